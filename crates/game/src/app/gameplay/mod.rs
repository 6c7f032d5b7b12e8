mod body;
mod character;
mod combat;
mod events;
mod geometry;
mod hazard;
mod health;
mod pickup;
mod player;
mod pool;
mod projectile;
mod pursuer;
mod ranged;
mod scene_impl;
mod score;
mod simulation;
mod treasure;
mod waves;

use engine::{Scene, Vec2};

pub(crate) use events::{TracingUiSink, UiSink};
pub(crate) use geometry::Bounds;
pub(crate) use scene_impl::{PlayScene, TitleScene};
pub(crate) use simulation::SimSettings;

/// Title and play scenes wired to the same arena settings.
pub(crate) fn build_scene_pair(
    settings: SimSettings,
    seed: u64,
    ui: Box<dyn UiSink>,
) -> (Box<dyn Scene>, Box<dyn Scene>) {
    let focus: Vec2 = settings.arena.center();
    let title = TitleScene::new(focus);
    let play = PlayScene::new(settings, seed, ui);
    (Box::new(title), Box::new(play))
}
