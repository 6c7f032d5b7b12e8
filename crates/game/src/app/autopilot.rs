use engine::{InputAction, InputSnapshot, InputSource, RenderItem, SceneKey, SceneWorld, Vec2};
use tracing::info;

/// Ticks spent on the title before pressing start.
const START_DELAY_TICKS: u32 = 30;
/// Ticks the ending banner stays up before the next choice.
const REPLAY_DELAY_TICKS: u32 = 120;
const DASH_RANGE: f32 = 180.0;
const RETREAT_RANGE: f32 = 90.0;
const ORBIT_RADIUS: f32 = 140.0;

const PLAYER_SPRITES: [&str; 2] = ["chungus", "chungus_power"];
const ENEMY_SPRITES: [&str; 2] = ["taz", "elmer"];

/// Plays the game from the render layer alone, the way a person watching the
/// screen would. Drives the headless binary.
#[derive(Debug)]
pub(crate) struct Autopilot {
    arena_center: Vec2,
    /// `None` replays forever.
    games_to_play: Option<u32>,
    games_finished: u32,
    active_scene: Option<SceneKey>,
    scene_ticks: u32,
    ending_ticks: u32,
}

impl Autopilot {
    pub(crate) fn new(arena_center: Vec2, games_to_play: Option<u32>) -> Self {
        Self {
            arena_center,
            games_to_play,
            games_finished: 0,
            active_scene: None,
            scene_ticks: 0,
            ending_ticks: 0,
        }
    }

    pub(crate) fn games_finished(&self) -> u32 {
        self.games_finished
    }

    fn is_done(&self) -> bool {
        self.games_to_play
            .is_some_and(|limit| self.games_finished >= limit)
    }

    fn title_input(&self) -> InputSnapshot {
        if self.is_done() {
            info!(games = self.games_finished, "autopilot_finished");
            return InputSnapshot::empty().with_quit_requested(true);
        }
        InputSnapshot::empty().with_primary_pressed(self.scene_ticks == START_DELAY_TICKS)
    }

    fn play_input(&mut self, items: &[RenderItem]) -> InputSnapshot {
        if items.iter().any(|item| item.sprite == "ending_banner") {
            return self.ending_input();
        }
        self.ending_ticks = 0;

        let Some(player) = first_position(items, &PLAYER_SPRITES) else {
            return InputSnapshot::empty();
        };
        let enemy = nearest(items, &ENEMY_SPRITES, player);
        let carrot = nearest(items, &["carrot"], player);

        let heading = match (enemy, carrot) {
            (Some(enemy), _) if enemy.distance(player) < RETREAT_RANGE => player - enemy,
            (_, Some(carrot)) => carrot - player,
            _ => self.orbit(player),
        };
        let dash = enemy.is_some_and(|enemy| enemy.distance(player) < DASH_RANGE);

        InputSnapshot::empty()
            .with_move_axis(Some(heading))
            .with_pointer_world(enemy)
            .with_action_down(InputAction::Primary, dash)
    }

    fn ending_input(&mut self) -> InputSnapshot {
        self.ending_ticks += 1;
        if self.ending_ticks == 1 {
            self.games_finished += 1;
            info!(games = self.games_finished, "autopilot_game_over");
        }
        if self.ending_ticks < REPLAY_DELAY_TICKS {
            return InputSnapshot::empty();
        }
        if self.is_done() {
            InputSnapshot::empty().with_action_down(InputAction::Quit, true)
        } else {
            InputSnapshot::empty().with_primary_pressed(self.ending_ticks == REPLAY_DELAY_TICKS)
        }
    }

    /// Circles the arena centre, drifting back toward the orbit radius.
    fn orbit(&self, player: Vec2) -> Vec2 {
        let offset = player - self.arena_center;
        let distance = offset.length();
        let tangent = offset.perpendicular().normalized_or_zero();
        let radial = offset.normalized_or_zero() * ((ORBIT_RADIUS - distance) / ORBIT_RADIUS);
        tangent + radial
    }
}

impl InputSource for Autopilot {
    fn snapshot_for_tick(&mut self, active_scene: SceneKey, world: &SceneWorld) -> InputSnapshot {
        if self.active_scene != Some(active_scene) {
            self.active_scene = Some(active_scene);
            self.scene_ticks = 0;
            self.ending_ticks = 0;
        }
        self.scene_ticks = self.scene_ticks.saturating_add(1);
        match active_scene {
            SceneKey::Title => self.title_input(),
            SceneKey::Play => self.play_input(world.render_layer().items()),
        }
    }
}

fn first_position(items: &[RenderItem], sprites: &[&str]) -> Option<Vec2> {
    items
        .iter()
        .find(|item| sprites.contains(&item.sprite))
        .map(|item| item.world_position)
}

fn nearest(items: &[RenderItem], sprites: &[&str], from: Vec2) -> Option<Vec2> {
    items
        .iter()
        .filter(|item| sprites.contains(&item.sprite))
        .map(|item| item.world_position)
        .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Vec2 = Vec2::new(256.0, 256.0);

    fn world_with(items: &[(&'static str, Vec2)]) -> SceneWorld {
        let mut world = SceneWorld::default();
        for &(sprite, position) in items {
            world
                .render_layer_mut()
                .push(RenderItem::new(sprite, position));
        }
        world
    }

    #[test]
    fn presses_start_once_after_delay() {
        let mut autopilot = Autopilot::new(CENTER, None);
        let world = SceneWorld::default();
        let presses = (0..START_DELAY_TICKS * 3)
            .filter(|_| {
                autopilot
                    .snapshot_for_tick(SceneKey::Title, &world)
                    .primary_pressed()
            })
            .count();
        assert_eq!(presses, 1);
    }

    #[test]
    fn aims_at_nearest_enemy_and_dashes_in_range() {
        let mut autopilot = Autopilot::new(CENTER, None);
        let world = world_with(&[
            ("chungus", Vec2::new(100.0, 100.0)),
            ("elmer", Vec2::new(400.0, 400.0)),
            ("taz", Vec2::new(200.0, 100.0)),
        ]);
        let input = autopilot.snapshot_for_tick(SceneKey::Play, &world);
        assert_eq!(input.pointer_world(), Some(Vec2::new(200.0, 100.0)));
        assert!(input.primary_held());
        assert!(!input.move_vector().is_zero());
    }

    #[test]
    fn retreats_from_close_enemies() {
        let mut autopilot = Autopilot::new(CENTER, None);
        let world = world_with(&[
            ("chungus", Vec2::new(200.0, 200.0)),
            ("taz", Vec2::new(250.0, 200.0)),
            ("carrot", Vec2::new(300.0, 200.0)),
        ]);
        let input = autopilot.snapshot_for_tick(SceneKey::Play, &world);
        assert_eq!(input.move_vector(), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn heads_for_carrots_when_safe() {
        let mut autopilot = Autopilot::new(CENTER, None);
        let world = world_with(&[
            ("chungus", Vec2::new(200.0, 200.0)),
            ("carrot", Vec2::new(200.0, 300.0)),
        ]);
        let input = autopilot.snapshot_for_tick(SceneKey::Play, &world);
        assert_eq!(input.move_vector(), Vec2::new(0.0, 1.0));
        assert!(!input.primary_held());
        assert_eq!(input.pointer_world(), None);
    }

    #[test]
    fn replays_after_ending_until_limit_then_leaves() {
        let mut autopilot = Autopilot::new(CENTER, Some(1));
        let ended = world_with(&[("ending_banner", CENTER)]);

        let mut last = InputSnapshot::empty();
        for _ in 0..REPLAY_DELAY_TICKS {
            last = autopilot.snapshot_for_tick(SceneKey::Play, &ended);
        }
        assert_eq!(autopilot.games_finished(), 1);
        assert!(last.is_down(InputAction::Quit));
        assert!(!last.primary_pressed());

        let title = autopilot.snapshot_for_tick(SceneKey::Title, &SceneWorld::default());
        assert!(title.quit_requested());
    }

    #[test]
    fn endless_mode_presses_play_again() {
        let mut autopilot = Autopilot::new(CENTER, None);
        let ended = world_with(&[("ending_banner", CENTER)]);
        let presses = (0..REPLAY_DELAY_TICKS * 2)
            .filter(|_| {
                autopilot
                    .snapshot_for_tick(SceneKey::Play, &ended)
                    .primary_pressed()
            })
            .count();
        assert_eq!(presses, 1);
        assert_eq!(autopilot.games_finished(), 1);
    }

    #[test]
    fn empty_layer_gives_no_input() {
        let mut autopilot = Autopilot::new(CENTER, None);
        let input = autopilot.snapshot_for_tick(SceneKey::Play, &SceneWorld::default());
        assert!(input.move_vector().is_zero());
        assert!(!input.primary_held());
    }
}
