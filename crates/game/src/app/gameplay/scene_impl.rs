use engine::{
    InputAction, InputSnapshot, RenderItem, Scene, SceneCommand, SceneKey, SceneWorld, Vec2,
};
use tracing::info;

use super::events::{dispatch, UiSink};
use super::simulation::{PlayerIntent, SimSettings, Simulation};

/// Menu shown before the first game and after quitting one.
pub(crate) struct TitleScene {
    focus: Vec2,
}

impl TitleScene {
    pub(crate) fn new(focus: Vec2) -> Self {
        Self { focus }
    }
}

impl Scene for TitleScene {
    fn load(&mut self, world: &mut SceneWorld) {
        world.camera_mut().follow(self.focus, 0.0);
        info!(scene = "title", "scene_ready");
    }

    fn update(
        &mut self,
        _fixed_dt: f32,
        input: &InputSnapshot,
        _world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.is_down(InputAction::Quit) {
            return SceneCommand::Quit;
        }
        if input.primary_pressed() {
            return SceneCommand::HardResetTo(SceneKey::Play);
        }
        SceneCommand::None
    }

    fn render(&mut self, world: &mut SceneWorld) {
        world
            .render_layer_mut()
            .push(RenderItem::new("title_logo", self.focus));
    }

    fn unload(&mut self, _world: &mut SceneWorld) {}

    fn debug_title(&self) -> Option<String> {
        Some("Big Chungus | press to play".to_string())
    }
}

/// Hosts the [`Simulation`]. The first load builds it; every later load
/// restarts it, which keeps the RNG stream and the best score.
pub(crate) struct PlayScene {
    settings: SimSettings,
    seed: u64,
    games_started: u64,
    simulation: Option<Simulation>,
    ui: Box<dyn UiSink>,
}

impl PlayScene {
    pub(crate) fn new(settings: SimSettings, seed: u64, ui: Box<dyn UiSink>) -> Self {
        Self {
            settings,
            seed,
            games_started: 0,
            simulation: None,
            ui,
        }
    }

    fn flush_events(&mut self) {
        if let Some(simulation) = self.simulation.as_mut() {
            dispatch(simulation.drain_events(), self.ui.as_mut());
        }
    }

    fn follow_player(simulation: &Simulation, world: &mut SceneWorld) {
        let (focus, offset) = simulation.camera_focus();
        world.camera_mut().follow(focus, offset);
    }
}

impl Scene for PlayScene {
    fn load(&mut self, world: &mut SceneWorld) {
        self.games_started += 1;
        match self.simulation.as_mut() {
            Some(simulation) => simulation.restart(),
            None => self.simulation = Some(Simulation::new(self.settings.clone(), self.seed)),
        }
        let Some(simulation) = self.simulation.as_ref() else {
            return;
        };
        Self::follow_player(simulation, world);
        info!(
            scene = "play",
            seed = self.seed,
            game = self.games_started,
            "scene_ready"
        );
        self.flush_events();
    }

    fn update(
        &mut self,
        fixed_dt: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        let Some(simulation) = self.simulation.as_mut() else {
            return SceneCommand::None;
        };

        if simulation.ending().is_some() {
            if input.is_down(InputAction::Quit) {
                return SceneCommand::SwitchTo(SceneKey::Title);
            }
            if input.primary_pressed() {
                return SceneCommand::HardResetTo(SceneKey::Play);
            }
        }

        let intent = PlayerIntent {
            move_dir: input.move_vector(),
            dash_target: input.pointer_world(),
            primary_held: input.primary_held(),
        };
        simulation.tick(fixed_dt, intent);
        dispatch(simulation.drain_events(), self.ui.as_mut());
        Self::follow_player(simulation, world);
        SceneCommand::None
    }

    fn render(&mut self, world: &mut SceneWorld) {
        if let Some(simulation) = &self.simulation {
            simulation.render_into(world.render_layer_mut());
        }
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        if let Some(simulation) = &self.simulation {
            info!(
                score = simulation.score(),
                high_score = simulation.high_score(),
                wave = simulation.wave(),
                frames = simulation.frame(),
                "play_unloaded"
            );
        }
    }

    fn debug_title(&self) -> Option<String> {
        let simulation = self.simulation.as_ref()?;
        let player = simulation.player();
        let health = player.health();
        let mut title = format!(
            "Big Chungus | wave {} | enemies {} | score {}{} | best {} | hp {}/{}",
            simulation.wave(),
            simulation.active_enemies(),
            simulation.score(),
            if simulation.score_frozen() { " (final)" } else { "" },
            simulation.high_score(),
            health.current(),
            health.max(),
        );
        if health.is_extended() {
            title.push('+');
        }
        if player.has_power_banked() {
            title.push_str(" | power banked");
        }
        Some(title)
    }
}

#[cfg(test)]
impl PlayScene {
    pub(crate) fn simulation_mut(&mut self) -> Option<&mut Simulation> {
        self.simulation.as_mut()
    }
}
