use engine::{LoopConfig, Scene};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::autopilot::Autopilot;
use super::config::{ConfigError, GameConfig};
use super::gameplay::{self, TracingUiSink};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) title: Box<dyn Scene>,
    pub(crate) play: Box<dyn Scene>,
    pub(crate) input: Autopilot,
    pub(crate) seed: u64,
}

pub(crate) fn build_app() -> Result<AppWiring, ConfigError> {
    init_tracing();
    info!("=== Big Chungus Startup ===");

    let game_config = GameConfig::load_from_env()?;
    Ok(wire(&game_config))
}

/// Everything `build_app` does after logging and config, for a config in hand.
pub(crate) fn wire(game_config: &GameConfig) -> AppWiring {
    let seed = game_config.seed.unwrap_or_else(rand::random);
    let settings = game_config.to_sim_settings();
    let arena_center = settings.arena.center();
    info!(
        seed,
        enemy_population_limit = settings.enemy_population_limit,
        player_max_health = settings.player_max_health,
        "arena_configured"
    );

    let (title, play) = gameplay::build_scene_pair(settings, seed, Box::new(TracingUiSink));
    AppWiring {
        config: game_config.to_loop_config(),
        title,
        play,
        input: Autopilot::new(arena_center, game_config.autopilot_games),
        seed,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
