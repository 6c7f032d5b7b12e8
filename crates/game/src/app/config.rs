use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine::LoopConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::gameplay::{Bounds, SimSettings};

pub(crate) const CONFIG_ENV_VAR: &str = "CHUNGUS_CONFIG";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path} at {location}: {source}")]
    Parse {
        path: PathBuf,
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config at {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LoopSection {
    pub(crate) target_tps: u32,
    pub(crate) max_frame_delta_ms: u64,
    pub(crate) max_ticks_per_frame: u32,
    /// `None` only makes sense together with `realtime`.
    pub(crate) max_frames: Option<u64>,
    pub(crate) realtime: bool,
    pub(crate) render_fps: u32,
    pub(crate) metrics_log_interval_ms: u64,
}

impl Default for LoopSection {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta_ms: 250,
            max_ticks_per_frame: 5,
            max_frames: Some(3600),
            realtime: false,
            render_fps: 60,
            metrics_log_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ArenaSection {
    pub(crate) min_x: f32,
    pub(crate) max_x: f32,
    pub(crate) min_y: f32,
    pub(crate) max_y: f32,
    pub(crate) wander_margin: f32,
    pub(crate) spawn_min: i32,
    pub(crate) spawn_max: i32,
    pub(crate) min_spawn_distance: f32,
    pub(crate) pickup_min: i32,
    pub(crate) pickup_max: i32,
}

impl Default for ArenaSection {
    fn default() -> Self {
        let settings = SimSettings::default();
        Self {
            min_x: settings.arena.min_x,
            max_x: settings.arena.max_x,
            min_y: settings.arena.min_y,
            max_y: settings.arena.max_y,
            wander_margin: settings.wander_margin,
            spawn_min: settings.spawn_min,
            spawn_max: settings.spawn_max,
            min_spawn_distance: settings.min_spawn_distance,
            pickup_min: settings.pickup_min,
            pickup_max: settings.pickup_max,
        }
    }
}

/// Tuning file. Every field is optional; missing ones keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) seed: Option<u64>,
    #[serde(rename = "loop")]
    pub(crate) loop_: LoopSection,
    pub(crate) arena: ArenaSection,
    pub(crate) enemy_population_limit: usize,
    pub(crate) player_max_health: i32,
    /// Games the autopilot plays before quitting. `None` keeps replaying.
    pub(crate) autopilot_games: Option<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let settings = SimSettings::default();
        Self {
            seed: None,
            loop_: LoopSection::default(),
            arena: ArenaSection::default(),
            enemy_population_limit: settings.enemy_population_limit,
            player_max_health: settings.player_max_health,
            autopilot_games: None,
        }
    }
}

impl GameConfig {
    /// Reads the file named by `CHUNGUS_CONFIG`, or the defaults when unset.
    pub(crate) fn load_from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => {
                info!("config_defaults");
                Ok(Self::default())
            }
        }
    }

    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(path, &raw)?;
        config.validate()?;
        info!(path = %path.display(), seed = ?config.seed, "config_loaded");
        Ok(config)
    }

    fn parse(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize::<_, GameConfig>(&mut deserializer).map_err(|error| {
            let location = error.path().to_string();
            ConfigError::Parse {
                path: path.to_path_buf(),
                location,
                source: error.into_inner(),
            }
        })
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let arena = &self.arena;
        if arena.min_x >= arena.max_x {
            return Err(invalid("arena.max_x", "must be greater than arena.min_x"));
        }
        if arena.min_y >= arena.max_y {
            return Err(invalid("arena.max_y", "must be greater than arena.min_y"));
        }
        if arena.spawn_min > arena.spawn_max {
            return Err(invalid(
                "arena.spawn_max",
                format!("{} is below spawn_min {}", arena.spawn_max, arena.spawn_min),
            ));
        }
        if arena.pickup_min > arena.pickup_max {
            return Err(invalid(
                "arena.pickup_max",
                format!("{} is below pickup_min {}", arena.pickup_max, arena.pickup_min),
            ));
        }
        if arena.min_spawn_distance < 0.0 {
            return Err(invalid("arena.min_spawn_distance", "cannot be negative"));
        }
        if self.enemy_population_limit == 0 {
            return Err(invalid("enemy_population_limit", "must be at least 1"));
        }
        if self.player_max_health <= 0 {
            return Err(invalid("player_max_health", "must be at least 1"));
        }
        if self.loop_.render_fps == 0 {
            return Err(invalid("loop.render_fps", "must be greater than zero"));
        }
        if self.loop_.max_frames.is_none() && !self.loop_.realtime {
            return Err(invalid(
                "loop.max_frames",
                "required unless loop.realtime is set",
            ));
        }
        Ok(())
    }

    pub(crate) fn to_sim_settings(&self) -> SimSettings {
        let arena = &self.arena;
        SimSettings {
            arena: Bounds {
                min_x: arena.min_x,
                max_x: arena.max_x,
                min_y: arena.min_y,
                max_y: arena.max_y,
            },
            wander_margin: arena.wander_margin,
            spawn_min: arena.spawn_min,
            spawn_max: arena.spawn_max,
            min_spawn_distance: arena.min_spawn_distance,
            pickup_min: arena.pickup_min,
            pickup_max: arena.pickup_max,
            enemy_population_limit: self.enemy_population_limit,
            player_max_health: self.player_max_health,
        }
    }

    pub(crate) fn to_loop_config(&self) -> LoopConfig {
        let section = &self.loop_;
        LoopConfig {
            target_tps: section.target_tps,
            max_frame_delta: Duration::from_millis(section.max_frame_delta_ms),
            max_ticks_per_frame: section.max_ticks_per_frame,
            metrics_log_interval: Duration::from_millis(section.metrics_log_interval_ms),
            max_frames: section.max_frames,
            realtime: section.realtime,
            render_fps: section.render_fps,
            ..LoopConfig::default()
        }
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write_config(temp: &TempDir, json: &str) -> PathBuf {
        let path = temp.path().join("chungus.json");
        fs::write(&path, json).expect("write config");
        path
    }

    #[test]
    fn defaults_match_simulation_defaults() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.to_sim_settings(), SimSettings::default());
        let loop_config = config.to_loop_config();
        assert_eq!(loop_config.target_tps, 60);
        assert_eq!(loop_config.max_frames, Some(3600));
        assert_eq!(loop_config.max_frame_delta, Duration::from_millis(250));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().expect("temp");
        let path = write_config(
            &temp,
            r#"{ "seed": 7, "loop": { "max_frames": 120 }, "arena": { "spawn_min": 100 } }"#,
        );
        let config = GameConfig::load(&path).expect("load");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.loop_.max_frames, Some(120));
        assert_eq!(config.loop_.target_tps, 60);
        assert_eq!(config.arena.spawn_min, 100);
        assert_eq!(config.arena.spawn_max, 440);
        assert_eq!(config.player_max_health, 5);
    }

    #[test]
    fn parse_error_names_the_offending_field() {
        let temp = TempDir::new().expect("temp");
        let path = write_config(&temp, r#"{ "arena": { "pickup_min": "near" } }"#);
        let error = GameConfig::load(&path).expect_err("should fail");
        match error {
            ConfigError::Parse { location, .. } => assert_eq!(location, "arena.pickup_min"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let temp = TempDir::new().expect("temp");
        let path = write_config(&temp, r#"{ "arena": { "lava": true } }"#);
        assert!(matches!(
            GameConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn inverted_ranges_fail_validation() {
        let temp = TempDir::new().expect("temp");
        let path = write_config(&temp, r#"{ "arena": { "pickup_min": 400, "pickup_max": 100 } }"#);
        match GameConfig::load(&path) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "arena.pickup_max"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn zero_health_fails_validation() {
        let config = GameConfig {
            player_max_health: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "player_max_health",
                ..
            })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("absent.json");
        assert!(matches!(
            GameConfig::load(&path),
            Err(ConfigError::Read { .. })
        ));
    }
}
