//! Headless fixed-step scene runner shared by the game crate.
//!
//! The engine owns the frame loop, scene switching, input snapshots and the
//! per-frame render layer. Game rules live entirely in the scenes.

pub mod app;

pub use app::{
    is_on_screen, run_headless, world_to_screen, AppError, Camera2D, InputAction, InputSnapshot,
    InputSource, LoopConfig, LoopMetricsSnapshot, RenderItem, RenderLayer, RunReport, Scene,
    SceneCommand, SceneKey, SceneWorld, Vec2, Viewport,
};
