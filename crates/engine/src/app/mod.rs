mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::InputAction;
pub use loop_runner::{run_headless, AppError, InputSource, LoopConfig, RunReport};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{is_on_screen, world_to_screen, RenderItem, RenderLayer, Viewport};
pub use scene::{
    Camera2D, InputSnapshot, Scene, SceneCommand, SceneKey, SceneWorld, Vec2,
};
