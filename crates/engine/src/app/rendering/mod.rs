mod layer;
mod transform;

pub use layer::{RenderItem, RenderLayer};
pub use transform::{is_on_screen, world_to_screen, Viewport};
