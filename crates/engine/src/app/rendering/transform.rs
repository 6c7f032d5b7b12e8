use crate::app::{Camera2D, Vec2};

/// Logical size of the drawing surface in pixels. The arena is
/// drawn 1:1, so one world unit is one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 640,
            height: 640,
        }
    }
}

/// Screen space is y-down like world space; the camera position lands at
/// the viewport centre.
pub fn world_to_screen(world: Vec2, camera: &Camera2D, viewport: Viewport) -> (i32, i32) {
    let x = world.x - camera.position.x + viewport.width as f32 * 0.5;
    let y = world.y - camera.position.y + viewport.height as f32 * 0.5;
    (x.round() as i32, y.round() as i32)
}

pub fn is_on_screen(world: Vec2, margin_px: i32, camera: &Camera2D, viewport: Viewport) -> bool {
    let (x, y) = world_to_screen(world, camera, viewport);
    x >= -margin_px
        && y >= -margin_px
        && x <= viewport.width as i32 + margin_px
        && y <= viewport.height as i32 + margin_px
}
