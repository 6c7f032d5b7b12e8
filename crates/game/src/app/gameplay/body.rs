use engine::{RenderItem, Vec2};

use super::geometry::Bounds;

/// Smallest scale any body may take. Keeps the footprint radius positive.
pub(crate) const MIN_SCALE: f32 = 0.00390625;
/// Elevation at which the shadow has shrunk away completely.
const SHADOW_MAX_ELEVATION: f32 = 600.0;
/// Downward pull on elevation rate, per frame squared.
const GRAVITY: f32 = 1.0;

pub(crate) const WHITE: u32 = 0xffffff;

/// Ground-plane body with a pseudo-3D height.
///
/// The footprint is an ellipse twice as wide as it is tall. Velocity is only
/// integrated by [`MovingBody::post_update`]; per-entity logic writes it
/// during `update`.
#[derive(Debug, Clone)]
pub(crate) struct MovingBody {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) elevation_rate: f32,
    pub(crate) rotation: f32,
    pub(crate) tint: u32,
    pub(crate) alpha: f32,
    pub(crate) visible: bool,
    elevation: f32,
    scale: f32,
    base_radius: f32,
    radius: f32,
    shadow_scale: f32,
    draw_order: f32,
}

impl MovingBody {
    pub(crate) fn new(base_radius: f32) -> Self {
        let base_radius = base_radius.max(0.0);
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            elevation_rate: 0.0,
            rotation: 0.0,
            tint: WHITE,
            alpha: 1.0,
            visible: true,
            elevation: 0.0,
            scale: 1.0,
            base_radius,
            radius: base_radius,
            shadow_scale: 1.0,
            draw_order: 0.0,
        }
    }

    pub(crate) fn set_scale(&mut self, scale: f32) {
        let scale = if scale.is_nan() { MIN_SCALE } else { scale };
        self.scale = scale.max(MIN_SCALE);
        self.radius = self.base_radius * self.scale;
    }

    pub(crate) fn scale(&self) -> f32 {
        self.scale
    }

    pub(crate) fn radius(&self) -> f32 {
        self.radius
    }

    pub(crate) fn set_elevation(&mut self, elevation: f32) {
        self.elevation = elevation.max(0.0);
        self.shadow_scale = 1.0 - normalized_elevation(self.elevation);
    }

    pub(crate) fn elevation(&self) -> f32 {
        self.elevation
    }

    pub(crate) fn is_grounded(&self) -> bool {
        self.elevation == 0.0
    }

    pub(crate) fn shadow_scale(&self) -> f32 {
        self.shadow_scale
    }

    pub(crate) fn draw_order(&self) -> f32 {
        self.draw_order
    }

    /// Gravity only acts while airborne or launching.
    pub(crate) fn apply_gravity(&mut self, dt: f32) {
        if self.elevation > 0.0 || self.elevation_rate > 0.0 {
            self.elevation_rate -= GRAVITY * dt;
        }
    }

    pub(crate) fn post_update(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        if self.elevation_rate != 0.0 {
            let next = self.elevation + self.elevation_rate * dt;
            if next < 0.0 {
                self.set_elevation(0.0);
                self.elevation_rate = 0.0;
            } else {
                self.set_elevation(next);
            }
        }
        self.refresh_draw_order();
    }

    pub(crate) fn refresh_draw_order(&mut self) {
        self.draw_order = self.position.y;
    }

    /// Footprints overlap when the centre distance, with y doubled to undo
    /// the 2:1 ellipse, is below the sum of the radii.
    pub(crate) fn collides_with(&self, other: &MovingBody) -> bool {
        let dx = self.position.x - other.position.x;
        let dy = (self.position.y - other.position.y) * 2.0;
        let reach = self.radius + other.radius;
        dx * dx + dy * dy < reach * reach
    }

    /// Clamps the footprint inside `bounds`. Returns which axes were clamped.
    pub(crate) fn constrain_to_bounds(&mut self, bounds: &Bounds) -> (bool, bool) {
        let quarter = self.radius * 0.25;
        let x = clamp_axis(
            self.position.x,
            bounds.min_x + self.radius,
            bounds.max_x - self.radius,
        );
        let y = clamp_axis(self.position.y, bounds.min_y + quarter, bounds.max_y - quarter);
        let clamped = (x != self.position.x, y != self.position.y);
        self.position = Vec2::new(x, y);
        clamped
    }

    pub(crate) fn render_item(&self, sprite: &'static str) -> RenderItem {
        RenderItem {
            elevation: self.elevation,
            scale: self.scale,
            rotation: self.rotation,
            tint: self.tint,
            alpha: self.alpha,
            shadow_scale: self.shadow_scale,
            draw_order: self.draw_order,
            ..RenderItem::new(sprite, self.position)
        }
    }
}

fn clamp_axis(value: f32, lo: f32, hi: f32) -> f32 {
    if lo > hi {
        return (lo + hi) * 0.5;
    }
    value.clamp(lo, hi)
}

fn normalized_elevation(elevation: f32) -> f32 {
    (elevation / SHADOW_MAX_ELEVATION).clamp(0.0, 1.0)
}

/// Anything with a ground body.
pub(crate) trait Positioned {
    fn body(&self) -> &MovingBody;
    fn body_mut(&mut self) -> &mut MovingBody;

    fn position(&self) -> Vec2 {
        self.body().position
    }
}

pub(crate) trait Collidable: Positioned {
    fn overlaps<T: Positioned + ?Sized>(&self, other: &T) -> bool {
        self.body().collides_with(other.body())
    }
}

impl<T: Positioned + ?Sized> Collidable for T {}
