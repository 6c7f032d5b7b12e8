use engine::{RenderLayer, Vec2};

use super::body::{MovingBody, Positioned};
use super::character::Hit;
use super::geometry::Bounds;

const BASE_RADIUS: f32 = 64.0;
const SCALE: f32 = 0.6;
const DAMPING: f32 = 0.99;
/// Squared speed above which the boulder hurts whatever it hits.
const FAST_THRESHOLD_SQ: f32 = 12.0;
const ROLL_FACTOR: f32 = 0.05;
const DROP_ELEVATION: f32 = 500.0;
const FAST_TINT: u32 = 0xffffff;
const SLOW_TINT: u32 = 0xcccccc;

/// Free-rolling boulder. Never defeated; bounces off the arena walls.
#[derive(Debug, Clone)]
pub(crate) struct Boulder {
    body: MovingBody,
    live: bool,
    moving_quick: bool,
}

impl Boulder {
    pub(crate) fn new() -> Self {
        let mut body = MovingBody::new(BASE_RADIUS);
        body.visible = false;
        Self {
            body,
            live: false,
            moving_quick: false,
        }
    }

    /// Drops the boulder out of the sky at `position`.
    pub(crate) fn init(&mut self, position: Vec2) {
        self.live = true;
        self.moving_quick = false;
        let body = &mut self.body;
        body.visible = true;
        body.position = position;
        body.velocity = Vec2::ZERO;
        body.rotation = 0.0;
        body.tint = SLOW_TINT;
        body.set_scale(SCALE);
        body.set_elevation(DROP_ELEVATION);
        body.elevation_rate = -1.0;
        body.refresh_draw_order();
    }

    pub(crate) fn deactivate(&mut self) {
        self.live = false;
        self.moving_quick = false;
        self.body.visible = false;
    }

    pub(crate) fn is_inactive(&self) -> bool {
        !self.live
    }

    pub(crate) fn is_moving_quick(&self) -> bool {
        self.moving_quick
    }

    pub(crate) fn update(&mut self, dt: f32) {
        if !self.live {
            return;
        }
        let body = &mut self.body;
        body.apply_gravity(dt);
        body.velocity = body.velocity * DAMPING.powf(dt);
        self.moving_quick = body.velocity.length_squared() > FAST_THRESHOLD_SQ;
        body.tint = if self.moving_quick { FAST_TINT } else { SLOW_TINT };
        body.rotation += body.velocity.x * dt * ROLL_FACTOR;
    }

    pub(crate) fn post_update(&mut self, dt: f32, arena: &Bounds) {
        if !self.live {
            return;
        }
        self.body.post_update(dt);
        self.constrain_position(arena);
    }

    /// Gets shoved by the attacker's velocity.
    pub(crate) fn take_damage(&mut self, hit: Hit) {
        self.body.velocity += hit.source_velocity;
    }

    /// Clamps like any body, then reflects velocity on every clamped axis.
    pub(crate) fn constrain_position(&mut self, arena: &Bounds) {
        let (bounced_x, bounced_y) = self.body.constrain_to_bounds(arena);
        if bounced_x {
            self.body.velocity.x = -self.body.velocity.x;
        }
        if bounced_y {
            self.body.velocity.y = -self.body.velocity.y;
        }
    }

    pub(crate) fn render(&self, layer: &mut RenderLayer) {
        if self.live {
            layer.push(self.body.render_item("boulder"));
        }
    }
}

impl Positioned for Boulder {
    fn body(&self) -> &MovingBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut MovingBody {
        &mut self.body
    }
}
