use engine::{RenderLayer, Vec2};
use rand::rngs::SmallRng;

use super::body::{MovingBody, Positioned};
use super::pool::Poolable;

const BASE_RADIUS: f32 = 8.0;
/// Frames before a shot fizzles out.
const LIFETIME: f32 = 150.0;
/// Roughly gun-barrel height.
const ELEVATION: f32 = 40.0;

#[derive(Debug, Clone)]
pub(crate) struct Projectile {
    body: MovingBody,
    remaining: f32,
    live: bool,
}

impl Projectile {
    pub(crate) fn new() -> Self {
        Self {
            body: MovingBody::new(BASE_RADIUS),
            remaining: 0.0,
            live: false,
        }
    }

    pub(crate) fn launch(&mut self, origin: Vec2, velocity: Vec2) {
        self.body.position = origin;
        self.body.velocity = velocity;
        self.body.rotation = velocity.angle();
        self.body.refresh_draw_order();
    }

    pub(crate) fn update(&mut self, dt: f32) {
        if !self.live {
            return;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.deactivate();
        }
    }

    pub(crate) fn post_update(&mut self, dt: f32) {
        if self.live {
            self.body.post_update(dt);
        }
    }

    pub(crate) fn render(&self, layer: &mut RenderLayer) {
        if self.live {
            layer.push(self.body.render_item("bullet"));
        }
    }
}

impl Positioned for Projectile {
    fn body(&self) -> &MovingBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut MovingBody {
        &mut self.body
    }
}

impl Poolable for Projectile {
    fn respawn(&mut self, _rng: &mut SmallRng) {
        self.live = true;
        self.remaining = LIFETIME;
        self.body.visible = true;
        self.body.velocity = Vec2::ZERO;
        self.body.set_elevation(ELEVATION);
        self.body.elevation_rate = 0.0;
    }

    fn is_inactive(&self) -> bool {
        !self.live
    }

    fn deactivate(&mut self) {
        self.live = false;
        self.body.visible = false;
    }
}
