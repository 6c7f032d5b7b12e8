use engine::{RenderLayer, Vec2};

use super::body::{MovingBody, Positioned};

const BASE_RADIUS: f32 = 24.0;
const SCALE: f32 = 0.5;

/// Passive prop. Sits where it was placed until the next restart.
#[derive(Debug, Clone)]
pub(crate) struct Treasure {
    body: MovingBody,
}

impl Treasure {
    pub(crate) fn new(position: Vec2) -> Self {
        let mut body = MovingBody::new(BASE_RADIUS);
        body.set_scale(SCALE);
        body.position = position;
        body.refresh_draw_order();
        Self { body }
    }

    pub(crate) fn place(&mut self, position: Vec2) {
        self.body.velocity = Vec2::ZERO;
        self.body.position = position;
        self.body.refresh_draw_order();
    }

    pub(crate) fn post_update(&mut self, dt: f32) {
        self.body.post_update(dt);
    }

    pub(crate) fn render(&self, layer: &mut RenderLayer) {
        if self.body.visible {
            layer.push(self.body.render_item("treasure"));
        }
    }
}

impl Positioned for Treasure {
    fn body(&self) -> &MovingBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut MovingBody {
        &mut self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn treasure_stays_put() {
        let spot = Vec2::new(420.0, 240.0);
        let mut treasure = Treasure::new(spot);
        treasure.post_update(1.0);
        assert_eq!(treasure.position(), spot);
    }

    #[test]
    fn place_moves_and_stops_the_treasure() {
        let mut treasure = Treasure::new(Vec2::new(420.0, 240.0));
        treasure.body_mut().velocity = Vec2::new(3.0, -1.0);
        treasure.place(Vec2::new(100.0, 50.0));
        treasure.post_update(1.0);
        assert_eq!(treasure.position(), Vec2::new(100.0, 50.0));
    }
}
