use std::cmp::Ordering;

use crate::app::Vec2;

/// Owned snapshot of one drawable. Scenes hand these over instead of
/// references to their entities, so a renderer never aliases simulation state.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem {
    pub sprite: &'static str,
    pub world_position: Vec2,
    pub elevation: f32,
    pub scale: f32,
    pub rotation: f32,
    pub tint: u32,
    pub alpha: f32,
    pub shadow_scale: f32,
    pub draw_order: f32,
}

impl RenderItem {
    pub fn new(sprite: &'static str, world_position: Vec2) -> Self {
        Self {
            sprite,
            world_position,
            elevation: 0.0,
            scale: 1.0,
            rotation: 0.0,
            tint: 0xffffff,
            alpha: 1.0,
            shadow_scale: 1.0,
            draw_order: world_position.y,
        }
    }
}

#[derive(Debug, Default)]
pub struct RenderLayer {
    items: Vec<RenderItem>,
}

impl RenderLayer {
    pub fn push(&mut self, item: RenderItem) {
        self.items.push(item);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[RenderItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter_sprite<'a>(&'a self, sprite: &'a str) -> impl Iterator<Item = &'a RenderItem> + 'a {
        self.items.iter().filter(move |item| item.sprite == sprite)
    }

    /// Smaller keys draw first. Stable, so equal keys keep push order.
    pub fn sort_by_draw_order(&mut self) {
        self.items.sort_by(|a, b| {
            a.draw_order
                .partial_cmp(&b.draw_order)
                .unwrap_or(Ordering::Equal)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(sprite: &'static str, draw_order: f32) -> RenderItem {
        RenderItem {
            draw_order,
            ..RenderItem::new(sprite, Vec2::ZERO)
        }
    }

    #[test]
    fn default_draw_order_is_world_y() {
        let item = RenderItem::new("boulder", Vec2 { x: 4.0, y: 9.0 });
        assert_eq!(item.draw_order, 9.0);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut layer = RenderLayer::default();
        layer.push(item("b", 2.0));
        layer.push(item("first", 1.0));
        layer.push(item("second", 1.0));
        layer.sort_by_draw_order();

        let sprites: Vec<&str> = layer.items().iter().map(|item| item.sprite).collect();
        assert_eq!(sprites, vec!["first", "second", "b"]);
    }

    #[test]
    fn iter_sprite_filters_by_key() {
        let mut layer = RenderLayer::default();
        layer.push(item("taz", 1.0));
        layer.push(item("elmer", 2.0));
        layer.push(item("taz", 3.0));

        assert_eq!(layer.iter_sprite("taz").count(), 2);
        assert_eq!(layer.len(), 3);
    }
}
