use engine::{RenderItem, RenderLayer, Vec2};
use rand::rngs::SmallRng;

use super::body::{MovingBody, Positioned};
use super::character::{CharacterCore, DamageOutcome, Damageable, Hit};
use super::geometry::{point_to, Bounds};
use super::pool::Poolable;

const BASE_RADIUS: f32 = 56.0;
const SCALE: f32 = 0.7;
const WALK_SPEED: f32 = 2.0;
const HIT_POINTS: u32 = 2;
pub(crate) const AGGRO_RADIUS: f32 = 80.0;
pub(crate) const CALMDOWN_RADIUS: f32 = 120.0;
const CHARGE_RATE: f32 = 0.01;
/// Squared distance under which a destination counts as reached.
const ARRIVAL_DISTANCE_SQ: f32 = 10.0;
const HURT_DURATION: f32 = 30.0;
const HURT_DAMPING: f32 = 0.9;
const HURT_TINT: u32 = 0xff6666;
const RESIDUAL_TINT: u32 = 0xffcccc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PursuerState {
    Walking,
    Hurt,
}

/// Melee enemy. Wanders until the target comes close, then chases it and
/// charges up contact damage.
#[derive(Debug, Clone)]
pub(crate) struct Pursuer {
    core: CharacterCore,
    state: PursuerState,
    hit_points: u32,
    aggro: bool,
    charge: f32,
    wander_dest: Vec2,
    wander_bounds: Bounds,
    hurt_time: f32,
}

impl Pursuer {
    pub(crate) fn new(wander_bounds: Bounds) -> Self {
        Self {
            core: CharacterCore::new(BASE_RADIUS),
            state: PursuerState::Walking,
            hit_points: HIT_POINTS,
            aggro: false,
            charge: 0.0,
            wander_dest: wander_bounds.center(),
            wander_bounds,
            hurt_time: 0.0,
        }
    }

    pub(crate) fn update(&mut self, dt: f32, target: Vec2, rng: &mut SmallRng) {
        self.core.update(dt);
        if !self.core.is_active() {
            return;
        }
        match self.state {
            PursuerState::Walking => self.update_walking(dt, target, rng),
            PursuerState::Hurt => self.update_hurt(dt),
        }
    }

    pub(crate) fn post_update(&mut self, dt: f32, arena: &Bounds) {
        self.core.body.post_update(dt);
        if self.core.is_active() {
            self.core.body.constrain_to_bounds(arena);
        }
    }

    /// Deals contact damage only once fully charged.
    pub(crate) fn can_damage(&self) -> bool {
        self.core.is_active() && self.state == PursuerState::Walking && self.charge >= 1.0
    }

    pub(crate) fn is_aggro(&self) -> bool {
        self.aggro
    }

    pub(crate) fn charge(&self) -> f32 {
        self.charge
    }

    pub(crate) fn state(&self) -> PursuerState {
        self.state
    }

    pub(crate) fn hit_points(&self) -> u32 {
        self.hit_points
    }

    pub(crate) fn render(&self, layer: &mut RenderLayer) {
        let body = &self.core.body;
        if !body.visible {
            return;
        }
        layer.push(body.render_item("taz"));
        if self.aggro && self.core.is_active() {
            layer.push(RenderItem {
                alpha: self.charge,
                elevation: body.elevation(),
                scale: body.scale(),
                draw_order: body.draw_order() + 0.5,
                ..RenderItem::new("taz_eyes", body.position)
            });
        }
    }

    fn update_walking(&mut self, dt: f32, target: Vec2, rng: &mut SmallRng) {
        let position = self.core.body.position;
        let to_target = point_to(position, target);
        let distance_sq = to_target.length_squared();
        if distance_sq < AGGRO_RADIUS * AGGRO_RADIUS {
            self.aggro = true;
        } else if distance_sq > CALMDOWN_RADIUS * CALMDOWN_RADIUS {
            self.aggro = false;
        }

        let heading = if self.aggro {
            self.charge = (self.charge + CHARGE_RATE * dt).min(1.0);
            if distance_sq < ARRIVAL_DISTANCE_SQ {
                self.core.body.velocity = Vec2::ZERO;
                return;
            }
            to_target
        } else {
            self.charge = (self.charge - CHARGE_RATE * dt).max(0.0);
            let mut to_dest = point_to(position, self.wander_dest);
            if to_dest.length_squared() < ARRIVAL_DISTANCE_SQ {
                self.wander_dest = self.wander_bounds.random_point(rng);
                to_dest = point_to(position, self.wander_dest);
            }
            to_dest
        };
        self.core.body.velocity = heading.normalized_or_zero() * WALK_SPEED;
    }

    fn update_hurt(&mut self, dt: f32) {
        let body = &mut self.core.body;
        body.velocity = body.velocity * HURT_DAMPING.powf(dt);
        self.hurt_time -= dt;
        if self.hurt_time <= 0.0 {
            self.state = PursuerState::Walking;
            body.tint = RESIDUAL_TINT;
        }
    }
}

impl Positioned for Pursuer {
    fn body(&self) -> &MovingBody {
        &self.core.body
    }

    fn body_mut(&mut self) -> &mut MovingBody {
        &mut self.core.body
    }
}

impl Damageable for Pursuer {
    fn is_vulnerable(&self) -> bool {
        self.core.is_active() && self.state == PursuerState::Walking
    }

    fn take_damage(&mut self, hit: Hit, rng: &mut SmallRng) -> DamageOutcome {
        self.hit_points = self.hit_points.saturating_sub(1);
        if self.hit_points == 0 {
            self.core.take_damage(hit, rng);
            return DamageOutcome::Defeated;
        }
        self.core.knock_back(hit, rng);
        self.core.body.tint = HURT_TINT;
        self.aggro = false;
        self.charge = 0.0;
        self.hurt_time = HURT_DURATION;
        self.state = PursuerState::Hurt;
        DamageOutcome::Hurt
    }
}

impl Poolable for Pursuer {
    fn respawn(&mut self, rng: &mut SmallRng) {
        self.core.init(SCALE);
        self.state = PursuerState::Walking;
        self.hit_points = HIT_POINTS;
        self.aggro = false;
        self.charge = 0.0;
        self.hurt_time = 0.0;
        self.wander_dest = self.wander_bounds.random_point(rng);
    }

    fn is_inactive(&self) -> bool {
        self.core.is_inactive()
    }

    fn deactivate(&mut self) {
        self.core.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn wander() -> Bounds {
        Bounds {
            min_x: 82.0,
            max_x: 430.0,
            min_y: 82.0,
            max_y: 430.0,
        }
    }

    fn landed(rng: &mut SmallRng, at: Vec2) -> Pursuer {
        let mut pursuer = Pursuer::new(wander());
        pursuer.respawn(rng);
        pursuer.core.body.position = at;
        let far = Vec2::new(10_000.0, 10_000.0);
        while !pursuer.core.is_active() {
            pursuer.update(1.0, far, rng);
            pursuer.core.body.post_update(1.0);
        }
        pursuer.core.body.position = at;
        pursuer
    }

    #[test]
    fn aggro_has_hysteresis() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut pursuer = landed(&mut rng, Vec2::ZERO);
        let inside = (AGGRO_RADIUS * AGGRO_RADIUS - 1.0).sqrt();
        let outside = (AGGRO_RADIUS * AGGRO_RADIUS + 1.0).sqrt();

        pursuer.update(1.0, Vec2::new(inside, 0.0), &mut rng);
        assert!(pursuer.is_aggro());
        for frame in 0..20 {
            let x = if frame % 2 == 0 { outside } else { inside };
            pursuer.core.body.position = Vec2::ZERO;
            pursuer.update(1.0, Vec2::new(x, 0.0), &mut rng);
            assert!(pursuer.is_aggro(), "toggled off at frame {frame}");
        }

        pursuer.core.body.position = Vec2::ZERO;
        pursuer.update(1.0, Vec2::new(CALMDOWN_RADIUS + 1.0, 0.0), &mut rng);
        assert!(!pursuer.is_aggro());
    }

    #[test]
    fn charge_must_fill_before_contact_damage() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut pursuer = landed(&mut rng, Vec2::ZERO);
        let target = Vec2::new(1.0, 1.0);
        pursuer.update(1.0, target, &mut rng);
        assert!(!pursuer.can_damage());
        for _ in 0..100 {
            pursuer.core.body.position = Vec2::ZERO;
            pursuer.update(1.0, target, &mut rng);
        }
        assert!(pursuer.can_damage());
        assert_eq!(pursuer.body().velocity, Vec2::ZERO, "halts on top of target");
    }

    #[test]
    fn wanders_toward_destination_when_calm() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut pursuer = landed(&mut rng, Vec2::new(256.0, 256.0));
        pursuer.update(1.0, Vec2::new(10_000.0, 0.0), &mut rng);
        let speed = pursuer.body().velocity.length();
        assert!(!pursuer.is_aggro());
        assert!((speed - WALK_SPEED).abs() < 1e-4 || speed == 0.0);
    }

    #[test]
    fn two_hits_to_defeat() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut pursuer = landed(&mut rng, Vec2::ZERO);
        let hit = Hit {
            source_velocity: Vec2::new(5.0, 0.0),
            hurts: true,
        };
        assert_eq!(pursuer.take_damage(hit, &mut rng), DamageOutcome::Hurt);
        assert_eq!(pursuer.state(), PursuerState::Hurt);
        assert_eq!(pursuer.charge(), 0.0);
        assert!(!pursuer.is_vulnerable());

        for _ in 0..HURT_DURATION as u32 {
            pursuer.update(1.0, Vec2::new(10_000.0, 0.0), &mut rng);
        }
        assert!(pursuer.is_vulnerable());
        assert_eq!(pursuer.take_damage(hit, &mut rng), DamageOutcome::Defeated);
        assert_eq!(pursuer.hit_points(), 0);
        assert!(!pursuer.core.is_active());
    }
}
