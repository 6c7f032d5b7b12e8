use engine::Vec2;
use rand::rngs::SmallRng;
use rand::Rng;

use super::body::{MovingBody, WHITE};

const START_ELEVATION: f32 = 500.0;
const START_ELEVATION_RATE: f32 = -1.0;
/// Frames spent flying away before going inactive.
const LEAVING_DURATION: f32 = 60.0;
const LEAVING_LAUNCH_RATE: f32 = 40.0;
const LEAVING_TINT: u32 = 0xffeeee;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    Entering,
    Active,
    Leaving,
    Inactive,
}

/// A blow landed on something. Carries a copy of the attacker's velocity so
/// the receiver never borrows the attacker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Hit {
    pub(crate) source_velocity: Vec2,
    /// `false` means knockback only.
    pub(crate) hurts: bool,
}

impl Hit {
    pub(crate) fn from_body(body: &MovingBody) -> Self {
        Self {
            source_velocity: body.velocity,
            hurts: true,
        }
    }

    pub(crate) fn knockback_only(self) -> Self {
        Self {
            hurts: false,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    Ignored,
    Knocked,
    Hurt,
    Defeated,
    PowerActivated,
}

pub(crate) trait Damageable {
    fn is_vulnerable(&self) -> bool;
    fn take_damage(&mut self, hit: Hit, rng: &mut SmallRng) -> DamageOutcome;
}

/// Shared Entering/Active/Leaving/Inactive lifecycle for every character.
#[derive(Debug, Clone)]
pub(crate) struct CharacterCore {
    pub(crate) body: MovingBody,
    lifecycle: Lifecycle,
    state_time: f32,
    spin: f32,
}

impl CharacterCore {
    pub(crate) fn new(base_radius: f32) -> Self {
        Self {
            body: MovingBody::new(base_radius),
            lifecycle: Lifecycle::Inactive,
            state_time: 0.0,
            spin: 0.0,
        }
    }

    /// Back to spawn defaults: at the origin, high in the sky, falling.
    pub(crate) fn init(&mut self, scale: f32) {
        self.lifecycle = Lifecycle::Entering;
        self.state_time = 0.0;
        self.spin = 0.0;
        let body = &mut self.body;
        body.visible = true;
        body.position = Vec2::ZERO;
        body.velocity = Vec2::ZERO;
        body.rotation = 0.0;
        body.tint = WHITE;
        body.alpha = 1.0;
        body.set_scale(scale);
        body.set_elevation(START_ELEVATION);
        body.elevation_rate = START_ELEVATION_RATE;
        body.refresh_draw_order();
    }

    pub(crate) fn update(&mut self, dt: f32) {
        self.body.apply_gravity(dt);
        match self.lifecycle {
            Lifecycle::Entering => {
                if self.body.is_grounded() {
                    self.lifecycle = Lifecycle::Active;
                }
            }
            Lifecycle::Leaving => {
                self.state_time += dt;
                if self.state_time > LEAVING_DURATION {
                    self.deactivate();
                }
                self.body.rotation += self.spin * dt;
            }
            Lifecycle::Active | Lifecycle::Inactive => {}
        }
    }

    /// Default reaction: tint, get knocked back, fly away.
    pub(crate) fn take_damage(&mut self, hit: Hit, rng: &mut SmallRng) {
        self.body.tint = LEAVING_TINT;
        self.knock_back(hit, rng);
        self.set_leaving(rng);
    }

    /// Attacker velocity plus up to one unit of jitter per axis, so a still
    /// attacker still shoves.
    pub(crate) fn knock_back(&mut self, hit: Hit, rng: &mut SmallRng) {
        let jitter = Vec2::new(rng.random::<f32>(), rng.random::<f32>());
        self.body.velocity += hit.source_velocity + jitter;
    }

    pub(crate) fn deactivate(&mut self) {
        self.lifecycle = Lifecycle::Inactive;
        self.body.visible = false;
    }

    pub(crate) fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub(crate) fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    pub(crate) fn is_inactive(&self) -> bool {
        self.lifecycle == Lifecycle::Inactive
    }

    fn set_leaving(&mut self, rng: &mut SmallRng) {
        self.state_time = 0.0;
        self.lifecycle = Lifecycle::Leaving;
        self.body.elevation_rate = LEAVING_LAUNCH_RATE;
        self.spin = rng.random::<f32>() - 0.5;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn landed_core() -> CharacterCore {
        let mut core = CharacterCore::new(20.0);
        core.init(1.0);
        while !core.is_active() {
            core.update(1.0);
            core.body.post_update(1.0);
        }
        core
    }

    #[test]
    fn entering_becomes_active_on_landing() {
        let mut core = CharacterCore::new(20.0);
        core.init(1.0);
        assert_eq!(core.lifecycle(), Lifecycle::Entering);
        assert_eq!(core.body.elevation(), START_ELEVATION);

        let mut frames = 0;
        while !core.is_active() {
            core.update(1.0);
            core.body.post_update(1.0);
            frames += 1;
            assert!(frames < 200, "never landed");
        }
        assert_eq!(core.body.elevation(), 0.0);
    }

    #[test]
    fn damage_sends_character_through_leaving_to_inactive() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut core = landed_core();
        core.take_damage(
            Hit {
                source_velocity: Vec2::new(3.0, 0.0),
                hurts: true,
            },
            &mut rng,
        );
        assert_eq!(core.lifecycle(), Lifecycle::Leaving);
        assert_eq!(core.body.tint, LEAVING_TINT);

        for _ in 0..=LEAVING_DURATION as u32 {
            core.update(1.0);
            core.body.post_update(1.0);
        }
        assert!(core.is_inactive());
        assert!(!core.body.visible);

        core.init(1.0);
        assert_eq!(core.lifecycle(), Lifecycle::Entering);
        assert!(core.body.visible);
    }

    #[test]
    fn knockback_jitter_is_bounded_and_varies() {
        let mut rng = SmallRng::seed_from_u64(42);
        let hit = Hit {
            source_velocity: Vec2::new(2.0, -1.0),
            hurts: true,
        };
        let mut first = landed_core();
        let mut second = landed_core();
        first.take_damage(hit, &mut rng);
        second.take_damage(hit, &mut rng);

        for velocity in [first.body.velocity, second.body.velocity] {
            assert!(velocity.x >= 2.0 && velocity.x < 3.0);
            assert!(velocity.y >= -1.0 && velocity.y < 0.0);
        }
        assert_ne!(first.body.velocity, second.body.velocity);
    }
}
