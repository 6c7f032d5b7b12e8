use engine::{RenderItem, RenderLayer, Vec2};
use rand::rngs::SmallRng;

use super::body::{MovingBody, Positioned};
use super::character::{CharacterCore, DamageOutcome, Damageable, Hit};
use super::geometry::{point_to, rand_range, rand_range_f32, Bounds};
use super::pool::Poolable;

const BASE_RADIUS: f32 = 48.0;
const SCALE: f32 = 0.6;
const STRAFE_RANGE: f32 = 2.0;
const FLEE_DISTANCE: f32 = 150.0;
const FLEE_JITTER: f32 = 30.0;
const FLEE_SPEED: f32 = 1.5;
const REROLL_MIN: i32 = 60;
const REROLL_MAX: i32 = 120;
const PRE_ATTACK_MIN: i32 = 90;
const PRE_ATTACK_MAX: i32 = 180;
const AIM_CHARGE_RATE: f32 = 0.01;
/// Frames per muzzle-flash step; the flash shows on even steps.
const FIRE_FLICKER: [f32; 4] = [4.0, 4.0, 4.0, 4.0];
/// Share of the aim angle carried by the arms; the body takes the rest.
const ARM_ROTATION_SHARE: f32 = 0.75;
pub(crate) const PROJECTILE_SPEED: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum AttackPhase {
    Charging,
    Firing { step: usize, step_time: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RangedState {
    Walking,
    Attacking(AttackPhase),
}

/// A shot the enemy wants fired. The simulation owns the projectile pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ProjectileRequest {
    pub(crate) origin: Vec2,
    pub(crate) velocity: Vec2,
}

/// Ranged enemy. Keeps its distance while strafing, then stops, aims and fires.
#[derive(Debug, Clone)]
pub(crate) struct RangedEnemy {
    core: CharacterCore,
    state: RangedState,
    strafe: f32,
    flee_distance: f32,
    reroll_timer: f32,
    attack_timer: f32,
    aim_target: Vec2,
    aim_angle: f32,
    aim_alpha: f32,
    aim_visible: bool,
    arm_rotation: f32,
    flash_visible: bool,
}

impl RangedEnemy {
    pub(crate) fn new() -> Self {
        Self {
            core: CharacterCore::new(BASE_RADIUS),
            state: RangedState::Walking,
            strafe: 0.0,
            flee_distance: FLEE_DISTANCE,
            reroll_timer: 0.0,
            attack_timer: PRE_ATTACK_MAX as f32,
            aim_target: Vec2::ZERO,
            aim_angle: 0.0,
            aim_alpha: 0.0,
            aim_visible: false,
            arm_rotation: 0.0,
            flash_visible: false,
        }
    }

    pub(crate) fn update(
        &mut self,
        dt: f32,
        target: Vec2,
        rng: &mut SmallRng,
    ) -> Option<ProjectileRequest> {
        self.core.update(dt);
        if !self.core.is_active() {
            return None;
        }
        match self.state {
            RangedState::Walking => {
                self.update_walking(dt, target, rng);
                None
            }
            RangedState::Attacking(phase) => self.update_attacking(dt, phase, rng),
        }
    }

    pub(crate) fn post_update(&mut self, dt: f32, arena: &Bounds) {
        self.core.body.post_update(dt);
        if self.core.is_active() {
            self.core.body.constrain_to_bounds(arena);
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.core.is_active()
    }

    pub(crate) fn state(&self) -> RangedState {
        self.state
    }

    pub(crate) fn aim_alpha(&self) -> f32 {
        self.aim_alpha
    }

    pub(crate) fn render(&self, layer: &mut RenderLayer) {
        let body = &self.core.body;
        if !body.visible {
            return;
        }
        layer.push(body.render_item("elmer"));
        let arms = RenderItem {
            rotation: self.arm_rotation,
            elevation: body.elevation(),
            scale: body.scale(),
            draw_order: body.draw_order() + 0.25,
            ..RenderItem::new("elmer_arms", body.position)
        };
        layer.push(arms);
        if self.aim_visible {
            layer.push(RenderItem {
                rotation: self.aim_angle,
                alpha: self.aim_alpha,
                draw_order: body.draw_order() + 0.5,
                ..RenderItem::new("elmer_aim", body.position)
            });
        }
        if self.flash_visible {
            layer.push(RenderItem {
                rotation: self.aim_angle,
                draw_order: body.draw_order() + 0.75,
                ..RenderItem::new("muzzle_flash", body.position)
            });
        }
    }

    fn update_walking(&mut self, dt: f32, target: Vec2, rng: &mut SmallRng) {
        self.reroll_timer -= dt;
        if self.reroll_timer <= 0.0 {
            self.reroll_movement(rng);
        }

        let to_target = point_to(self.core.body.position, target);
        let direction = to_target.normalized_or_zero();
        let mut velocity = direction.perpendicular() * self.strafe;
        if to_target.length() < self.flee_distance {
            velocity -= direction * FLEE_SPEED;
        }
        self.core.body.velocity = velocity;
        self.aim_at(to_target);

        self.attack_timer -= dt;
        if self.attack_timer <= 0.0 {
            self.aim_target = target;
            self.aim_alpha = 0.0;
            self.aim_visible = true;
            self.core.body.velocity = Vec2::ZERO;
            self.state = RangedState::Attacking(AttackPhase::Charging);
        }
    }

    fn update_attacking(
        &mut self,
        dt: f32,
        phase: AttackPhase,
        rng: &mut SmallRng,
    ) -> Option<ProjectileRequest> {
        self.core.body.velocity = Vec2::ZERO;
        match phase {
            AttackPhase::Charging => {
                let to_target = point_to(self.core.body.position, self.aim_target);
                self.aim_at(to_target);
                self.aim_alpha = (self.aim_alpha + AIM_CHARGE_RATE * dt).min(1.0);
                if self.aim_alpha < 1.0 {
                    return None;
                }
                self.aim_visible = false;
                self.flash_visible = true;
                self.state = RangedState::Attacking(AttackPhase::Firing {
                    step: 0,
                    step_time: 0.0,
                });
                Some(ProjectileRequest {
                    origin: self.core.body.position,
                    velocity: to_target.normalized_or_zero() * PROJECTILE_SPEED,
                })
            }
            AttackPhase::Firing { step, step_time } => {
                let step_time = step_time + dt;
                let (step, step_time) = match FIRE_FLICKER.get(step) {
                    Some(length) if step_time >= *length => (step + 1, 0.0),
                    _ => (step, step_time),
                };
                if step >= FIRE_FLICKER.len() {
                    self.flash_visible = false;
                    self.attack_timer = rand_range(rng, PRE_ATTACK_MIN, PRE_ATTACK_MAX) as f32;
                    self.state = RangedState::Walking;
                } else {
                    self.flash_visible = step % 2 == 0;
                    self.state = RangedState::Attacking(AttackPhase::Firing { step, step_time });
                }
                None
            }
        }
    }

    fn aim_at(&mut self, to_target: Vec2) {
        self.aim_angle = to_target.angle();
        self.arm_rotation = self.aim_angle * ARM_ROTATION_SHARE;
        self.core.body.rotation = self.aim_angle - self.arm_rotation;
    }

    fn reroll_movement(&mut self, rng: &mut SmallRng) {
        self.strafe = rand_range_f32(rng, -STRAFE_RANGE, STRAFE_RANGE);
        self.flee_distance = FLEE_DISTANCE + rand_range_f32(rng, 0.0, FLEE_JITTER);
        self.reroll_timer = rand_range(rng, REROLL_MIN, REROLL_MAX) as f32;
    }
}

impl Positioned for RangedEnemy {
    fn body(&self) -> &MovingBody {
        &self.core.body
    }

    fn body_mut(&mut self) -> &mut MovingBody {
        &mut self.core.body
    }
}

impl Damageable for RangedEnemy {
    fn is_vulnerable(&self) -> bool {
        self.core.is_active()
    }

    /// One hit is enough.
    fn take_damage(&mut self, hit: Hit, rng: &mut SmallRng) -> DamageOutcome {
        self.aim_visible = false;
        self.flash_visible = false;
        self.core.take_damage(hit, rng);
        DamageOutcome::Defeated
    }
}

impl Poolable for RangedEnemy {
    fn respawn(&mut self, rng: &mut SmallRng) {
        self.core.init(SCALE);
        self.state = RangedState::Walking;
        self.aim_alpha = 0.0;
        self.aim_visible = false;
        self.flash_visible = false;
        self.arm_rotation = 0.0;
        self.reroll_movement(rng);
        self.attack_timer = rand_range(rng, PRE_ATTACK_MIN, PRE_ATTACK_MAX) as f32;
    }

    fn is_inactive(&self) -> bool {
        self.core.is_inactive()
    }

    fn deactivate(&mut self) {
        self.core.deactivate();
    }
}
