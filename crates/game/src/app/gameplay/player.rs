use engine::{RenderItem, RenderLayer, Vec2};
use rand::rngs::SmallRng;

use super::body::{MovingBody, Positioned, WHITE};
use super::character::{CharacterCore, DamageOutcome, Damageable, Hit};
use super::events::{SpeechLine, SpeechSpeed};
use super::health::Health;

const BASE_RADIUS: f32 = 64.0;
const STARTING_SCALE: f32 = 0.6;
const MOVE_SPEED: f32 = 4.0;
const WADDLE_AMOUNT: f32 = 0.07;
const WADDLE_STEP: f32 = 0.01;

pub(crate) const MIN_DASH_CHARGE: f32 = 60.0;
pub(crate) const MAX_DASH_CHARGE: f32 = 180.0;
const DASH_POWER_FACTOR: f32 = 0.1;
const DASH_DAMPING: f32 = 0.96;
const DASH_TILT_FACTOR: f32 = 0.01;

const HURT_DURATION: f32 = 30.0;
const HURT_MOVE_PENALTY: f32 = 0.5;
const HURT_DAMPING: f32 = 0.95;
const HURT_TINT: u32 = 0xff3333;

const POWER_JUMP: f32 = 35.0;
const POWER_GROW_START: f32 = 420.0;
const POWER_GROW_SPEED: f32 = 0.01;
const POWER_MAX_SCALE: f32 = 3.1;
const POWER_WIN_TIME: f32 = 900.0;
/// Power mode only counts as "huge" above this scale.
const HUGE_SCALE: f32 = 2.0;

struct PowerBeat {
    at: f32,
    line: SpeechLine,
}

const POWER_BEATS: [PowerBeat; 2] = [
    PowerBeat {
        at: 60.0,
        line: SpeechLine {
            text: "YOU FOOLS!       \nTHIS ISN'T EVEN MY FINAL FORM.",
            speed: SpeechSpeed::Slow,
        },
    },
    PowerBeat {
        at: POWER_GROW_START - 30.0,
        line: SpeechLine::normal("HUMONGOUS CHUNGUS"),
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayerState {
    Walking,
    Dashing,
    Hurt,
}

/// The player character.
#[derive(Debug, Clone)]
pub(crate) struct Player {
    core: CharacterCore,
    state: PlayerState,
    health: Health,
    move_input: Vec2,
    /// Dash aim relative to the player. Never zero.
    dash_dest: Vec2,
    /// Zero means not charging.
    dash_charge: f32,
    hurt_time: f32,
    waddle: f32,
    waddle_direction: f32,
    powered_up: bool,
    power_time: f32,
    beat_index: usize,
}

impl Player {
    pub(crate) fn new(max_health: i32) -> Self {
        let mut player = Self {
            core: CharacterCore::new(BASE_RADIUS),
            state: PlayerState::Walking,
            health: Health::new(max_health),
            move_input: Vec2::ZERO,
            dash_dest: Vec2::new(1.0, 0.0),
            dash_charge: 0.0,
            hurt_time: 0.0,
            waddle: 0.0,
            waddle_direction: 1.0,
            powered_up: false,
            power_time: 0.0,
            beat_index: 0,
        };
        player.core.init(STARTING_SCALE);
        player
    }

    /// Resets everything, health included, and drops in at `spawn`.
    pub(crate) fn init(&mut self, spawn: Vec2) {
        self.core.init(STARTING_SCALE);
        self.core.body.position = spawn;
        self.core.body.refresh_draw_order();
        self.state = PlayerState::Walking;
        self.health.restart();
        self.move_input = Vec2::ZERO;
        self.dash_dest = Vec2::new(1.0, 0.0);
        self.dash_charge = 0.0;
        self.hurt_time = 0.0;
        self.waddle = 0.0;
        self.waddle_direction = 1.0;
        self.powered_up = false;
        self.power_time = 0.0;
        self.beat_index = 0;
    }

    pub(crate) fn set_move_input(&mut self, input: Vec2) {
        self.move_input = input.normalized_or_zero();
    }

    /// Zero vectors are ignored so the last aim sticks.
    pub(crate) fn set_dash_dest(&mut self, relative: Vec2) {
        if relative.is_zero() {
            return;
        }
        self.dash_dest = relative;
    }

    /// Launches a dash when walking and charged past the minimum. Otherwise a no-op.
    pub(crate) fn attempt_dash(&mut self) -> bool {
        if self.state != PlayerState::Walking
            || !self.core.is_active()
            || self.dash_charge < MIN_DASH_CHARGE
        {
            return false;
        }
        self.dash_charge = self.dash_charge.min(MAX_DASH_CHARGE);
        let power = self.dash_charge * DASH_POWER_FACTOR;
        let direction = self.dash_dest.normalized_or_zero();
        let body = &mut self.core.body;
        body.velocity = direction * power;
        body.elevation_rate += power;
        self.dash_charge = 0.0;
        self.state = PlayerState::Dashing;
        true
    }

    /// Advances one step. Returns a line to say when power mode hits a beat.
    pub(crate) fn update(&mut self, dt: f32) -> Option<SpeechLine> {
        self.core.update(dt);
        if !self.core.is_active() {
            return None;
        }
        match self.state {
            PlayerState::Walking => self.update_walking(dt),
            PlayerState::Dashing => self.update_dashing(dt),
            PlayerState::Hurt => self.update_hurt(dt),
        }
        if self.power_time > 0.0 {
            return self.update_power(dt);
        }
        None
    }

    pub(crate) fn post_update(&mut self, dt: f32) {
        self.core.body.post_update(dt);
    }

    /// Banks the power-up. It fires when health next reaches zero.
    pub(crate) fn power_up(&mut self) {
        self.powered_up = true;
        self.power_time = 0.0;
    }

    pub(crate) fn is_active(&self) -> bool {
        self.core.is_active()
    }

    pub(crate) fn is_dashing(&self) -> bool {
        self.state == PlayerState::Dashing
    }

    pub(crate) fn is_powered(&self) -> bool {
        self.power_time > 0.0
    }

    pub(crate) fn has_power_banked(&self) -> bool {
        self.powered_up
    }

    pub(crate) fn is_huge_and_moving(&self) -> bool {
        self.is_powered()
            && self.core.body.scale() > HUGE_SCALE
            && !self.core.body.velocity.is_zero()
    }

    pub(crate) fn has_won(&self) -> bool {
        self.power_time > POWER_WIN_TIME
    }

    pub(crate) fn state(&self) -> PlayerState {
        self.state
    }

    pub(crate) fn dash_charge(&self) -> f32 {
        self.dash_charge
    }

    pub(crate) fn health(&self) -> &Health {
        &self.health
    }

    pub(crate) fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }

    pub(crate) fn render(&self, layer: &mut RenderLayer) {
        let body = &self.core.body;
        if !body.visible {
            return;
        }
        let sprite = if self.is_powered() {
            "chungus_power"
        } else {
            "chungus"
        };
        layer.push(body.render_item(sprite));
        if self.state == PlayerState::Walking && self.dash_charge > 0.0 && self.core.is_active() {
            layer.push(RenderItem {
                rotation: self.dash_dest.angle(),
                alpha: self.dash_charge / MAX_DASH_CHARGE,
                scale: self.dash_charge,
                tint: if self.dash_charge >= MIN_DASH_CHARGE {
                    0xffffaa
                } else {
                    grey(self.dash_charge / MIN_DASH_CHARGE)
                },
                draw_order: body.draw_order() - 0.5,
                ..RenderItem::new("dash_aim", body.position)
            });
        }
    }

    fn update_walking(&mut self, dt: f32) {
        if self.dash_charge == 0.0 {
            self.dash_charge = 1.0;
        } else {
            self.dash_charge = (self.dash_charge + dt).min(MAX_DASH_CHARGE);
        }
        self.core.body.velocity = self.move_input * MOVE_SPEED;
        self.update_waddle();
    }

    fn update_dashing(&mut self, dt: f32) {
        let body = &mut self.core.body;
        body.velocity = body.velocity * DASH_DAMPING.powf(dt);
        if body.is_grounded() {
            if body.velocity.x.abs() < MOVE_SPEED && body.velocity.y.abs() < MOVE_SPEED {
                body.rotation = 0.0;
                self.state = PlayerState::Walking;
            }
            return;
        }
        let tilt = body.elevation() * DASH_TILT_FACTOR;
        body.rotation = if body.velocity.x < 0.0 { tilt } else { -tilt };
    }

    fn update_hurt(&mut self, dt: f32) {
        let body = &mut self.core.body;
        body.velocity += self.move_input * (HURT_MOVE_PENALTY * dt);
        body.velocity = body.velocity * HURT_DAMPING.powf(dt);
        self.hurt_time -= dt;
        if self.hurt_time <= 0.0 {
            self.state = PlayerState::Walking;
            body.tint = WHITE;
            self.waddle = 0.0;
        }
        self.update_waddle();
    }

    fn update_waddle(&mut self) {
        if self.core.body.velocity.is_zero() {
            return;
        }
        self.core.body.rotation = self.waddle;
        if self.waddle <= -WADDLE_AMOUNT && self.waddle_direction < 0.0 {
            self.waddle_direction = 1.0;
        } else if self.waddle >= WADDLE_AMOUNT && self.waddle_direction > 0.0 {
            self.waddle_direction = -1.0;
        }
        self.waddle += WADDLE_STEP * self.waddle_direction;
    }

    fn activate_power(&mut self) {
        self.power_time = 1.0;
        self.core.body.elevation_rate += POWER_JUMP;
    }

    fn update_power(&mut self, dt: f32) -> Option<SpeechLine> {
        self.power_time += dt;

        let mut said = None;
        if let Some(beat) = POWER_BEATS.get(self.beat_index) {
            if self.power_time >= beat.at {
                self.beat_index += 1;
                if self.health.is_below_max() {
                    self.health.add(1);
                }
                said = Some(beat.line);
            }
        }

        let grow_time = self.power_time - POWER_GROW_START;
        if grow_time > 0.0 {
            let next = (STARTING_SCALE + grow_time * POWER_GROW_SPEED).min(POWER_MAX_SCALE);
            self.core.body.set_scale(next);
        }
        said
    }
}

impl Positioned for Player {
    fn body(&self) -> &MovingBody {
        &self.core.body
    }

    fn body_mut(&mut self) -> &mut MovingBody {
        &mut self.core.body
    }
}

impl Damageable for Player {
    /// Only a walking, active, unpowered player can be hit.
    fn is_vulnerable(&self) -> bool {
        self.core.is_active() && self.state == PlayerState::Walking && !self.is_powered()
    }

    fn take_damage(&mut self, hit: Hit, rng: &mut SmallRng) -> DamageOutcome {
        if self.is_powered() {
            return DamageOutcome::Ignored;
        }
        if hit.hurts {
            self.health.add(-1);
            if self.health.current() <= 0 {
                if self.powered_up {
                    self.activate_power();
                    return DamageOutcome::PowerActivated;
                }
                self.core.take_damage(hit, rng);
                self.dash_charge = 0.0;
                return DamageOutcome::Defeated;
            }
            self.core.body.tint = HURT_TINT;
        }
        self.core.knock_back(hit, rng);
        self.dash_charge = 0.0;
        self.hurt_time = HURT_DURATION;
        self.state = PlayerState::Hurt;
        if hit.hurts {
            DamageOutcome::Hurt
        } else {
            DamageOutcome::Knocked
        }
    }
}

fn grey(level: f32) -> u32 {
    let channel = (255.0 * level.clamp(0.0, 1.0)).round() as u32;
    (channel << 16) | (channel << 8) | channel
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::app::gameplay::character::Lifecycle;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(9)
    }

    fn landed_player() -> Player {
        let mut player = Player::new(5);
        player.init(Vec2::new(200.0, 200.0));
        while !player.is_active() {
            player.update(1.0);
            player.post_update(1.0);
        }
        player
    }

    fn hit() -> Hit {
        Hit {
            source_velocity: Vec2::new(1.0, 0.0),
            hurts: true,
        }
    }

    fn charge(player: &mut Player, frames: u32) {
        for _ in 0..frames {
            player.update(1.0);
            player.post_update(1.0);
        }
    }

    #[test]
    fn charge_is_capped_at_max() {
        let mut player = landed_player();
        charge(&mut player, 400);
        assert_eq!(player.dash_charge(), MAX_DASH_CHARGE);
        assert!(player.dash_charge() >= 0.0);
    }

    #[test]
    fn dash_requires_minimum_charge() {
        let mut player = landed_player();
        charge(&mut player, 10);
        assert!(!player.attempt_dash());
        assert_eq!(player.state(), PlayerState::Walking);
    }

    #[test]
    fn dash_launches_along_aim_and_resets_charge() {
        let mut player = landed_player();
        player.set_dash_dest(Vec2::new(0.0, -10.0));
        charge(&mut player, 100);
        let expected_power = player.dash_charge() * DASH_POWER_FACTOR;

        assert!(player.attempt_dash());
        assert_eq!(player.state(), PlayerState::Dashing);
        assert_eq!(player.dash_charge(), 0.0);
        assert!((player.body().velocity.y + expected_power).abs() < 1e-4);
        assert!(!player.is_vulnerable());

        assert!(!player.attempt_dash(), "already dashing");
    }

    #[test]
    fn dash_settles_back_into_walking() {
        let mut player = landed_player();
        charge(&mut player, 180);
        assert!(player.attempt_dash());
        let mut frames = 0;
        while player.is_dashing() {
            player.update(1.0);
            player.post_update(1.0);
            frames += 1;
            assert!(frames < 600, "dash never ended");
        }
        assert_eq!(player.state(), PlayerState::Walking);
        assert_eq!(player.body().elevation(), 0.0);
    }

    #[test]
    fn zero_dash_dest_is_ignored() {
        let mut player = landed_player();
        player.set_dash_dest(Vec2::new(0.0, 2.0));
        player.set_dash_dest(Vec2::ZERO);
        charge(&mut player, 70);
        player.attempt_dash();
        assert!(player.body().velocity.y > 0.0);
    }

    #[test]
    fn hit_hurts_then_recovers() {
        let mut rng = rng();
        let mut player = landed_player();
        assert_eq!(player.take_damage(hit(), &mut rng), DamageOutcome::Hurt);
        assert_eq!(player.health().current(), 4);
        assert_eq!(player.state(), PlayerState::Hurt);
        assert!(!player.is_vulnerable());

        charge(&mut player, HURT_DURATION as u32);
        assert_eq!(player.state(), PlayerState::Walking);
        assert!(player.is_vulnerable());
    }

    #[test]
    fn knockback_only_hit_keeps_health() {
        let mut rng = rng();
        let mut player = landed_player();
        let outcome = player.take_damage(hit().knockback_only(), &mut rng);
        assert_eq!(outcome, DamageOutcome::Knocked);
        assert_eq!(player.health().current(), 5);
    }

    #[test]
    fn last_hit_defeats_without_power() {
        let mut rng = rng();
        let mut player = landed_player();
        player.health_mut().add(-4);
        assert_eq!(player.take_damage(hit(), &mut rng), DamageOutcome::Defeated);
        assert_eq!(player.core.lifecycle(), Lifecycle::Leaving);
    }

    #[test]
    fn banked_power_rescues_and_eventually_wins() {
        let mut rng = rng();
        let mut player = landed_player();
        player.power_up();
        player.health_mut().add(-4);
        assert_eq!(
            player.take_damage(hit(), &mut rng),
            DamageOutcome::PowerActivated
        );
        assert!(player.is_powered());
        assert!(player.is_active());
        assert_eq!(player.take_damage(hit(), &mut rng), DamageOutcome::Ignored);

        let mut lines = Vec::new();
        let mut frames = 0;
        while !player.has_won() {
            if let Some(line) = player.update(1.0) {
                lines.push(line.text);
            }
            player.post_update(1.0);
            frames += 1;
            assert!(frames < 2000, "never won");
        }
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "HUMONGOUS CHUNGUS");
        assert_eq!(player.health().current(), 2);
        assert!((player.body().scale() - POWER_MAX_SCALE).abs() < 1e-4);
    }
}
