use engine::{RenderLayer, Vec2};
use rand::rngs::SmallRng;

use super::body::{MovingBody, Positioned, MIN_SCALE, WHITE};
use super::pool::Poolable;

const BASE_RADIUS: f32 = 32.0;
const NORMAL_SCALE: f32 = 0.4;
const POWER_SCALE: f32 = 0.8;
const POWER_TINT: u32 = 0x00ffff;
const DROP_ELEVATION: f32 = 500.0;
pub(crate) const RISE_DURATION: f32 = 20.0;
const RISE_RATE: f32 = 2.0;
pub(crate) const SHRINK_DURATION: f32 = 20.0;
const FOLLOW_OFFSET: Vec2 = Vec2::new(0.0, 2.0);
/// Cancelled pickups rewind this many times faster.
const REWIND_SPEED: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CarrotKind {
    Normal,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CarrotState {
    Idle,
    Picked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PickupDecision {
    Confirm,
    Reject,
}

/// Has the final say once the pickup animation completes.
pub(crate) trait PickupArbiter {
    fn decide(&mut self, kind: CarrotKind) -> PickupDecision;
}

/// Pickup that rises, follows its picker and shrinks away. Only consumed if
/// the arbiter confirms at the end; otherwise the animation rewinds.
#[derive(Debug, Clone)]
pub(crate) struct Carrot {
    body: MovingBody,
    kind: CarrotKind,
    state: CarrotState,
    /// Cleared by [`Carrot::cancel_pick_up`].
    following: bool,
    state_time: f32,
    start_scale: f32,
    live: bool,
}

impl Carrot {
    pub(crate) fn new() -> Self {
        Self {
            body: MovingBody::new(BASE_RADIUS),
            kind: CarrotKind::Normal,
            state: CarrotState::Idle,
            following: false,
            state_time: 0.0,
            start_scale: NORMAL_SCALE,
            live: false,
        }
    }

    /// Drops from the sky at `position`.
    pub(crate) fn place(&mut self, kind: CarrotKind, position: Vec2) {
        self.kind = kind;
        let (scale, tint) = match kind {
            CarrotKind::Normal => (NORMAL_SCALE, WHITE),
            CarrotKind::Power => (POWER_SCALE, POWER_TINT),
        };
        self.body.set_scale(scale);
        self.body.tint = tint;
        self.body.position = position;
        self.body.refresh_draw_order();
    }

    pub(crate) fn kind(&self) -> CarrotKind {
        self.kind
    }

    pub(crate) fn state(&self) -> CarrotState {
        self.state
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.body.visible
    }

    pub(crate) fn can_pick_up(&self) -> bool {
        self.live
            && self.state == CarrotState::Idle
            && self.body.visible
            && self.body.is_grounded()
    }

    /// No-op unless the carrot can currently be picked up.
    pub(crate) fn pick_up(&mut self) -> bool {
        if !self.can_pick_up() {
            return false;
        }
        self.start_scale = self.body.scale();
        self.following = true;
        self.state_time = 0.0;
        self.body.velocity = Vec2::ZERO;
        self.body.elevation_rate = 0.0;
        self.state = CarrotState::Picked;
        true
    }

    /// Lets go of the picker. The animation rewinds and the carrot goes idle.
    pub(crate) fn cancel_pick_up(&mut self) {
        self.following = false;
    }

    pub(crate) fn update(
        &mut self,
        dt: f32,
        picker: Vec2,
        arbiter: &mut dyn PickupArbiter,
    ) {
        if !self.live {
            return;
        }
        match self.state {
            CarrotState::Idle => self.body.apply_gravity(dt),
            CarrotState::Picked if self.following => {
                self.state_time += dt;
                self.body.position = picker + FOLLOW_OFFSET;
                self.apply_pose();
                if self.state_time >= RISE_DURATION + SHRINK_DURATION {
                    match arbiter.decide(self.kind) {
                        PickupDecision::Confirm => self.deactivate(),
                        PickupDecision::Reject => self.cancel_pick_up(),
                    }
                }
            }
            CarrotState::Picked => {
                self.state_time -= dt * REWIND_SPEED;
                if self.state_time <= 0.0 {
                    self.state_time = 0.0;
                    self.state = CarrotState::Idle;
                }
                self.apply_pose();
            }
        }
    }

    pub(crate) fn post_update(&mut self, dt: f32) {
        if self.live {
            self.body.post_update(dt);
        }
    }

    pub(crate) fn render(&self, layer: &mut RenderLayer) {
        if self.live && self.body.visible {
            layer.push(self.body.render_item("carrot"));
        }
    }

    /// Elevation and scale are pure functions of time spent picked.
    fn apply_pose(&mut self) {
        let rise = self.state_time.clamp(0.0, RISE_DURATION);
        self.body.set_elevation(rise * RISE_RATE);
        let shrink = ((self.state_time - RISE_DURATION) / SHRINK_DURATION).clamp(0.0, 1.0);
        self.body
            .set_scale((self.start_scale * (1.0 - shrink)).max(MIN_SCALE));
    }
}

impl Positioned for Carrot {
    fn body(&self) -> &MovingBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut MovingBody {
        &mut self.body
    }
}

impl Poolable for Carrot {
    fn respawn(&mut self, _rng: &mut SmallRng) {
        self.live = true;
        self.state = CarrotState::Idle;
        self.following = false;
        self.state_time = 0.0;
        self.body.visible = true;
        self.body.velocity = Vec2::ZERO;
        self.body.set_elevation(DROP_ELEVATION);
        self.body.elevation_rate = -1.0;
        self.place(CarrotKind::Normal, Vec2::ZERO);
    }

    fn is_inactive(&self) -> bool {
        !self.live
    }

    fn deactivate(&mut self) {
        self.live = false;
        self.following = false;
        self.body.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    struct Scripted {
        decision: PickupDecision,
        calls: u32,
    }

    impl PickupArbiter for Scripted {
        fn decide(&mut self, _kind: CarrotKind) -> PickupDecision {
            self.calls += 1;
            self.decision
        }
    }

    fn grounded_carrot() -> Carrot {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut carrot = Carrot::new();
        carrot.respawn(&mut rng);
        carrot.place(CarrotKind::Normal, Vec2::new(100.0, 100.0));
        let mut idle = Scripted {
            decision: PickupDecision::Reject,
            calls: 0,
        };
        while !carrot.can_pick_up() {
            carrot.update(1.0, Vec2::ZERO, &mut idle);
            carrot.post_update(1.0);
        }
        carrot
    }

    #[test]
    fn airborne_carrot_cannot_be_picked_up() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut carrot = Carrot::new();
        carrot.respawn(&mut rng);
        assert!(!carrot.can_pick_up());
        assert!(!carrot.pick_up());
    }

    #[test]
    fn confirmed_pickup_fires_once_and_vanishes() {
        let mut carrot = grounded_carrot();
        let mut arbiter = Scripted {
            decision: PickupDecision::Confirm,
            calls: 0,
        };
        assert!(carrot.pick_up());
        assert!(!carrot.pick_up(), "already picked");

        let picker = Vec2::new(120.0, 130.0);
        for _ in 0..(RISE_DURATION + SHRINK_DURATION) as u32 + 5 {
            carrot.update(1.0, picker, &mut arbiter);
            carrot.post_update(1.0);
        }
        assert_eq!(arbiter.calls, 1);
        assert!(!carrot.is_visible());
        assert!(carrot.is_inactive());
    }

    #[test]
    fn follows_and_rises_while_picked() {
        let mut carrot = grounded_carrot();
        let mut arbiter = Scripted {
            decision: PickupDecision::Confirm,
            calls: 0,
        };
        carrot.pick_up();
        let picker = Vec2::new(50.0, 60.0);
        for _ in 0..10 {
            carrot.update(1.0, picker, &mut arbiter);
            carrot.post_update(1.0);
        }
        assert_eq!(carrot.position(), picker + FOLLOW_OFFSET);
        assert_eq!(carrot.body().elevation(), 10.0 * RISE_RATE);
    }

    #[test]
    fn rejected_pickup_rewinds_to_idle() {
        let mut carrot = grounded_carrot();
        let mut arbiter = Scripted {
            decision: PickupDecision::Reject,
            calls: 0,
        };
        carrot.pick_up();
        let picker = Vec2::new(120.0, 130.0);
        for _ in 0..(RISE_DURATION + SHRINK_DURATION) as u32 {
            carrot.update(1.0, picker, &mut arbiter);
            carrot.post_update(1.0);
        }
        assert_eq!(arbiter.calls, 1);
        assert_eq!(carrot.state(), CarrotState::Picked);

        for _ in 0..((RISE_DURATION + SHRINK_DURATION) / REWIND_SPEED) as u32 + 1 {
            carrot.update(1.0, picker, &mut arbiter);
            carrot.post_update(1.0);
        }
        assert_eq!(carrot.state(), CarrotState::Idle);
        assert!(carrot.is_visible());
        assert!(!carrot.is_inactive());
        assert!((carrot.body().scale() - NORMAL_SCALE).abs() < 1e-6);
        assert!(carrot.can_pick_up());
        assert_eq!(arbiter.calls, 1);
    }
}
