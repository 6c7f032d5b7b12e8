use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use super::input::{ActionStates, InputAction};
use super::rendering::{RenderLayer, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Title,
    Play,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneKey),
    HardResetTo(SceneKey),
    Quit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    move_axis: Option<Vec2>,
    pointer_world: Option<Vec2>,
    primary_pressed: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }

    /// Analog override for the movement actions (touch joystick style).
    pub fn with_move_axis(mut self, move_axis: Option<Vec2>) -> Self {
        self.move_axis = move_axis;
        self
    }

    pub fn with_pointer_world(mut self, pointer_world: Option<Vec2>) -> Self {
        self.pointer_world = pointer_world;
        self
    }

    pub fn with_primary_pressed(mut self, primary_pressed: bool) -> Self {
        self.primary_pressed = primary_pressed;
        self
    }

    /// Movement intent with length 1, or zero when there is none.
    pub fn move_vector(&self) -> Vec2 {
        let raw = match self.move_axis {
            Some(axis) => axis,
            None => {
                let (x, y) = self.actions.raw_move_axis();
                Vec2 { x, y }
            }
        };
        raw.normalized_or_zero()
    }

    pub fn pointer_world(&self) -> Option<Vec2> {
        self.pointer_world
    }

    pub fn primary_held(&self) -> bool {
        self.actions.is_down(InputAction::Primary)
    }

    /// True only on the tick the primary action went down.
    pub fn primary_pressed(&self) -> bool {
        self.primary_pressed
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn distance_squared(self, other: Vec2) -> f32 {
        (other - self).length_squared()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// The zero vector normalises to itself instead of NaN.
    pub fn normalized_or_zero(self) -> Vec2 {
        let length = self.length();
        if length == 0.0 || !length.is_finite() {
            return Vec2::ZERO;
        }
        Vec2 {
            x: self.x / length,
            y: self.y / length,
        }
    }

    /// Rotated a quarter turn clockwise in screen space.
    pub fn perpendicular(self) -> Vec2 {
        Vec2 {
            x: -self.y,
            y: self.x,
        }
    }

    /// Angle from the +x axis in radians.
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2 {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2 {
            x: -self.x,
            y: -self.y,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Camera2D {
    /// World point shown at the centre of the viewport.
    pub position: Vec2,
}

impl Camera2D {
    /// Centres on `target`, shifted down by `vertical_offset` so tall
    /// sprites stay in frame. Rounded to whole pixels to avoid blurring.
    pub fn follow(&mut self, target: Vec2, vertical_offset: f32) {
        self.position = Vec2 {
            x: target.x.round(),
            y: (target.y - vertical_offset).round(),
        };
    }
}

#[derive(Debug, Default)]
pub struct SceneWorld {
    camera: Camera2D,
    viewport: Viewport,
    render_layer: RenderLayer,
}

impl SceneWorld {
    pub fn with_viewport(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.camera = Camera2D::default();
        self.render_layer.clear();
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn render_layer(&self) -> &RenderLayer {
        &self.render_layer
    }

    pub fn render_layer_mut(&mut self) -> &mut RenderLayer {
        &mut self.render_layer
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    /// Rebuild the scene's render layer for this frame. The engine sorts it afterwards.
    fn render(&mut self, world: &mut SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self) -> Option<String> {
        None
    }
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRuntime {
    fn new(scene: Box<dyn Scene>, viewport: Viewport) -> Self {
        Self {
            scene,
            world: SceneWorld::with_viewport(viewport),
            is_loaded: false,
        }
    }
}

pub(crate) struct SceneMachine {
    title: SceneRuntime,
    play: SceneRuntime,
    active_scene: SceneKey,
}

impl SceneMachine {
    pub(crate) fn new(
        title: Box<dyn Scene>,
        play: Box<dyn Scene>,
        active_scene: SceneKey,
        viewport: Viewport,
    ) -> Self {
        Self {
            title: SceneRuntime::new(title, viewport),
            play: SceneRuntime::new(play, viewport),
            active_scene,
        }
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub(crate) fn load_active(&mut self) {
        self.load_scene_if_needed(self.active_scene);
    }

    pub(crate) fn update_active(&mut self, fixed_dt: f32, input: &InputSnapshot) -> SceneCommand {
        let runtime = self.active_runtime_mut();
        let (scene, world) = (&mut runtime.scene, &mut runtime.world);
        scene.update(fixed_dt, input, world)
    }

    pub(crate) fn render_active(&mut self) {
        let runtime = self.active_runtime_mut();
        runtime.world.render_layer_mut().clear();
        runtime.scene.render(&mut runtime.world);
        runtime.world.render_layer_mut().sort_by_draw_order();
    }

    pub(crate) fn active_world(&self) -> &SceneWorld {
        &self.active_runtime_ref().world
    }

    pub(crate) fn debug_title_active(&self) -> Option<String> {
        self.active_runtime_ref().scene.debug_title()
    }

    pub(crate) fn switch_to(&mut self, next_scene: SceneKey) -> bool {
        if self.active_scene == next_scene {
            return false;
        }

        self.load_scene_if_needed(next_scene);
        self.active_scene = next_scene;
        true
    }

    pub(crate) fn hard_reset_to(&mut self, next_scene: SceneKey) -> bool {
        let runtime = self.runtime_mut(next_scene);
        if runtime.is_loaded {
            let (scene, world) = (&mut runtime.scene, &mut runtime.world);
            scene.unload(world);
        }
        runtime.world.clear();
        {
            let (scene, world) = (&mut runtime.scene, &mut runtime.world);
            scene.load(world);
        }
        runtime.is_loaded = true;
        let changed = self.active_scene != next_scene;
        self.active_scene = next_scene;
        changed
    }

    pub(crate) fn shutdown_all(&mut self) {
        for runtime in [&mut self.title, &mut self.play] {
            if runtime.is_loaded {
                let (scene, world) = (&mut runtime.scene, &mut runtime.world);
                scene.unload(world);
                runtime.world.clear();
                runtime.is_loaded = false;
            }
        }
    }

    fn load_scene_if_needed(&mut self, key: SceneKey) {
        if self.runtime_ref(key).is_loaded {
            return;
        }
        let runtime = self.runtime_mut(key);
        {
            let (scene, world) = (&mut runtime.scene, &mut runtime.world);
            scene.load(world);
        }
        runtime.is_loaded = true;
    }

    fn active_runtime_mut(&mut self) -> &mut SceneRuntime {
        self.runtime_mut(self.active_scene)
    }

    fn active_runtime_ref(&self) -> &SceneRuntime {
        self.runtime_ref(self.active_scene)
    }

    fn runtime_mut(&mut self, key: SceneKey) -> &mut SceneRuntime {
        match key {
            SceneKey::Title => &mut self.title,
            SceneKey::Play => &mut self.play,
        }
    }

    fn runtime_ref(&self, key: SceneKey) -> &SceneRuntime {
        match key {
            SceneKey::Title => &self.title,
            SceneKey::Play => &self.play,
        }
    }
}
