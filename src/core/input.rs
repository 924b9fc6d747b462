//! Input handling for the interactive model transform
//!
//! Keyboard and scroll input is translated into [`ControlAction`]s which are
//! applied to an explicit [`TransformControls`] context. The renderer reads the
//! model matrix from that context each frame, so nothing here needs a window.

use std::collections::HashSet;
use winit::event::{ElementState, MouseScrollDelta};
use winit::keyboard::KeyCode;
use tracing::debug;

use crate::core::config::{ControlsConfig, ShadingModel, TransformMode};
use crate::math::{matrix, utils, Matrix4, Vector3};

/// Scale factor applied per scroll notch
const SCROLL_SCALE_UP: f32 = 1.05;
const SCROLL_SCALE_DOWN: f32 = 0.95;

/// One step of user intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    RollLeft,
    RollRight,
    YawLeft,
    YawRight,
    PitchUp,
    PitchDown,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    ScaleUp,
    ScaleDown,
    SpeedUp,
    SpeedDown,
    ToggleTransformMode,
}

impl ControlAction {
    /// Key binding for each action
    pub fn from_key(key: KeyCode) -> Option<Self> {
        let action = match key {
            KeyCode::KeyA => Self::RollLeft,
            KeyCode::KeyD => Self::RollRight,
            KeyCode::KeyQ => Self::YawLeft,
            KeyCode::KeyE => Self::YawRight,
            KeyCode::KeyW => Self::PitchUp,
            KeyCode::KeyS => Self::PitchDown,
            KeyCode::ArrowLeft => Self::MoveLeft,
            KeyCode::ArrowRight => Self::MoveRight,
            KeyCode::ArrowUp => Self::MoveUp,
            KeyCode::ArrowDown => Self::MoveDown,
            KeyCode::KeyO => Self::ScaleUp,
            KeyCode::KeyI => Self::ScaleDown,
            KeyCode::Equal => Self::SpeedUp,
            KeyCode::Minus => Self::SpeedDown,
            KeyCode::KeyT => Self::ToggleTransformMode,
            _ => return None,
        };
        Some(action)
    }

    /// Held actions repeat every frame; the rest fire once per key press
    pub fn is_continuous(&self) -> bool {
        !matches!(
            self,
            Self::SpeedUp | Self::SpeedDown | Self::ToggleTransformMode
        )
    }
}

/// Per-frame model transform state
///
/// `model = translation · rotation · scale`; every incremental step is
/// post-multiplied, so rotations happen about the model's own axes.
#[derive(Debug, Clone)]
pub struct TransformControls {
    rotation: Matrix4,
    translation: Matrix4,
    scale: Matrix4,

    /// Degrees per step
    rotation_strength: f32,
    translation_strength: f32,
    scale_strength: f32,
    speed_multiplier: f32,

    mode: TransformMode,
}

impl TransformControls {
    /// Create controls for a mesh with the given normalization scale
    ///
    /// The depth shading model starts further away and larger so the depth
    /// gradient is visible.
    pub fn new(
        config: &ControlsConfig,
        shading: ShadingModel,
        mode: TransformMode,
        normalization_scale: f32,
    ) -> Self {
        let mut controls = Self {
            rotation: Matrix4::identity(),
            translation: Matrix4::identity(),
            scale: matrix::uniform_scaling(normalization_scale),
            rotation_strength: config.rotation_strength,
            translation_strength: config.translation_strength,
            scale_strength: config.scale_strength,
            speed_multiplier: config.speed_multiplier,
            mode,
        };

        if shading == ShadingModel::Depth {
            controls.scale *= matrix::uniform_scaling(20.0);
            controls.translation *= matrix::translation(0.0, 0.0, -50.0);
            controls.translation_strength = 0.005;
        }

        controls
    }

    pub fn apply(&mut self, action: ControlAction) {
        let angle = utils::deg_to_rad(self.rotation_strength);
        let step = self.translation_strength;

        match action {
            ControlAction::RollLeft => self.rotate(Vector3::z(), angle),
            ControlAction::RollRight => self.rotate(-Vector3::z(), angle),
            ControlAction::YawLeft => self.rotate(-Vector3::y(), angle),
            ControlAction::YawRight => self.rotate(Vector3::y(), angle),
            ControlAction::PitchUp => self.rotate(Vector3::x(), angle),
            ControlAction::PitchDown => self.rotate(-Vector3::x(), angle),
            ControlAction::MoveLeft => self.translate(-step, 0.0),
            ControlAction::MoveRight => self.translate(step, 0.0),
            ControlAction::MoveUp => self.translate(0.0, step),
            ControlAction::MoveDown => self.translate(0.0, -step),
            ControlAction::ScaleUp => self.rescale(1.0 + self.scale_strength),
            ControlAction::ScaleDown => self.rescale(1.0 - self.scale_strength),
            ControlAction::SpeedUp => self.multiply_speed(self.speed_multiplier),
            ControlAction::SpeedDown => self.multiply_speed(1.0 / self.speed_multiplier),
            ControlAction::ToggleTransformMode => {
                self.mode = self.mode.toggled();
                debug!(mode = ?self.mode, "transform mode toggled");
            }
        }
    }

    /// Scroll wheel scaling: only the sign of the vertical delta matters
    pub fn scroll(&mut self, delta_y: f32) {
        if delta_y > 0.0 {
            self.rescale(SCROLL_SCALE_UP);
        } else if delta_y < 0.0 {
            self.rescale(SCROLL_SCALE_DOWN);
        }
    }

    pub fn model_matrix(&self) -> Matrix4 {
        self.translation * self.rotation * self.scale
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    /// (rotation, translation, scale) step sizes
    pub fn strengths(&self) -> (f32, f32, f32) {
        (
            self.rotation_strength,
            self.translation_strength,
            self.scale_strength,
        )
    }

    fn rotate(&mut self, axis: Vector3, angle: f32) {
        self.rotation *= matrix::rotation(&axis, angle);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.translation *= matrix::translation(x, y, 0.0);
    }

    fn rescale(&mut self, factor: f32) {
        self.scale *= matrix::uniform_scaling(factor);
    }

    fn multiply_speed(&mut self, factor: f32) {
        self.rotation_strength *= factor;
        self.translation_strength *= factor;
        self.scale_strength *= factor;
    }
}

/// Tracks held keys and feeds actions into [`TransformControls`]
#[derive(Debug, Default)]
pub struct InputSystem {
    pressed_keys: HashSet<KeyCode>,
}

impl InputSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a keyboard event
    ///
    /// Returns the one-shot action triggered by a fresh key press, if any.
    /// Continuous actions are applied from [`update`](Self::update) instead.
    pub fn on_keyboard_input(&mut self, key: KeyCode, state: ElementState) -> Option<ControlAction> {
        match state {
            ElementState::Pressed => {
                let fresh = self.pressed_keys.insert(key);
                ControlAction::from_key(key).filter(|a| fresh && !a.is_continuous())
            }
            ElementState::Released => {
                self.pressed_keys.remove(&key);
                None
            }
        }
    }

    /// Vertical scroll amount in "notches"
    pub fn scroll_amount(delta: &MouseScrollDelta) -> f32 {
        match delta {
            MouseScrollDelta::LineDelta(_, y) => *y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
        }
    }

    /// Apply every held continuous action once
    pub fn update(&self, controls: &mut TransformControls) {
        for key in &self.pressed_keys {
            if let Some(action) = ControlAction::from_key(*key).filter(ControlAction::is_continuous) {
                controls.apply(action);
            }
        }
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Forget held keys, e.g. when the window loses focus
    pub fn reset(&mut self) {
        self.pressed_keys.clear();
    }
}
