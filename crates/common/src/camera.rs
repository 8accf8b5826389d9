use glam::{Mat4, Vec2, Vec3};

/// Pitch limit in degrees, both directions.
pub const MAX_PITCH: f32 = 70.0;

/// Base movement speed in units per acceleration step.
pub const BASE_SPEED: f32 = 0.8;

/// Acceleration steps per second of elapsed time.
pub const ACCELERATION_PER_SECOND: f32 = 20.0;

/// A directional movement intent, bound to a held key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Forward,
    Backward,
    Left,
    Right,
}

impl Intent {
    pub const ALL: [Intent; 4] = [
        Intent::Forward,
        Intent::Backward,
        Intent::Left,
        Intent::Right,
    ];
}

/// Which directional keys are currently held. Flags are independent:
/// forward and left may both be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intents {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl Intents {
    pub fn get(&self, intent: Intent) -> bool {
        match intent {
            Intent::Forward => self.forward,
            Intent::Backward => self.backward,
            Intent::Left => self.left,
            Intent::Right => self.right,
        }
    }

    pub fn set(&mut self, intent: Intent, active: bool) {
        match intent {
            Intent::Forward => self.forward = active,
            Intent::Backward => self.backward = active,
            Intent::Left => self.left = active,
            Intent::Right => self.right = active,
        }
    }

    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// First-person camera state.
///
/// `rotation` holds pitch (x), yaw (y) and roll (z) in degrees; `translation`
/// is the accumulated offset applied after the rotation in the view transform.
///
/// The calibration pair (`first_motion_captured`, `rotation_shift`) records the
/// rotation at the first mouse-motion sample of the run. Nothing subtracts the
/// shift from the live rotation; it is kept so the capture timing is observable.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraState {
    pub rotation: Vec3,
    pub translation: Vec3,
    pub intents: Intents,
    pub first_motion_captured: bool,
    pub rotation_shift: Vec2,
}

impl CameraState {
    /// All-zero orientation and offset, no intents, calibration pending.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_intent(&mut self, intent: Intent, active: bool) {
        self.intents.set(intent, active);
    }

    /// Add mouse deltas to yaw and pitch, then clamp pitch.
    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        self.rotation.y += yaw;
        self.rotation.x = (self.rotation.x + pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Capture the current rotation as the calibration shift.
    ///
    /// Only the first call of a run has an effect. Returns whether this call
    /// performed the capture.
    pub fn capture_calibration(&mut self) -> bool {
        if self.first_motion_captured {
            return false;
        }
        self.rotation_shift = Vec2::new(self.rotation.x, self.rotation.y);
        self.first_motion_captured = true;
        true
    }

    /// Forward basis derived from the current yaw and pitch.
    pub fn forward(&self) -> Vec3 {
        let (sin_pitch, _) = self.rotation.x.to_radians().sin_cos();
        let (sin_yaw, cos_yaw) = self.rotation.y.to_radians().sin_cos();
        Vec3::new(-sin_yaw, sin_pitch, cos_yaw)
    }

    /// Right basis derived from the current yaw. Always horizontal.
    pub fn right(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.rotation.y.to_radians().sin_cos();
        Vec3::new(-cos_yaw, 0.0, -sin_yaw)
    }

    /// Translation change the held intents produce over `elapsed` seconds.
    ///
    /// Intents combine additively and the result is not normalized, so
    /// diagonal movement is faster than axis-aligned movement.
    pub fn movement_delta(&self, elapsed: f64) -> Vec3 {
        let step = BASE_SPEED * ACCELERATION_PER_SECOND * elapsed as f32;
        let forward = self.forward() * step;
        let right = self.right() * step;

        let mut delta = Vec3::ZERO;
        if self.intents.forward {
            delta += forward;
        }
        if self.intents.backward {
            delta -= forward;
        }
        if self.intents.right {
            delta += right;
        }
        if self.intents.left {
            delta -= right;
        }
        delta
    }

    /// Advance the translation by the movement of the held intents.
    pub fn integrate(&mut self, elapsed: f64) {
        self.translation += self.movement_delta(elapsed);
    }

    /// View transform: pitch, then yaw, then roll, then the translation.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.rotation.x.to_radians())
            * Mat4::from_rotation_y(self.rotation.y.to_radians())
            * Mat4::from_rotation_z(self.rotation.z.to_radians())
            * Mat4::from_translation(self.translation)
    }
}
