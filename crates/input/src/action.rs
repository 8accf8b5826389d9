use nutshell_common::{CameraState, Intent};

/// A camera change produced by the dispatcher.
///
/// The camera owner applies actions; the dispatcher never sees the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Start or stop moving in a direction.
    SetIntent { intent: Intent, active: bool },
    /// The pointer moved. `yaw`/`pitch` are the rotation to add in degrees,
    /// zero when mouse look is not engaged. Every pointer action also
    /// triggers the one-time calibration capture.
    Pointer { yaw: f32, pitch: f32 },
}

impl Action {
    pub fn apply(&self, camera: &mut CameraState) {
        match *self {
            Action::SetIntent { intent, active } => camera.set_intent(intent, active),
            Action::Pointer { yaw, pitch } => {
                if yaw != 0.0 || pitch != 0.0 {
                    camera.rotate(yaw, pitch);
                }
                if camera.capture_calibration() {
                    tracing::debug!(
                        pitch = camera.rotation_shift.x,
                        yaw = camera.rotation_shift.y,
                        "captured initial camera rotation"
                    );
                }
            }
        }
    }
}
