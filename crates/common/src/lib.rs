//! Shared types for the nut-shell demo.
//!
//! # Invariants
//! - Camera pitch never leaves `[-MAX_PITCH, MAX_PITCH]`.
//! - Camera state is owned by the render loop; nothing else holds it.

pub mod camera;

pub use camera::{CameraState, Intent, Intents};

pub fn crate_info() -> &'static str {
    "nutshell-common v0.1.0"
}
