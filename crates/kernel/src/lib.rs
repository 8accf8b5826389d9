//! Render kernel: frame clock, window settings and the render loop.
//!
//! # Invariants
//! - The loop is single-threaded: sample clock, draw, present, drain input.
//! - Input drained in one iteration affects the next frame, never the current.
//! - `Stopped` is terminal; once stopped nothing else is drawn.

pub mod clock;
pub mod render_loop;
pub mod settings;

pub use clock::{Clock, FixedStepTimeSource, ManualTimeSource, MonotonicTimeSource, TimeSource};
pub use render_loop::{EventSource, LoopState, PlatformEvent, RenderLoop};
pub use settings::WindowSettings;

pub fn crate_info() -> &'static str {
    "nutshell-kernel v0.1.0"
}
