//! Rendering Adapter: backend-agnostic frame description.
//!
//! The [`FrameRenderer`] turns camera state and elapsed time into a
//! [`FramePlan`], an ordered list of draw calls with their transforms,
//! shading and texture bindings. Backends implement [`Renderer`] and execute
//! plans.
//!
//! # Invariants
//! - Every frame plan contains every draw step, in order, whether or not its
//!   texture is available.
//! - Scene rotation advances only with elapsed time, never per frame.
//! - Renderers never mutate camera or scene state.

mod frame;
mod material;
mod plan;
mod projection;
mod renderer;
pub mod scene;

pub use frame::{FrameRenderer, SceneTextures};
pub use material::{Light, Material, Shading};
pub use plan::{DrawCall, DrawStep, FramePlan, Geometry};
pub use projection::Projection;
pub use renderer::{DebugTextRenderer, Renderer};
pub use scene::SceneRotation;

pub fn crate_info() -> &'static str {
    "nutshell-render v0.1.0"
}
