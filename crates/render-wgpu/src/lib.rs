//! wgpu render backend for the Earth scene.
//!
//! Executes frame plans with one shader for every layer: lit spheres, the
//! unlit starfield box and the axis line. Images are decoded with `image`,
//! uploaded with a CPU-built mip chain and shared through the texture cache.
//!
//! # Invariants
//! - Renderer never mutates camera or scene state.
//! - Draws without a loaded texture are drawn with a white texture.
//! - A lost or outdated surface is reconfigured and the frame skipped;
//!   only unrecoverable surface errors stop the loop.

mod gpu;
mod mesh;
mod shaders;
mod texture;

pub use gpu::{RendererSettings, SetupError, WgpuRenderer};
pub use texture::{GpuTexture, WgpuTextureLoader};
