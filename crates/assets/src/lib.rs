//! Asset plumbing: where files live and how loaded textures are shared.
//!
//! The renderer consumes textures by handle, never by raw file path. A handle
//! keeps its texture alive; the cache only remembers textures somebody still
//! holds.
//!
//! # Invariants
//! - Lookup order over resource roots is registration order.
//! - Two shared loads with the same resolved path and parameters return the
//!   same texture.
//! - Failed loads are logged and reported as absent; they never panic.

pub mod locator;
pub mod texture;

pub use locator::ResourceLocator;
pub use texture::{
    Filter, LoadedTexture, Texture, TextureCache, TextureError, TextureHandle, TextureId,
    TextureKind, TextureLoader, TextureParams,
};

pub fn crate_info() -> &'static str {
    "nutshell-assets v0.1.0"
}
