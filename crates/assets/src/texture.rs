use crate::locator::ResourceLocator;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

/// Identifier of a loaded texture, unique within one cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// Texture dimensionality. Only flat 2D textures are supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextureKind {
    #[default]
    D2,
}

/// Sampling filter, named after the classic minification filter set.
///
/// The first word is the filter within a mip level, the second (if any) the
/// filter between mip levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl Filter {
    pub fn uses_mipmaps(self) -> bool {
        !matches!(self, Filter::Nearest | Filter::Linear)
    }

    /// Filter applied to texels within one level.
    pub fn texel(self) -> Filter {
        match self {
            Filter::Nearest | Filter::NearestMipmapNearest | Filter::NearestMipmapLinear => {
                Filter::Nearest
            }
            Filter::Linear | Filter::LinearMipmapNearest | Filter::LinearMipmapLinear => {
                Filter::Linear
            }
        }
    }

    /// Filter applied between mip levels, if mipmapping is used.
    pub fn between_levels(self) -> Option<Filter> {
        match self {
            Filter::Nearest | Filter::Linear => None,
            Filter::NearestMipmapNearest | Filter::LinearMipmapNearest => Some(Filter::Nearest),
            Filter::NearestMipmapLinear | Filter::LinearMipmapLinear => Some(Filter::Linear),
        }
    }
}

/// Parameters a texture is loaded with. Part of the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureParams {
    pub kind: TextureKind,
    pub min_filter: Filter,
    pub mag_filter: Filter,
    /// Let the loader pick the storage format from the image (color images are
    /// treated as sRGB). When false the data is stored as linear RGBA8.
    pub auto_format: bool,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            kind: TextureKind::D2,
            min_filter: Filter::NearestMipmapLinear,
            mag_filter: Filter::Linear,
            auto_format: true,
        }
    }
}

impl TextureParams {
    /// Linear filtering within and between mip levels.
    pub fn trilinear() -> Self {
        Self {
            min_filter: Filter::LinearMipmapLinear,
            mag_filter: Filter::Linear,
            ..Self::default()
        }
    }

    /// Magnification cannot use mip levels; such a request falls back to
    /// linear filtering.
    pub fn sanitized(self) -> Self {
        if self.mag_filter.uses_mipmaps() {
            tracing::warn!(
                requested = ?self.mag_filter,
                "mipmap filter is not valid for magnification, using Linear"
            );
            return Self {
                mag_filter: Filter::Linear,
                ..self
            };
        }
        self
    }

    pub fn generates_mipmaps(&self) -> bool {
        self.min_filter.uses_mipmaps()
    }
}

/// Errors from loading a texture.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texture file not found: {0}")]
    NotFound(String),
    #[error("could not decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("{path} is {width}x{height}, larger than the device limit of {max} pixels")]
    TooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max: u32,
    },
    #[error("could not upload {path}: {reason}")]
    Upload { path: PathBuf, reason: String },
}

/// What a [`TextureLoader`] produces for one file.
#[derive(Debug)]
pub struct LoadedTexture<T> {
    pub width: u32,
    pub height: u32,
    pub gpu: T,
}

/// Decodes an image file and uploads it, producing the backend payload.
pub trait TextureLoader {
    type Gpu;

    fn load(
        &mut self,
        path: &Path,
        params: &TextureParams,
    ) -> Result<LoadedTexture<Self::Gpu>, TextureError>;
}

/// A loaded texture and its backend payload.
#[derive(Debug)]
pub struct Texture<T> {
    id: TextureId,
    name: String,
    path: PathBuf,
    params: TextureParams,
    width: u32,
    height: u32,
    private: bool,
    gpu: T,
}

impl<T> Texture<T> {
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// File name the texture was requested under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn params(&self) -> &TextureParams {
        &self.params
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Private textures were loaded past the cache and are never shared.
    pub fn is_private(&self) -> bool {
        self.private
    }

    pub fn gpu(&self) -> &T {
        &self.gpu
    }
}

/// Shared ownership of a texture. Dropping the last handle releases it.
pub type TextureHandle<T> = Rc<Texture<T>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: PathBuf,
    params: TextureParams,
}

/// Cache of shared textures keyed by resolved path and load parameters.
///
/// The cache holds weak references only, so a texture lives exactly as long
/// as some handle to it does.
#[derive(Debug)]
pub struct TextureCache<T> {
    shared: HashMap<CacheKey, Weak<Texture<T>>>,
    next_id: u64,
}

impl<T> Default for TextureCache<T> {
    fn default() -> Self {
        Self {
            shared: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<T> TextureCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of shared textures that are still alive.
    pub fn live_count(&self) -> usize {
        self.shared
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Load `name`, or return absent after logging why it failed.
    pub fn load<L>(
        &mut self,
        locator: &ResourceLocator,
        loader: &mut L,
        name: &str,
        params: TextureParams,
        force_private: bool,
    ) -> Option<TextureHandle<T>>
    where
        L: TextureLoader<Gpu = T>,
    {
        match self.try_load(locator, loader, name, params, force_private) {
            Ok(texture) => Some(texture),
            Err(e) => {
                tracing::warn!(texture = name, "texture unavailable: {e}");
                None
            }
        }
    }

    /// Try each name in order and return the first that loads.
    ///
    /// Used to fall back from a high resolution image to a smaller one when
    /// the first is missing or exceeds the device limits.
    pub fn load_first<L>(
        &mut self,
        locator: &ResourceLocator,
        loader: &mut L,
        names: &[&str],
        params: TextureParams,
    ) -> Option<TextureHandle<T>>
    where
        L: TextureLoader<Gpu = T>,
    {
        names
            .iter()
            .find_map(|name| self.load(locator, loader, name, params, false))
    }

    pub fn try_load<L>(
        &mut self,
        locator: &ResourceLocator,
        loader: &mut L,
        name: &str,
        params: TextureParams,
        force_private: bool,
    ) -> Result<TextureHandle<T>, TextureError>
    where
        L: TextureLoader<Gpu = T>,
    {
        let params = params.sanitized();
        let path = locator
            .resolve(name)
            .ok_or_else(|| TextureError::NotFound(name.to_string()))?;
        let key = CacheKey {
            path: path.clone(),
            params,
        };

        if !force_private {
            if let Some(texture) = self.shared.get(&key).and_then(Weak::upgrade) {
                tracing::debug!(texture = name, "texture already loaded, sharing it");
                return Ok(texture);
            }
        }

        let loaded = loader.load(&path, &params)?;
        let texture = Rc::new(Texture {
            id: TextureId(self.next_id),
            name: name.to_string(),
            path,
            params,
            width: loaded.width,
            height: loaded.height,
            private: force_private,
            gpu: loaded.gpu,
        });
        self.next_id += 1;

        tracing::info!(
            texture = name,
            width = texture.width,
            height = texture.height,
            private = force_private,
            "texture loaded"
        );

        if !force_private {
            self.shared.retain(|_, weak| weak.strong_count() > 0);
            self.shared.insert(key, Rc::downgrade(&texture));
        }
        Ok(texture)
    }
}
