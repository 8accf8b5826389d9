use image::RgbaImage;
use image::imageops::{self, FilterType};
use nutshell_assets::{Filter, LoadedTexture, TextureError, TextureLoader, TextureParams};
use std::path::Path;

/// A texture uploaded to the device, ready to bind at group 1.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub bind_group: wgpu::BindGroup,
    pub mip_levels: u32,
}

impl std::fmt::Debug for GpuTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuTexture")
            .field("size", &self.texture.size())
            .field("format", &self.texture.format())
            .field("mip_levels", &self.mip_levels)
            .finish()
    }
}

/// Layout of the per-draw texture bind group: texture then sampler.
pub(crate) fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("texture_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Decodes image files and uploads them through a device.
pub struct WgpuTextureLoader<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    layout: &'a wgpu::BindGroupLayout,
}

impl<'a> WgpuTextureLoader<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        layout: &'a wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            device,
            queue,
            layout,
        }
    }

    /// Largest width or height the device accepts.
    pub fn max_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}

impl TextureLoader for WgpuTextureLoader<'_> {
    type Gpu = GpuTexture;

    fn load(
        &mut self,
        path: &Path,
        params: &TextureParams,
    ) -> Result<LoadedTexture<GpuTexture>, TextureError> {
        let decode_error = |e: image::ImageError| TextureError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        // reject oversized files before decoding the whole image
        let (width, height) = image::image_dimensions(path).map_err(decode_error)?;
        check_size(path, width, height, self.max_dimension())?;

        let image = image::open(path).map_err(decode_error)?.to_rgba8();
        let levels = mip_chain(image, params.generates_mipmaps());
        let format = if params.auto_format {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let label = path.display().to_string();
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let gpu = upload(self.device, self.queue, self.layout, &label, &levels, format, params);
        if let Some(e) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(TextureError::Upload {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }

        tracing::debug!(
            path = %path.display(),
            mip_levels = gpu.mip_levels,
            ?format,
            "texture uploaded"
        );
        Ok(LoadedTexture { width, height, gpu })
    }
}

/// Plain white texture bound to draws without an image.
pub(crate) fn white_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> GpuTexture {
    let pixel = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
    let params = TextureParams {
        min_filter: Filter::Nearest,
        mag_filter: Filter::Nearest,
        ..TextureParams::default()
    };
    upload(
        device,
        queue,
        layout,
        "white",
        &[pixel],
        wgpu::TextureFormat::Rgba8Unorm,
        &params,
    )
}

fn check_size(path: &Path, width: u32, height: u32, max: u32) -> Result<(), TextureError> {
    if width > max || height > max {
        return Err(TextureError::TooLarge {
            path: path.to_path_buf(),
            width,
            height,
            max,
        });
    }
    Ok(())
}

/// Number of levels in a full mip chain down to 1x1.
fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Level 0 followed by successively halved levels when `generate` is set.
fn mip_chain(image: RgbaImage, generate: bool) -> Vec<RgbaImage> {
    let count = if generate {
        mip_level_count(image.width(), image.height())
    } else {
        1
    };
    let mut levels = Vec::with_capacity(count as usize);
    levels.push(image);
    for _ in 1..count {
        let Some(prev) = levels.last() else { break };
        let width = (prev.width() / 2).max(1);
        let height = (prev.height() / 2).max(1);
        let next = imageops::resize(prev, width, height, FilterType::Triangle);
        levels.push(next);
    }
    levels
}

fn filter_mode(filter: Filter) -> wgpu::FilterMode {
    match filter {
        Filter::Nearest => wgpu::FilterMode::Nearest,
        _ => wgpu::FilterMode::Linear,
    }
}

fn sampler_descriptor<'a>(label: &'a str, params: &TextureParams) -> wgpu::SamplerDescriptor<'a> {
    wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: filter_mode(params.mag_filter.texel()),
        min_filter: filter_mode(params.min_filter.texel()),
        mipmap_filter: params
            .min_filter
            .between_levels()
            .map(filter_mode)
            .unwrap_or(wgpu::FilterMode::Nearest),
        ..Default::default()
    }
}

fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    label: &str,
    levels: &[RgbaImage],
    format: wgpu::TextureFormat,
    params: &TextureParams,
) -> GpuTexture {
    let (width, height) = levels
        .first()
        .map(|level| level.dimensions())
        .unwrap_or((1, 1));
    let mip_levels = levels.len().max(1) as u32;

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: mip_levels,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (mip_level, level) in levels.iter().enumerate() {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: mip_level as u32,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            level.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * level.width()),
                rows_per_image: Some(level.height()),
            },
            wgpu::Extent3d {
                width: level.width(),
                height: level.height(),
                depth_or_array_layers: 1,
            },
        );
    }

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&sampler_descriptor(label, params));
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });

    GpuTexture {
        texture,
        view,
        sampler,
        bind_group,
        mip_levels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_counts() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(8, 4), 4);
        assert_eq!(mip_level_count(4096, 2048), 13);
        assert_eq!(mip_level_count(1000, 500), 10);
    }

    #[test]
    fn chain_halves_down_to_one_pixel() {
        let image = RgbaImage::new(8, 2);
        let levels = mip_chain(image, true);
        let sizes: Vec<_> = levels.iter().map(|l| l.dimensions()).collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
    }

    #[test]
    fn chain_without_mipmaps_is_single_level() {
        let levels = mip_chain(RgbaImage::new(16, 16), false);
        assert_eq!(levels.len(), 1);
    }

    #[test]
    fn oversized_images_rejected() {
        let path = Path::new("earthmap4k.jpg");
        assert!(check_size(path, 4096, 2048, 8192).is_ok());
        assert!(check_size(path, 8192, 8192, 8192).is_ok());
        let err = check_size(path, 4096, 2048, 2048).unwrap_err();
        assert!(matches!(
            err,
            TextureError::TooLarge {
                width: 4096,
                max: 2048,
                ..
            }
        ));
    }

    #[test]
    fn sampler_follows_filters() {
        let desc = sampler_descriptor("t", &TextureParams::trilinear());
        assert_eq!(desc.min_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.mipmap_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.address_mode_u, wgpu::AddressMode::Repeat);

        let params = TextureParams {
            min_filter: Filter::NearestMipmapNearest,
            mag_filter: Filter::Nearest,
            ..TextureParams::default()
        };
        let desc = sampler_descriptor("t", &params);
        assert_eq!(desc.min_filter, wgpu::FilterMode::Nearest);
        assert_eq!(desc.mag_filter, wgpu::FilterMode::Nearest);
        assert_eq!(desc.mipmap_filter, wgpu::FilterMode::Nearest);
    }
}
