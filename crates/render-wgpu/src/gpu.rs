use crate::mesh::{GpuMesh, MeshData, Topology, Vertex};
use crate::shaders;
use crate::texture::{self, GpuTexture, WgpuTextureLoader};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use nutshell_assets::{ResourceLocator, TextureCache, TextureHandle, TextureId, TextureParams};
use nutshell_render::{DrawCall, DrawStep, FramePlan, Projection, Renderer, SceneTextures, Shading, scene};
use std::collections::BTreeMap;
use std::num::NonZeroU64;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Upper bound on draws in one frame.
const MAX_DRAWS: usize = 16;

/// Per-draw uniforms, laid out like `DrawUniforms` in the scene shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct DrawUniforms {
    mvp: [[f32; 4]; 4],
    model_view: [[f32; 4]; 4],
    color: [f32; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
    emissive: [f32; 4],
    light_position: [f32; 4],
    light_ambient: [f32; 4],
    light_diffuse: [f32; 4],
    light_specular: [f32; 4],
    params: [f32; 4],
}

impl DrawUniforms {
    fn new(draw: &DrawCall, plan: &FramePlan, projection: Mat4) -> Self {
        let light = &plan.light;
        let mut uniforms = Self {
            mvp: (projection * draw.model_view).to_cols_array_2d(),
            model_view: draw.model_view.to_cols_array_2d(),
            color: [1.0; 4],
            ambient: [0.0; 4],
            diffuse: [0.0; 4],
            specular: [0.0; 4],
            emissive: [0.0; 4],
            light_position: light.position.to_array(),
            light_ambient: light.ambient.to_array(),
            light_diffuse: light.diffuse.to_array(),
            light_specular: light.specular.to_array(),
            params: [0.0, 0.0, scene::GLOBAL_AMBIENT, 0.0],
        };
        match draw.shading {
            Shading::Unlit { color } => uniforms.color = color.to_array(),
            Shading::Lit(material) => {
                uniforms.ambient = material.ambient.to_array();
                uniforms.diffuse = material.diffuse.to_array();
                uniforms.specular = material.specular.to_array();
                uniforms.emissive = material.emissive.to_array();
                uniforms.params[0] = material.shininess;
                uniforms.params[1] = 1.0;
            }
        }
        uniforms
    }
}

/// Window and context parameters for the wgpu backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererSettings {
    pub width: u32,
    pub height: u32,
    /// Requested multisample count. Unsupported counts fall back to 1.
    pub samples: u32,
}

/// Failures while bringing up the rendering context.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("could not create a surface for the window: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no graphics adapter can present to the window")]
    NoAdapter,
    #[error("could not open the graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("the window surface reports no usable format")]
    UnsupportedSurface,
}

/// wgpu-based renderer for the Earth scene.
///
/// Owns the surface and device. Frames are drawn by [`Renderer::render`] and
/// shown by [`Renderer::present`].
pub struct WgpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    sample_count: u32,
    projection: Projection,
    triangle_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_stride: u64,
    texture_layout: wgpu::BindGroupLayout,
    white: GpuTexture,
    meshes: BTreeMap<DrawStep, GpuMesh>,
    cache: TextureCache<GpuTexture>,
    textures: BTreeMap<TextureId, TextureHandle<GpuTexture>>,
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    frame: Option<wgpu::SurfaceTexture>,
}

impl WgpuRenderer {
    /// Create the surface, device and scene resources for `target`.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        settings: RendererSettings,
    ) -> Result<Self, SetupError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(target)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(SetupError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("nutshell_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(SetupError::UnsupportedSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: settings.width.max(1),
            height: settings.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count = supported_sample_count(&adapter, surface_format, settings.samples);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            adapter = %adapter.get_info().name,
            format = ?surface_format,
            samples = sample_count,
            "GPU initialized"
        );

        let uniform_size = std::mem::size_of::<DrawUniforms>() as u64;
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let uniform_stride = uniform_size.div_ceil(alignment) * alignment;
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: uniform_stride * MAX_DRAWS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(uniform_size),
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: NonZeroU64::new(uniform_size),
                }),
            }],
        });

        let texture_layout = texture::bind_group_layout(&device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let triangle_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_format,
            sample_count,
            wgpu::PrimitiveTopology::TriangleList,
        );
        let line_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_format,
            sample_count,
            wgpu::PrimitiveTopology::LineList,
        );

        let meshes = DrawStep::ALL
            .iter()
            .map(|&step| {
                let label = format!("{step:?}").to_lowercase();
                let data = MeshData::for_geometry(&step.geometry());
                (step, GpuMesh::upload(&device, &label, &data))
            })
            .collect();

        let white = texture::white_texture(&device, &queue, &texture_layout);
        let depth_view = create_depth_view(&device, &config, sample_count);
        let msaa_view = create_msaa_view(&device, &config, sample_count);

        Ok(Self {
            surface,
            device,
            queue,
            projection: Projection::for_size(config.width, config.height),
            config,
            sample_count,
            triangle_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_bind_group,
            uniform_stride,
            texture_layout,
            white,
            meshes,
            cache: TextureCache::new(),
            textures: BTreeMap::new(),
            depth_view,
            msaa_view,
            frame: None,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.projection.resize(width, height);
        self.depth_view = create_depth_view(&self.device, &self.config, self.sample_count);
        self.msaa_view = create_msaa_view(&self.device, &self.config, self.sample_count);
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Largest texture width or height the device accepts.
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Load the image of every scene layer, falling back to the smaller file
    /// of each layer when the larger one is missing or too big.
    ///
    /// Layers whose images all fail are left untextured.
    pub fn load_scene_textures(&mut self, locator: &ResourceLocator) -> SceneTextures {
        SceneTextures {
            starfield: self.load_layer(locator, scene::STARFIELD_TEXTURES),
            surface: self.load_layer(locator, scene::SURFACE_TEXTURES),
            clouds: self.load_layer(locator, scene::CLOUD_TEXTURES),
        }
    }

    fn load_layer(&mut self, locator: &ResourceLocator, names: &[&str]) -> Option<TextureId> {
        let mut loader = WgpuTextureLoader::new(&self.device, &self.queue, &self.texture_layout);
        let Some(handle) =
            self.cache
                .load_first(locator, &mut loader, names, TextureParams::trilinear())
        else {
            tracing::warn!(files = ?names, "no image could be loaded for scene layer");
            return None;
        };
        let id = handle.id();
        self.textures.insert(id, handle);
        Some(id)
    }

    fn encode(&self, plan: &FramePlan, target: &wgpu::TextureView) -> wgpu::CommandBuffer {
        let projection = self.projection.matrix();
        let draws = &plan.draws[..plan.draws.len().min(MAX_DRAWS)];
        if draws.len() < plan.draws.len() {
            tracing::warn!(
                draws = plan.draws.len(),
                max = MAX_DRAWS,
                "frame has more draws than the uniform buffer holds"
            );
        }

        let mut staging = vec![0u8; self.uniform_stride as usize * draws.len()];
        for (i, draw) in draws.iter().enumerate() {
            let uniforms = DrawUniforms::new(draw, plan, projection);
            let start = i * self.uniform_stride as usize;
            let bytes = bytemuck::bytes_of(&uniforms);
            staging[start..start + bytes.len()].copy_from_slice(bytes);
        }
        if !staging.is_empty() {
            self.queue.write_buffer(&self.uniform_buffer, 0, &staging);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let (view, resolve_target) = match &self.msaa_view {
                Some(msaa) => (msaa, Some(target)),
                None => (target, None),
            };
            let clear = plan.clear_color;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.x as f64,
                            g: clear.y as f64,
                            b: clear.z as f64,
                            a: clear.w as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for (i, draw) in draws.iter().enumerate() {
                let Some(mesh) = self.meshes.get(&draw.step) else {
                    continue;
                };
                let texture = draw
                    .texture
                    .and_then(|id| self.textures.get(&id))
                    .map(|handle| handle.gpu())
                    .unwrap_or(&self.white);
                let offset = (i as u64 * self.uniform_stride) as u32;

                pass.set_pipeline(match mesh.topology {
                    Topology::Triangles => &self.triangle_pipeline,
                    Topology::Lines => &self.line_pipeline,
                });
                pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
                pass.set_bind_group(1, &texture.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        encoder.finish()
    }
}

impl Renderer for WgpuRenderer {
    fn render(&mut self, plan: &FramePlan) -> bool {
        // a frame that was drawn but never presented is dropped
        self.frame = None;

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return true;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("timed out waiting for the next surface texture");
                return true;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return false;
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let commands = self.encode(plan, &view);
        self.queue.submit(std::iter::once(commands));
        self.frame = Some(frame);
        true
    }

    fn present(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.present();
        }
    }
}

/// `requested` if both the color and depth formats support it, else 1.
fn supported_sample_count(adapter: &wgpu::Adapter, format: wgpu::TextureFormat, requested: u32) -> u32 {
    if requested <= 1 {
        return 1;
    }
    let color = adapter.get_texture_format_features(format).flags;
    let depth = adapter.get_texture_format_features(DEPTH_FORMAT).flags;
    if color.sample_count_supported(requested) && depth.sample_count_supported(requested) {
        requested
    } else {
        tracing::warn!(
            requested,
            "multisample count not supported by the adapter, rendering without multisampling"
        );
        1
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    sample_count: u32,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(match topology {
            wgpu::PrimitiveTopology::LineList => "line_pipeline",
            _ => "triangle_pipeline",
        }),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            ..Default::default()
        },
        multiview: None,
        cache: None,
    })
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

fn create_msaa_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> Option<wgpu::TextureView> {
    if sample_count <= 1 {
        return None;
    }
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("msaa_color_texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: config.format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    Some(texture.create_view(&Default::default()))
}
