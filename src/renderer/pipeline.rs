//! WebGPU render pipeline setup
//!
//! Two pipelines share one render pass: flat-coloured triangles and textured
//! sprite quads. Batches from the tessellated display list are replayed in order
//! so painter's ordering survives pipeline switches.

use wgpu::util::DeviceExt;

use super::assets::{AssetTable, SpriteId, SpriteImage};
use super::scene::{Batch, Mesh};
use super::vertex::{SpriteVertex, Vertex};
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// GPU setup failures; the game keeps simulating without drawing
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

/// Map logical canvas pixels (origin top-left, y down) to NDC
pub fn canvas_to_ndc(p: [f32; 2]) -> [f32; 2] {
    [p[0] / CANVAS_WIDTH * 2.0 - 1.0, 1.0 - p[1] / CANVAS_HEIGHT * 2.0]
}

/// Whether a sprite can become a single 2D texture on this device
pub fn fits_texture_limit(image: &SpriteImage, max_dim: u32) -> bool {
    image.width <= max_dim && image.height <= max_dim
}

/// Main render state
pub struct RenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    color_pipeline: wgpu::RenderPipeline,
    sprite_pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    /// One bind group per uploaded sprite, indexed by [`SpriteId::index`]
    textures: Vec<Option<wgpu::BindGroup>>,
    /// Viewport size in pixels
    pub size: (u32, u32),
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        assets: &AssetTable,
    ) -> Result<Self, RenderError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("recycle-rush-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        // Palette colours are already sRGB-encoded, so prefer a linear target
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprite_bind_group_layout"),
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
        });

        let color_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("color_pipeline_layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });
        let sprite_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &[&texture_layout],
            immediate_size: 0,
        });

        let color_pipeline = create_pipeline(
            &device,
            &shader,
            &color_layout,
            config.format,
            "color_pipeline",
            ("vs_color", "fs_color"),
            Vertex::desc(),
        );
        let sprite_pipeline = create_pipeline(
            &device,
            &shader,
            &sprite_layout,
            config.format,
            "sprite_pipeline",
            ("vs_sprite", "fs_sprite"),
            SpriteVertex::desc(),
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sprite_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let mut state = Self {
            surface,
            device,
            queue,
            config,
            color_pipeline,
            sprite_pipeline,
            texture_layout,
            sampler,
            textures: (0..SpriteId::COUNT).map(|_| None).collect(),
            size: (width, height),
        };
        for (id, image) in assets.iter() {
            state.upload_sprite(id, image);
        }
        Ok(state)
    }

    /// Create (or replace) the texture behind a sprite slot
    pub fn upload_sprite(&mut self, id: SpriteId, image: &SpriteImage) {
        if image.width == 0 || image.height == 0 {
            log::warn!("Skipping empty sprite {:?}", id);
            return;
        }
        let max_dim = self.device.limits().max_texture_dimension_2d;
        if !fits_texture_limit(image, max_dim) {
            log::warn!(
                "Skipping sprite {:?}: {}x{} exceeds the {max_dim}px texture limit",
                id,
                image.width,
                image.height
            );
            self.textures[id.index()] = None;
            return;
        }
        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some(id.url()),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.rgba,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite_bind_group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.textures[id.index()] = Some(bind_group);
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reconfigure with the current size (after a lost surface)
    pub fn reconfigure(&mut self) {
        self.resize(self.size.0, self.size.1);
    }

    /// Upload a tessellated frame and draw its batches in order
    pub fn render(&mut self, mesh: &Mesh) -> Result<(), wgpu::SurfaceError> {
        let colored: Vec<Vertex> = mesh
            .colored
            .iter()
            .map(|v| Vertex {
                position: canvas_to_ndc(v.position),
                color: v.color,
            })
            .collect();
        let sprites: Vec<SpriteVertex> = mesh
            .sprites
            .iter()
            .map(|v| SpriteVertex {
                position: canvas_to_ndc(v.position),
                ..*v
            })
            .collect();

        let color_buffer = self.vertex_buffer("color_vertices", bytemuck::cast_slice(&colored));
        let sprite_buffer = self.vertex_buffer("sprite_vertices", bytemuck::cast_slice(&sprites));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for batch in &mesh.batches {
                match *batch {
                    Batch::Colored { first, count } => {
                        let Some(buffer) = &color_buffer else { continue };
                        render_pass.set_pipeline(&self.color_pipeline);
                        render_pass.set_vertex_buffer(0, buffer.slice(..));
                        render_pass.draw(first..first + count, 0..1);
                    }
                    Batch::Sprite { id, first, count } => {
                        let (Some(buffer), Some(Some(texture))) =
                            (&sprite_buffer, self.textures.get(id.index()))
                        else {
                            continue;
                        };
                        render_pass.set_pipeline(&self.sprite_pipeline);
                        render_pass.set_bind_group(0, texture, &[]);
                        render_pass.set_vertex_buffer(0, buffer.slice(..));
                        render_pass.draw(first..first + count, 0..1);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn vertex_buffer(&self, label: &str, contents: &[u8]) -> Option<wgpu::Buffer> {
        if contents.is_empty() {
            return None;
        }
        Some(
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents,
                    usage: wgpu::BufferUsages::VERTEX,
                }),
        )
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    label: &str,
    (vs, fs): (&str, &str),
    buffer: wgpu::VertexBufferLayout<'static>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs),
            buffers: &[buffer],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
