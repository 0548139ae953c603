use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use bytemuck::{bytes_of, Pod};
use image::imageops::FilterType;
use image::RgbaImage;
use log::{debug, warn};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use crate::decode::DecodedImage;
use crate::error::SceneError;
use crate::geometry::{MeshData, FLOATS_PER_VERTEX};
use crate::meshes::{Shape, ShapeMeshes, Surfaces};
use crate::shader::{ShaderState, UniformBlock, UniformValue};
use crate::texture::{TextureHandle, TextureUploader, MAX_TEXTURE_UNITS};

use super::shared::{FrameUniform, ObjectUniform, SHADER};

/// wgpu-backed render device for the display window.
///
/// Uniform writes land in a CPU-side [`UniformBlock`]; every draw call
/// snapshots it and [`present`](Self::present) replays the queued draws in a
/// single render pass.
pub struct GpuDevice {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth: DepthBuffer,
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    fallback_texture: GpuTexture,
    meshes: HashMap<Shape, MeshBuffers>,
    textures: HashMap<TextureHandle, GpuTexture>,
    units: [Option<TextureHandle>; MAX_TEXTURE_UNITS],
    next_texture: u32,
    uniforms: UniformBlock,
    queued: Vec<QueuedDraw>,
}

impl GpuDevice {
    /// Initializes the GPU for the provided window.
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(anyhow!("window has zero area"));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: Default::default(),
            backend_options: Default::default(),
        });
        let surface = instance.create_surface(Arc::clone(&window))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to acquire GPU adapter")?;

        let device_descriptor = wgpu::DeviceDescriptor {
            label: Some("garden-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: Default::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
        };
        let (device, queue) = adapter
            .request_device(&device_descriptor)
            .await
            .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no texture formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth = DepthBuffer::create(&device, config.width, config.height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("garden-shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let frame_layout = uniform_layout::<FrameUniform>(&device, "frame-bind-layout");
        let object_layout = uniform_layout::<ObjectUniform>(&device, "object-bind-layout");
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture-bind-layout"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("garden-pipeline-layout"),
            bind_group_layouts: &[&frame_layout, &object_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame-uniform"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame-bind-group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let stride = (FLOATS_PER_VERTEX * std::mem::size_of::<f32>()) as u64;
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("garden-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: stride,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x2
                    ],
                }],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("garden-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white = RgbaImage::from_pixel(1, 1, image::Rgba([255; 4]));
        let fallback_texture = GpuTexture::create(
            &device,
            &queue,
            &texture_layout,
            &sampler,
            &[white],
            "fallback-white",
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth,
            pipeline,
            frame_buffer,
            frame_bind_group,
            object_layout,
            texture_layout,
            sampler,
            fallback_texture,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            units: [None; MAX_TEXTURE_UNITS],
            next_texture: 1,
            uniforms: UniformBlock::default(),
            queued: Vec::new(),
        })
    }

    /// Returns the identifier of the window owned by the device.
    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    /// Resizes the swap chain to match the new dimensions.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthBuffer::create(&self.device, new_size.width, new_size.height);
    }

    /// Draws everything queued since the last call and presents the frame.
    pub fn present(&mut self) -> Result<(), wgpu::SurfaceError> {
        let draws = std::mem::take(&mut self.queued);
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let frame = FrameUniform::from_block(&self.uniforms);
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytes_of(&frame));

        let object_groups: Vec<wgpu::BindGroup> = draws
            .iter()
            .map(|draw| {
                let buffer = self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("object-uniform"),
                        contents: bytes_of(&draw.object),
                        usage: wgpu::BufferUsages::UNIFORM,
                    });
                self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("object-bind-group"),
                    layout: &self.object_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                })
            })
            .collect();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("garden-encoder"),
            });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("main-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.53,
                        g: 0.72,
                        b: 0.88,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for (draw, object_group) in draws.iter().zip(&object_groups) {
            let Some(mesh) = self.meshes.get(&draw.shape) else {
                continue;
            };
            let texture = draw
                .texture
                .and_then(|handle| self.textures.get(&handle))
                .unwrap_or(&self.fallback_texture);

            pass.set_vertex_buffer(0, mesh.vertex.slice(..));
            pass.set_index_buffer(mesh.index.slice(..), wgpu::IndexFormat::Uint32);
            pass.set_bind_group(1, object_group, &[]);
            pass.set_bind_group(2, &texture.bind_group, &[]);
            for range in &draw.ranges {
                pass.draw_indexed(range.clone(), 0, 0..1);
            }
        }

        drop(pass);
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn texture_for_current_draw(&self) -> Option<TextureHandle> {
        if !self.uniforms.use_texture {
            return None;
        }
        let unit = usize::try_from(self.uniforms.object_texture).ok()?;
        self.units.get(unit).copied().flatten()
    }
}

impl ShaderState for GpuDevice {
    // A single pipeline serves every draw.
    fn use_program(&mut self) {}

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.uniforms.apply_or_warn(name, value);
    }
}

impl ShapeMeshes for GpuDevice {
    fn load_shape(&mut self, shape: Shape) {
        if self.meshes.contains_key(&shape) {
            return;
        }
        let mesh = MeshData::for_shape(shape);
        debug!(
            "uploading {shape} mesh ({} vertices, {} indices)",
            mesh.vertex_count(),
            mesh.indices.len()
        );
        let buffers = MeshBuffers::from_mesh(&self.device, mesh, &shape.to_string());
        self.meshes.insert(shape, buffers);
    }

    fn draw_shape(&mut self, shape: Shape, surfaces: Surfaces) {
        if !self.meshes.contains_key(&shape) {
            warn!("drawing {shape} before it was loaded; loading now");
            self.load_shape(shape);
        }
        let Some(mesh) = self.meshes.get(&shape) else {
            return;
        };
        let ranges = mesh.data.index_ranges(surfaces);
        let texture = self.texture_for_current_draw();
        self.queued.push(QueuedDraw {
            shape,
            ranges,
            object: ObjectUniform::from_block(&self.uniforms),
            texture,
        });
    }
}

impl TextureUploader for GpuDevice {
    fn upload_texture(
        &mut self,
        tag: &str,
        image: &DecodedImage,
    ) -> Result<TextureHandle, SceneError> {
        let upload_error = |reason: &str| SceneError::TextureUpload {
            tag: tag.to_string(),
            reason: reason.to_string(),
        };
        let rgba = image
            .to_rgba8()
            .ok_or_else(|| upload_error("only RGB and RGBA images can be uploaded"))?;
        let base = RgbaImage::from_raw(image.width, image.height, rgba)
            .ok_or_else(|| upload_error("pixel buffer does not match the image size"))?;
        if base.width() == 0 || base.height() == 0 {
            return Err(upload_error("image is empty"));
        }

        let levels = mip_chain(base);
        let texture = GpuTexture::create(
            &self.device,
            &self.queue,
            &self.texture_layout,
            &self.sampler,
            &levels,
            tag,
        );

        let handle = TextureHandle(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(handle, texture);
        debug!("uploaded texture {tag:?} with {} mip level(s)", levels.len());
        Ok(handle)
    }

    fn bind_texture_unit(&mut self, unit: u32, handle: TextureHandle) {
        match self.units.get_mut(unit as usize) {
            Some(slot) => *slot = Some(handle),
            None => warn!("texture unit {unit} is out of range"),
        }
    }

    fn release_texture(&mut self, handle: TextureHandle) {
        for slot in self.units.iter_mut() {
            if *slot == Some(handle) {
                *slot = None;
            }
        }
        if let Some(texture) = self.textures.remove(&handle) {
            texture.texture.destroy();
        }
    }
}

/// Base level followed by successively halved levels down to 1x1.
fn mip_chain(base: RgbaImage) -> Vec<RgbaImage> {
    let mut levels = vec![base];
    loop {
        let Some(last) = levels.last() else {
            break;
        };
        let (width, height) = last.dimensions();
        if width <= 1 && height <= 1 {
            break;
        }
        let next = image::imageops::resize(
            last,
            (width / 2).max(1),
            (height / 2).max(1),
            FilterType::Triangle,
        );
        levels.push(next);
    }
    levels
}

fn uniform_layout<T: Pod>(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
            },
            count: None,
        }],
    })
}

struct QueuedDraw {
    shape: Shape,
    ranges: Vec<Range<u32>>,
    object: ObjectUniform,
    texture: Option<TextureHandle>,
}

struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    data: MeshData,
}

impl MeshBuffers {
    fn from_mesh(device: &wgpu::Device, mesh: MeshData, label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            data: mesh,
        }
    }
}

struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

impl GpuTexture {
    fn create(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        levels: &[RgbaImage],
        label: &str,
    ) -> Self {
        let (width, height) = levels.first().map(RgbaImage::dimensions).unwrap_or((1, 1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len().max(1) as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, level) in levels.iter().enumerate() {
            let (level_width, level_height) = level.dimensions();
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
                    bytes_per_row: Some(4 * level_width),
                    rows_per_image: Some(level_height),
                },
                wgpu::Extent3d {
                    width: level_width,
                    height: level_height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
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
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        Self {
            texture,
            bind_group,
        }
    }
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}
