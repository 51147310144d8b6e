use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use std::num::NonZeroU64;
use std::ops::Range;
use wgpu::util::DeviceExt;

use crate::core::gpu_context::GpuContext;
use crate::core::window::WindowDimensions;
use crate::loaders::{CubemapData, MeshData, TextureData};
use crate::scene::{ElementTransform, MeshId};
use crate::traits::renderer::{FrameUniforms, PolygonMode, SceneRenderer, SkyboxUniforms};
use crate::types::{MaterialUniform, MeshUniform, SkyboxUniform, Vertex};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Uniform slots allocated up front; the buffer grows when a frame needs more
const INITIAL_SLOTS: u64 = 16;

const MESH_UNIFORM_SIZE: u64 = std::mem::size_of::<MeshUniform>() as u64;

/// Draw recorded during a frame, replayed in order by `end_frame`
#[derive(Debug, Clone, Copy, PartialEq)]
enum Draw {
    Mesh { mesh: MeshId, slot: u64 },
    Skybox,
}

struct GpuPrimitive {
    indices: Range<u32>,
    material: usize,
}

/// Uploaded geometry of one model plus one bind group per material
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    primitives: Vec<GpuPrimitive>,
    materials: Vec<wgpu::BindGroup>,
}

struct MeshPipelines {
    fill: wgpu::RenderPipeline,
    line: Option<wgpu::RenderPipeline>,
    point: Option<wgpu::RenderPipeline>,
}

impl MeshPipelines {
    fn get(&self, mode: PolygonMode) -> Option<&wgpu::RenderPipeline> {
        match mode {
            PolygonMode::Fill => Some(&self.fill),
            PolygonMode::Line => self.line.as_ref(),
            PolygonMode::Point => self.point.as_ref(),
        }
    }
}

/// Per-draw mesh uniforms, one dynamic-offset slot each
struct UniformSlots {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: u64,
    staged: Vec<u8>,
}

impl UniformSlots {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, stride: u64, capacity: u64) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Mesh Uniform Slots"),
            size: stride * capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Uniform Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(MESH_UNIFORM_SIZE),
                }),
            }],
        });

        Self {
            buffer,
            bind_group,
            stride,
            capacity,
            staged: Vec::new(),
        }
    }

    fn len(&self) -> u64 {
        self.staged.len() as u64 / self.stride
    }

    /// Stage one uniform block, returning its slot
    fn push(&mut self, uniform: &MeshUniform) -> u64 {
        let slot = self.len();
        self.staged.extend_from_slice(bytemuck::bytes_of(uniform));
        self.staged.resize(((slot + 1) * self.stride) as usize, 0);
        slot
    }

    fn offset(&self, slot: u64) -> u32 {
        (slot * self.stride) as u32
    }
}

/// wgpu implementation of [`SceneRenderer`]
pub struct WgpuRenderer {
    gpu: GpuContext,
    pipelines: MeshPipelines,
    skybox_pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    slots: UniformSlots,
    skybox_buffer: wgpu::Buffer,
    skybox_bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    meshes: Vec<GpuMesh>,
    polygon_mode: PolygonMode,
    clear_color: wgpu::Color,
    draws: Vec<Draw>,
    frame: Option<FrameUniforms>,
}

impl WgpuRenderer {
    /// Upload `meshes` (indexed by [`MeshId`]) and the sky cube, and build the pipelines
    pub fn new(
        gpu: GpuContext,
        meshes: &[MeshData],
        skybox: &CubemapData,
        clear_color: [f32; 3],
    ) -> Result<Self> {
        let device = gpu.device();
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(MESH_UNIFORM_SIZE),
                },
                count: None,
            }],
        });
        let material_layout = Self::create_material_layout(device);
        let skybox_layout = Self::create_skybox_layout(device);

        let pipelines = Self::create_mesh_pipelines(&gpu, &uniform_layout, &material_layout);
        let skybox_pipeline = Self::create_skybox_pipeline(device, gpu.format(), &skybox_layout);

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let slots = UniformSlots::new(
            device,
            &uniform_layout,
            slot_stride(MESH_UNIFORM_SIZE, alignment),
            INITIAL_SLOTS,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let white = TextureData {
            width: 1,
            height: 1,
            data: vec![255; 4],
        };
        let white_view = Self::upload_texture(&gpu, &white, "White Texture");

        let meshes = meshes
            .iter()
            .enumerate()
            .map(|(index, mesh)| {
                Self::upload_mesh(&gpu, index, mesh, &material_layout, &sampler, &white_view)
            })
            .collect::<Result<Vec<_>>>()?;

        let skybox_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Skybox Uniform"),
            size: std::mem::size_of::<SkyboxUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let cube_view = Self::upload_cubemap(&gpu, skybox);
        let skybox_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Skybox Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let skybox_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Skybox Bind Group"),
            layout: &skybox_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: skybox_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&cube_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&skybox_sampler),
                },
            ],
        });

        let depth_view = Self::create_depth_view(device, gpu.dimensions());

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            bail!("Failed to create render resources: {error}");
        }
        info!(
            "Renderer ready: {} meshes, surface format {:?}",
            meshes.len(),
            gpu.format()
        );

        let [r, g, b] = clear_color.map(f64::from);
        Ok(Self {
            gpu,
            pipelines,
            skybox_pipeline,
            uniform_layout,
            slots,
            skybox_buffer,
            skybox_bind_group,
            depth_view,
            meshes,
            polygon_mode: PolygonMode::Fill,
            clear_color: wgpu::Color { r, g, b, a: 1.0 },
            draws: Vec::new(),
            frame: None,
        })
    }

    /// Reconfigure the surface and depth buffer
    pub fn resize(&mut self, dimensions: WindowDimensions) {
        if dimensions.is_empty() {
            return;
        }
        self.gpu.resize(dimensions);
        self.depth_view = Self::create_depth_view(self.gpu.device(), dimensions);
    }

    fn create_material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    fn create_skybox_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Skybox Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    fn create_mesh_pipelines(
        gpu: &GpuContext,
        uniform_layout: &wgpu::BindGroupLayout,
        material_layout: &wgpu::BindGroupLayout,
    ) -> MeshPipelines {
        let device = gpu.device();
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[uniform_layout, material_layout],
            push_constant_ranges: &[],
        });

        let create = |label: &str, polygon_mode: wgpu::PolygonMode| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.format(),
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    polygon_mode,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let line = gpu
            .supports(wgpu::Features::POLYGON_MODE_LINE)
            .then(|| create("Mesh Pipeline (line)", wgpu::PolygonMode::Line));
        let point = gpu
            .supports(wgpu::Features::POLYGON_MODE_POINT)
            .then(|| create("Mesh Pipeline (point)", wgpu::PolygonMode::Point));

        MeshPipelines {
            fill: create("Mesh Pipeline (fill)", wgpu::PolygonMode::Fill),
            line,
            point,
        }
    }

    fn create_skybox_pipeline(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Skybox Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/skybox.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Skybox Pipeline Layout"),
            bind_group_layouts: &[layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Skybox Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            // Sits at the far plane behind everything already drawn
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_depth_view(device: &wgpu::Device, dimensions: WindowDimensions) -> wgpu::TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("Depth Texture"),
                size: wgpu::Extent3d {
                    width: dimensions.width.max(1),
                    height: dimensions.height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn upload_texture(gpu: &GpuContext, texture: &TextureData, label: &str) -> wgpu::TextureView {
        let size = wgpu::Extent3d {
            width: texture.width,
            height: texture.height,
            depth_or_array_layers: 1,
        };
        let gpu_texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        gpu.queue().write_texture(
            gpu_texture.as_image_copy(),
            &texture.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * texture.width),
                rows_per_image: Some(texture.height),
            },
            size,
        );
        gpu_texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn upload_cubemap(gpu: &GpuContext, cubemap: &CubemapData) -> wgpu::TextureView {
        let face_size = wgpu::Extent3d {
            width: cubemap.size,
            height: cubemap.size,
            depth_or_array_layers: 1,
        };
        let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Skybox Texture"),
            size: wgpu::Extent3d {
                depth_or_array_layers: 6,
                ..face_size
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, face) in cubemap.faces.iter().enumerate() {
            gpu.queue().write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                face,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * cubemap.size),
                    rows_per_image: Some(cubemap.size),
                },
                face_size,
            );
        }

        texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Skybox View"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        })
    }

    fn upload_mesh(
        gpu: &GpuContext,
        index: usize,
        mesh: &MeshData,
        material_layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        white_view: &wgpu::TextureView,
    ) -> Result<GpuMesh> {
        let device = gpu.device();
        if mesh.vertices.is_empty() || mesh.indices.is_empty() {
            bail!("Mesh {index} has no geometry");
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let texture_views: Vec<wgpu::TextureView> = mesh
            .textures
            .iter()
            .map(|texture| Self::upload_texture(gpu, texture, "Material Texture"))
            .collect();

        let material_bind_group = |uniform: MaterialUniform, view: &wgpu::TextureView| {
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Material Uniform"),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Material Bind Group"),
                layout: material_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            })
        };

        let mut materials: Vec<wgpu::BindGroup> = mesh
            .materials
            .iter()
            .map(|material| {
                let view = material.texture.and_then(|t| texture_views.get(t));
                material_bind_group(
                    MaterialUniform::new(material.base_color, view.is_some()),
                    view.unwrap_or(white_view),
                )
            })
            .collect();
        // Primitives without a material use plain white
        let default_material = materials.len();
        materials.push(material_bind_group(
            MaterialUniform::new([1.0; 4], false),
            white_view,
        ));

        let primitives = mesh
            .primitives
            .iter()
            .map(|p| GpuPrimitive {
                indices: p.indices.clone(),
                material: p
                    .material
                    .filter(|&m| m < default_material)
                    .unwrap_or(default_material),
            })
            .collect();

        Ok(GpuMesh {
            vertex_buffer,
            index_buffer,
            primitives,
            materials,
        })
    }

    /// Grow the slot buffer to fit everything staged this frame
    fn ensure_slot_capacity(&mut self) {
        let needed = self.slots.len();
        if needed <= self.slots.capacity {
            return;
        }
        let capacity = needed.next_power_of_two();
        debug!("Growing mesh uniform slots to {}", capacity);
        let staged = std::mem::take(&mut self.slots.staged);
        self.slots = UniformSlots::new(
            self.gpu.device(),
            &self.uniform_layout,
            self.slots.stride,
            capacity,
        );
        self.slots.staged = staged;
    }

    fn encode(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let mesh_pipeline = self
            .pipelines
            .get(self.polygon_mode)
            .unwrap_or(&self.pipelines.fill);

        for draw in &self.draws {
            match *draw {
                Draw::Mesh { mesh, slot } => {
                    let gpu_mesh = &self.meshes[mesh.0];
                    pass.set_pipeline(mesh_pipeline);
                    pass.set_bind_group(0, &self.slots.bind_group, &[self.slots.offset(slot)]);
                    pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(gpu_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    for primitive in &gpu_mesh.primitives {
                        pass.set_bind_group(1, &gpu_mesh.materials[primitive.material], &[]);
                        pass.draw_indexed(primitive.indices.clone(), 0, 0..1);
                    }
                }
                Draw::Skybox => {
                    pass.set_pipeline(&self.skybox_pipeline);
                    pass.set_bind_group(0, &self.skybox_bind_group, &[]);
                    pass.draw(0..36, 0..1);
                }
            }
        }
    }
}

impl SceneRenderer for WgpuRenderer {
    fn begin_frame(&mut self, uniforms: &FrameUniforms) -> Result<()> {
        self.frame = Some(*uniforms);
        self.draws.clear();
        self.slots.staged.clear();
        Ok(())
    }

    fn draw_mesh(&mut self, mesh: MeshId, transform: &ElementTransform) -> Result<()> {
        let frame = self.frame.as_ref().context("draw_mesh called outside a frame")?;
        if mesh.0 >= self.meshes.len() {
            bail!("Unknown mesh {:?} ({} loaded)", mesh, self.meshes.len());
        }
        let slot = self.slots.push(&MeshUniform::new(frame, transform));
        self.draws.push(Draw::Mesh { mesh, slot });
        Ok(())
    }

    fn draw_skybox(&mut self, uniforms: &SkyboxUniforms) -> Result<()> {
        if self.frame.is_none() {
            bail!("draw_skybox called outside a frame");
        }
        self.gpu.queue().write_buffer(
            &self.skybox_buffer,
            0,
            bytemuck::bytes_of(&SkyboxUniform::new(uniforms)),
        );
        self.draws.push(Draw::Skybox);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        if self.frame.take().is_none() {
            bail!("end_frame called without begin_frame");
        }

        self.ensure_slot_capacity();
        if !self.slots.staged.is_empty() {
            self.gpu
                .queue()
                .write_buffer(&self.slots.buffer, 0, &self.slots.staged);
        }

        let Some(surface_texture) = self.gpu.acquire()? else {
            return Ok(());
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });
        self.encode(&mut encoder, &view);

        self.gpu.queue().submit(Some(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) -> PolygonMode {
        self.polygon_mode = resolve_polygon_mode(mode, |m| self.pipelines.get(m).is_some());
        if self.polygon_mode != mode {
            warn!("Polygon mode {:?} not supported by this device, staying in fill", mode);
        }
        self.polygon_mode
    }
}

/// Requested mode when available, fill otherwise
pub fn resolve_polygon_mode(
    requested: PolygonMode,
    available: impl Fn(PolygonMode) -> bool,
) -> PolygonMode {
    if available(requested) {
        requested
    } else {
        PolygonMode::Fill
    }
}

/// Round `size` up to the dynamic-offset alignment
pub fn slot_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}
