use glam::{Mat3, Mat4, Vec3};

use crate::scene::ElementTransform;
use crate::traits::renderer::{FrameUniforms, SkyboxUniforms};

/// Mesh vertex as laid out in the vertex buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-draw uniform block for the mesh shader.
/// `mat3x3<f32>` columns are padded to 16 bytes in WGSL uniform storage.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniform {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    pub light_direction: [f32; 3],
    pub fog: u32,
    pub light_color: [f32; 3],
    pub _pad1: f32,
    pub lamp_position: [f32; 3],
    pub _pad2: f32,
}

impl MeshUniform {
    pub fn new(frame: &FrameUniforms, transform: &ElementTransform) -> Self {
        let lighting = frame.lighting;
        Self {
            model: transform.model.to_cols_array_2d(),
            view: frame.view.to_cols_array_2d(),
            projection: frame.projection.to_cols_array_2d(),
            normal: padded_mat3(transform.normal),
            light_direction: lighting.direction.to_array(),
            fog: frame.fog as u32,
            light_color: lighting.color.to_array(),
            _pad1: 0.0,
            lamp_position: lighting.lamp_position.to_array(),
            _pad2: 0.0,
        }
    }
}

/// Uniform block for the sky cube
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyboxUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub fog: u32,
    pub _pad: [u32; 3],
}

impl SkyboxUniform {
    /// The translation is stripped so the sky stays centred on the eye
    pub fn new(uniforms: &SkyboxUniforms) -> Self {
        let rotation_only = Mat4::from_mat3(Mat3::from_mat4(uniforms.view));
        Self {
            view: rotation_only.to_cols_array_2d(),
            projection: uniforms.projection.to_cols_array_2d(),
            fog: uniforms.fog as u32,
            _pad: [0; 3],
        }
    }
}

/// Material block bound alongside each mesh
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub has_texture: u32,
    pub _pad: [u32; 3],
}

impl MaterialUniform {
    pub fn new(base_color: [f32; 4], has_texture: bool) -> Self {
        Self {
            base_color,
            has_texture: has_texture as u32,
            _pad: [0; 3],
        }
    }
}

fn padded_mat3(m: Mat3) -> [[f32; 4]; 3] {
    let pad = |c: Vec3| [c.x, c.y, c.z, 0.0];
    [pad(m.x_axis), pad(m.y_axis), pad(m.z_axis)]
}
