use anyhow::Result;
use glam::{Mat4, Vec3};

use crate::scene::{ElementTransform, MeshId};

/// Rasterization mode for scene meshes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
    Point,
}

/// Scene lighting, world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    /// Direction towards the light
    pub direction: Vec3,
    pub color: Vec3,
    pub lamp_position: Vec3,
}

/// Values shared by every mesh draw of a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub fog: bool,
    pub lighting: Lighting,
}

/// Skybox inputs; the box has no model matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyboxUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub fog: bool,
}

/// Draw interface the frame orchestrator talks to.
///
/// Calls within a frame arrive as `begin_frame`, any number of `draw_mesh`, at most one
/// `draw_skybox`, then `end_frame`. Draws must reach the screen in call order.
pub trait SceneRenderer {
    fn begin_frame(&mut self, uniforms: &FrameUniforms) -> Result<()>;

    fn draw_mesh(&mut self, mesh: MeshId, transform: &ElementTransform) -> Result<()>;

    /// Draw the sky behind everything already drawn this frame
    fn draw_skybox(&mut self, uniforms: &SkyboxUniforms) -> Result<()>;

    fn end_frame(&mut self) -> Result<()>;

    /// Switch mesh rasterization; returns the mode actually in effect
    fn set_polygon_mode(&mut self, mode: PolygonMode) -> PolygonMode;
}
