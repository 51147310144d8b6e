//! Viewer settings, loaded from an optional JSON file.
//!
//! Every field has a default, so a config file only needs the values it changes.

use anyhow::{Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::loaders::skybox::face_paths;
use crate::traits::renderer::Lighting;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            title: "Scene Tour".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub world_up: [f32; 3],
    /// Units per movement step
    pub speed: f32,
    /// Degrees per pixel of pointer motion
    pub sensitivity: f32,
    /// Degrees per frame while Q/E is held
    pub yaw_step: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [10.0, 3.0, 10.0],
            target: [0.0, 0.0, -10.0],
            world_up: [0.0, 1.0, 0.0],
            speed: 0.75,
            sensitivity: 0.1,
            yaw_step: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl ProjectionConfig {
    pub fn matrix(&self, aspect: f32) -> glam::Mat4 {
        glam::Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, self.near, self.far)
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 400.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Degrees the blades turn per frame while animated
    pub blade_step: f32,
    /// Startup rotation of the terrain mesh about +Y, degrees
    pub rotation: f32,
    pub light_direction: [f32; 3],
    pub light_color: [f32; 3],
    pub lamp_position: [f32; 3],
    pub clear_color: [f32; 3],
}

impl SceneConfig {
    pub fn lighting(&self) -> Lighting {
        Lighting {
            direction: Vec3::from_array(self.light_direction),
            color: Vec3::from_array(self.light_color),
            lamp_position: Vec3::from_array(self.lamp_position),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            blade_step: 2.0,
            rotation: 0.0,
            light_direction: [0.0, 1.0, 1.0],
            light_color: [1.0, 1.0, 1.0],
            lamp_position: [154.788, 12.426, 4.751],
            clear_color: [0.7, 0.7, 0.7],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub root: PathBuf,
    /// Model directory, relative to `root`
    pub models: PathBuf,
    /// Skybox faces relative to `root`, in +X, -X, +Y, -Y, +Z, -Z order
    pub skybox_faces: [PathBuf; 6],
}

impl AssetConfig {
    pub fn model_path(&self, file: &str) -> PathBuf {
        self.root.join(&self.models).join(file)
    }

    pub fn skybox_paths(&self) -> [PathBuf; 6] {
        self.skybox_faces.clone().map(|face| self.root.join(face))
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            models: PathBuf::from("models"),
            skybox_faces: face_paths("skybox", "plains-of-abraham", "tga"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub projection: ProjectionConfig,
    pub skybox_projection: ProjectionConfig,
    pub scene: SceneConfig,
    pub assets: AssetConfig,
    /// Start with the tour engaged
    pub autopilot: bool,
    pub fog: bool,
    /// Keep the startup aspect ratio when the window is resized
    pub static_aspect: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            projection: ProjectionConfig::default(),
            skybox_projection: ProjectionConfig {
                fov_degrees: 90.0,
                near: 0.1,
                far: 75.0,
            },
            scene: SceneConfig::default(),
            assets: AssetConfig::default(),
            autopilot: false,
            fog: false,
            static_aspect: false,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_json(&json).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
