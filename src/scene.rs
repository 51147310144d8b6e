//! Layout and animation of the valley scene.

use glam::{Mat3, Mat4, Vec3};

/// Index of a loaded mesh, assigned in [`SCENE_ELEMENTS`] order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// Rotor axis of every blade assembly
pub const BLADE_SPIN_AXIS: Vec3 = Vec3::Z;

/// How an element is placed in the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Rotated by the shared blade angle about its own pivot
    Spinning { pivot: Vec3 },
    /// The terrain and buildings, turned by the startup rotation
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneElement {
    pub name: &'static str,
    pub mesh_file: &'static str,
    pub placement: Placement,
}

const fn spinning(name: &'static str, mesh_file: &'static str, pivot: Vec3) -> SceneElement {
    SceneElement {
        name,
        mesh_file,
        placement: Placement::Spinning { pivot },
    }
}

/// Every mesh in the scene, in draw order. The skybox is drawn after all of them.
pub const SCENE_ELEMENTS: [SceneElement; 6] = [
    spinning("blades", "blades.glb", Vec3::new(125.444, 35.511, 79.0)),
    spinning("blades1", "blades1.glb", Vec3::new(43.80, 35.511, 77.881)),
    spinning("blades2", "blades2.glb", Vec3::new(54.434, 35.511, -89.514)),
    spinning("blades3", "blades3.glb", Vec3::new(124.673, 35.511, -98.123)),
    spinning("windmill_blades", "windmill_blades.glb", Vec3::new(35.317, 16.916, 16.683)),
    SceneElement {
        name: "scene",
        mesh_file: "scene.glb",
        placement: Placement::Static,
    },
];

/// Shared rotor angle of all blade assemblies, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BladeSpin {
    angle: f32,
    step: f32,
    enabled: bool,
}

impl BladeSpin {
    pub fn new(step: f32) -> Self {
        Self {
            angle: 0.0,
            step,
            enabled: false,
        }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Flip the animation flag, returning the new state
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Advance one frame. The angle wraps to zero once it reaches a full turn.
    pub fn advance(&mut self) {
        if !self.enabled {
            return;
        }
        if self.angle >= 360.0 {
            self.angle = 0.0;
        }
        self.angle += self.step;
    }
}

/// Model and normal matrices for one draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementTransform {
    pub model: Mat4,
    pub normal: Mat3,
}

impl ElementTransform {
    pub fn new(view: Mat4, model: Mat4) -> Self {
        Self {
            model,
            normal: normal_matrix(view, model),
        }
    }
}

/// Inverse-transpose of the upper 3×3 of `view * model`
pub fn normal_matrix(view: Mat4, model: Mat4) -> Mat3 {
    Mat3::from_mat4(view * model).inverse().transpose()
}

/// World transform of an element given the current blade angle and the scene's startup rotation
pub fn model_matrix(placement: Placement, blade_angle: f32, scene_rotation: f32) -> Mat4 {
    match placement {
        Placement::Spinning { pivot } => {
            Mat4::from_translation(pivot)
                * Mat4::from_axis_angle(BLADE_SPIN_AXIS, blade_angle.to_radians())
        }
        Placement::Static => Mat4::from_rotation_y(scene_rotation.to_radians()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_scene_elements_order() {
        let names: Vec<&str> = SCENE_ELEMENTS.iter().map(|e| e.name).collect();
        assert_eq!(
            names,
            ["blades", "blades1", "blades2", "blades3", "windmill_blades", "scene"]
        );
        assert_eq!(SCENE_ELEMENTS[5].placement, Placement::Static);
    }

    #[test]
    fn test_blade_pivots_are_distinct() {
        let pivots: Vec<Vec3> = SCENE_ELEMENTS
            .iter()
            .filter_map(|e| match e.placement {
                Placement::Spinning { pivot } => Some(pivot),
                Placement::Static => None,
            })
            .collect();
        assert_eq!(pivots.len(), 5);
        for (i, a) in pivots.iter().enumerate() {
            for b in &pivots[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_spin_disabled_by_default() {
        let mut spin = BladeSpin::new(2.0);
        spin.advance();
        assert_eq!(spin.angle(), 0.0);
        assert!(!spin.is_enabled());
    }

    #[test]
    fn test_spin_advances_when_enabled() {
        let mut spin = BladeSpin::new(2.0);
        assert!(spin.toggle());
        spin.advance();
        spin.advance();
        assert_eq!(spin.angle(), 4.0);
        assert!(!spin.toggle());
        spin.advance();
        assert_eq!(spin.angle(), 4.0);
    }

    #[test]
    fn test_spin_wraps_after_full_turn() {
        let mut spin = BladeSpin::new(2.0);
        spin.toggle();
        for _ in 0..180 {
            spin.advance();
        }
        assert_eq!(spin.angle(), 360.0);
        spin.advance();
        assert_eq!(spin.angle(), 2.0);
    }

    #[test]
    fn test_spinning_model_matrix_keeps_pivot_fixed() {
        let pivot = Vec3::new(125.444, 35.511, 79.0);
        let model = model_matrix(Placement::Spinning { pivot }, 73.0, 0.0);
        assert!(model.transform_point3(Vec3::ZERO).abs_diff_eq(pivot, EPS));
    }

    #[test]
    fn test_spinning_model_matrix_rotates_about_axis() {
        let model = model_matrix(
            Placement::Spinning { pivot: Vec3::ZERO },
            90.0,
            0.0,
        );
        let rotated = model.transform_vector3(Vec3::X);
        assert!(rotated.abs_diff_eq(Vec3::Y, EPS));
        let axis = model.transform_vector3(BLADE_SPIN_AXIS);
        assert!(axis.abs_diff_eq(BLADE_SPIN_AXIS, EPS));
    }

    #[test]
    fn test_static_model_matrix_ignores_blade_angle() {
        let a = model_matrix(Placement::Static, 0.0, 0.0);
        let b = model_matrix(Placement::Static, 120.0, 0.0);
        assert_eq!(a, b);
        assert_eq!(a, Mat4::IDENTITY);
    }

    #[test]
    fn test_normal_matrix_is_inverse_transpose() {
        let view = Mat4::look_at_rh(Vec3::new(3.0, 2.0, 1.0), Vec3::ZERO, Vec3::Y);
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 0.5));
        let normal = normal_matrix(view, model);
        let upper = Mat3::from_mat4(view * model);
        // N^T * M = I for the upper 3×3
        assert!((normal.transpose() * upper).abs_diff_eq(Mat3::IDENTITY, EPS));
    }

    #[test]
    fn test_normal_matrix_rigid_equals_rotation() {
        let view = Mat4::look_at_rh(Vec3::new(10.0, 3.0, 10.0), Vec3::ZERO, Vec3::Y);
        let model = model_matrix(
            Placement::Spinning {
                pivot: Vec3::new(1.0, 2.0, 3.0),
            },
            45.0,
            0.0,
        );
        let transform = ElementTransform::new(view, model);
        assert!(transform
            .normal
            .abs_diff_eq(Mat3::from_mat4(view * model), EPS));
    }
}
