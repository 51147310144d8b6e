use glam::{EulerRot, Mat3, Mat4, Vec3};

use crate::movement::MovementPolicy;

/// Below this length a cross product is treated as degenerate
const DEGENERATE_EPSILON: f32 = 1.0e-6;

/// Direction of a single camera step, relative to the current basis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

/// First-person camera.
///
/// Orientation is never integrated: `rotate` rebuilds the basis from the frame captured at
/// construction, so the same `(pitch, yaw)` always yields the same basis. Position only
/// changes through a [`MovementPolicy`].
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    original_front: Vec3,
    original_right: Vec3,
    original_up: Vec3,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, world_up: Vec3) -> Self {
        let front = (target - position).try_normalize().unwrap_or(Vec3::NEG_Z);
        let right = reference_right(front, world_up);
        let up = right.cross(front);

        Self {
            position,
            target,
            front,
            right,
            up,
            original_front: front,
            original_right: right,
            original_up: world_up,
        }
    }

    /// World-to-eye transform. Pure.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Orient the camera `pitch` degrees about its horizontal axis and `yaw` degrees about
    /// the vertical axis, both measured from the construction frame. Roll is always zero.
    pub fn rotate(&mut self, pitch: f32, yaw: f32) {
        let rotation = Mat3::from_euler(EulerRot::YXZ, yaw.to_radians(), pitch.to_radians(), 0.0);

        self.front = (rotation * self.original_front).normalize();
        // Looking straight along the original up: carry the construction right vector along
        self.right = normalized_cross(self.front, self.original_up)
            .unwrap_or_else(|| (rotation * self.original_right).normalize());
        self.up = self.right.cross(self.front);
        self.target = self.position + self.front;
    }

    /// Step `speed` units along the basis. The candidate is committed only if `policy`
    /// accepts it; returns whether the camera moved.
    pub fn move_by(
        &mut self,
        direction: MoveDirection,
        speed: f32,
        policy: &impl MovementPolicy,
    ) -> bool {
        let offset = match direction {
            MoveDirection::Forward => self.front,
            MoveDirection::Backward => -self.front,
            MoveDirection::Left => -self.right,
            MoveDirection::Right => self.right,
        };
        let candidate = self.position + speed * offset;

        let accepted = policy.accept(candidate);
        if accepted {
            self.position = candidate;
        }
        self.target = self.position + self.front;
        accepted
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// One-line position dump for the diagnostic key
    pub fn position_report(&self) -> String {
        format!(
            "X: {:.6} y: {:.6} z: {:.6}",
            self.position.x, self.position.y, self.position.z
        )
    }
}

fn normalized_cross(a: Vec3, b: Vec3) -> Option<Vec3> {
    let cross = a.cross(b);
    (cross.length() > DEGENERATE_EPSILON).then(|| cross.normalize())
}

/// `front × up`, falling back to +Z then +X when `front` is parallel to `up`
fn reference_right(front: Vec3, world_up: Vec3) -> Vec3 {
    [world_up, Vec3::Z, Vec3::X]
        .into_iter()
        .find_map(|axis| normalized_cross(front, axis))
        .unwrap_or(Vec3::X)
}
