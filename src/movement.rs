//! Accept/reject gate for camera position changes.

use glam::Vec3;

use crate::math::AABB;

/// Decides whether the camera may occupy a candidate position
pub trait MovementPolicy {
    fn accept(&self, candidate: Vec3) -> bool;
}

/// Lowest eye height above the terrain
pub const GROUND_CLEARANCE: f32 = 0.5;

/// Walkable region of the terrain model
pub const WORLD_BOUNDS: AABB = AABB::new(
    Vec3::new(-187.0, GROUND_CLEARANCE, -188.5),
    Vec3::new(189.0, f32::INFINITY, 189.0),
);

/// Keeps the camera above the ground plane and inside the terrain extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBoxPolicy {
    bounds: AABB,
}

impl BoundingBoxPolicy {
    pub const fn new(bounds: AABB) -> Self {
        Self { bounds }
    }
}

impl Default for BoundingBoxPolicy {
    fn default() -> Self {
        Self::new(WORLD_BOUNDS)
    }
}

impl MovementPolicy for BoundingBoxPolicy {
    fn accept(&self, candidate: Vec3) -> bool {
        self.bounds.contains(candidate)
    }
}

/// Accepts every position
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrestricted;

impl MovementPolicy for Unrestricted {
    fn accept(&self, _candidate: Vec3) -> bool {
        true
    }
}
