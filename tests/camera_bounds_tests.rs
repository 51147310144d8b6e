use glam::Vec3;
use scene_tour::movement::{BoundingBoxPolicy, MovementPolicy, WORLD_BOUNDS};
use scene_tour::orientation::Orientation;
use scene_tour::{Camera, MoveDirection};

/// Small deterministic generator so failures replay exactly
struct Lcg(u64);

impl Lcg {
    fn next_u32(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * (self.next_u32() as f32 / u32::MAX as f32)
    }
}

const DIRECTIONS: [MoveDirection; 4] = [
    MoveDirection::Forward,
    MoveDirection::Backward,
    MoveDirection::Left,
    MoveDirection::Right,
];

fn start_camera() -> Camera {
    Camera::new(Vec3::new(10.0, 3.0, 10.0), Vec3::new(0.0, 0.0, -10.0), Vec3::Y)
}

fn assert_orthonormal(camera: &Camera) {
    let (f, r, u) = (camera.front(), camera.right(), camera.up());
    for v in [f, r, u] {
        assert!((v.length() - 1.0).abs() < 1e-4, "not unit: {v:?}");
    }
    assert!(f.dot(r).abs() < 1e-4);
    assert!(f.dot(u).abs() < 1e-4);
    assert!(r.dot(u).abs() < 1e-4);
}

#[cfg(test)]
mod camera_bounds_tests {
    use super::*;

    #[test]
    fn test_random_walks_never_leave_bounds() {
        let policy = BoundingBoxPolicy::default();

        for seed in 0..20 {
            let mut rng = Lcg(seed);
            let mut camera = start_camera();
            let mut orientation = Orientation::default();

            for _ in 0..2_000 {
                if rng.next_u32() % 4 == 0 {
                    orientation.apply_cursor_delta(rng.range(-200.0, 200.0), rng.range(-200.0, 200.0), 0.1);
                    camera.rotate(orientation.pitch(), orientation.yaw());
                }
                let direction = DIRECTIONS[(rng.next_u32() % 4) as usize];
                let speed = rng.range(0.1, 5.0);
                camera.move_by(direction, speed, &policy);

                assert!(
                    WORLD_BOUNDS.contains(camera.position()),
                    "seed {seed}: escaped to {:?}",
                    camera.position()
                );
            }
            assert_orthonormal(&camera);
        }
    }

    #[test]
    fn test_long_sprint_stops_at_each_wall() {
        let policy = BoundingBoxPolicy::default();
        let walls: [(Vec3, f32); 4] = [
            (Vec3::X, 189.0),
            (Vec3::NEG_X, -187.0),
            (Vec3::Z, 189.0),
            (Vec3::NEG_Z, -188.5),
        ];

        for (heading, limit) in walls {
            let start = Vec3::new(0.0, 5.0, 0.0);
            let mut camera = Camera::new(start, start + heading, Vec3::Y);
            for _ in 0..1_000 {
                camera.move_by(MoveDirection::Forward, 0.75, &policy);
                assert!(policy.accept(camera.position()));
            }
            let reached = camera.position().dot(heading.abs());
            assert!(reached.abs() <= limit.abs());
            assert!(limit.abs() - reached.abs() < 0.75, "stopped short of {limit}: {reached}");
        }
    }

    #[test]
    fn test_rotation_is_history_independent() {
        let mut rng = Lcg(7);
        let mut wandering = start_camera();
        for _ in 0..500 {
            wandering.rotate(rng.range(-89.0, 89.0), rng.range(-720.0, 720.0));
        }
        wandering.rotate(30.0, -45.0);

        let mut fresh = start_camera();
        fresh.rotate(30.0, -45.0);

        assert!(wandering.front().abs_diff_eq(fresh.front(), 1e-6));
        assert!(wandering.right().abs_diff_eq(fresh.right(), 1e-6));
        assert!(wandering.up().abs_diff_eq(fresh.up(), 1e-6));
    }

    #[test]
    fn test_forward_sprint_from_start_never_breaks_bounds() {
        let policy = BoundingBoxPolicy::default();
        let mut camera = start_camera();
        for _ in 0..300 {
            camera.move_by(MoveDirection::Forward, 0.75, &policy);
            assert!(camera.position().x <= 189.0);
            assert!(camera.position().y >= 0.5);
        }
    }
}
