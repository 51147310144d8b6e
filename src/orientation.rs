/// Pitch limit in degrees; keeps the camera off the vertical pole
pub const PITCH_LIMIT: f32 = 89.0;

/// Camera orientation in degrees, shared between free-look and the autopilot.
///
/// This is the only persistent orientation state. The camera basis is rebuilt from it on
/// every change.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    pitch: f32,
    yaw: f32,
}

impl Orientation {
    pub fn new(pitch: f32, yaw: f32) -> Self {
        Self {
            pitch: clamp_pitch(pitch),
            yaw,
        }
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Cursor motion in pixels. Moving right lowers yaw, moving down lowers pitch.
    pub fn apply_cursor_delta(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.yaw -= dx * sensitivity;
        self.set_pitch(self.pitch - dy * sensitivity);
    }

    pub fn add_yaw(&mut self, degrees: f32) {
        self.yaw += degrees;
    }

    pub fn add_pitch(&mut self, degrees: f32) {
        self.set_pitch(self.pitch + degrees);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = clamp_pitch(pitch);
    }
}

fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_level() {
        let orientation = Orientation::default();
        assert_eq!(orientation.pitch(), 0.0);
        assert_eq!(orientation.yaw(), 0.0);
    }

    #[test]
    fn test_new_clamps_pitch() {
        assert_eq!(Orientation::new(91.0, 0.0).pitch(), 89.0);
        assert_eq!(Orientation::new(-200.0, 0.0).pitch(), -89.0);
    }

    #[test]
    fn test_cursor_delta_scaled_by_sensitivity() {
        let mut orientation = Orientation::default();
        orientation.apply_cursor_delta(10.0, -20.0, 0.1);
        assert!((orientation.yaw() - -1.0).abs() < 1e-6);
        assert!((orientation.pitch() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_cursor_delta_clamps_pitch() {
        let mut orientation = Orientation::new(89.0, 0.0);
        orientation.apply_cursor_delta(0.0, -20.0, 0.1);
        assert_eq!(orientation.pitch(), 89.0);

        orientation.apply_cursor_delta(0.0, 5000.0, 0.1);
        assert_eq!(orientation.pitch(), -89.0);
    }

    #[test]
    fn test_yaw_is_unbounded() {
        let mut orientation = Orientation::default();
        for _ in 0..1000 {
            orientation.add_yaw(1.0);
        }
        assert_eq!(orientation.yaw(), 1000.0);
    }

    #[test]
    fn test_add_pitch_clamps() {
        let mut orientation = Orientation::new(88.5, 0.0);
        orientation.add_pitch(2.0);
        assert_eq!(orientation.pitch(), 89.0);
    }
}
