/// Framebuffer dimensions in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDimensions {
    pub width: u32,
    pub height: u32,
}

impl WindowDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Minimized windows report a zero extent; nothing can be drawn then
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, 1.0 for an empty window
    pub fn aspect_ratio(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for WindowDimensions {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_dimensions_new() {
        let dims = WindowDimensions::new(1920, 1080);
        assert_eq!(dims.width, 1920);
        assert_eq!(dims.height, 1080);
    }

    #[test]
    fn test_aspect_ratio() {
        assert!((WindowDimensions::new(1920, 1080).aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(WindowDimensions::new(600, 600).aspect_ratio(), 1.0);
    }

    #[test]
    fn test_empty_window() {
        assert!(WindowDimensions::new(0, 1080).is_empty());
        assert!(WindowDimensions::new(800, 0).is_empty());
        assert_eq!(WindowDimensions::new(0, 0).aspect_ratio(), 1.0);
        assert!(!WindowDimensions::new(1, 1).is_empty());
    }

    #[test]
    fn test_from_physical_size() {
        let dims: WindowDimensions = winit::dpi::PhysicalSize::new(640u32, 480u32).into();
        assert_eq!(dims, WindowDimensions::new(640, 480));
    }
}
