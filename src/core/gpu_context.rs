use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use std::sync::Arc;
use wgpu::{
    Adapter, Device, DeviceDescriptor, Features, Instance, Limits, Queue, Surface,
    SurfaceConfiguration, SurfaceTexture,
};
use winit::window::Window;

use super::window::WindowDimensions;

/// Features used when available; rendering degrades without them
fn polygon_mode_features() -> Features {
    Features::POLYGON_MODE_LINE | Features::POLYGON_MODE_POINT
}

/// Window surface plus the device that draws into it
pub struct GpuContext {
    surface: Surface<'static>,
    device: Device,
    queue: Queue,
    config: SurfaceConfiguration,
    features: Features,
}

impl GpuContext {
    /// Create a device compatible with the window's surface and configure the surface
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let dimensions = WindowDimensions::from(window.inner_size());

        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("Failed to create window surface")?;

        let adapter = Self::request_adapter(&instance, &surface).await?;
        let info = adapter.get_info();
        info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = Self::request_device(&adapter).await?;
        let features = device.features();
        if !features.contains(polygon_mode_features()) {
            warn!(
                "Line/point polygon modes partly unavailable, got {:?}",
                optional_features(features)
            );
        }

        let config = Self::create_surface_config(&surface, &adapter, dimensions)?;
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            features,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn dimensions(&self) -> WindowDimensions {
        WindowDimensions::new(self.config.width, self.config.height)
    }

    pub fn supports(&self, features: Features) -> bool {
        self.features.contains(features)
    }

    /// Reconfigure the surface; zero-sized windows are skipped
    pub fn resize(&mut self, dimensions: WindowDimensions) {
        if dimensions.is_empty() {
            return;
        }
        self.config.width = dimensions.width;
        self.config.height = dimensions.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Next swapchain image. A lost or outdated surface is reconfigured and the frame
    /// skipped, returning `None`.
    pub fn acquire(&mut self) -> Result<Option<SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(Some(texture)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Surface acquire timed out, skipping frame");
                Ok(None)
            }
            Err(e) => Err(anyhow!("Failed to acquire surface texture: {e}")),
        }
    }

    async fn request_adapter(instance: &Instance, surface: &Surface<'_>) -> Result<Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("Failed to find appropriate adapter: {e:?}"))
    }

    async fn request_device(adapter: &Adapter) -> Result<(Device, Queue)> {
        adapter
            .request_device(&DeviceDescriptor {
                label: Some("Scene Device"),
                required_features: optional_features(adapter.features()),
                required_limits: Limits::default().using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| anyhow!("Failed to create device: {e:?}"))
    }

    fn create_surface_config(
        surface: &Surface<'_>,
        adapter: &Adapter,
        dimensions: WindowDimensions,
    ) -> Result<SurfaceConfiguration> {
        let caps = surface.get_capabilities(adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .context("Surface reports no supported formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        Ok(SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: dimensions.width.max(1),
            height: dimensions.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }
}

/// Subset of the optional features the adapter can provide
pub fn optional_features(supported: Features) -> Features {
    supported & polygon_mode_features()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_features_intersects_support() {
        assert_eq!(optional_features(Features::empty()), Features::empty());
        assert_eq!(
            optional_features(Features::POLYGON_MODE_LINE | Features::TIMESTAMP_QUERY),
            Features::POLYGON_MODE_LINE
        );
        assert_eq!(
            optional_features(polygon_mode_features() | Features::DEPTH_CLIP_CONTROL),
            polygon_mode_features()
        );
    }
}
