use anyhow::Result;
use clap::Parser;
use log::{debug, error, info, warn};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use scene_tour::cli::Cli;
use scene_tour::config::ViewerConfig;
use scene_tour::core::{Clock, FpsCounter, GpuContext, WindowDimensions, WinitController};
use scene_tour::frame::FrameOrchestrator;
use scene_tour::loaders::{load_cubemap, load_mesh};
use scene_tour::renderer::WgpuRenderer;
use scene_tour::scene::SCENE_ELEMENTS;

const FPS_UPDATE_INTERVAL: f32 = 1.0;

struct App {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    renderer: Option<WgpuRenderer>,
    frames: Option<FrameOrchestrator>,
    input: WinitController,
    clock: Clock,
    fps: FpsCounter,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            window: None,
            renderer: None,
            frames: None,
            input: WinitController::new(),
            clock: Clock::new(),
            fps: FpsCounter::new(FPS_UPDATE_INTERVAL),
        }
    }

    fn create_renderer(&self, window: Arc<Window>) -> Result<WgpuRenderer> {
        let gpu = pollster::block_on(GpuContext::new(window))?;

        let assets = &self.config.assets;
        let meshes = SCENE_ELEMENTS
            .iter()
            .map(|element| load_mesh(assets.model_path(element.mesh_file)))
            .collect::<Result<Vec<_>>>()?;
        let skybox = load_cubemap(&assets.skybox_paths())?;

        WgpuRenderer::new(gpu, &meshes, &skybox, self.config.scene.clear_color)
    }

    fn capture_cursor(window: &Window) {
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        if let Err(e) = grabbed {
            warn!("Could not grab cursor: {}", e);
        }
        window.set_cursor_visible(false);
    }

    fn redraw(&mut self) {
        let delta = self.clock.tick();
        if let Some(fps) = self.fps.record(delta) {
            debug!("FPS: {:.1}", fps);
        }

        if let (Some(window), Some(frames), Some(renderer)) =
            (&self.window, &mut self.frames, &mut self.renderer)
        {
            if !WindowDimensions::from(window.inner_size()).is_empty() {
                if let Err(e) = frames.frame(&self.input, renderer) {
                    error!("Render error: {:#}", e);
                }
            }
        }
        self.input.reset_deltas();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title(self.config.window.title.clone())
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.config.window.width,
                    self.config.window.height,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match self.create_renderer(window.clone()) {
            Ok(renderer) => renderer,
            Err(e) => {
                error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        Self::capture_cursor(&window);
        let dimensions = WindowDimensions::from(window.inner_size());
        info!("Window ready at {}x{}", dimensions.width, dimensions.height);

        self.frames = Some(FrameOrchestrator::new(&self.config, dimensions));
        self.renderer = Some(renderer);
        self.window = Some(window);
        self.clock = Clock::new();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::KeyboardInput { .. } => self.input.process_event(&event),
            WindowEvent::Resized(size) => {
                let dimensions = WindowDimensions::from(size);
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(dimensions);
                }
                if let Some(frames) = &mut self.frames {
                    frames.resize(dimensions);
                }
            }
            WindowEvent::Focused(false) => self.input.release_all(),
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        self.input.process_device_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.resolve()?;

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);

    println!("Scene Tour - Controls:");
    println!("  WASD move, mouse or Q/E look, Space autopilot tour");
    println!("  M blades, F fog, J/K/L line/fill/point, C print position, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
