//! Per-frame driver: input, state update, uniforms, ordered draws.
//!
//! All mutable viewer state lives here and is touched from the event-loop thread only.
//! `update` always completes before `render`, so draws never see a stale view.

use anyhow::Result;
use glam::{Mat4, Vec3};
use log::{debug, info};

use crate::camera::{Camera, MoveDirection};
use crate::choreography::{Choreography, Tick};
use crate::config::{ProjectionConfig, ViewerConfig};
use crate::core::controller::{Button, Command, Controller};
use crate::core::window::WindowDimensions;
use crate::movement::BoundingBoxPolicy;
use crate::orientation::Orientation;
use crate::scene::{model_matrix, BladeSpin, ElementTransform, MeshId, SCENE_ELEMENTS};
use crate::traits::renderer::{
    FrameUniforms, Lighting, PolygonMode, SceneRenderer, SkyboxUniforms,
};

const MOVEMENT_KEYS: [(Button, MoveDirection); 4] = [
    (Button::KeyW, MoveDirection::Forward),
    (Button::KeyS, MoveDirection::Backward),
    (Button::KeyA, MoveDirection::Left),
    (Button::KeyD, MoveDirection::Right),
];

pub struct FrameOrchestrator {
    camera: Camera,
    orientation: Orientation,
    policy: BoundingBoxPolicy,
    choreography: Choreography,
    autopilot: bool,
    spin: BladeSpin,
    fog: bool,
    polygon_mode: PolygonMode,
    requested_polygon_mode: Option<PolygonMode>,
    speed: f32,
    sensitivity: f32,
    yaw_step: f32,
    scene_rotation: f32,
    lighting: Lighting,
    projection_config: ProjectionConfig,
    skybox_projection_config: ProjectionConfig,
    static_aspect: bool,
    projection: Mat4,
    skybox_projection: Mat4,
    view: Mat4,
    frame: u64,
}

impl FrameOrchestrator {
    pub fn new(config: &ViewerConfig, dimensions: WindowDimensions) -> Self {
        let camera = Camera::new(
            Vec3::from_array(config.camera.position),
            Vec3::from_array(config.camera.target),
            Vec3::from_array(config.camera.world_up),
        );
        let aspect = dimensions.aspect_ratio();
        let view = camera.view_matrix();

        Self {
            camera,
            orientation: Orientation::default(),
            policy: BoundingBoxPolicy::default(),
            choreography: Choreography::tour(config.camera.speed),
            autopilot: config.autopilot,
            spin: BladeSpin::new(config.scene.blade_step),
            fog: config.fog,
            polygon_mode: PolygonMode::Fill,
            requested_polygon_mode: None,
            speed: config.camera.speed,
            sensitivity: config.camera.sensitivity,
            yaw_step: config.camera.yaw_step,
            scene_rotation: config.scene.rotation,
            lighting: config.scene.lighting(),
            projection_config: config.projection,
            skybox_projection_config: config.skybox_projection,
            static_aspect: config.static_aspect,
            projection: config.projection.matrix(aspect),
            skybox_projection: config.skybox_projection.matrix(aspect),
            view,
            frame: 0,
        }
    }

    /// Run one full frame: state update, then draws
    pub fn frame(
        &mut self,
        input: &impl Controller,
        renderer: &mut impl SceneRenderer,
    ) -> Result<()> {
        self.update(input);
        self.render(renderer)
    }

    /// Apply commands, drive the camera from the autopilot or free-look input, and advance
    /// the blade animation
    pub fn update(&mut self, input: &impl Controller) {
        for command in input.commands() {
            self.handle_command(*command);
        }

        if self.is_autopilot_engaged() {
            self.tick_autopilot();
        } else {
            self.free_look(input);
        }

        self.spin.advance();
        self.view = self.camera.view_matrix();
        self.frame += 1;
    }

    /// Submit the frame: spinning blades, terrain, then the sky
    pub fn render(&mut self, renderer: &mut impl SceneRenderer) -> Result<()> {
        if let Some(mode) = self.requested_polygon_mode.take() {
            self.polygon_mode = renderer.set_polygon_mode(mode);
            if self.polygon_mode != mode {
                info!("Polygon mode {:?} unavailable, using {:?}", mode, self.polygon_mode);
            }
        }

        renderer.begin_frame(&FrameUniforms {
            view: self.view,
            projection: self.projection,
            fog: self.fog,
            lighting: self.lighting,
        })?;

        for (index, element) in SCENE_ELEMENTS.iter().enumerate() {
            let model = model_matrix(element.placement, self.spin.angle(), self.scene_rotation);
            renderer.draw_mesh(MeshId(index), &ElementTransform::new(self.view, model))?;
        }

        renderer.draw_skybox(&SkyboxUniforms {
            view: self.view,
            projection: self.skybox_projection,
            fog: self.fog,
        })?;

        renderer.end_frame()
    }

    /// Rebuild both projections for a new framebuffer size
    pub fn resize(&mut self, dimensions: WindowDimensions) {
        if self.static_aspect || dimensions.is_empty() {
            return;
        }
        let aspect = dimensions.aspect_ratio();
        self.projection = self.projection_config.matrix(aspect);
        self.skybox_projection = self.skybox_projection_config.matrix(aspect);
        debug!(
            "Projection updated for {}x{}",
            dimensions.width, dimensions.height
        );
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::ToggleAnimation => {
                let enabled = self.spin.toggle();
                info!("Blade animation {}", on_off(enabled));
            }
            Command::ToggleAutopilot => {
                if self.choreography.is_active() {
                    self.autopilot = !self.autopilot;
                    info!(
                        "Autopilot {} at frame {}",
                        on_off(self.autopilot),
                        self.choreography.frame()
                    );
                } else {
                    info!("Autopilot tour already finished");
                }
            }
            Command::ToggleFog => {
                self.fog = !self.fog;
                info!("Fog {}", on_off(self.fog));
            }
            Command::DumpPosition => {
                let report = self.camera.position_report();
                println!("{}", report);
                info!("Camera position {}", report);
            }
            Command::SetPolygonMode(mode) => {
                self.requested_polygon_mode = Some(mode);
                info!("Polygon mode {:?}", mode);
            }
        }
    }

    fn tick_autopilot(&mut self) {
        let tick = self
            .choreography
            .tick(&mut self.camera, &mut self.orientation, &self.policy);
        if tick == Tick::Blocked {
            debug!(
                "Autopilot step blocked at frame {}",
                self.choreography.frame() - 1
            );
        }
        if !self.choreography.is_active() {
            self.autopilot = false;
            info!("Autopilot tour finished after {} frames", self.choreography.frame());
        }
    }

    fn free_look(&mut self, input: &impl Controller) {
        for (button, direction) in MOVEMENT_KEYS {
            if input.is_down(button) {
                self.camera.move_by(direction, self.speed, &self.policy);
            }
        }

        let mut rotated = false;
        if input.is_down(Button::KeyQ) {
            self.orientation.add_yaw(self.yaw_step);
            rotated = true;
        }
        if input.is_down(Button::KeyE) {
            self.orientation.add_yaw(-self.yaw_step);
            rotated = true;
        }

        let (dx, dy) = input.look_delta();
        if dx != 0.0 || dy != 0.0 {
            self.orientation.apply_cursor_delta(dx, dy, self.sensitivity);
            rotated = true;
        }

        if rotated {
            self.camera
                .rotate(self.orientation.pitch(), self.orientation.yaw());
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn choreography(&self) -> &Choreography {
        &self.choreography
    }

    /// Autopilot switched on and the tour not yet finished
    pub fn is_autopilot_engaged(&self) -> bool {
        self.autopilot && self.choreography.is_active()
    }

    pub fn blade_angle(&self) -> f32 {
        self.spin.angle()
    }

    pub fn is_animating(&self) -> bool {
        self.spin.is_enabled()
    }

    pub fn fog(&self) -> bool {
        self.fog
    }

    pub fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn skybox_projection(&self) -> Mat4 {
        self.skybox_projection
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
