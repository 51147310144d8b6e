use std::collections::HashSet;
use winit::event::{DeviceEvent, ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::controller::{Button, Command, Controller, Edge};

/// Adapter that bridges Winit events to the Controller trait
#[derive(Debug, Clone, Default)]
pub struct WinitController {
    /// Currently pressed buttons
    pressed_keys: HashSet<Button>,
    /// Raw pointer motion since last reset
    mouse_delta: (f32, f32),
    /// Commands raised since last reset
    commands: Vec<Command>,
}

impl WinitController {
    /// Create a new WinitController with no pressed keys
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a Winit WindowEvent and update internal state
    pub fn process_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if let PhysicalKey::Code(keycode) = event.physical_key {
                if let Some(button) = Self::keycode_to_button(keycode) {
                    match event.state {
                        ElementState::Pressed => self.press(button, event.repeat),
                        ElementState::Released => self.release(button),
                    }
                }
            }
        }
    }

    /// Process raw device motion; used while the cursor is grabbed
    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.add_mouse_motion(delta.0 as f32, delta.1 as f32);
        }
    }

    /// Record a key press. Auto-repeat keeps the key held but raises no command.
    pub fn press(&mut self, button: Button, repeat: bool) {
        self.pressed_keys.insert(button);
        if !repeat {
            self.raise(button, Edge::Press);
        }
    }

    pub fn release(&mut self, button: Button) {
        self.pressed_keys.remove(&button);
        self.raise(button, Edge::Release);
    }

    pub fn add_mouse_motion(&mut self, dx: f32, dy: f32) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    /// Reset per-frame state (mouse delta and commands)
    /// Call this at the end of each frame after processing input
    pub fn reset_deltas(&mut self) {
        self.mouse_delta = (0.0, 0.0);
        self.commands.clear();
    }

    /// Forget held keys, e.g. after the window loses focus
    pub fn release_all(&mut self) {
        self.pressed_keys.clear();
    }

    fn raise(&mut self, button: Button, edge: Edge) {
        if let Some((command, trigger)) = button.command() {
            if trigger == edge {
                self.commands.push(command);
            }
        }
    }

    /// Map Winit KeyCode to Button
    fn keycode_to_button(keycode: KeyCode) -> Option<Button> {
        match keycode {
            KeyCode::KeyW => Some(Button::KeyW),
            KeyCode::KeyA => Some(Button::KeyA),
            KeyCode::KeyS => Some(Button::KeyS),
            KeyCode::KeyD => Some(Button::KeyD),
            KeyCode::KeyQ => Some(Button::KeyQ),
            KeyCode::KeyE => Some(Button::KeyE),
            KeyCode::KeyM => Some(Button::KeyM),
            KeyCode::KeyF => Some(Button::KeyF),
            KeyCode::KeyC => Some(Button::KeyC),
            KeyCode::KeyJ => Some(Button::KeyJ),
            KeyCode::KeyK => Some(Button::KeyK),
            KeyCode::KeyL => Some(Button::KeyL),
            KeyCode::Space => Some(Button::Space),
            _ => None,
        }
    }
}

impl Controller for WinitController {
    fn is_down(&self, button: Button) -> bool {
        self.pressed_keys.contains(&button)
    }

    fn look_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }

    fn commands(&self) -> &[Command] {
        &self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::renderer::PolygonMode;

    #[test]
    fn test_new_controller_empty() {
        let controller = WinitController::new();
        assert!(!controller.is_down(Button::KeyW));
        assert!(!controller.is_down(Button::Space));
        assert_eq!(controller.look_delta(), (0.0, 0.0));
        assert!(controller.commands().is_empty());
    }

    #[test]
    fn test_press_and_release_track_held_keys() {
        let mut controller = WinitController::new();
        controller.press(Button::KeyW, false);
        controller.press(Button::KeyW, true);
        controller.press(Button::KeyA, false);
        assert!(controller.is_down(Button::KeyW));
        assert!(controller.is_down(Button::KeyA));

        controller.release(Button::KeyW);
        assert!(!controller.is_down(Button::KeyW));
        assert!(controller.is_down(Button::KeyA));
    }

    #[test]
    fn test_press_edge_commands() {
        let mut controller = WinitController::new();
        controller.press(Button::KeyM, false);
        controller.release(Button::KeyM);
        controller.press(Button::KeyJ, false);
        assert_eq!(
            controller.commands(),
            &[
                Command::ToggleAnimation,
                Command::SetPolygonMode(PolygonMode::Line)
            ]
        );
    }

    #[test]
    fn test_release_edge_commands() {
        let mut controller = WinitController::new();
        controller.press(Button::Space, false);
        assert!(controller.commands().is_empty());
        controller.release(Button::Space);
        assert_eq!(controller.commands(), &[Command::ToggleAutopilot]);
    }

    #[test]
    fn test_repeat_raises_no_command() {
        let mut controller = WinitController::new();
        controller.press(Button::KeyC, false);
        controller.press(Button::KeyC, true);
        controller.press(Button::KeyC, true);
        assert_eq!(controller.commands(), &[Command::DumpPosition]);
    }

    #[test]
    fn test_delta_reset() {
        let mut controller = WinitController::new();
        controller.add_mouse_motion(10.0, 5.0);
        controller.add_mouse_motion(-4.0, 1.0);
        controller.press(Button::KeyW, false);
        controller.press(Button::KeyM, false);
        assert_eq!(controller.look_delta(), (6.0, 6.0));

        controller.reset_deltas();
        assert_eq!(controller.look_delta(), (0.0, 0.0));
        assert!(controller.commands().is_empty());
        // Held keys survive the frame boundary
        assert!(controller.is_down(Button::KeyW));
    }

    #[test]
    fn test_release_all() {
        let mut controller = WinitController::new();
        controller.press(Button::KeyW, false);
        controller.press(Button::KeyD, false);
        controller.release_all();
        assert!(!controller.is_down(Button::KeyW));
        assert!(!controller.is_down(Button::KeyD));
    }

    #[test]
    fn test_keycode_mapping() {
        assert_eq!(
            WinitController::keycode_to_button(KeyCode::Space),
            Some(Button::Space)
        );
        assert_eq!(
            WinitController::keycode_to_button(KeyCode::KeyL),
            Some(Button::KeyL)
        );
        assert_eq!(WinitController::keycode_to_button(KeyCode::KeyZ), None);
    }
}
