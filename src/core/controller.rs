use crate::traits::renderer::PolygonMode;

/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    KeyQ,
    KeyE,
    KeyM,
    KeyF,
    KeyC,
    KeyJ,
    KeyK,
    KeyL,
    Space,
}

/// One-shot request raised by a key edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleAnimation,
    ToggleAutopilot,
    ToggleFog,
    DumpPosition,
    SetPolygonMode(PolygonMode),
}

/// Which transition of a key raises its command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Press,
    Release,
}

impl Button {
    /// Command bound to this button, if any, and the edge that fires it
    pub fn command(self) -> Option<(Command, Edge)> {
        match self {
            Button::KeyM => Some((Command::ToggleAnimation, Edge::Press)),
            Button::Space => Some((Command::ToggleAutopilot, Edge::Release)),
            Button::KeyF => Some((Command::ToggleFog, Edge::Release)),
            Button::KeyC => Some((Command::DumpPosition, Edge::Press)),
            Button::KeyJ => Some((Command::SetPolygonMode(PolygonMode::Line), Edge::Press)),
            Button::KeyK => Some((Command::SetPolygonMode(PolygonMode::Fill), Edge::Press)),
            Button::KeyL => Some((Command::SetPolygonMode(PolygonMode::Point), Edge::Press)),
            _ => None,
        }
    }
}

/// Controller - per-frame view of the input devices
pub trait Controller {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;

    /// Pointer motion accumulated since the last frame, in pixels
    fn look_delta(&self) -> (f32, f32);

    /// Commands raised since the last frame, oldest first
    fn commands(&self) -> &[Command];
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_button_hash() {
        let mut set = HashSet::new();
        set.insert(Button::KeyW);
        set.insert(Button::KeyA);
        set.insert(Button::Space);
        set.insert(Button::KeyW);

        assert!(set.contains(&Button::KeyW));
        assert!(!set.contains(&Button::KeyS));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_movement_buttons_have_no_command() {
        for button in [
            Button::KeyW,
            Button::KeyA,
            Button::KeyS,
            Button::KeyD,
            Button::KeyQ,
            Button::KeyE,
        ] {
            assert_eq!(button.command(), None);
        }
    }

    #[test]
    fn test_toggle_edges() {
        assert_eq!(
            Button::KeyM.command(),
            Some((Command::ToggleAnimation, Edge::Press))
        );
        assert_eq!(
            Button::Space.command(),
            Some((Command::ToggleAutopilot, Edge::Release))
        );
        assert_eq!(
            Button::KeyF.command(),
            Some((Command::ToggleFog, Edge::Release))
        );
        assert_eq!(
            Button::KeyC.command(),
            Some((Command::DumpPosition, Edge::Press))
        );
    }

    #[test]
    fn test_polygon_mode_keys() {
        let modes: Vec<_> = [Button::KeyJ, Button::KeyK, Button::KeyL]
            .into_iter()
            .filter_map(|b| b.command())
            .collect();
        assert_eq!(
            modes,
            vec![
                (Command::SetPolygonMode(PolygonMode::Line), Edge::Press),
                (Command::SetPolygonMode(PolygonMode::Fill), Edge::Press),
                (Command::SetPolygonMode(PolygonMode::Point), Edge::Press),
            ]
        );
    }

    // Test mock controller implementation
    struct MockController {
        pressed: Vec<Button>,
    }

    impl Controller for MockController {
        fn is_down(&self, button: Button) -> bool {
            self.pressed.contains(&button)
        }

        fn look_delta(&self) -> (f32, f32) {
            (0.0, 0.0)
        }

        fn commands(&self) -> &[Command] {
            &[]
        }
    }

    #[test]
    fn test_controller_is_down() {
        let controller = MockController {
            pressed: vec![Button::KeyW, Button::Space],
        };

        assert!(controller.is_down(Button::KeyW));
        assert!(controller.is_down(Button::Space));
        assert!(!controller.is_down(Button::KeyA));
    }
}
