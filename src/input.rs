use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::scene::ViewKind;

/// Tracks keyboard state between frames.
#[derive(Debug, Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the start of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput { event, .. } = event
            && let PhysicalKey::Code(key) = event.physical_key
        {
            self.apply(key, event.state);
        }
    }

    fn apply(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_down.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_down.insert(key);
            }
            ElementState::Released => {
                self.keys_down.remove(&key);
                self.keys_released.insert(key);
            }
        }
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the key was released this frame.
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Host commands triggered by this frame's key presses.
    pub fn commands(&self, view: ViewKind) -> Vec<Command> {
        let mut commands = Vec::new();
        match view {
            ViewKind::Overview => {
                if self.key_pressed(KeyCode::ArrowLeft) {
                    commands.push(Command::SelectPrev);
                }
                if self.key_pressed(KeyCode::ArrowRight) {
                    commands.push(Command::SelectNext);
                }
                if self.key_pressed(KeyCode::Enter) {
                    commands.push(Command::OpenDetail);
                }
                if self.key_pressed(KeyCode::Escape) {
                    commands.push(Command::Quit);
                }
            }
            ViewKind::Detail => {
                if self.key_pressed(KeyCode::Escape) || self.key_pressed(KeyCode::Backspace) {
                    commands.push(Command::Back);
                }
            }
        }
        commands
    }
}

/// What the host should do in response to input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    SelectPrev,
    SelectNext,
    OpenDetail,
    Back,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_reported_for_one_frame() {
        let mut input = Input::new();
        input.apply(KeyCode::ArrowRight, ElementState::Pressed);
        assert!(input.key_pressed(KeyCode::ArrowRight));
        assert!(input.key_down(KeyCode::ArrowRight));

        input.begin_frame();
        assert!(!input.key_pressed(KeyCode::ArrowRight));
        assert!(input.key_down(KeyCode::ArrowRight));

        // Key repeat does not count as a new press.
        input.apply(KeyCode::ArrowRight, ElementState::Pressed);
        assert!(!input.key_pressed(KeyCode::ArrowRight));

        input.apply(KeyCode::ArrowRight, ElementState::Released);
        assert!(input.key_released(KeyCode::ArrowRight));
        assert!(!input.key_down(KeyCode::ArrowRight));
    }

    #[test]
    fn overview_keys_map_to_commands() {
        let mut input = Input::new();
        input.apply(KeyCode::ArrowLeft, ElementState::Pressed);
        input.apply(KeyCode::Enter, ElementState::Pressed);
        assert_eq!(
            input.commands(ViewKind::Overview),
            vec![Command::SelectPrev, Command::OpenDetail]
        );
    }

    #[test]
    fn escape_depends_on_view() {
        let mut input = Input::new();
        input.apply(KeyCode::Escape, ElementState::Pressed);
        assert_eq!(input.commands(ViewKind::Overview), vec![Command::Quit]);
        assert_eq!(input.commands(ViewKind::Detail), vec![Command::Back]);
    }

    #[test]
    fn selection_keys_do_nothing_in_detail() {
        let mut input = Input::new();
        input.apply(KeyCode::ArrowRight, ElementState::Pressed);
        assert!(input.commands(ViewKind::Detail).is_empty());
    }
}
