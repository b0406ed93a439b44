use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ ElementState, MouseButton, MouseScrollDelta };
use winit::keyboard::KeyCode;

/// Pixels of touchpad scrolling that count as one wheel notch.
const PIXELS_PER_SCROLL_LINE: f32 = 40.0;

/// Keyboard / mouse state accumulated between two frames.
#[derive(Debug, Default)]
pub struct InputState {
    pressed_keys: HashSet<KeyCode>,
    /// Keys that went down since the last frame (auto-repeat excluded).
    just_pressed: HashSet<KeyCode>,
    pressed_buttons: HashSet<MouseButton>,
    cursor: Option<Vec2>,
    /// Cursor movement since the last frame, y pointing up.
    cursor_delta: Vec2,
    scroll_delta: f32,
    /// Set by the UI overlay when it owns the pointer this frame.
    pub ui_wants_pointer: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receive_key(&mut self, code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.pressed_keys.insert(code) {
                    self.just_pressed.insert(code);
                }
            }
            ElementState::Released => {
                self.pressed_keys.remove(&code);
            }
        }
    }

    pub fn receive_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.pressed_buttons.insert(button);
            }
            ElementState::Released => {
                self.pressed_buttons.remove(&button);
            }
        }
    }

    /// The first reported position only seeds the tracker and produces no delta.
    pub fn receive_cursor(&mut self, x: f64, y: f64) {
        let position = Vec2::new(x as f32, y as f32);
        if let Some(last) = self.cursor {
            self.cursor_delta += Vec2::new(position.x - last.x, last.y - position.y);
        }
        self.cursor = Some(position);
    }

    pub fn receive_scroll(&mut self, delta: MouseScrollDelta) {
        self.scroll_delta += match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(position) => (position.y as f32) / PIXELS_PER_SCROLL_LINE,
        };
    }

    pub fn is_key_down(&self, code: KeyCode) -> bool {
        self.pressed_keys.contains(&code)
    }

    pub fn was_key_pressed(&self, code: KeyCode) -> bool {
        self.just_pressed.contains(&code)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    pub fn cursor_position(&self) -> Vec2 {
        self.cursor.unwrap_or(Vec2::ZERO)
    }

    pub fn cursor_delta(&self) -> Vec2 {
        self.cursor_delta
    }

    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// Left-button drag in window pixels (x right, y up), unless the UI owns the pointer.
    pub fn drag_delta(&self) -> Vec2 {
        if self.ui_wants_pointer || !self.is_button_down(MouseButton::Left) {
            Vec2::ZERO
        } else {
            self.cursor_delta
        }
    }

    /// Scroll amount for the scene, zero while the UI owns the pointer.
    pub fn scene_scroll(&self) -> f32 {
        if self.ui_wants_pointer { 0.0 } else { self.scroll_delta }
    }

    /// Reset per-frame accumulators. Held keys and buttons persist.
    pub fn end_frame(&mut self) {
        self.cursor_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
        self.just_pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cursor_event_produces_no_delta() {
        let mut input = InputState::new();
        input.receive_cursor(100.0, 100.0);
        assert_eq!(input.cursor_delta(), Vec2::ZERO);

        input.receive_cursor(110.0, 90.0);
        // y grows downward in window space, upward in the delta
        assert_eq!(input.cursor_delta(), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn end_frame_clears_deltas_but_keeps_keys() {
        let mut input = InputState::new();
        input.receive_key(KeyCode::KeyW, ElementState::Pressed);
        input.receive_cursor(0.0, 0.0);
        input.receive_cursor(5.0, 0.0);
        input.receive_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));

        input.end_frame();
        assert!(input.is_key_down(KeyCode::KeyW));
        assert_eq!(input.cursor_delta(), Vec2::ZERO);
        assert_eq!(input.scroll_delta(), 0.0);

        input.receive_key(KeyCode::KeyW, ElementState::Released);
        assert!(!input.is_key_down(KeyCode::KeyW));
    }

    #[test]
    fn held_keys_register_one_press() {
        let mut input = InputState::new();
        input.receive_key(KeyCode::KeyR, ElementState::Pressed);
        input.receive_key(KeyCode::KeyR, ElementState::Pressed);
        assert!(input.was_key_pressed(KeyCode::KeyR));

        input.end_frame();
        input.receive_key(KeyCode::KeyR, ElementState::Pressed);
        assert!(!input.was_key_pressed(KeyCode::KeyR));
        assert!(input.is_key_down(KeyCode::KeyR));
    }

    #[test]
    fn drag_requires_left_button_and_free_pointer() {
        let mut input = InputState::new();
        input.receive_cursor(0.0, 0.0);
        input.receive_cursor(4.0, 0.0);
        assert_eq!(input.drag_delta(), Vec2::ZERO);

        input.receive_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert_eq!(input.drag_delta(), Vec2::new(4.0, 0.0));

        input.ui_wants_pointer = true;
        assert_eq!(input.drag_delta(), Vec2::ZERO);
    }
}
