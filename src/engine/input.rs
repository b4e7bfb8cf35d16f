use glam::Vec2;
use std::collections::HashSet;

/// Discrete actions the movement options poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Jump,
    Grab,
}

/// Input as seen by movement options, polled once per frame.
pub trait InputSource {
    /// Pressed this frame.
    fn key_down(&self, key: Key) -> bool;
    fn key_held(&self, key: Key) -> bool;
    /// Desired planar direction: x = world X, y = world Z.
    fn move_axis(&self) -> Vec2;
}

/// Held keys, this frame's presses and the move axis.
#[derive(Debug, Default)]
pub struct InputState {
    pub keys: HashSet<Key>,
    pressed: HashSet<Key>,
    pub move_axis: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame edges. Call at the start of every frame before
    /// feeding new events.
    pub fn begin_frame(&mut self) {
        self.pressed.clear();
    }

    pub fn press(&mut self, key: Key) {
        if self.keys.insert(key) {
            self.pressed.insert(key);
        }
    }

    pub fn release(&mut self, key: Key) {
        self.keys.remove(&key);
    }

    pub fn set_move_axis(&mut self, axis: Vec2) {
        self.move_axis = axis;
    }
}

impl InputSource for InputState {
    fn key_down(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    fn key_held(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    fn move_axis(&self) -> Vec2 {
        self.move_axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_an_edge_hold_is_a_level() {
        let mut input = InputState::new();
        input.press(Key::Jump);
        assert!(input.key_down(Key::Jump));
        assert!(input.key_held(Key::Jump));

        input.begin_frame();
        input.press(Key::Jump);
        assert!(!input.key_down(Key::Jump));
        assert!(input.key_held(Key::Jump));

        input.release(Key::Jump);
        input.begin_frame();
        input.press(Key::Jump);
        assert!(input.key_down(Key::Jump));
    }
}
