//! Per-step keyboard state derived from the raw input queue.
//!
//! Browsers fire repeated `keydown` events while a key is held; games
//! usually want "went down this step" semantics instead, so the state
//! tracks which keys are held and only reports a press on the first
//! `KeyDown` after a `KeyUp`.

use std::collections::HashSet;

use super::queue::{InputEvent, InputQueue};

/// Browser `KeyboardEvent.keyCode` values used by the engine and games.
pub mod keys {
    pub const ENTER: u32 = 13;
    pub const SPACE: u32 = 32;
    pub const ARROW_LEFT: u32 = 37;
    pub const ARROW_UP: u32 = 38;
    pub const ARROW_RIGHT: u32 = 39;
    pub const ARROW_DOWN: u32 = 40;
    pub const A: u32 = 65;
    pub const D: u32 = 68;
    pub const S: u32 = 83;
    pub const W: u32 = 87;
}

#[derive(Debug, Default, Clone)]
pub struct KeyboardState {
    held: HashSet<u32>,
    pressed: HashSet<u32>,
    released: HashSet<u32>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold this step's events into the state. Clears the per-step
    /// pressed/released sets first, so call exactly once per step.
    pub fn update(&mut self, input: &InputQueue) {
        self.pressed.clear();
        self.released.clear();

        for event in input.iter() {
            match *event {
                InputEvent::KeyDown { key_code } => {
                    if self.held.insert(key_code) {
                        self.pressed.insert(key_code);
                    }
                }
                InputEvent::KeyUp { key_code } => {
                    if self.held.remove(&key_code) {
                        self.released.insert(key_code);
                    }
                }
                InputEvent::Custom { .. } => {}
            }
        }
    }

    /// Whether the key went down during this step.
    pub fn just_pressed(&self, key_code: u32) -> bool {
        self.pressed.contains(&key_code)
    }

    /// Whether the key was released during this step.
    pub fn just_released(&self, key_code: u32) -> bool {
        self.released.contains(&key_code)
    }

    /// Forget all held keys (e.g. when the page loses focus).
    pub fn reset(&mut self) {
        self.held.clear();
        self.pressed.clear();
        self.released.clear();
    }
}
