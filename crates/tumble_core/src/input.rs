//! Input state tracking with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` is true every frame the key is
//!   physically down. Camera movement reads this.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only during the
//!   frame the transition happened, cleared by `end_frame()`. Rolls, mode
//!   flips and editor clicks read these so one press triggers one action.
//!
//! Mouse motion and scroll accumulate between frames and are also cleared by
//! `end_frame()`.

use crate::roll::RollDirection;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Escape,
    Space,
    LControl,
    LShift,
    F3,
    F5,
    W,
    A,
    S,
    D,
    C,
    E,
    M,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseBtn {
    Left,
    Right,
    Middle,
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,

    mouse_held: HashSet<MouseBtn>,
    mouse_just_pressed: HashSet<MouseBtn>,
    mouse_just_released: HashSet<MouseBtn>,

    pub mouse_position: (f64, f64),
    mouse_delta: (f64, f64),
    raw_motion: (f64, f64),
    scroll: f32,
    first_arrow: Option<RollDirection>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
            mouse_held: HashSet::new(),
            mouse_just_pressed: HashSet::new(),
            mouse_just_released: HashSet::new(),
            mouse_position: (0.0, 0.0),
            mouse_delta: (0.0, 0.0),
            raw_motion: (0.0, 0.0),
            scroll: 0.0,
            first_arrow: None,
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
            if self.first_arrow.is_none() {
                self.first_arrow = arrow_direction(key);
            }
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn mouse_down(&mut self, btn: MouseBtn) {
        if self.mouse_held.insert(btn) {
            self.mouse_just_pressed.insert(btn);
        }
    }

    pub fn mouse_up(&mut self, btn: MouseBtn) {
        if self.mouse_held.remove(&btn) {
            self.mouse_just_released.insert(btn);
        }
    }

    /// Record a new cursor position. The first event after startup only
    /// seeds the position so the camera does not jump.
    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        let (last_x, last_y) = self.mouse_position;
        if last_x != 0.0 || last_y != 0.0 {
            self.mouse_delta.0 += x - last_x;
            self.mouse_delta.1 += y - last_y;
        }
        self.mouse_position = (x, y);
    }

    /// Raw device motion, unaffected by the cursor hitting the window edge.
    pub fn add_raw_motion(&mut self, dx: f64, dy: f64) {
        self.raw_motion.0 += dx;
        self.raw_motion.1 += dy;
    }

    pub fn add_scroll(&mut self, lines: f32) {
        self.scroll += lines;
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn is_mouse_held(&self, btn: MouseBtn) -> bool {
        self.mouse_held.contains(&btn)
    }

    pub fn is_mouse_just_pressed(&self, btn: MouseBtn) -> bool {
        self.mouse_just_pressed.contains(&btn)
    }

    pub fn is_mouse_just_released(&self, btn: MouseBtn) -> bool {
        self.mouse_just_released.contains(&btn)
    }

    /// Cursor motion since the last `end_frame()`, in pixels.
    pub fn mouse_delta(&self) -> (f64, f64) {
        self.mouse_delta
    }

    /// Device motion since the last `end_frame()`. Fly look reads this.
    pub fn raw_motion(&self) -> (f64, f64) {
        self.raw_motion
    }

    /// Wheel movement since the last `end_frame()`, in lines.
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// First arrow key pressed this frame, as a roll direction.
    pub fn roll_request(&self) -> Option<RollDirection> {
        self.first_arrow
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.mouse_just_pressed.clear();
        self.mouse_just_released.clear();
        self.mouse_delta = (0.0, 0.0);
        self.raw_motion = (0.0, 0.0);
        self.scroll = 0.0;
        self.first_arrow = None;
    }
}

fn arrow_direction(key: Key) -> Option<RollDirection> {
    match key {
        Key::Up => Some(RollDirection::Up),
        Key::Down => Some(RollDirection::Down),
        Key::Left => Some(RollDirection::Left),
        Key::Right => Some(RollDirection::Right),
        _ => None,
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
