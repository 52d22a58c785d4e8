//! Input handling and player control.
//!
//! The game polls an [`InputSource`] once per frame. Touch gestures are
//! reduced to taps and drags by a [`TapTracker`], and the result is boiled
//! down to a [`PlayerIntent`] the player's brain can read without knowing
//! about cameras or devices.

use std::collections::HashSet;

use glam::Vec2;

use crate::camera::Camera;
use crate::constants::*;
use crate::geometry::{pixel_to_tile, TileCoord};

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    /// Wait a turn
    Z,
    /// Held while clicking an enemy to shove instead of bite
    Shift,
}

/// Discrete per-frame input queries
pub trait InputSource {
    fn key_down(&self, key: Key) -> bool;
    /// Left button went down this frame
    fn left_click_edge(&self) -> bool;
    /// Left button is held
    fn pointer_down(&self) -> bool;
    /// Screen pixels
    fn cursor_position(&self) -> Vec2;
    fn active_touch_count(&self) -> usize;
    /// Movement of one touch since last frame, in screen pixels
    fn touch_delta(&self, index: usize) -> Vec2;
    /// Tap reported by the device itself
    fn tap_edge(&self) -> bool;
    /// Zoom steps requested this frame
    fn scroll_delta(&self) -> f32 {
        0.0
    }
}

/// Turns raw press state into taps (short touches) and drags (long presses)
#[derive(Debug, Clone, Default)]
pub struct TapTracker {
    held_frames: u32,
    touch_press: bool,
    tapped: bool,
    dragging: bool,
    drag_delta: Vec2,
    last_cursor: Option<Vec2>,
}

impl TapTracker {
    pub fn update(&mut self, input: &dyn InputSource) {
        let touching = input.active_touch_count() > 0;
        let pressed = input.pointer_down() || touching;
        let cursor = input.cursor_position();
        self.tapped = false;
        self.drag_delta = Vec2::ZERO;

        if pressed {
            self.held_frames += 1;
            self.touch_press |= touching;
            if self.held_frames > TAP_DRAG_FRAMES {
                self.dragging = true;
                self.drag_delta = if input.active_touch_count() == 1 {
                    input.touch_delta(0)
                } else {
                    self.last_cursor.map_or(Vec2::ZERO, |last| cursor - last)
                };
            }
        } else {
            // Mouse clicks already report an edge on press
            self.tapped = self.touch_press && (1..TAP_MAX_FRAMES).contains(&self.held_frames);
            self.held_frames = 0;
            self.touch_press = false;
            self.dragging = false;
        }
        self.last_cursor = Some(cursor);
    }

    pub fn tapped(&self) -> bool {
        self.tapped
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn drag_delta(&self) -> Vec2 {
        self.drag_delta
    }
}

/// Plain in-memory input, for scripted runs and tests
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub keys: HashSet<Key>,
    pub click: bool,
    pub pointer_down: bool,
    pub cursor: Vec2,
    pub touches: Vec<Vec2>,
    pub tap: bool,
    pub scroll: f32,
}

impl FrameInput {
    pub fn with_key(mut self, key: Key) -> Self {
        self.keys.insert(key);
        self
    }

    /// A single click at a screen position
    pub fn click_at(cursor: Vec2) -> Self {
        Self {
            click: true,
            pointer_down: true,
            cursor,
            ..Default::default()
        }
    }
}

impl InputSource for FrameInput {
    fn key_down(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    fn left_click_edge(&self) -> bool {
        self.click
    }

    fn pointer_down(&self) -> bool {
        self.pointer_down
    }

    fn cursor_position(&self) -> Vec2 {
        self.cursor
    }

    fn active_touch_count(&self) -> usize {
        self.touches.len()
    }

    fn touch_delta(&self, index: usize) -> Vec2 {
        self.touches.get(index).copied().unwrap_or(Vec2::ZERO)
    }

    fn tap_edge(&self) -> bool {
        self.tap
    }

    fn scroll_delta(&self) -> f32 {
        self.scroll
    }
}

/// What the player asked for this frame, in tile terms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerIntent {
    pub clicked_tile: Option<TileCoord>,
    pub wait: bool,
    pub shove: bool,
}

impl PlayerIntent {
    pub fn from_input(input: &dyn InputSource, camera: &Camera, tap: &TapTracker) -> Self {
        let clicked = input.left_click_edge() || input.tap_edge() || tap.tapped();
        let clicked_tile = clicked.then(|| pixel_to_tile(camera.screen_to_world(input.cursor_position())));
        Self {
            clicked_tile,
            wait: input.key_down(Key::Z),
            shove: input.key_down(Key::Shift),
        }
    }

    /// Click on a specific tile
    pub fn click(tile: TileCoord) -> Self {
        Self {
            clicked_tile: Some(tile),
            ..Default::default()
        }
    }

    pub fn wait() -> Self {
        Self {
            wait: true,
            ..Default::default()
        }
    }
}
