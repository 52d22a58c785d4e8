use glam::Vec2;

use crate::constants::*;
use crate::input::{InputSource, Key, TapTracker};

/// World-to-screen transform. `position` is the world pixel at the center
/// of the viewport; y grows down in both spaces.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec2,
    pub zoom: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Free camera: WASD pans and the player is not followed
    pub freecam: bool,
}

impl Camera {
    pub fn new(viewport_width: f32, viewport_height: f32, freecam: bool) -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: CAMERA_DEFAULT_ZOOM,
            viewport_width,
            viewport_height,
            freecam,
        }
    }

    fn half_viewport(&self) -> Vec2 {
        Vec2::new(self.viewport_width, self.viewport_height) / 2.0
    }

    /// Center on a world position
    pub fn center_on(&mut self, target: Vec2) {
        self.position = target;
    }

    /// Move with the cursor; `screen_delta` is in screen pixels
    pub fn pan(&mut self, screen_delta: Vec2) {
        self.position -= screen_delta / self.zoom;
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(CAMERA_MIN_ZOOM, CAMERA_MAX_ZOOM);
    }

    /// Per-frame camera control. Follow mode tracks `follow_target`; freecam
    /// pans with WASD at a speed scaled by zoom. Dragging pans either way.
    pub fn update(&mut self, input: &dyn InputSource, tap: &TapTracker, follow_target: Vec2) {
        let zoom_delta = input.scroll_delta();
        if zoom_delta != 0.0 {
            self.set_zoom(self.zoom + zoom_delta);
        }

        if self.freecam {
            let speed = CAMERA_PAN_SPEED * self.zoom;
            let mut direction = Vec2::ZERO;
            if input.key_down(Key::W) {
                direction.y -= 1.0;
            }
            if input.key_down(Key::S) {
                direction.y += 1.0;
            }
            if input.key_down(Key::A) {
                direction.x -= 1.0;
            }
            if input.key_down(Key::D) {
                direction.x += 1.0;
            }
            self.position += direction * speed;
        }

        if tap.is_dragging() {
            self.pan(tap.drag_delta());
        } else if !self.freecam {
            self.center_on(follow_target);
        }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.position) * self.zoom + self.half_viewport()
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.half_viewport()) / self.zoom + self.position
    }

    /// Inclusive tile bounds currently on screen, padded by one tile
    pub fn visible_tile_bounds(&self) -> (i32, i32, i32, i32) {
        let half = self.half_viewport() / self.zoom;
        let min = (self.position - half) / TILE_SIZE;
        let max = (self.position + half) / TILE_SIZE;
        (
            min.x.floor() as i32 - 1,
            max.x.ceil() as i32 + 1,
            min.y.floor() as i32 - 1,
            max.y.ceil() as i32 + 1,
        )
    }
}
