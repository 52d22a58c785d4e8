//! Camera-related constants.

/// Default zoom level
pub const CAMERA_DEFAULT_ZOOM: f32 = 1.0;
/// Minimum zoom level
pub const CAMERA_MIN_ZOOM: f32 = 1.0;
/// Maximum zoom level
pub const CAMERA_MAX_ZOOM: f32 = 3.0;
/// Freecam pan speed in pixels per frame at zoom 1
pub const CAMERA_PAN_SPEED: f32 = 10.0;
/// Frames a press must be held before it becomes a drag
pub const TAP_DRAG_FRAMES: u32 = 5;
/// Presses released within this many frames count as a tap
pub const TAP_MAX_FRAMES: u32 = 10;
