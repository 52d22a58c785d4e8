//! Coordinate math shared by the generator, visibility, actions and rendering.
//!
//! Tile coordinates are `(i32, i32)` pairs; pixel space uses `glam::Vec2` with
//! y growing downward and tile `(x, y)` centered at `(x, y) * TILE_SIZE`.
//! Angles are in degrees, measured from +x toward +y.

use glam::Vec2;

use crate::constants::TILE_SIZE;

pub type TileCoord = (i32, i32);

/// Collision shape, centered on its collider's position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect { w: f32, h: f32 },
    Circle { r: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub position: Vec2,
    pub shape: Shape,
}

impl Collider {
    pub fn new(position: Vec2, shape: Shape) -> Self {
        Self { position, shape }
    }

    /// Collider covering a single tile
    pub fn tile(coord: TileCoord) -> Self {
        Self::new(
            tile_to_pixel(coord),
            Shape::Rect {
                w: TILE_SIZE,
                h: TILE_SIZE,
            },
        )
    }
}

/// Overlap test between two colliders. Touching edges count as a collision.
pub fn detect_collision(a: &Collider, b: &Collider) -> bool {
    match (a.shape, b.shape) {
        (Shape::Rect { w: aw, h: ah }, Shape::Rect { w: bw, h: bh }) => {
            (a.position.x - b.position.x).abs() * 2.0 <= aw + bw
                && (a.position.y - b.position.y).abs() * 2.0 <= ah + bh
        }
        (Shape::Circle { r: ar }, Shape::Circle { r: br }) => {
            a.position.distance_squared(b.position) <= (ar + br) * (ar + br)
        }
        (Shape::Rect { w, h }, Shape::Circle { r }) => rect_circle(a.position, w, h, b.position, r),
        (Shape::Circle { r }, Shape::Rect { w, h }) => rect_circle(b.position, w, h, a.position, r),
    }
}

fn rect_circle(rect_center: Vec2, w: f32, h: f32, circle_center: Vec2, r: f32) -> bool {
    let half = Vec2::new(w / 2.0, h / 2.0);
    let closest = circle_center.clamp(rect_center - half, rect_center + half);
    closest.distance_squared(circle_center) <= r * r
}

pub fn point_in_collider(point: Vec2, collider: &Collider) -> bool {
    detect_collision(
        &Collider::new(point, Shape::Circle { r: 0.0 }),
        collider,
    )
}

/// Offset of length `magnitude` in direction `angle_deg`
pub fn rotational_translate(angle_deg: f32, magnitude: f32) -> Vec2 {
    let radians = angle_deg.to_radians();
    Vec2::new(radians.cos(), radians.sin()) * magnitude
}

pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Direction from `from` to `to` in degrees
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.y.atan2(delta.x).to_degrees()
}

/// Euclidean distance between two tiles
pub fn tile_distance(a: TileCoord, b: TileCoord) -> f32 {
    let dx = (a.0 - b.0) as f32;
    let dy = (a.1 - b.1) as f32;
    (dx * dx + dy * dy).sqrt()
}

/// Tile reached by stepping `magnitude` tiles from `origin` at `angle_deg`, rounded
pub fn rotational_tile(origin: TileCoord, angle_deg: f32, magnitude: f32) -> TileCoord {
    let offset = rotational_translate(angle_deg, magnitude);
    (
        (origin.0 as f32 + offset.x).round() as i32,
        (origin.1 as f32 + offset.y).round() as i32,
    )
}

/// Pixel-space center of a tile
pub fn tile_to_pixel(coord: TileCoord) -> Vec2 {
    Vec2::new(coord.0 as f32, coord.1 as f32) * TILE_SIZE
}

/// Tile whose square contains a pixel position. May be out of level bounds.
pub fn pixel_to_tile(position: Vec2) -> TileCoord {
    let scaled = position / TILE_SIZE;
    (scaled.x.round() as i32, scaled.y.round() as i32)
}

/// Chebyshev distance, the number of 8-connected steps between two tiles
pub fn chebyshev(a: TileCoord, b: TileCoord) -> i32 {
    (a.0 - b.0).abs().max((a.1 - b.1).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_rect_collision() {
        let a = Collider::new(Vec2::ZERO, Shape::Rect { w: 10.0, h: 10.0 });
        let b = Collider::new(Vec2::new(9.0, 0.0), Shape::Rect { w: 10.0, h: 10.0 });
        let c = Collider::new(Vec2::new(25.0, 0.0), Shape::Rect { w: 10.0, h: 10.0 });
        assert!(detect_collision(&a, &b));
        assert!(!detect_collision(&a, &c));
    }

    #[test]
    fn test_circle_collisions() {
        let circle = Collider::new(Vec2::new(0.0, 0.0), Shape::Circle { r: 5.0 });
        let near = Collider::new(Vec2::new(8.0, 0.0), Shape::Circle { r: 3.0 });
        let far = Collider::new(Vec2::new(20.0, 0.0), Shape::Circle { r: 3.0 });
        assert!(detect_collision(&circle, &near));
        assert!(!detect_collision(&circle, &far));

        let rect = Collider::new(Vec2::new(10.0, 10.0), Shape::Rect { w: 4.0, h: 4.0 });
        // Rect corner (8, 8) is ~11.3 from the origin
        assert!(!detect_collision(&circle, &rect));
        let big = Collider::new(Vec2::ZERO, Shape::Circle { r: 12.0 });
        assert!(detect_collision(&rect, &big));
    }

    #[test]
    fn test_point_in_tile_collider() {
        let collider = Collider::tile((2, 3));
        assert!(point_in_collider(Vec2::new(64.0, 96.0), &collider));
        assert!(point_in_collider(Vec2::new(70.0, 100.0), &collider));
        assert!(!point_in_collider(Vec2::new(100.0, 96.0), &collider));
    }

    #[test]
    fn test_rotational_translate() {
        let east = rotational_translate(0.0, 2.0);
        assert!((east.x - 2.0).abs() < 1e-5 && east.y.abs() < 1e-5);
        let south = rotational_translate(90.0, 3.0);
        assert!(south.x.abs() < 1e-5 && (south.y - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_angle_between() {
        assert!((angle_between(Vec2::ZERO, Vec2::new(0.0, 5.0)) - 90.0).abs() < 1e-4);
        assert!((angle_between(Vec2::ZERO, Vec2::new(-1.0, 0.0)).abs() - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_rotational_tile_rounds() {
        assert_eq!(rotational_tile((10, 10), 0.0, 3.0), (13, 10));
        assert_eq!(rotational_tile((10, 10), 45.0, 1.0), (11, 11));
        assert_eq!(rotational_tile((10, 10), 180.0, 2.0), (8, 10));
    }

    #[test]
    fn test_pixel_tile_conversion() {
        assert_eq!(pixel_to_tile(tile_to_pixel((7, 12))), (7, 12));
        assert_eq!(pixel_to_tile(Vec2::new(7.0 * TILE_SIZE + 10.0, 12.0 * TILE_SIZE - 10.0)), (7, 12));
    }

    #[test]
    fn test_distances() {
        assert!((tile_distance((0, 0), (3, 4)) - 5.0).abs() < 1e-6);
        assert_eq!(chebyshev((0, 0), (3, 4)), 4);
    }
}
