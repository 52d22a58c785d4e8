//! Field of view by short tile rays.
//!
//! Sight is cast from the player's tile every few degrees. A ray stops at the
//! first wall, which is still revealed so room outlines show up. Pits and
//! floors never block sight.

use std::collections::HashSet;

use crate::constants::RESHADE_ANGLE_STEP;
use crate::geometry::{angle_between, rotational_tile, tile_distance, tile_to_pixel, TileCoord};
use crate::grid::Grid;

/// Recompute `visible` for every tile and reveal what the origin can see
pub fn reshade(grid: &mut Grid, origin: TileCoord, range: i32) {
    puffin::profile_function!();

    for tile in grid.tiles.iter_mut() {
        tile.visible = false;
    }
    if let Some(tile) = grid.get_mut(origin.0, origin.1) {
        tile.revealed = true;
        tile.visible = true;
    }

    for (x, y) in visible_tiles(grid, origin, range) {
        if let Some(tile) = grid.get_mut(x, y) {
            tile.revealed = true;
            tile.visible = true;
        }
    }
}

/// Tiles reached by the reshade rays, origin excluded
pub fn visible_tiles(grid: &Grid, origin: TileCoord, range: i32) -> HashSet<TileCoord> {
    let mut lit = HashSet::new();
    for angle in (0..360).step_by(RESHADE_ANGLE_STEP) {
        for d in 0..range.max(0) {
            let coord = rotational_tile(origin, angle as f32, d as f32);
            let Some(tile) = grid.get(coord.0, coord.1) else {
                break;
            };
            if coord != origin {
                lit.insert(coord);
            }
            if tile.kind.is_wall() {
                break;
            }
        }
    }
    lit
}

/// First wall between two tiles, stepping one tile at a time along the line.
/// Leaving the grid counts as blocked. `None` means a clear line.
pub fn raycast(grid: &Grid, from: TileCoord, to: TileCoord) -> Option<TileCoord> {
    let angle = angle_between(tile_to_pixel(from), tile_to_pixel(to));
    let segments = tile_distance(from, to).round() as i32;
    for seg in 0..segments {
        let coord = rotational_tile(from, angle, seg as f32);
        match grid.get(coord.0, coord.1) {
            Some(tile) if !tile.kind.is_wall() => {}
            _ => return Some(coord),
        }
    }
    None
}

/// Clear line of sight between two tiles
pub fn line_of_sight(grid: &Grid, from: TileCoord, to: TileCoord) -> bool {
    raycast(grid, from, to).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileKind;

    fn open_grid(walls: &[TileCoord]) -> Grid {
        let mut grid = Grid::filled(20, 20, TileKind::floor());
        for &(x, y) in walls {
            grid.set_kind(x, y, TileKind::wall());
        }
        grid
    }

    #[test]
    fn test_origin_always_visible() {
        let mut grid = open_grid(&[]);
        reshade(&mut grid, (10, 10), 5);
        let tile = grid.get(10, 10).unwrap();
        assert!(tile.visible && tile.revealed);
    }

    #[test]
    fn test_rays_stop_short_of_range() {
        let mut grid = open_grid(&[]);
        reshade(&mut grid, (10, 10), 5);
        assert!(grid.is_visible(14, 10));
        assert!(!grid.is_visible(15, 10));
        assert!(grid.is_visible(10, 6));
    }

    #[test]
    fn test_wall_is_revealed_and_blocks() {
        let mut grid = open_grid(&[(12, 10)]);
        reshade(&mut grid, (10, 10), 5);
        assert!(grid.get(12, 10).unwrap().revealed);
        assert!(!grid.is_visible(13, 10));
        assert!(!grid.get(14, 10).unwrap().revealed);
    }

    #[test]
    fn test_reshade_clears_old_visibility_but_keeps_reveal() {
        let mut grid = open_grid(&[]);
        reshade(&mut grid, (3, 3), 4);
        reshade(&mut grid, (16, 16), 4);
        let old = grid.get(3, 3).unwrap();
        assert!(old.revealed);
        assert!(!old.visible);
    }

    #[test]
    fn test_raycast_finds_blocking_wall() {
        let grid = open_grid(&[(5, 3)]);
        assert_eq!(raycast(&grid, (2, 3), (8, 3)), Some((5, 3)));
        assert!(line_of_sight(&grid, (2, 3), (2, 9)));
    }

    #[test]
    fn test_raycast_off_grid_is_blocked() {
        let grid = open_grid(&[]);
        assert!(!line_of_sight(&grid, (0, 0), (-6, 0)));
    }
}
