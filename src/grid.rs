use crate::constants::LEVEL_SIZE;
use crate::geometry::TileCoord;
use crate::tile::{Tile, TileKind};

/// Fixed-size tile map of one level, stored row-major
#[derive(Debug, Clone)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Tile>,
}

impl Grid {
    /// A level-sized grid filled with walls
    pub fn new() -> Self {
        Self::filled(LEVEL_SIZE, LEVEL_SIZE, TileKind::wall())
    }

    pub fn filled(width: i32, height: i32, kind: TileKind) -> Self {
        let count = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            tiles: vec![Tile::new(kind); count],
        }
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Tile> {
        self.index(x, y).map(|i| &self.tiles[i])
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        let i = self.index(x, y)?;
        Some(&mut self.tiles[i])
    }

    /// Replace a tile's kind, keeping its flags and overlay
    pub fn set_kind(&mut self, x: i32, y: i32, kind: TileKind) {
        if let Some(tile) = self.get_mut(x, y) {
            tile.kind = kind;
        }
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(|tile| tile.is_walkable())
    }

    pub fn is_visible(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(|tile| tile.visible)
    }

    /// Every coordinate in row-major order
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| (x, y)))
    }

    /// Coordinates of tiles matching a predicate
    pub fn find_all<F: Fn(&Tile) -> bool>(&self, predicate: F) -> Vec<TileCoord> {
        self.coords()
            .filter(|&(x, y)| self.get(x, y).is_some_and(&predicate))
            .collect()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
