//! Hand-authored room templates.
//!
//! Templates are data (`assets/rooms.json`): a character tilemap plus metadata
//! controlling which floors a room may appear on and what it carries. Raw JSON
//! records are validated into immutable [`RoomTemplate`]s.

use serde::Deserialize;

use crate::constants::{TALL_ROOM_THRESHOLD, WIDE_ROOM_THRESHOLD};
use crate::error::{GameError, GameResult};
use crate::geometry::TileCoord;
use crate::tile::Overlay;

const BUILTIN_ROOMS: &str = include_str!("../assets/rooms.json");

/// One tilemap character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Floor,
    Pit,
    /// A wall that may be opened into a corridor
    Entrance,
}

impl Cell {
    fn parse(ch: char) -> Option<Cell> {
        match ch {
            'w' => Some(Cell::Wall),
            'f' => Some(Cell::Floor),
            'p' => Some(Cell::Pit),
            'e' => Some(Cell::Entrance),
            _ => None,
        }
    }
}

/// Side of a room carrying an entrance. Offsets are in tile space (y grows down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    pub fn inverse(&self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

/// Entities a template can place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlacedEntity {
    SilverChest,
    GoldChest,
}

impl PlacedEntity {
    pub fn chest_tier(&self) -> u32 {
        match self {
            PlacedEntity::SilverChest => 1,
            PlacedEntity::GoldChest => 2,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOverlay {
    overlay: Overlay,
    at: [i32; 2],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntity {
    entity: PlacedEntity,
    at: [i32; 2],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRoom {
    id: String,
    tier: u32,
    entrance_count: usize,
    #[serde(default)]
    blocked_floors: Vec<u32>,
    #[serde(default)]
    only_floors: Option<Vec<u32>>,
    #[serde(default)]
    required_floors: Vec<u32>,
    #[serde(default)]
    overlays: Vec<RawOverlay>,
    #[serde(default)]
    entities: Vec<RawEntity>,
    tiles: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RoomTemplate {
    pub id: String,
    /// Treasure weight counted against the level's tier budget
    pub tier: u32,
    /// Entrances kept after stamping
    pub entrance_count: usize,
    pub blocked_floors: Vec<u32>,
    pub only_floors: Option<Vec<u32>>,
    pub required_floors: Vec<u32>,
    pub overlays: Vec<(Overlay, TileCoord)>,
    pub entities: Vec<(PlacedEntity, TileCoord)>,
    /// Rows top to bottom
    pub cells: Vec<Vec<Cell>>,
    pub width: usize,
    pub height: usize,
    pub connections: Vec<Direction>,
}

impl RoomTemplate {
    fn from_raw(raw: RawRoom) -> GameResult<Self> {
        let invalid = |reason: String| GameError::InvalidTemplate {
            id: raw.id.clone(),
            reason,
        };

        if raw.tiles.is_empty() {
            return Err(invalid("tilemap has no rows".to_string()));
        }
        let mut cells = Vec::with_capacity(raw.tiles.len());
        for (row_index, row) in raw.tiles.iter().enumerate() {
            let parsed: Option<Vec<Cell>> = row.chars().map(Cell::parse).collect();
            let parsed = parsed.ok_or_else(|| invalid(format!("row {} has an unknown tile character", row_index)))?;
            cells.push(parsed);
        }
        let width = cells[0].len();
        if width == 0 || cells.iter().any(|row| row.len() != width) {
            return Err(invalid("tilemap rows must be non-empty and equally long".to_string()));
        }
        let height = cells.len();
        if width > 2 * crate::constants::SECTION_SIZE as usize
            || height > 2 * crate::constants::SECTION_SIZE as usize
        {
            return Err(invalid(format!("{}x{} does not fit in two sections", width, height)));
        }
        if raw.entrance_count == 0 {
            return Err(invalid("entrance count must be at least 1".to_string()));
        }

        let in_bounds = |[x, y]: [i32; 2]| x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height;
        let mut overlays = Vec::with_capacity(raw.overlays.len());
        for placement in &raw.overlays {
            if !in_bounds(placement.at) {
                return Err(invalid(format!("overlay {:?} at {:?} is outside the tilemap", placement.overlay, placement.at)));
            }
            overlays.push((placement.overlay, (placement.at[0], placement.at[1])));
        }
        let mut entities = Vec::with_capacity(raw.entities.len());
        for placement in &raw.entities {
            if !in_bounds(placement.at) {
                return Err(invalid(format!("entity {:?} at {:?} is outside the tilemap", placement.entity, placement.at)));
            }
            let (x, y) = (placement.at[0] as usize, placement.at[1] as usize);
            if cells[y][x] != Cell::Floor {
                return Err(invalid(format!("entity {:?} must stand on a floor cell", placement.entity)));
            }
            entities.push((placement.entity, (placement.at[0], placement.at[1])));
        }

        let connections = derive_connections(&cells);
        if connections.is_empty() {
            return Err(invalid("room has no entrances".to_string()));
        }

        Ok(Self {
            id: raw.id,
            tier: raw.tier,
            entrance_count: raw.entrance_count,
            blocked_floors: raw.blocked_floors,
            only_floors: raw.only_floors,
            required_floors: raw.required_floors,
            overlays,
            entities,
            cells,
            width,
            height,
            connections,
        })
    }

    pub fn wide(&self) -> bool {
        self.width > WIDE_ROOM_THRESHOLD
    }

    pub fn tall(&self) -> bool {
        self.height > TALL_ROOM_THRESHOLD
    }

    /// Sections claimed along each axis
    pub fn section_span(&self) -> (i32, i32) {
        (if self.wide() { 2 } else { 1 }, if self.tall() { 2 } else { 1 })
    }

    pub fn allowed_on(&self, floor: u32) -> bool {
        !self.blocked_floors.contains(&floor)
            && self.only_floors.as_ref().map_or(true, |floors| floors.contains(&floor))
    }

    pub fn required_on(&self, floor: u32) -> bool {
        self.required_floors.contains(&floor) && self.allowed_on(floor)
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        self.cells.get(y).and_then(|row| row.get(x)).copied()
    }

    pub fn has_connection(&self, direction: Direction) -> bool {
        self.connections.contains(&direction)
    }

    /// This room's directions that `child` could attach to: the child must
    /// carry the inverse direction.
    pub fn matching_connections(&self, child: &RoomTemplate) -> Vec<Direction> {
        self.connections
            .iter()
            .copied()
            .filter(|direction| child.has_connection(direction.inverse()))
            .collect()
    }

    /// First matching connection, if the rooms can be linked at all
    pub fn valid_connection(&self, child: &RoomTemplate) -> Option<Direction> {
        self.matching_connections(child).first().copied()
    }
}

/// At most one connection per side: left/right if any row starts/ends with an
/// entrance, up/down if the first/last row contains one.
fn derive_connections(cells: &[Vec<Cell>]) -> Vec<Direction> {
    let mut connections = Vec::new();
    if cells.iter().any(|row| row.first() == Some(&Cell::Entrance)) {
        connections.push(Direction::Left);
    }
    if cells.iter().any(|row| row.last() == Some(&Cell::Entrance)) {
        connections.push(Direction::Right);
    }
    if cells.first().is_some_and(|row| row.contains(&Cell::Entrance)) {
        connections.push(Direction::Up);
    }
    if cells.last().is_some_and(|row| row.contains(&Cell::Entrance)) {
        connections.push(Direction::Down);
    }
    connections
}

/// Validated set of room templates
#[derive(Debug, Clone)]
pub struct RoomLibrary {
    pub templates: Vec<RoomTemplate>,
}

impl RoomLibrary {
    /// Templates shipped with the game
    pub fn builtin() -> GameResult<Self> {
        Self::from_json(BUILTIN_ROOMS)
    }

    pub fn from_json(text: &str) -> GameResult<Self> {
        let raw: Vec<RawRoom> = serde_json::from_str(text)?;
        let templates = raw
            .into_iter()
            .map(RoomTemplate::from_raw)
            .collect::<GameResult<Vec<_>>>()?;
        Ok(Self { templates })
    }

    pub fn get(&self, id: &str) -> Option<&RoomTemplate> {
        self.templates.iter().find(|template| template.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.templates.iter().position(|template| template.id == id)
    }
}
