//! Dungeon generation constants.

/// Width and height of every level in tiles
pub const LEVEL_SIZE: i32 = 50;
/// Sections per side of the placement grid
pub const SECTION_COUNT: i32 = 7;
/// Tiles per side of one section
pub const SECTION_SIZE: i32 = 7;
/// Section claimed by the entrance room
pub const ENTRANCE_SECTION: (i32, i32) = (3, 3);
/// Rooms wider than this claim two section columns
pub const WIDE_ROOM_THRESHOLD: usize = 6;
/// Rooms taller than this claim two section rows
pub const TALL_ROOM_THRESHOLD: usize = 6;
/// Maximum cumulative treasure tier per level
pub const TIER_BUDGET: u32 = 3;
/// Attempts to find a parent with a matching connection
pub const LINK_ATTEMPTS: u32 = 50;
/// Rooms placed before optional ones stop being drawn
pub const BASE_ROOM_COUNT: usize = 5;
/// Upper bound on rooms in a level
pub const MAX_ROOM_COUNT: usize = 12;
/// Entrances beyond a room's entrance count are trimmed starting farthest from here
pub const TRIM_ANCHOR: (i32, i32) = (24, 24);
/// Node expansion budget for corridor carving
pub const CARVE_MAX_EXPANSIONS: usize = 10_000;
/// Repair rounds before falling back to hub-and-spoke carving
pub const CARVE_REPAIR_ROUNDS: u32 = 4;
/// Attempts to find a free random tile for a spawn
pub const SPAWN_ATTEMPTS: u32 = 500;
/// Floor-0 player spawn offset inside Marshall's room
pub const HOME_PLAYER_OFFSET: (i32, i32) = (4, 1);
/// Player spawn offset inside a regular entrance room
pub const ENTRANCE_PLAYER_OFFSET: (i32, i32) = (2, 2);
