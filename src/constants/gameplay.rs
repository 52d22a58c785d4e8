//! Core gameplay constants (player stats, XP, vision, spawning).

/// Default sight radius in tiles
pub const VISION_RANGE: i32 = 5;
/// Degrees between reshade rays
pub const RESHADE_ANGLE_STEP: usize = 5;
/// Node expansion budget for live entity pathfinding
pub const PATH_MAX_EXPANSIONS: usize = 2000;

/// Player starting and maximum health
pub const PLAYER_MAX_HEALTH: i32 = 20;
/// Turns between regen ticks
pub const PLAYER_REGEN_TIME: i32 = 10;
/// Player base melee damage
pub const PLAYER_MELEE_DAMAGE: i32 = 7;
/// XP converted into one skill point
pub const XP_PER_SKILL_POINT: u32 = 20;
/// Regen points granted per XP gained
pub const REGEN_POINTS_PER_XP: i32 = 10;

/// NPC health
pub const NPC_MAX_HEALTH: i32 = 10;
/// Michael greets the player within this distance
pub const NPC_GREET_DISTANCE: f32 = 3.0;

/// Turns before the first timed enemy spawn
pub const ENEMY_SPAWN_COUNTDOWN: i32 = 75;
/// Countdown reset value before subtracting the floor number
pub const ENEMY_SPAWN_COUNTDOWN_BASE: i32 = 50;
/// Shortest countdown reset on deep floors
pub const ENEMY_SPAWN_COUNTDOWN_MIN: i32 = 10;
/// Countdown reduction per enemy slain
pub const ENEMY_KILL_COUNTDOWN_PENALTY: i32 = 5;
/// Spawns must be farther than vision range times this from the player
pub const SPAWN_DISTANCE_FACTOR: f32 = 1.5;
/// Wandering enemies pick targets within this many tiles per axis
pub const WANDER_RADIUS: i32 = 10;
/// Turns a chasing enemy keeps following before giving up
pub const CHASE_GIVE_UP_TURNS: u32 = 5;
/// Sleeping enemies wake when a roll up to their distance lands below this
pub const WAKE_THRESHOLD: i32 = 2;
/// Enemies melee when the heuristic distance to the player is below this
pub const MELEE_REACH: f32 = 2.0;
