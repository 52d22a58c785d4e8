use glam::Vec2;
use hecs::Entity;

use crate::constants::{ATTACK_FRAME_TIME, IDLE_FRAME_TIME, MOVE_FRAME_TIME};
use crate::geometry::{tile_to_pixel, TileCoord};
use crate::items::ItemKind;
use crate::tile::{SpriteRef, SpriteSheet};

/// Position component - tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn coord(&self) -> TileCoord {
        (self.x, self.y)
    }
}

impl From<TileCoord> for Position {
    fn from((x, y): TileCoord) -> Self {
        Self { x, y }
    }
}

/// Pixel-space presentation state. Only actions mutate it.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec2,
    /// Degrees
    pub rotation: f32,
    pub scale: f32,
    pub alpha: f32,
    pub left_facing: bool,
}

impl Transform {
    pub fn at_tile(coord: TileCoord) -> Self {
        Self {
            position: tile_to_pixel(coord),
            rotation: 0.0,
            scale: 1.0,
            alpha: 1.0,
            left_facing: true,
        }
    }

    pub fn snap_to(&mut self, coord: TileCoord) {
        self.position = tile_to_pixel(coord);
    }
}

// =============================================================================
// Identity
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NpcKind {
    Michael,
    Minnie,
    Maxwell,
    Magnolia,
}

impl NpcKind {
    pub fn name(&self) -> &'static str {
        match self {
            NpcKind::Michael => "Michael",
            NpcKind::Minnie => "Minnie",
            NpcKind::Maxwell => "Maxwell",
            NpcKind::Magnolia => "Magnolia",
        }
    }

    pub fn sheet(&self) -> SpriteSheet {
        match self {
            NpcKind::Michael => SpriteSheet::Michael,
            NpcKind::Minnie => SpriteSheet::Minnie,
            NpcKind::Maxwell => SpriteSheet::Maxwell,
            NpcKind::Magnolia => SpriteSheet::Magnolia,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    WigglyWorm,
    Spiderling,
}

/// What an entity is; behavior dispatches on this
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    Player,
    Npc(NpcKind),
    Enemy(EnemyKind),
    Chest,
}

#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub kind: ActorKind,
}

impl Actor {
    pub fn new(kind: ActorKind) -> Self {
        Self { kind }
    }

    pub fn is_player(&self) -> bool {
        self.kind == ActorKind::Player
    }
}

/// Can cross pits
#[derive(Debug, Clone, Copy)]
pub struct Flying;

// =============================================================================
// Capabilities
// =============================================================================

/// Schedulable: owns a place in the turn order
#[derive(Debug, Clone, Copy)]
pub struct TurnTaker {
    /// Fractional timestamp of the next turn; lower acts sooner
    pub next_turn: f64,
    /// Turn cost of one tile of movement
    pub move_time: f64,
}

impl TurnTaker {
    pub fn new(next_turn: f64, move_time: f64) -> Self {
        Self { next_turn, move_time }
    }
}

/// Damageable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
    /// Turns until the next regen tick
    pub regen_time: i32,
    pub regen_max: i32,
    /// Remaining turns of banked regeneration
    pub regen_points: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self {
            current: max,
            max,
            regen_time: 0,
            regen_max: 0,
            regen_points: 0,
        }
    }

    pub fn with_regen(max: i32, regen_max: i32) -> Self {
        Self {
            regen_time: regen_max,
            regen_max,
            ..Self::new(max)
        }
    }

    pub fn is_dead(&self) -> bool {
        self.current < 1
    }

    pub fn percentage(&self) -> f32 {
        (self.current as f32 / self.max as f32).clamp(0.0, 1.0)
    }

    pub fn heal(&mut self, amount: i32) {
        self.current = (self.current + amount).min(self.max);
    }
}

/// Base melee stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Melee {
    /// Turn cost of an attack
    pub time: f64,
    pub damage: i32,
}

impl Melee {
    pub fn new(time: f64, damage: i32) -> Self {
        Self { time, damage }
    }
}

/// Equipped weapon bonus
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weapon {
    pub kind: ItemKind,
    pub damage: i32,
}

/// Pather: current navigation goal and cached route
#[derive(Debug, Clone, Default)]
pub struct Pather {
    pub target: Option<TileCoord>,
    pub path: Option<Vec<TileCoord>>,
}

impl Pather {
    pub fn clear(&mut self) {
        self.target = None;
        self.path = None;
    }

    pub fn next_step(&self) -> Option<TileCoord> {
        self.path.as_ref().and_then(|path| path.first().copied())
    }
}

// =============================================================================
// Brains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiState {
    Sleeping,
    Wandering,
    Attacking,
    Chasing,
}

#[derive(Debug, Clone, Copy)]
pub struct EnemyBrain {
    pub kind: EnemyKind,
    pub state: AiState,
    /// Turns spent chasing since the player left sight
    pub chase_time: u32,
    /// Player is in clear line of sight
    pub player_lock: bool,
    pub xp_value: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct NpcBrain {
    pub kind: NpcKind,
    /// Where the NPC heads once the tutorial sends it home
    pub home: Option<TileCoord>,
}

/// Timed status effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Strength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub magnitude: i32,
    pub turns_left: u32,
}

/// Player-only state
#[derive(Debug, Clone, Default)]
pub struct PlayerData {
    pub xp: u32,
    pub skill_points: u32,
    pub inventory: Vec<ItemKind>,
    pub effects: Vec<StatusEffect>,
    pub weapon: Option<Weapon>,
    /// Tile at the start of the player's latest turn; enemies chase it
    pub last_position: TileCoord,
    /// Keep walking even with enemies in sight
    pub force_move: bool,
    /// Inventory slot queued for use on the next turn
    pub pending_use: Option<usize>,
    /// Shove, rather than bite, the enemy at the end of the current route
    pub shove_next: bool,
}

impl PlayerData {
    pub fn melee_bonus(&self) -> i32 {
        let weapon = self.weapon.map_or(0, |w| w.damage);
        let effects: i32 = self
            .effects
            .iter()
            .filter(|effect| effect.kind == StatusKind::Strength)
            .map(|effect| effect.magnitude)
            .sum();
        weapon + effects
    }
}

// =============================================================================
// Non-moving entities and items
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Chest {
    pub tier: u32,
    pub loot: ItemKind,
    pub opened: bool,
}

/// Loot lying on a tile
#[derive(Debug, Clone, Copy)]
pub struct GroundItem {
    pub kind: ItemKind,
    pub collected: bool,
}

// =============================================================================
// Animation
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimState {
    Idle,
    Move,
    Jump,
    Attack,
}

/// Frame cycler shared by every animated actor. Sheets lay out
/// idle at (0,0) (1,0) (0,1), walking at row 2, attacks at row 3, jump at (1,1).
#[derive(Debug, Clone, Copy)]
pub struct Animator {
    pub sheet: SpriteSheet,
    pub state: AnimState,
    pub elapsed: f32,
    pub frame: usize,
}

const IDLE_CYCLE: [(u8, u8); 4] = [(0, 0), (1, 0), (0, 1), (1, 0)];
const MOVE_CYCLE: [(u8, u8); 2] = [(0, 2), (1, 2)];
const ATTACK_CYCLE: [(u8, u8); 4] = [(0, 0), (0, 3), (1, 3), (0, 0)];
const JUMP_CELL: (u8, u8) = (1, 1);

impl Animator {
    pub fn new(sheet: SpriteSheet) -> Self {
        Self {
            sheet,
            state: AnimState::Idle,
            elapsed: 0.0,
            frame: 0,
        }
    }

    pub fn set_state(&mut self, state: AnimState) {
        if self.state != state {
            self.state = state;
            self.elapsed = 0.0;
            self.frame = 0;
        }
    }

    /// Advance the cycle by `dt` seconds. Attacks hold their last frame.
    pub fn tick(&mut self, dt: f32) {
        let (frame_time, len, loops) = match self.state {
            AnimState::Idle => (IDLE_FRAME_TIME, IDLE_CYCLE.len(), true),
            AnimState::Move => (MOVE_FRAME_TIME, MOVE_CYCLE.len(), true),
            AnimState::Attack => (ATTACK_FRAME_TIME, ATTACK_CYCLE.len(), false),
            AnimState::Jump => return,
        };
        self.elapsed += dt;
        while self.elapsed >= frame_time {
            self.elapsed -= frame_time;
            self.frame = if loops {
                (self.frame + 1) % len
            } else {
                (self.frame + 1).min(len - 1)
            };
        }
    }

    pub fn cell(&self) -> (u8, u8) {
        match self.state {
            AnimState::Idle => IDLE_CYCLE[self.frame % IDLE_CYCLE.len()],
            AnimState::Move => MOVE_CYCLE[self.frame % MOVE_CYCLE.len()],
            AnimState::Attack => ATTACK_CYCLE[self.frame % ATTACK_CYCLE.len()],
            AnimState::Jump => JUMP_CELL,
        }
    }

    pub fn sprite(&self, transform: &Transform) -> SpriteRef {
        let (col, row) = self.cell();
        let mut sprite = SpriteRef::new(self.sheet, col, row);
        sprite.flip_h = transform.left_facing;
        sprite.rotation = transform.rotation;
        sprite.scale = transform.scale;
        sprite.alpha = transform.alpha;
        sprite
    }
}

/// Look up the tile an entity stands on
pub fn entity_coord(world: &hecs::World, entity: Entity) -> Option<TileCoord> {
    world.get::<&Position>(entity).ok().map(|pos| pos.coord())
}
