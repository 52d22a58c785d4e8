//! Data-driven entity spawning.
//!
//! Enemy types are plain definitions so adding one never touches spawning
//! code. Every spawn helper inserts the full component bundle for its kind.

use hecs::{Entity, World};
use rand::Rng;

use crate::components::{
    AiState, Actor, ActorKind, Animator, Chest, EnemyBrain, EnemyKind, Flying,
    GroundItem, Health, Melee, NpcBrain, NpcKind, Pather, PlayerData, Position, Transform,
    TurnTaker,
};
use crate::constants::*;
use crate::geometry::TileCoord;
use crate::items::ItemKind;
use crate::tile::SpriteSheet;

/// Definition of an enemy type - all the data needed to spawn one
#[derive(Debug, Clone)]
pub struct EnemyDef {
    pub kind: EnemyKind,
    pub name: &'static str,
    pub sheet: SpriteSheet,
    pub health: i32,
    pub melee: Melee,
    /// Turn cost of one tile of movement
    pub move_time: f64,
    /// Inclusive xp range granted on death
    pub xp: (u32, u32),
    pub flying: bool,
}

impl EnemyDef {
    /// Spawn this enemy type asleep on `coord`
    pub fn spawn<R: Rng>(&self, world: &mut World, coord: TileCoord, next_turn: f64, rng: &mut R) -> Entity {
        let xp_value = rng.gen_range(self.xp.0..=self.xp.1);
        let entity = world.spawn((
            Position::from(coord),
            Transform::at_tile(coord),
            Actor::new(ActorKind::Enemy(self.kind)),
            TurnTaker::new(next_turn, self.move_time),
            Health::new(self.health),
            self.melee,
            Pather::default(),
            Animator::new(self.sheet),
            EnemyBrain {
                kind: self.kind,
                state: AiState::Sleeping,
                chase_time: 0,
                player_lock: false,
                xp_value,
            },
        ));
        if self.flying {
            let _ = world.insert_one(entity, Flying);
        }
        entity
    }
}

/// Predefined enemy types
pub mod enemies {
    use super::*;

    pub const WIGGLY_WORM: EnemyDef = EnemyDef {
        kind: EnemyKind::WigglyWorm,
        name: "Wiggly Worm",
        sheet: SpriteSheet::WigglyWorm,
        health: 10,
        melee: Melee { time: 1.0, damage: 3 },
        move_time: 1.0,
        xp: (3, 6),
        flying: false,
    };

    pub const SPIDERLING: EnemyDef = EnemyDef {
        kind: EnemyKind::Spiderling,
        name: "Spiderling",
        sheet: SpriteSheet::Spiderling,
        health: 6,
        melee: Melee { time: 1.0, damage: 2 },
        move_time: 0.5,
        xp: (2, 4),
        flying: false,
    };
}

pub fn enemy_def(kind: EnemyKind) -> &'static EnemyDef {
    match kind {
        EnemyKind::WigglyWorm => &enemies::WIGGLY_WORM,
        EnemyKind::Spiderling => &enemies::SPIDERLING,
    }
}

/// Pick the enemy type for a spawn on `floor`. The mole hill has none.
pub fn roll_enemy_for_floor<R: Rng>(floor: u32, rng: &mut R) -> Option<&'static EnemyDef> {
    match floor {
        0 => None,
        1 => Some(&enemies::WIGGLY_WORM),
        2 => Some(if rng.gen_bool(0.5) {
            &enemies::WIGGLY_WORM
        } else {
            &enemies::SPIDERLING
        }),
        _ => Some(if rng.gen_bool(0.4) {
            &enemies::WIGGLY_WORM
        } else {
            &enemies::SPIDERLING
        }),
    }
}

/// Player stats carried from one floor to the next
#[derive(Debug, Clone)]
pub struct CarriedPlayer {
    pub health: Health,
    pub melee: Melee,
    pub data: PlayerData,
}

/// Spawn Marshall, fresh or carrying stats from the previous floor
pub fn spawn_player(world: &mut World, coord: TileCoord, carried: Option<CarriedPlayer>) -> Entity {
    let CarriedPlayer { health, melee, mut data } = carried.unwrap_or_else(|| CarriedPlayer {
        health: Health::with_regen(PLAYER_MAX_HEALTH, PLAYER_REGEN_TIME),
        melee: Melee::new(1.0, PLAYER_MELEE_DAMAGE),
        data: PlayerData::default(),
    });
    data.last_position = coord;
    data.force_move = false;
    data.pending_use = None;
    data.shove_next = false;
    world.spawn((
        Position::from(coord),
        Transform::at_tile(coord),
        Actor::new(ActorKind::Player),
        TurnTaker::new(0.0, 1.0),
        health,
        melee,
        Pather::default(),
        Animator::new(SpriteSheet::Marshall),
        data,
    ))
}

/// Spawn one of the family moles. Their turn offsets order the opening
/// tutorial: Minnie acts before the player, the others just after.
pub fn spawn_npc(world: &mut World, kind: NpcKind, coord: TileCoord) -> Entity {
    let next_turn = match kind {
        NpcKind::Minnie => -0.1,
        NpcKind::Michael => 0.1,
        NpcKind::Maxwell => 0.2,
        NpcKind::Magnolia => 0.3,
    };
    world.spawn((
        Position::from(coord),
        Transform::at_tile(coord),
        Actor::new(ActorKind::Npc(kind)),
        TurnTaker::new(next_turn, 1.0),
        Health::new(NPC_MAX_HEALTH),
        Melee::new(1.0, 1),
        Pather::default(),
        Animator::new(kind.sheet()),
        NpcBrain { kind, home: None },
    ))
}

pub fn spawn_chest(world: &mut World, coord: TileCoord, tier: u32, loot: ItemKind) -> Entity {
    world.spawn((
        Position::from(coord),
        Transform::at_tile(coord),
        Actor::new(ActorKind::Chest),
        Chest {
            tier,
            loot,
            opened: false,
        },
    ))
}

pub fn spawn_ground_item(world: &mut World, coord: TileCoord, kind: ItemKind) -> Entity {
    world.spawn((
        Position::from(coord),
        Transform::at_tile(coord),
        GroundItem {
            kind,
            collected: false,
        },
    ))
}
