//! One dungeon floor: the tile grid, the entities living on it, and the
//! bookkeeping the generator leaves behind.

use std::collections::HashSet;

use hecs::{Entity, World};
use log::{debug, info};
use rand::Rng;

use crate::components::{
    entity_coord, Actor, ActorKind, Animator, Chest, EnemyBrain, Flying, GroundItem, Health,
    Position, Transform, TurnTaker,
};
use crate::constants::*;
use crate::events::{EventQueue, GameEvent};
use crate::fov;
use crate::geometry::{tile_distance, tile_to_pixel, TileCoord};
use crate::grid::Grid;
use crate::items::{loot_roll, ItemKind};
use crate::spawning::{self, roll_enemy_for_floor, CarriedPlayer, EnemyDef};
use crate::systems::combat;
use crate::tile::SpriteRef;
use crate::time_system::TurnScheduler;

/// Themed band of floors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    MoleHill,
    BuggyBurrows,
    GnomeHome,
    SnakeyStronghold,
    MustelidMafia,
}

impl Zone {
    pub fn for_floor(floor: u32) -> Self {
        match floor {
            0 => Zone::MoleHill,
            1..=4 => Zone::BuggyBurrows,
            5..=8 => Zone::GnomeHome,
            9..=12 => Zone::SnakeyStronghold,
            _ => Zone::MustelidMafia,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Zone::MoleHill => "The Mole Hill",
            Zone::BuggyBurrows => "Buggy Burrows",
            Zone::GnomeHome => "The Gnome Home",
            Zone::SnakeyStronghold => "Snakey Stronghold",
            Zone::MustelidMafia => "The Mustelid Mafia",
        }
    }
}

/// A template stamped into the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedRoom {
    pub id: String,
    /// Top-left tile of the stamped tilemap
    pub origin: TileCoord,
    pub width: i32,
    pub height: i32,
}

impl PlacedRoom {
    pub fn contains(&self, (x, y): TileCoord) -> bool {
        x >= self.origin.0
            && y >= self.origin.1
            && x < self.origin.0 + self.width
            && y < self.origin.1 + self.height
    }

    /// Level tile at a room-relative offset
    pub fn at(&self, (dx, dy): TileCoord) -> TileCoord {
        (self.origin.0 + dx, self.origin.1 + dy)
    }
}

pub struct Level {
    pub floor: u32,
    pub zone: Zone,
    pub grid: Grid,
    pub world: World,
    pub enemies: Vec<Entity>,
    pub npcs: Vec<Entity>,
    /// Non-moving entities (chests)
    pub nmes: Vec<Entity>,
    pub items: Vec<Entity>,
    pub player_spawn: TileCoord,
    /// Tile carrying the exit overlay, if this floor has one
    pub exit: Option<TileCoord>,
    /// Tile carrying the entrance overlay, if this floor has one
    pub entry: Option<TileCoord>,
    /// Corridor entrances kept after trimming
    pub entrances: Vec<TileCoord>,
    pub rooms: Vec<PlacedRoom>,
    pub vision_range: i32,
    pub enemy_spawn_countdown: i32,
    pub tutorial_stage: u32,
}

impl Level {
    /// An all-wall level with no entities
    pub fn new(floor: u32, vision_range: i32) -> Self {
        Self {
            floor,
            zone: Zone::for_floor(floor),
            grid: Grid::new(),
            world: World::new(),
            enemies: Vec::new(),
            npcs: Vec::new(),
            nmes: Vec::new(),
            items: Vec::new(),
            player_spawn: (0, 0),
            exit: None,
            entry: None,
            entrances: Vec::new(),
            rooms: Vec::new(),
            vision_range,
            enemy_spawn_countdown: ENEMY_SPAWN_COUNTDOWN,
            tutorial_stage: 0,
        }
    }

    pub fn room(&self, id: &str) -> Option<&PlacedRoom> {
        self.rooms.iter().find(|room| room.id == id)
    }

    // =========================================================================
    // Entity placement
    // =========================================================================

    fn occupy(&mut self, entity: Entity, coord: TileCoord) {
        if let Some(tile) = self.grid.get_mut(coord.0, coord.1) {
            tile.occupant = Some(entity);
        }
    }

    pub fn add_player(&mut self, coord: TileCoord, carried: Option<CarriedPlayer>) -> Entity {
        let player = spawning::spawn_player(&mut self.world, coord, carried);
        self.occupy(player, coord);
        player
    }

    pub fn add_enemy<R: Rng>(&mut self, def: &EnemyDef, coord: TileCoord, next_turn: f64, rng: &mut R) -> Entity {
        let enemy = def.spawn(&mut self.world, coord, next_turn, rng);
        self.occupy(enemy, coord);
        self.enemies.push(enemy);
        enemy
    }

    pub fn add_npc(&mut self, kind: crate::components::NpcKind, coord: TileCoord) -> Entity {
        let npc = spawning::spawn_npc(&mut self.world, kind, coord);
        self.occupy(npc, coord);
        self.npcs.push(npc);
        npc
    }

    pub fn add_chest(&mut self, coord: TileCoord, tier: u32, loot: ItemKind) -> Entity {
        let chest = spawning::spawn_chest(&mut self.world, coord, tier, loot);
        self.occupy(chest, coord);
        self.nmes.push(chest);
        chest
    }

    /// Items lie under occupants and never claim the tile
    pub fn add_item(&mut self, coord: TileCoord, kind: ItemKind) -> Entity {
        let item = spawning::spawn_ground_item(&mut self.world, coord, kind);
        self.items.push(item);
        item
    }

    /// Move an entity's tile relationship. The transform is left to actions.
    pub fn relocate(&mut self, entity: Entity, to: TileCoord) {
        if let Some(from) = entity_coord(&self.world, entity) {
            if let Some(tile) = self.grid.get_mut(from.0, from.1) {
                if tile.occupant == Some(entity) {
                    tile.occupant = None;
                }
            }
        }
        if let Ok(mut position) = self.world.get::<&mut Position>(entity) {
            *position = Position::from(to);
        }
        self.occupy(entity, to);
    }

    /// Detach an entity from its tile without despawning it
    pub fn vacate(&mut self, entity: Entity) {
        if let Some(coord) = entity_coord(&self.world, entity) {
            if let Some(tile) = self.grid.get_mut(coord.0, coord.1) {
                if tile.occupant == Some(entity) {
                    tile.occupant = None;
                }
            }
        }
    }

    pub fn occupant_at(&self, coord: TileCoord) -> Option<Entity> {
        self.grid.get(coord.0, coord.1).and_then(|tile| tile.occupant)
    }

    pub fn actor_kind(&self, entity: Entity) -> Option<ActorKind> {
        self.world.get::<&Actor>(entity).ok().map(|actor| actor.kind)
    }

    /// Uncollected items lying on a tile
    pub fn items_at(&self, coord: TileCoord) -> Vec<Entity> {
        self.items
            .iter()
            .copied()
            .filter(|&item| {
                entity_coord(&self.world, item) == Some(coord)
                    && self.world.get::<&GroundItem>(item).is_ok_and(|ground| !ground.collected)
            })
            .collect()
    }

    /// Walkable and unoccupied
    pub fn is_free(&self, coord: TileCoord) -> bool {
        self.grid
            .get(coord.0, coord.1)
            .is_some_and(|tile| tile.is_walkable() && tile.occupant.is_none())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Tiles `client` may not path through. `target` stays enterable so a
    /// route can end on an enemy to attack or an NPC to talk to. Enemies and
    /// NPCs on tiles hidden from the player do not block.
    pub fn non_walkables(&self, client: Entity, target: Option<TileCoord>, player: Entity) -> HashSet<TileCoord> {
        let client_is_player = client == player;
        let flying = self.world.get::<&Flying>(client).is_ok();
        let mut blocked = HashSet::new();

        for (x, y) in self.grid.coords() {
            let Some(tile) = self.grid.get(x, y) else {
                continue;
            };
            let passable = tile.is_walkable() || (flying && tile.is_flyable());
            if !passable || (client_is_player && !tile.revealed) {
                blocked.insert((x, y));
                continue;
            }
            let Some(occupant) = tile.occupant else {
                continue;
            };
            if occupant == client || target == Some((x, y)) {
                continue;
            }
            let blocks = match self.actor_kind(occupant) {
                Some(ActorKind::Player) => !client_is_player,
                Some(ActorKind::Enemy(_)) | Some(ActorKind::Npc(_)) => tile.visible,
                Some(ActorKind::Chest) => true,
                None => false,
            };
            if blocks {
                blocked.insert((x, y));
            }
        }
        blocked
    }

    /// Recompute sight around `origin`
    pub fn reshade(&mut self, origin: TileCoord) {
        fov::reshade(&mut self.grid, origin, self.vision_range);
    }

    pub fn line_of_sight(&self, from: TileCoord, to: TileCoord) -> bool {
        fov::line_of_sight(&self.grid, from, to)
    }

    pub fn is_visible(&self, coord: TileCoord) -> bool {
        self.grid.is_visible(coord.0, coord.1)
    }

    // =========================================================================
    // Spawning over time
    // =========================================================================

    /// Random free floor tile farther than 1.5 sight ranges from `avoid`
    pub fn random_spawn_tile<R: Rng>(&self, rng: &mut R, avoid: TileCoord) -> Option<TileCoord> {
        let min_distance = self.vision_range as f32 * SPAWN_DISTANCE_FACTOR;
        (0..SPAWN_ATTEMPTS)
            .map(|_| (rng.gen_range(0..self.grid.width), rng.gen_range(0..self.grid.height)))
            .find(|&coord| {
                self.grid.get(coord.0, coord.1).is_some_and(|tile| tile.kind.is_floor())
                    && self.is_free(coord)
                    && tile_distance(coord, avoid) > min_distance
            })
    }

    /// Spawn one floor-appropriate enemy away from `avoid`
    pub fn spawn_random_enemy<R: Rng>(&mut self, rng: &mut R, avoid: TileCoord, base_turn: f64) -> Option<Entity> {
        let def = roll_enemy_for_floor(self.floor, rng)?;
        let coord = self.random_spawn_tile(rng, avoid)?;
        let next_turn = base_turn + rng.gen_range(0.0..1.0);
        let enemy = self.add_enemy(def, coord, next_turn, rng);
        debug!("Spawned {} at {:?} (next turn {:.2})", def.name, coord, next_turn);
        Some(enemy)
    }

    /// Once-per-turn countdown toward the next timed enemy spawn
    pub fn turn_ping<R: Rng>(&mut self, rng: &mut R, player_pos: TileCoord, base_turn: f64) -> Option<Entity> {
        if self.enemy_spawn_countdown > 0 {
            self.enemy_spawn_countdown -= 1;
            return None;
        }
        self.enemy_spawn_countdown =
            (ENEMY_SPAWN_COUNTDOWN_BASE - self.floor as i32).max(ENEMY_SPAWN_COUNTDOWN_MIN);
        self.spawn_random_enemy(rng, player_pos, base_turn)
    }

    // =========================================================================
    // Cleanup
    // =========================================================================

    fn death_snapshot(&self, entity: Entity) -> (glam::Vec2, SpriteRef) {
        let transform = self
            .world
            .get::<&Transform>(entity)
            .map(|t| *t)
            .unwrap_or_else(|_| Transform::at_tile(entity_coord(&self.world, entity).unwrap_or((0, 0))));
        let sprite = self
            .world
            .get::<&Animator>(entity)
            .map(|animator| animator.sprite(&transform))
            .unwrap_or_else(|_| SpriteRef::new(crate::tile::SpriteSheet::Missing, 0, 0));
        (transform.position, sprite)
    }

    fn is_dead(&self, entity: Entity) -> bool {
        self.world.get::<&Health>(entity).is_ok_and(|health| health.is_dead())
    }

    /// Remove everything that died or was used up this frame. Dead enemies
    /// and NPCs leave the turn order and free their tile; enemies also pay
    /// out xp and may drop loot. Opened chests leave their loot behind.
    pub fn remove_dead<R: Rng>(
        &mut self,
        scheduler: &mut TurnScheduler,
        player: Entity,
        events: &mut EventQueue,
        rng: &mut R,
    ) {
        puffin::profile_function!();

        let dead_enemies: Vec<Entity> = self.enemies.iter().copied().filter(|&e| self.is_dead(e)).collect();
        for enemy in dead_enemies {
            let xp = self.world.get::<&EnemyBrain>(enemy).map(|brain| brain.xp_value).unwrap_or(0);
            let coord = entity_coord(&self.world, enemy);
            let (position, sprite) = self.death_snapshot(enemy);
            let kind = self.actor_kind(enemy).unwrap_or(ActorKind::Chest);

            scheduler.remove(enemy);
            self.vacate(enemy);
            self.enemies.retain(|&e| e != enemy);
            let _ = self.world.despawn(enemy);

            combat::add_xp(&mut self.world, player, xp, events);
            self.enemy_spawn_countdown -= ENEMY_KILL_COUNTDOWN_PENALTY;
            if let Some(coord) = coord {
                if rng.gen_range(0..ENEMY_LOOT_ODDS) == 0 {
                    let loot = loot_roll(rng, 1);
                    self.add_item(coord, loot);
                }
            }
            events.push(GameEvent::EntityDied { entity: enemy, kind, position, sprite });
            info!("{:?} died on floor {}", kind, self.floor);
        }

        let dead_npcs: Vec<Entity> = self.npcs.iter().copied().filter(|&e| self.is_dead(e)).collect();
        for npc in dead_npcs {
            let (position, sprite) = self.death_snapshot(npc);
            let kind = self.actor_kind(npc).unwrap_or(ActorKind::Chest);
            scheduler.remove(npc);
            self.vacate(npc);
            self.npcs.retain(|&e| e != npc);
            let _ = self.world.despawn(npc);
            events.push(GameEvent::EntityDied { entity: npc, kind, position, sprite });
            info!("{:?} died on floor {}", kind, self.floor);
        }

        let opened: Vec<(Entity, Chest)> = self
            .nmes
            .iter()
            .filter_map(|&e| self.world.get::<&Chest>(e).ok().filter(|chest| chest.opened).map(|chest| (e, *chest)))
            .collect();
        for (chest, contents) in opened {
            let coord = entity_coord(&self.world, chest);
            self.vacate(chest);
            self.nmes.retain(|&e| e != chest);
            let _ = self.world.despawn(chest);
            if let Some(coord) = coord {
                self.add_item(coord, contents.loot);
            }
        }

        let collected: Vec<Entity> = self
            .items
            .iter()
            .copied()
            .filter(|&e| self.world.get::<&GroundItem>(e).is_ok_and(|item| item.collected))
            .collect();
        for item in collected {
            self.items.retain(|&e| e != item);
            let _ = self.world.despawn(item);
        }
    }

    /// Entities that take turns, for building a scheduler
    pub fn schedulables(&self) -> Vec<(Entity, f64)> {
        self.world
            .query::<&TurnTaker>()
            .iter()
            .map(|(entity, turn)| (entity, turn.next_turn))
            .collect()
    }

    /// Shift every schedulable so the earliest acts at turn zero
    pub fn rebase_turns(&mut self) {
        let earliest = self
            .world
            .query::<&TurnTaker>()
            .iter()
            .map(|(_, turn)| turn.next_turn)
            .fold(f64::INFINITY, f64::min);
        if !earliest.is_finite() {
            return;
        }
        for (_, turn) in self.world.query_mut::<&mut TurnTaker>() {
            turn.next_turn -= earliest;
        }
    }

    /// Pixel position of an entity's tile
    pub fn pixel_of(&self, entity: Entity) -> Option<glam::Vec2> {
        entity_coord(&self.world, entity).map(tile_to_pixel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{NpcKind, PlayerData};
    use crate::spawning::enemies;
    use crate::tile::{Overlay, TileKind};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn open_level() -> Level {
        let mut level = Level::new(1, VISION_RANGE);
        for y in 1..LEVEL_SIZE - 1 {
            for x in 1..LEVEL_SIZE - 1 {
                level.grid.set_kind(x, y, TileKind::floor());
            }
        }
        level
    }

    #[test]
    fn test_zone_bands() {
        assert_eq!(Zone::for_floor(0), Zone::MoleHill);
        assert_eq!(Zone::for_floor(4), Zone::BuggyBurrows);
        assert_eq!(Zone::for_floor(5).name(), "The Gnome Home");
        assert_eq!(Zone::for_floor(12), Zone::SnakeyStronghold);
        assert_eq!(Zone::for_floor(40), Zone::MustelidMafia);
    }

    #[test]
    fn test_relocate_moves_occupant() {
        let mut level = open_level();
        let npc = level.add_npc(NpcKind::Maxwell, (4, 4));
        level.relocate(npc, (5, 4));
        assert_eq!(level.occupant_at((4, 4)), None);
        assert_eq!(level.occupant_at((5, 4)), Some(npc));
        assert_eq!(entity_coord(&level.world, npc), Some((5, 4)));
    }

    #[test]
    fn test_player_blocks_unrevealed_tiles() {
        let mut level = open_level();
        let player = level.add_player((10, 10), None);
        let npc = level.add_npc(NpcKind::Michael, (20, 20));
        let for_player = level.non_walkables(player, None, player);
        assert!(for_player.contains(&(11, 10)));
        let for_npc = level.non_walkables(npc, None, player);
        assert!(!for_npc.contains(&(11, 10)));
        // The player always blocks other entities
        assert!(for_npc.contains(&(10, 10)));
    }

    #[test]
    fn test_target_stays_enterable() {
        let mut level = open_level();
        let player = level.add_player((10, 10), None);
        let mut rng = StdRng::seed_from_u64(1);
        let worm = level.add_enemy(&enemies::WIGGLY_WORM, (12, 10), 0.5, &mut rng);
        level.reshade((10, 10));
        let blocked = level.non_walkables(player, None, player);
        assert!(blocked.contains(&(12, 10)));
        let blocked = level.non_walkables(player, Some((12, 10)), player);
        assert!(!blocked.contains(&(12, 10)));
        // The worm never blocks itself, and the player is enterable when it is the target
        let for_worm = level.non_walkables(worm, Some((10, 10)), player);
        assert!(!for_worm.contains(&(12, 10)));
        assert!(!for_worm.contains(&(10, 10)));
    }

    #[test]
    fn test_hidden_enemies_do_not_block() {
        let mut level = open_level();
        let player = level.add_player((5, 5), None);
        let mut rng = StdRng::seed_from_u64(2);
        level.add_enemy(&enemies::WIGGLY_WORM, (30, 30), 0.5, &mut rng);
        let npc = level.add_npc(NpcKind::Magnolia, (40, 40));
        let blocked = level.non_walkables(npc, None, player);
        assert!(!blocked.contains(&(30, 30)));
    }

    #[test]
    fn test_overlay_blocks_path() {
        let mut level = open_level();
        let player = level.add_player((5, 5), None);
        if let Some(tile) = level.grid.get_mut(6, 5) {
            tile.overlay = Some(Overlay::Statue);
        }
        let npc = level.add_npc(NpcKind::Minnie, (8, 8));
        assert!(level.non_walkables(npc, None, player).contains(&(6, 5)));
    }

    #[test]
    fn test_turn_ping_countdown_and_spawn() {
        let mut level = open_level();
        let mut rng = StdRng::seed_from_u64(5);
        level.enemy_spawn_countdown = 1;
        assert!(level.turn_ping(&mut rng, (5, 5), 3.0).is_none());
        assert_eq!(level.enemy_spawn_countdown, 0);
        let spawned = level.turn_ping(&mut rng, (5, 5), 3.0).unwrap();
        assert_eq!(level.enemy_spawn_countdown, ENEMY_SPAWN_COUNTDOWN_BASE - 1);
        let coord = entity_coord(&level.world, spawned).unwrap();
        assert!(tile_distance(coord, (5, 5)) > VISION_RANGE as f32 * SPAWN_DISTANCE_FACTOR);
        let next_turn = level.world.get::<&TurnTaker>(spawned).unwrap().next_turn;
        assert!((3.0..4.0).contains(&next_turn));
    }

    #[test]
    fn test_floor_zero_never_spawns() {
        let mut level = open_level();
        level.floor = 0;
        let mut rng = StdRng::seed_from_u64(5);
        assert!(level.spawn_random_enemy(&mut rng, (5, 5), 0.0).is_none());
    }

    #[test]
    fn test_remove_dead_clears_everything() {
        let mut level = open_level();
        let mut rng = StdRng::seed_from_u64(8);
        let player = level.add_player((5, 5), None);
        let worm = level.add_enemy(&enemies::WIGGLY_WORM, (6, 5), 0.3, &mut rng);
        let npc = level.add_npc(NpcKind::Maxwell, (7, 7));
        let mut scheduler = TurnScheduler::new();
        scheduler.initialize(&level);
        assert_eq!(scheduler.len(), 3);

        level.world.get::<&mut Health>(worm).unwrap().current = 0;
        level.world.get::<&mut Health>(npc).unwrap().current = -2;
        let mut events = EventQueue::new();
        level.remove_dead(&mut scheduler, player, &mut events, &mut rng);

        assert!(level.enemies.is_empty());
        assert!(level.npcs.is_empty());
        assert_eq!(level.occupant_at((6, 5)), None);
        assert_eq!(level.occupant_at((7, 7)), None);
        assert!(!scheduler.contains(worm));
        assert!(!scheduler.contains(npc));
        assert!(scheduler.contains(player));
        assert!(!level.world.contains(worm));
        assert!(level.world.get::<&PlayerData>(player).unwrap().xp > 0
            || level.world.get::<&PlayerData>(player).unwrap().skill_points > 0);
        assert_eq!(level.enemy_spawn_countdown, ENEMY_SPAWN_COUNTDOWN - ENEMY_KILL_COUNTDOWN_PENALTY);
        let deaths = events.iter().filter(|e| matches!(e, GameEvent::EntityDied { .. })).count();
        assert_eq!(deaths, 2);
    }

    #[test]
    fn test_opened_chest_drops_loot() {
        let mut level = open_level();
        let mut rng = StdRng::seed_from_u64(8);
        let player = level.add_player((5, 5), None);
        let chest = level.add_chest((9, 9), 1, ItemKind::StrengthTonic);
        level.world.get::<&mut Chest>(chest).unwrap().opened = true;
        let mut scheduler = TurnScheduler::new();
        level.remove_dead(&mut scheduler, player, &mut EventQueue::new(), &mut rng);
        assert!(level.nmes.is_empty());
        assert_eq!(level.occupant_at((9, 9)), None);
        let dropped = level.items_at((9, 9));
        assert_eq!(dropped.len(), 1);
        assert_eq!(level.world.get::<&GroundItem>(dropped[0]).unwrap().kind, ItemKind::StrengthTonic);
    }

    #[test]
    fn test_rebase_turns() {
        let mut level = open_level();
        let mut rng = StdRng::seed_from_u64(3);
        let a = level.add_enemy(&enemies::WIGGLY_WORM, (3, 3), 12.5, &mut rng);
        let b = level.add_enemy(&enemies::SPIDERLING, (4, 3), 13.0, &mut rng);
        level.rebase_turns();
        assert_eq!(level.world.get::<&TurnTaker>(a).unwrap().next_turn, 0.0);
        assert_eq!(level.world.get::<&TurnTaker>(b).unwrap().next_turn, 0.5);
    }
}
