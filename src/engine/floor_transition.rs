//! Moving the player between floors.
//!
//! Leaving a floor parks its `Level` in the session cache with the player
//! taken out of its world. Coming back reuses the parked level as it was
//! left; every other floor is generated from the session seed.

use hecs::Entity;
use log::{debug, info};

use crate::components::{Health, Melee, PlayerData};
use crate::dungeon_gen::DungeonGenerator;
use crate::error::GameResult;
use crate::events::GameEvent;
use crate::geometry::TileCoord;
use crate::level::Level;
use crate::spawning::CarriedPlayer;

use super::GameSession;

impl GameSession {
    /// Swap in floor `to`, carrying the player's stats across
    pub fn enter_floor(&mut self, to: u32) -> GameResult<()> {
        puffin::profile_function!();

        let from = self.level.floor;
        let ascending = to < from;
        let mut next = match self.levels.remove(&to) {
            Some(mut cached) => {
                debug!("Reusing cached floor {}", to);
                cached.rebase_turns();
                cached
            }
            None => DungeonGenerator::generate(&self.library, to, self.config.seed, self.config.vision_range)?,
        };

        let carried = take_player(&mut self.level, self.player);
        let arrival = if ascending {
            next.exit.unwrap_or(next.player_spawn)
        } else {
            next.player_spawn
        };
        let spawn = free_tile_near(&next, arrival);
        self.player = next.add_player(spawn, carried);
        next.reshade(spawn);

        let previous = std::mem::replace(&mut self.level, next);
        self.levels.insert(from, previous);

        self.scheduler.initialize(&self.level);
        if let Some(pixel) = self.level.pixel_of(self.player) {
            self.camera.center_on(pixel);
        }
        self.events.push(GameEvent::LevelEntered {
            floor: to,
            zone: self.level.zone.name(),
        });
        info!("Entered floor {} ({}) from floor {}", to, self.level.zone.name(), from);
        Ok(())
    }
}

/// Pull the player out of a level, keeping what survives a floor change
fn take_player(level: &mut Level, player: Entity) -> Option<CarriedPlayer> {
    let carried = {
        let health = *level.world.get::<&Health>(player).ok()?;
        let melee = *level.world.get::<&Melee>(player).ok()?;
        let data = (*level.world.get::<&PlayerData>(player).ok()?).clone();
        CarriedPlayer { health, melee, data }
    };
    level.vacate(player);
    let _ = level.world.despawn(player);
    Some(carried)
}

/// `coord` itself when free, else the first free neighbor
fn free_tile_near(level: &Level, coord: TileCoord) -> TileCoord {
    if level.is_free(coord) {
        return coord;
    }
    (-1..=1)
        .flat_map(|dy| (-1..=1).map(move |dx| (coord.0 + dx, coord.1 + dy)))
        .find(|&near| level.is_free(near))
        .unwrap_or(coord)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{entity_coord, TurnTaker};
    use crate::config::GameConfig;
    use crate::items::ItemKind;

    fn session() -> GameSession {
        GameSession::new(GameConfig::default()).unwrap()
    }

    #[test]
    fn test_descending_generates_and_caches() {
        let mut s = session();
        let old_player = s.player;
        s.enter_floor(1).unwrap();

        assert_eq!(s.floor(), 1);
        assert!(s.has_cached(0));
        assert!(!s.levels[&0].world.contains(old_player));
        assert_eq!(entity_coord(&s.level.world, s.player), Some(s.level.player_spawn));
        assert!(s.scheduler.contains(s.player));
        assert!(s.events.iter().any(|e| matches!(e, GameEvent::LevelEntered { floor: 1, .. })));
    }

    #[test]
    fn test_stats_carry_across() {
        let mut s = session();
        s.level.world.get::<&mut Health>(s.player).unwrap().current = 3;
        s.level.world.get::<&mut PlayerData>(s.player).unwrap().xp = 11;
        s.enter_floor(1).unwrap();
        assert_eq!(s.level.world.get::<&Health>(s.player).unwrap().current, 3);
        assert_eq!(s.level.world.get::<&PlayerData>(s.player).unwrap().xp, 11);
    }

    #[test]
    fn test_take_player_keeps_inventory_and_empties_tile() {
        let mut s = session();
        let at = entity_coord(&s.level.world, s.player).unwrap();
        s.level.world.get::<&mut PlayerData>(s.player).unwrap().inventory.push(ItemKind::GrubJerky);
        let carried = take_player(&mut s.level, s.player).unwrap();
        assert_eq!(carried.data.inventory, vec![ItemKind::GrubJerky]);
        assert!(!s.level.world.contains(s.player));
        assert_eq!(s.level.occupant_at(at), None);
        assert!(take_player(&mut s.level, s.player).is_none());
    }

    #[test]
    fn test_ascending_lands_on_exit_of_cached_floor() {
        let mut s = session();
        s.enter_floor(1).unwrap();
        let enemies_before = s.level.enemies.len();
        let exit = s.level.exit.unwrap();
        s.enter_floor(2).unwrap();
        s.enter_floor(1).unwrap();

        assert_eq!(s.level.enemies.len(), enemies_before);
        let at = entity_coord(&s.level.world, s.player).unwrap();
        assert!(crate::geometry::chebyshev(at, exit) <= 1);
        assert!(s.has_cached(2));
    }

    #[test]
    fn test_cached_turns_are_rebased() {
        let mut s = session();
        s.enter_floor(1).unwrap();
        for (_, turn) in s.level.world.query_mut::<&mut TurnTaker>() {
            turn.next_turn += 40.0;
        }
        s.enter_floor(0).unwrap();
        s.enter_floor(1).unwrap();
        let earliest = s
            .level
            .world
            .query::<&TurnTaker>()
            .iter()
            .map(|(_, turn)| turn.next_turn)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(earliest, 0.0);
    }
}
