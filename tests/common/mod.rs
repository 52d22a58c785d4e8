//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use hecs::Entity;
use rand::rngs::StdRng;
use rand::SeedableRng;

use molehole::actions::TurnContext;
use molehole::constants::{LEVEL_SIZE, VISION_RANGE};
use molehole::dialog::DialogQueue;
use molehole::events::EventQueue;
use molehole::input::PlayerIntent;
use molehole::level::Level;
use molehole::pathfinding::{Connectivity, Pathfinder};
use molehole::tile::TileKind;

/// A lit open room on floor 1 plus the queues a turn needs
pub struct Arena {
    pub level: Level,
    pub player: Entity,
    pub events: EventQueue,
    pub dialogs: DialogQueue,
    pub rng: StdRng,
    pub pathfinder: Pathfinder,
    pub intent: PlayerIntent,
}

impl Arena {
    pub fn new(player_at: (i32, i32)) -> Self {
        let mut level = Level::new(1, VISION_RANGE);
        for y in 1..16 {
            for x in 1..16 {
                level.grid.set_kind(x, y, TileKind::floor());
            }
        }
        // No surprise spawns during a test
        level.enemy_spawn_countdown = i32::MAX;
        let player = level.add_player(player_at, None);
        level.reshade(player_at);
        Self {
            level,
            player,
            events: EventQueue::new(),
            dialogs: DialogQueue::new(),
            rng: StdRng::seed_from_u64(5),
            pathfinder: Pathfinder::new(LEVEL_SIZE, LEVEL_SIZE, Connectivity::Eight),
            intent: PlayerIntent::default(),
        }
    }

    pub fn ctx(&mut self) -> TurnContext<'_> {
        TurnContext {
            level: &mut self.level,
            player: self.player,
            events: &mut self.events,
            dialogs: &mut self.dialogs,
            rng: &mut self.rng,
            pathfinder: &self.pathfinder,
            intent: &self.intent,
            path_max_expansions: 2000,
        }
    }
}
