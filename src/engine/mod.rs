//! Game session - owns all game state and provides a clean API to the shell.
//!
//! The session handles:
//! - The current level, the player and the cache of visited floors
//! - The turn scheduler and everything a turn needs (rng, pathfinder, queues)
//! - Per-frame simulation and event processing
//!
//! The shell (main.rs) only polls input, calls [`GameSession::update`] once
//! per frame and hands a sink to [`GameSession::render`].

mod floor_transition;
mod simulation;

use std::collections::HashMap;

use hecs::Entity;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::camera::Camera;
use crate::constants::LEVEL_SIZE;
use crate::components::PlayerData;
use crate::config::GameConfig;
use crate::dialog::DialogQueue;
use crate::dungeon_gen::DungeonGenerator;
use crate::error::GameResult;
use crate::events::{EventQueue, GameEvent};
use crate::input::{PlayerIntent, TapTracker};
use crate::level::Level;
use crate::pathfinding::{Connectivity, Pathfinder};
use crate::render::{render_frame, FrameView, RenderSink};
use crate::rooms::RoomLibrary;
use crate::time_system::TurnScheduler;
use crate::vfx::VfxManager;

/// Whether the player is still alive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    InGame,
    GameOver,
}

/// Everything one running game owns
pub struct GameSession {
    pub config: GameConfig,
    pub phase: GamePhase,
    pub level: Level,
    pub player: Entity,
    pub scheduler: TurnScheduler,
    pub events: EventQueue,
    pub dialogs: DialogQueue,
    pub vfx: VfxManager,
    pub camera: Camera,
    library: RoomLibrary,
    pathfinder: Pathfinder,
    rng: StdRng,
    tap: TapTracker,
    /// Last click not yet offered to the player's brain
    latched: PlayerIntent,
    /// Floors left behind, keyed by depth, with the player removed
    levels: HashMap<u32, Level>,
    frame: u64,
}

impl GameSession {
    /// Start a session on the configured floor with the built-in rooms
    pub fn new(config: GameConfig) -> GameResult<Self> {
        Self::with_library(config, RoomLibrary::builtin()?)
    }

    pub fn with_library(config: GameConfig, library: RoomLibrary) -> GameResult<Self> {
        config.validate()?;

        let floor = config.starting_floor;
        let mut level = DungeonGenerator::generate(&library, floor, config.seed, config.vision_range)?;
        let spawn = level.player_spawn;
        let player = level.add_player(spawn, None);
        level.reshade(spawn);

        let mut scheduler = TurnScheduler::new();
        scheduler.initialize(&level);

        let [width, height] = config.viewport;
        let mut camera = Camera::new(width, height, config.freecam);
        if let Some(pixel) = level.pixel_of(player) {
            camera.center_on(pixel);
        }

        let mut events = EventQueue::new();
        events.push(GameEvent::LevelEntered {
            floor,
            zone: level.zone.name(),
        });
        info!("Session started on floor {} with seed {}", floor, config.seed);

        Ok(Self {
            phase: GamePhase::InGame,
            level,
            player,
            scheduler,
            events,
            dialogs: DialogQueue::new(),
            vfx: VfxManager::new(),
            camera,
            library,
            pathfinder: Pathfinder::new(LEVEL_SIZE, LEVEL_SIZE, Connectivity::Eight),
            rng: StdRng::seed_from_u64(config.seed),
            tap: TapTracker::default(),
            latched: PlayerIntent::default(),
            levels: HashMap::new(),
            frame: 0,
            config,
        })
    }

    pub fn floor(&self) -> u32 {
        self.level.floor
    }

    /// Frames simulated so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Whether a floor is waiting in the cache
    pub fn has_cached(&self, floor: u32) -> bool {
        self.levels.contains_key(&floor)
    }

    /// Queue an inventory slot to be used on the player's next turn.
    /// Returns false when the slot is empty.
    pub fn queue_item_use(&mut self, slot: usize) -> bool {
        let Ok(mut data) = self.level.world.get::<&mut PlayerData>(self.player) else {
            return false;
        };
        if slot >= data.inventory.len() {
            return false;
        }
        data.pending_use = Some(slot);
        true
    }

    pub fn render(&self, sink: &mut dyn RenderSink) {
        let view = FrameView {
            level: &self.level,
            player: self.player,
            camera: &self.camera,
            vfx: &self.vfx,
            dialogs: &self.dialogs,
            game_over: self.is_game_over(),
        };
        render_frame(&view, sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{entity_coord, NpcBrain, NpcKind};
    use crate::items::ItemKind;
    use crate::render::RecordingSink;

    fn session() -> GameSession {
        GameSession::new(GameConfig::default()).unwrap()
    }

    #[test]
    fn test_new_session_places_player_on_spawn() {
        let session = session();
        assert_eq!(session.floor(), 0);
        assert_eq!(entity_coord(&session.level.world, session.player), Some(session.level.player_spawn));
        assert_eq!(session.level.occupant_at(session.level.player_spawn), Some(session.player));
        assert!(session.scheduler.contains(session.player));
        assert!(session.level.is_visible(session.level.player_spawn));
        assert_eq!(session.phase, GamePhase::InGame);
    }

    #[test]
    fn test_home_floor_has_the_family() {
        let session = session();
        let kinds: Vec<NpcKind> = session
            .level
            .npcs
            .iter()
            .map(|&npc| session.level.world.get::<&NpcBrain>(npc).unwrap().kind)
            .collect();
        assert!(kinds.contains(&NpcKind::Minnie));
        assert!(kinds.contains(&NpcKind::Michael));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = GameConfig {
            vision_range: 0,
            ..GameConfig::default()
        };
        assert!(GameSession::new(config).is_err());
    }

    #[test]
    fn test_queue_item_use_needs_an_item() {
        let mut session = session();
        assert!(!session.queue_item_use(0));
        session
            .level
            .world
            .get::<&mut PlayerData>(session.player)
            .unwrap()
            .inventory
            .push(ItemKind::GrubJerky);
        assert!(session.queue_item_use(0));
        assert_eq!(session.level.world.get::<&PlayerData>(session.player).unwrap().pending_use, Some(0));
    }

    #[test]
    fn test_render_draws_something() {
        let session = session();
        let mut sink = RecordingSink::default();
        session.render(&mut sink);
        assert!(!sink.calls.is_empty());
    }
}
