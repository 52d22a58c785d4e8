//! Game event system for decoupled communication between systems.
//!
//! Actions and systems emit events, the session consumes them at the end of
//! the frame. Effects, floor transitions and game over all react to events
//! instead of being called directly from gameplay code.

use glam::Vec2;
use hecs::Entity;

use crate::components::ActorKind;
use crate::items::ItemKind;
use crate::tile::SpriteRef;

/// Game events that systems can emit and subscribe to
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// A melee strike landed
    AttackHit {
        attacker: Entity,
        target: Entity,
        /// Pixel position of the target
        position: Vec2,
        damage: i32,
        surprise: bool,
    },
    /// An entity passed its turn
    Waited { entity: Entity, position: Vec2 },
    /// An entity was pushed; `landed` is false when it bounced back
    Shoved { target: Entity, landed: bool },
    /// An entity was removed after dying; `sprite` is its last frame
    EntityDied {
        entity: Entity,
        kind: ActorKind,
        position: Vec2,
        sprite: SpriteRef,
    },
    /// The player gained xp without completing a skill point
    XpGained { amount: u32 },
    /// The player converted xp into skill points
    SkillPointsGained { points: u32 },
    ItemCollected { kind: ItemKind, position: Vec2 },
    ItemUsed { kind: ItemKind },
    ChestOpened { chest: Entity, position: Vec2 },
    /// The player asked to change floors
    FloorTransition { to: u32 },
    /// The player's health dropped below one
    PlayerDied,
    /// A level finished loading
    LevelEntered { floor: u32, zone: &'static str },
}

/// Simple event queue - events are pushed during update, processed at end of frame
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Push an event to be processed later
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain all events for processing
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Peek at pending events without consuming them
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }
}
