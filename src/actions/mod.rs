//! Committed turns.
//!
//! A brain returns a boxed [`Action`]; the scheduler then drives it one
//! frame at a time while its actor is on screen, or resolves it in one call
//! with [`Action::apply_immediately`] when nobody can see it. Both paths
//! must leave the game in the same state, and `apply_immediately` only
//! performs what animation frames have not applied yet.

use std::fmt;

use glam::Vec2;
use hecs::Entity;
use rand::rngs::StdRng;

use crate::components::{Animator, AnimState, Transform};
use crate::dialog::DialogQueue;
use crate::events::EventQueue;
use crate::input::PlayerIntent;
use crate::level::Level;
use crate::pathfinding::Pathfinder;

mod fall;
mod interaction;
mod items;
mod melee;
mod movement;
mod shove;
mod wait;

pub use fall::Fall;
pub use interaction::Interaction;
pub use items::{ChestOpen, ItemCollect, ItemUse};
pub use melee::Melee;
pub use movement::Movement;
pub use shove::{Shove, ShoveOutcome};
pub use wait::Wait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Movement,
    Melee,
    Shove,
    Wait,
    Interaction,
    ItemCollect,
    ItemUse,
    ChestOpen,
    Fall,
}

/// Animation frame counter. The first frame sees `remaining == duration`,
/// the last sees `remaining == 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTimer {
    pub duration: u32,
    pub remaining: u32,
}

impl ActionTimer {
    pub fn new(duration: u32) -> Self {
        let duration = duration.max(1);
        Self {
            duration,
            remaining: duration,
        }
    }

    pub fn is_first_frame(&self) -> bool {
        self.remaining == self.duration
    }

    pub fn is_last_frame(&self) -> bool {
        self.remaining == 1
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    /// Frames already played, counting the current one
    pub fn elapsed(&self) -> u32 {
        self.duration - self.remaining + 1
    }

    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

/// Everything an action or brain may touch during a turn
pub struct TurnContext<'a> {
    pub level: &'a mut Level,
    pub player: Entity,
    pub events: &'a mut EventQueue,
    pub dialogs: &'a mut DialogQueue,
    pub rng: &'a mut StdRng,
    pub pathfinder: &'a Pathfinder,
    pub intent: &'a PlayerIntent,
    pub path_max_expansions: usize,
}

pub trait Action: fmt::Debug {
    fn kind(&self) -> ActionKind;

    fn actor(&self) -> Entity;

    /// Turns added to the actor's `next_turn` when the action is adopted
    fn turn_increase(&self) -> f64;

    fn timer(&self) -> &ActionTimer;

    fn timer_mut(&mut self) -> &mut ActionTimer;

    /// Play the current frame. The scheduler advances the timer afterwards.
    fn animate_step(&mut self, ctx: &mut TurnContext);

    /// Resolve whatever is left of the action with no animation
    fn apply_immediately(&mut self, ctx: &mut TurnContext);

    /// Action to adopt, at no turn cost, once this one ends
    fn take_follow_up(&mut self) -> Option<Box<dyn Action>> {
        None
    }
}

// Transform and animator helpers shared by the action files

pub(crate) fn with_transform(level: &mut Level, entity: Entity, f: impl FnOnce(&mut Transform)) {
    if let Ok(mut transform) = level.world.get::<&mut Transform>(entity) {
        f(&mut transform);
    }
}

pub(crate) fn set_anim(level: &mut Level, entity: Entity, state: AnimState) {
    if let Ok(mut animator) = level.world.get::<&mut Animator>(entity) {
        animator.set_state(state);
    }
}

/// Face left or right toward a horizontal target; vertical moves keep facing
pub(crate) fn face_toward(level: &mut Level, entity: Entity, from: Vec2, to: Vec2) {
    if to.x != from.x {
        with_transform(level, entity, |transform| transform.left_facing = to.x < from.x);
    }
}

/// Put an entity's transform back on its tile
pub(crate) fn snap_to_tile(level: &mut Level, entity: Entity) {
    if let Some(coord) = crate::components::entity_coord(&level.world, entity) {
        with_transform(level, entity, |transform| transform.snap_to(coord));
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_frames() {
        let mut timer = ActionTimer::new(3);
        assert!(timer.is_first_frame());
        assert_eq!(timer.elapsed(), 1);
        timer.tick();
        timer.tick();
        assert!(timer.is_last_frame());
        assert_eq!(timer.elapsed(), 3);
        timer.tick();
        assert!(timer.is_finished());
        timer.tick();
        assert_eq!(timer.remaining, 0);
    }

    #[test]
    fn test_single_frame_is_first_and_last() {
        let timer = ActionTimer::new(1);
        assert!(timer.is_first_frame() && timer.is_last_frame());
    }
}
