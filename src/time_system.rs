//! Turn scheduler.
//!
//! Every schedulable entity carries a fractional `next_turn` timestamp. The
//! scheduler repeatedly asks the entity with the smallest timestamp for an
//! action, charges the action's cost to that timestamp, and then plays the
//! action out frame by frame (or resolves it at once when the actor is out
//! of sight). Whole turns crossed by the global clock fire turn pings.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hecs::Entity;
use log::debug;

use crate::actions::{Action, TurnContext};
use crate::components::{entity_coord, TurnTaker};
use crate::level::Level;
use crate::systems;

/// One entry in the turn order
#[derive(Debug, Clone, Copy)]
struct ScheduledTurn {
    entity: Entity,
    next_turn: f64,
    /// Insertion counter; earlier entries win ties
    seq: u64,
}

impl PartialEq for ScheduledTurn {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledTurn {}

impl PartialOrd for ScheduledTurn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledTurn {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior (earliest turn first)
        other
            .next_turn
            .total_cmp(&self.next_turn)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the head of the turn order to commit to an action
    Idle,
    /// An action is playing out
    ActionPending,
}

/// Serializes every entity's turns by `next_turn`
#[derive(Debug, Default)]
pub struct TurnScheduler {
    order: BinaryHeap<ScheduledTurn>,
    seq: u64,
    pending: Option<Box<dyn Action>>,
    /// `next_turn` of the most recent dispatch
    turn: f64,
    /// Largest turn value dispatched so far
    highest_turn: f64,
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the turn order from every schedulable on a level
    pub fn initialize(&mut self, level: &Level) {
        self.order.clear();
        self.pending = None;
        self.turn = 0.0;
        self.highest_turn = 0.0;
        let mut schedulables = level.schedulables();
        // Stable insertion order for equal timestamps
        schedulables.sort_by(|a, b| a.1.total_cmp(&b.1));
        for (entity, next_turn) in schedulables {
            self.push(entity, next_turn);
        }
        debug!("Scheduler initialized with {} entities", self.order.len());
    }

    fn push(&mut self, entity: Entity, next_turn: f64) {
        self.seq += 1;
        self.order.push(ScheduledTurn {
            entity,
            next_turn,
            seq: self.seq,
        });
    }

    /// Add an entity at its current `next_turn`
    pub fn add(&mut self, level: &Level, entity: Entity) {
        if let Ok(turn) = level.world.get::<&TurnTaker>(entity) {
            let next_turn = turn.next_turn;
            drop(turn);
            self.push(entity, next_turn);
        }
    }

    /// Drop an entity from the turn order, keeping everyone else
    pub fn remove(&mut self, entity: Entity) {
        self.order.retain(|entry| entry.entity != entity);
        if self.pending.as_ref().is_some_and(|action| action.actor() == entity) {
            self.pending = None;
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.order.iter().any(|entry| entry.entity == entity)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entity that acts next, with its timestamp
    pub fn head(&self) -> Option<(Entity, f64)> {
        self.order.peek().map(|entry| (entry.entity, entry.next_turn))
    }

    pub fn state(&self) -> SchedulerState {
        if self.pending.is_some() {
            SchedulerState::ActionPending
        } else {
            SchedulerState::Idle
        }
    }

    pub fn pending(&self) -> Option<&dyn Action> {
        self.pending.as_deref()
    }

    pub fn turn(&self) -> f64 {
        self.turn
    }

    pub fn highest_turn(&self) -> f64 {
        self.highest_turn
    }

    /// Run one frame of the turn loop
    pub fn update(&mut self, ctx: &mut TurnContext) {
        puffin::profile_function!();

        if !ctx.dialogs.is_empty() {
            return;
        }
        if self.pending.is_some() {
            self.advance_pending(ctx);
        } else {
            self.dispatch(ctx);
        }
    }

    fn advance_pending(&mut self, ctx: &mut TurnContext) {
        let Some(mut action) = self.pending.take() else {
            return;
        };
        let actor = action.actor();
        let Some(coord) = entity_coord(&ctx.level.world, actor) else {
            debug!("Dropping {:?}: actor is gone", action.kind());
            return;
        };

        let finished = if ctx.level.is_visible(coord) {
            action.animate_step(ctx);
            action.timer_mut().tick();
            action.timer().is_finished()
        } else {
            action.apply_immediately(ctx);
            true
        };

        if finished {
            self.pending = action.take_follow_up();
        } else {
            self.pending = Some(action);
        }
    }

    fn dispatch(&mut self, ctx: &mut TurnContext) {
        // Discard heads whose entity has left the world
        while let Some(head) = self.order.peek() {
            if ctx.level.world.contains(head.entity) {
                break;
            }
            self.order.pop();
        }
        let Some(head) = self.order.peek().copied() else {
            return;
        };

        let Some(action) = systems::run_turn(ctx, head.entity) else {
            return;
        };
        self.order.pop();

        let next_turn = head.next_turn + action.turn_increase();
        if let Ok(mut turn) = ctx.level.world.get::<&mut TurnTaker>(head.entity) {
            turn.next_turn = next_turn;
        }
        self.push(head.entity, next_turn);
        self.pending = Some(action);
        self.turn = next_turn;

        if self.turn > self.highest_turn {
            let crossed = self.turn.floor() as i64 - self.highest_turn.floor() as i64;
            self.highest_turn = self.turn;
            for _ in 0..crossed.max(0) {
                self.ping(ctx);
            }
        }
    }

    /// One whole turn elapsed: every scheduled entity and the level get a ping
    fn ping(&mut self, ctx: &mut TurnContext) {
        let entities: Vec<Entity> = self.order.iter().map(|entry| entry.entity).collect();
        for entity in entities {
            systems::turn_ping(ctx, entity);
        }
        let player_at = entity_coord(&ctx.level.world, ctx.player).unwrap_or(ctx.level.player_spawn);
        if let Some(spawned) = ctx.level.turn_ping(ctx.rng, player_at, self.turn) {
            self.add(ctx.level, spawned);
        }
    }
}
