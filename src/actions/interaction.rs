use hecs::Entity;

use super::{Action, ActionKind, ActionTimer, TurnContext};
use crate::constants::{INTERACTION_FRAMES, INTERACTION_TURNS};
use crate::systems::npc;

/// Talk to an NPC. Free, and resolves on its only frame.
#[derive(Debug)]
pub struct Interaction {
    actor: Entity,
    npc: Entity,
    timer: ActionTimer,
    done: bool,
}

impl Interaction {
    pub fn new(actor: Entity, npc: Entity) -> Self {
        Self {
            actor,
            npc,
            timer: ActionTimer::new(INTERACTION_FRAMES),
            done: false,
        }
    }

    pub fn npc(&self) -> Entity {
        self.npc
    }

    fn interact(&mut self, ctx: &mut TurnContext) {
        if !self.done {
            self.done = true;
            npc::interact(ctx, self.npc);
        }
    }
}

impl Action for Interaction {
    fn kind(&self) -> ActionKind {
        ActionKind::Interaction
    }

    fn actor(&self) -> Entity {
        self.actor
    }

    fn turn_increase(&self) -> f64 {
        INTERACTION_TURNS
    }

    fn timer(&self) -> &ActionTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut ActionTimer {
        &mut self.timer
    }

    fn animate_step(&mut self, ctx: &mut TurnContext) {
        self.interact(ctx);
    }

    fn apply_immediately(&mut self, ctx: &mut TurnContext) {
        self.interact(ctx);
    }
}
