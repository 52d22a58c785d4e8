use hecs::Entity;

use super::{Action, ActionKind, ActionTimer, TurnContext};
use crate::constants::{WAIT_FRAMES, WAIT_TURNS};
use crate::events::GameEvent;

/// Pass one turn. Only a visible wait shows its particle.
#[derive(Debug)]
pub struct Wait {
    actor: Entity,
    timer: ActionTimer,
}

impl Wait {
    pub fn new(actor: Entity) -> Self {
        Self {
            actor,
            timer: ActionTimer::new(WAIT_FRAMES),
        }
    }
}

impl Action for Wait {
    fn kind(&self) -> ActionKind {
        ActionKind::Wait
    }

    fn actor(&self) -> Entity {
        self.actor
    }

    fn turn_increase(&self) -> f64 {
        WAIT_TURNS
    }

    fn timer(&self) -> &ActionTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut ActionTimer {
        &mut self.timer
    }

    fn animate_step(&mut self, ctx: &mut TurnContext) {
        if self.timer.is_first_frame() {
            if let Some(position) = ctx.level.pixel_of(self.actor) {
                ctx.events.push(GameEvent::Waited { entity: self.actor, position });
            }
        }
    }

    fn apply_immediately(&mut self, _ctx: &mut TurnContext) {}
}
