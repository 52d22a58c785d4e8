//! Game systems organized by domain.
//!
//! - `player`: turning input into the player's actions
//! - `ai`: enemy state machines
//! - `npc`: family moles and tutorial scripting
//! - `combat`: damage, xp, item effects and the player's per-turn upkeep
//! - `animation`: sprite frame cycling

pub mod ai;
pub mod animation;
pub mod combat;
pub mod npc;
pub mod player;

use hecs::Entity;

use crate::actions::{Action, TurnContext};
use crate::components::ActorKind;

pub use animation::tick_animators;

/// Ask an entity's brain for its next action
pub fn run_turn(ctx: &mut TurnContext, entity: Entity) -> Option<Box<dyn Action>> {
    match ctx.level.actor_kind(entity)? {
        ActorKind::Player => player::run_turn(ctx, entity),
        ActorKind::Npc(_) => npc::run_turn(ctx, entity),
        ActorKind::Enemy(_) => ai::run_turn(ctx, entity),
        ActorKind::Chest => None,
    }
}

/// Once-per-whole-turn upkeep for one scheduled entity
pub fn turn_ping(ctx: &mut TurnContext, entity: Entity) {
    if entity == ctx.player {
        combat::player_turn_ping(&mut ctx.level.world, entity);
    }
}
