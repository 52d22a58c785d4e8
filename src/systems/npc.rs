//! Family moles and the opening tutorial.
//!
//! The level's `tutorial_stage` is the only script state. Stages:
//! 0 Minnie wakes the player, 1 the player talks to Minnie, 2 Minnie walks
//! to the family room couch, 3 Michael greets the player once they are
//! close, 4 and beyond nothing is scripted.

use hecs::Entity;
use log::info;

use crate::actions::{Action, Movement, TurnContext, Wait};
use crate::components::{entity_coord, NpcBrain, NpcKind};
use crate::constants::NPC_GREET_DISTANCE;
use crate::dialog::Dialog;
use crate::geometry::{tile_distance, TileCoord};
use crate::tile::Overlay;

const PLAYER_NAME: &str = "Marshall";

pub fn run_turn(ctx: &mut TurnContext, npc: Entity) -> Option<Box<dyn Action>> {
    let kind = ctx.level.world.get::<&NpcBrain>(npc).ok()?.kind;
    let here = entity_coord(&ctx.level.world, npc)?;
    let stage = ctx.level.tutorial_stage;

    match (kind, stage) {
        (NpcKind::Minnie, 0) => {
            ctx.dialogs.say_all("Minnie", &["Marshall... MARSHALL!"]);
            ctx.dialogs.push(Dialog::say(PLAYER_NAME, "Mmmph. Five more minutes..."));
            ctx.dialogs.say_all("Minnie", &["Up! Now! You can sleep when you're a fossil."]);
            ctx.dialogs.push(Dialog::think(PLAYER_NAME, "Click on Minnie to talk to her."));
            advance_stage(ctx, 1);
        }
        (NpcKind::Minnie, 2) => {
            if let Some(couch) = couch_tile(ctx, npc) {
                if here == couch {
                    advance_stage(ctx, 3);
                } else if let Some(step) = step_toward(ctx, npc, here, couch) {
                    return Some(Box::new(Movement::new(ctx, npc, step)));
                }
            }
        }
        (NpcKind::Michael, 3) => {
            let near = entity_coord(&ctx.level.world, ctx.player)
                .is_some_and(|player_at| tile_distance(here, player_at) < NPC_GREET_DISTANCE);
            if near {
                ctx.dialogs.say_all("Michael", &[
                    "There he is. Morning, Marshall.",
                    "Half the grub stores went missing overnight.",
                ]);
                ctx.dialogs.push(Dialog::say(PLAYER_NAME, "Missing? Don't look at me."));
                ctx.dialogs.say_all("Michael", &[
                    "Nobody is looking at you. Yet.",
                    "Something has been digging under the pit. Go and see what it is.",
                ]);
                advance_stage(ctx, 4);
            }
        }
        _ => {}
    }
    Some(Box::new(Wait::new(npc)))
}

/// Respond to the player walking into an NPC
pub fn interact(ctx: &mut TurnContext, npc: Entity) {
    let Ok(kind) = ctx.level.world.get::<&NpcBrain>(npc).map(|brain| brain.kind) else {
        return;
    };
    let stage = ctx.level.tutorial_stage;
    match (kind, stage) {
        (NpcKind::Minnie, 1) => {
            ctx.dialogs.say_all("Minnie", &[
                "Dad called a family meeting. Everyone is already in the family room.",
                "Hurry up before he starts without you!",
            ]);
            ctx.dialogs.push(Dialog::think(PLAYER_NAME, "Click on a tile to walk there. Find the family room."));
            advance_stage(ctx, 2);
        }
        (NpcKind::Minnie, _) => ctx.dialogs.say_all("Minnie", &["Don't keep Dad waiting."]),
        (NpcKind::Michael, 0..=3) => ctx.dialogs.say_all("Michael", &["Not now, son. Wait for the others."]),
        (NpcKind::Michael, _) => ctx.dialogs.say_all("Michael", &["The pit won't explore itself."]),
        (NpcKind::Maxwell, _) => ctx.dialogs.say_all("Maxwell", &["I didn't take the grubs. Probably."]),
        (NpcKind::Magnolia, _) => ctx.dialogs.say_all("Magnolia", &["Be careful down there, dear. Bring a snack."]),
    }
}

fn advance_stage(ctx: &mut TurnContext, stage: u32) {
    info!("Tutorial stage {} -> {}", ctx.level.tutorial_stage, stage);
    ctx.level.tutorial_stage = stage;
}

/// Minnie's seat, found once and remembered on her brain
fn couch_tile(ctx: &mut TurnContext, npc: Entity) -> Option<TileCoord> {
    let known = ctx.level.world.get::<&NpcBrain>(npc).ok()?.home;
    if known.is_some() {
        return known;
    }
    let couch = ctx
        .level
        .grid
        .find_all(|tile| tile.overlay == Some(Overlay::CouchLeft))
        .into_iter()
        .next()?;
    if let Ok(mut brain) = ctx.level.world.get::<&mut NpcBrain>(npc) {
        brain.home = Some(couch);
    }
    Some(couch)
}

fn step_toward(ctx: &TurnContext, npc: Entity, here: TileCoord, goal: TileCoord) -> Option<TileCoord> {
    let blocked = ctx.level.non_walkables(npc, Some(goal), ctx.player);
    ctx.pathfinder.next_step_toward(here, goal, &blocked, ctx.path_max_expansions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::Harness;
    use crate::actions::ActionKind;

    #[test]
    fn test_minnie_wakes_the_player() {
        let mut h = Harness::new((5, 5));
        h.level.tutorial_stage = 0;
        let minnie = h.level.add_npc(NpcKind::Minnie, (6, 5));
        let action = run_turn(&mut h.ctx(), minnie).unwrap();
        assert_eq!(action.kind(), ActionKind::Wait);
        assert_eq!(h.level.tutorial_stage, 1);
        assert!(!h.dialogs.is_empty());
    }

    #[test]
    fn test_talking_to_minnie_advances_once() {
        let mut h = Harness::new((5, 5));
        h.level.tutorial_stage = 1;
        let minnie = h.level.add_npc(NpcKind::Minnie, (6, 5));
        interact(&mut h.ctx(), minnie);
        assert_eq!(h.level.tutorial_stage, 2);
        interact(&mut h.ctx(), minnie);
        assert_eq!(h.level.tutorial_stage, 2);
    }

    #[test]
    fn test_minnie_walks_to_couch() {
        let mut h = Harness::new((5, 5));
        h.level.tutorial_stage = 2;
        h.level.grid.get_mut(9, 9).unwrap().overlay = Some(Overlay::CouchLeft);
        let minnie = h.level.add_npc(NpcKind::Minnie, (12, 12));
        for _ in 0..10 {
            let mut action = run_turn(&mut h.ctx(), minnie).unwrap();
            action.apply_immediately(&mut h.ctx());
            if h.level.tutorial_stage == 3 {
                break;
            }
        }
        assert_eq!(h.level.tutorial_stage, 3);
        assert_eq!(entity_coord(&h.level.world, minnie), Some((9, 9)));
    }

    #[test]
    fn test_michael_greets_only_when_close() {
        let mut h = Harness::new((5, 5));
        h.level.tutorial_stage = 3;
        let far = h.level.add_npc(NpcKind::Michael, (12, 5));
        run_turn(&mut h.ctx(), far);
        assert_eq!(h.level.tutorial_stage, 3);
        assert!(h.dialogs.is_empty());

        let near = h.level.add_npc(NpcKind::Michael, (7, 5));
        run_turn(&mut h.ctx(), near);
        assert_eq!(h.level.tutorial_stage, 4);
        assert!(!h.dialogs.is_empty());
    }
}
