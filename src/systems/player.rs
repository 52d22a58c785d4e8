//! The player's brain: turns clicks into routes and routes into actions.

use hecs::Entity;

use crate::actions::{Action, ChestOpen, Interaction, ItemCollect, ItemUse, Melee, Movement, Shove, TurnContext, Wait};
use crate::components::{entity_coord, ActorKind, Pather, PlayerData};

/// Decide the player's next action. `None` defers: the player is idle
/// until a click gives them somewhere to go.
pub fn run_turn(ctx: &mut TurnContext, player: Entity) -> Option<Box<dyn Action>> {
    puffin::profile_function!();

    let here = entity_coord(&ctx.level.world, player)?;
    let (target, queued_use) = {
        let mut data = ctx.level.world.get::<&mut PlayerData>(player).ok()?;
        data.last_position = here;
        let slot = data.pending_use.take();
        let queued = slot.and_then(|slot| data.inventory.get(slot).copied());
        let target = ctx.level.world.get::<&Pather>(player).ok()?.target;
        (target, queued)
    };

    if let Some(item) = queued_use {
        return Some(Box::new(ItemUse::new(player, item)));
    }
    if target.is_none() && ctx.intent.wait {
        return Some(Box::new(Wait::new(player)));
    }

    let items = ctx.level.items_at(here);
    if !items.is_empty() {
        return Some(Box::new(ItemCollect::new(player, items)));
    }

    if target == Some(here) {
        clear_route(ctx, player);
    }

    let enemies_in_sight = stop_for_enemies(ctx, player, here);

    let current = ctx.level.world.get::<&Pather>(player).ok()?.target;
    let Some(target) = current else {
        accept_click(ctx, player, enemies_in_sight);
        return None;
    };

    let blocked = ctx.level.non_walkables(player, Some(target), player);
    let path = ctx.pathfinder.find_path(here, target, &blocked, ctx.path_max_expansions);
    let Some(next) = path.as_ref().and_then(|path| path.first().copied()) else {
        clear_route(ctx, player);
        return None;
    };
    if let Ok(mut pather) = ctx.level.world.get::<&mut Pather>(player) {
        pather.path = path;
    }

    let occupant = ctx.level.occupant_at(next);
    let kind = occupant.and_then(|entity| ctx.level.actor_kind(entity));
    match (occupant, kind) {
        (Some(enemy), Some(ActorKind::Enemy(_))) => {
            let shove = ctx.level.world.get::<&PlayerData>(player).is_ok_and(|data| data.shove_next);
            clear_route(ctx, player);
            if shove {
                Some(Box::new(Shove::new(ctx, player, enemy)))
            } else {
                Some(Box::new(Melee::new(ctx, player, enemy)))
            }
        }
        (Some(npc), Some(ActorKind::Npc(_))) => {
            clear_route(ctx, player);
            Some(Box::new(Interaction::new(player, npc)))
        }
        (Some(chest), Some(ActorKind::Chest)) => {
            clear_route(ctx, player);
            Some(Box::new(ChestOpen::new(player, chest)))
        }
        _ => Some(Box::new(Movement::new(ctx, player, next))),
    }
}

/// Drop the current destination and any shove request
fn clear_route(ctx: &mut TurnContext, player: Entity) {
    if let Ok(mut pather) = ctx.level.world.get::<&mut Pather>(player) {
        pather.clear();
    }
    if let Ok(mut data) = ctx.level.world.get::<&mut PlayerData>(player) {
        data.force_move = false;
        data.shove_next = false;
    }
}

/// A visible enemy in clear sight cuts a long walk short after the next
/// step, unless the walk was ordered with enemies already in view.
fn stop_for_enemies(ctx: &mut TurnContext, player: Entity, here: (i32, i32)) -> bool {
    let level = &*ctx.level;
    let in_sight = level.enemies.iter().any(|&enemy| {
        entity_coord(&level.world, enemy)
            .is_some_and(|coord| level.is_visible(coord) && level.line_of_sight(here, coord))
    });
    if !in_sight {
        return false;
    }
    let force_move = level.world.get::<&PlayerData>(player).is_ok_and(|data| data.force_move);
    if !force_move {
        if let Ok(mut pather) = ctx.level.world.get::<&mut Pather>(player) {
            let next = pather.path.as_ref().and_then(|path| match path.iter().position(|&c| c == here) {
                Some(i) => path.get(i + 1).copied(),
                None => path.first().copied(),
            });
            if let Some(step) = next {
                pather.target = Some(step);
            }
        }
    }
    true
}

/// Take a click on a revealed, non-wall tile as the new destination
fn accept_click(ctx: &mut TurnContext, player: Entity, enemies_in_sight: bool) {
    let Some(clicked) = ctx.intent.clicked_tile else {
        return;
    };
    let accepted = ctx
        .level
        .grid
        .get(clicked.0, clicked.1)
        .is_some_and(|tile| tile.revealed && !tile.kind.is_wall());
    if !accepted {
        return;
    }
    if let Ok(mut pather) = ctx.level.world.get::<&mut Pather>(player) {
        pather.target = Some(clicked);
        pather.path = None;
    }
    if let Ok(mut data) = ctx.level.world.get::<&mut PlayerData>(player) {
        data.force_move = enemies_in_sight;
        data.shove_next = ctx.intent.shove;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::Harness;
    use crate::actions::ActionKind;
    use crate::components::{Health, NpcKind};
    use crate::input::PlayerIntent;
    use crate::items::ItemKind;
    use crate::spawning::enemies;

    fn target_of(h: &Harness) -> Option<(i32, i32)> {
        h.level.world.get::<&Pather>(h.player).unwrap().target
    }

    #[test]
    fn test_idle_without_input() {
        let mut h = Harness::new((5, 5));
        let player = h.player;
        assert!(run_turn(&mut h.ctx(), player).is_none());
        assert_eq!(h.level.world.get::<&PlayerData>(player).unwrap().last_position, (5, 5));
    }

    #[test]
    fn test_wait_key_passes_turn() {
        let mut h = Harness::new((5, 5));
        h.intent = PlayerIntent::wait();
        let player = h.player;
        let action = run_turn(&mut h.ctx(), player).unwrap();
        assert_eq!(action.kind(), ActionKind::Wait);
    }

    #[test]
    fn test_click_sets_target_then_walks() {
        let mut h = Harness::new((5, 5));
        h.intent = PlayerIntent::click((8, 5));
        let player = h.player;
        assert!(run_turn(&mut h.ctx(), player).is_none());
        assert_eq!(target_of(&h), Some((8, 5)));

        h.intent = PlayerIntent::default();
        let action = run_turn(&mut h.ctx(), player).unwrap();
        assert_eq!(action.kind(), ActionKind::Movement);
    }

    #[test]
    fn test_click_on_hidden_or_wall_is_ignored() {
        let mut h = Harness::new((5, 5));
        let player = h.player;
        h.intent = PlayerIntent::click((0, 5));
        run_turn(&mut h.ctx(), player);
        assert_eq!(target_of(&h), None);
        h.intent = PlayerIntent::click((18, 18));
        run_turn(&mut h.ctx(), player);
        assert_eq!(target_of(&h), None);
    }

    #[test]
    fn test_route_ending_on_enemy_bites() {
        let mut h = Harness::new((5, 5));
        let worm = h.level.add_enemy(&enemies::WIGGLY_WORM, (6, 5), 0.5, &mut h.rng);
        h.level.world.get::<&mut Health>(worm).unwrap().current = 100;
        h.intent = PlayerIntent::click((6, 5));
        let player = h.player;
        run_turn(&mut h.ctx(), player);
        let action = run_turn(&mut h.ctx(), player).unwrap();
        assert_eq!(action.kind(), ActionKind::Melee);
        assert_eq!(target_of(&h), None);
    }

    #[test]
    fn test_shift_click_shoves() {
        let mut h = Harness::new((5, 5));
        let worm = h.level.add_enemy(&enemies::WIGGLY_WORM, (6, 5), 0.5, &mut h.rng);
        let mut intent = PlayerIntent::click((6, 5));
        intent.shove = true;
        h.intent = intent;
        let player = h.player;
        run_turn(&mut h.ctx(), player);
        let action = run_turn(&mut h.ctx(), player).unwrap();
        assert_eq!(action.kind(), ActionKind::Shove);
        assert!(h.level.world.contains(worm));
    }

    #[test]
    fn test_route_ending_on_npc_talks() {
        let mut h = Harness::new((5, 5));
        h.level.add_npc(NpcKind::Magnolia, (5, 6));
        h.intent = PlayerIntent::click((5, 6));
        let player = h.player;
        run_turn(&mut h.ctx(), player);
        let action = run_turn(&mut h.ctx(), player).unwrap();
        assert_eq!(action.kind(), ActionKind::Interaction);
        assert_eq!(action.turn_increase(), 0.0);
    }

    #[test]
    fn test_items_underfoot_are_collected() {
        let mut h = Harness::new((5, 5));
        h.level.add_item((5, 5), ItemKind::GrubJerky);
        let player = h.player;
        let action = run_turn(&mut h.ctx(), player).unwrap();
        assert_eq!(action.kind(), ActionKind::ItemCollect);
    }

    #[test]
    fn test_queued_item_use() {
        let mut h = Harness::new((5, 5));
        let player = h.player;
        {
            let mut data = h.level.world.get::<&mut PlayerData>(player).unwrap();
            data.inventory.push(ItemKind::BerryJuice);
            data.pending_use = Some(0);
        }
        let action = run_turn(&mut h.ctx(), player).unwrap();
        assert_eq!(action.kind(), ActionKind::ItemUse);
        assert!(h.level.world.get::<&PlayerData>(player).unwrap().pending_use.is_none());
    }

    #[test]
    fn test_enemy_in_sight_stops_walk_after_next_step() {
        let mut h = Harness::new((5, 5));
        h.intent = PlayerIntent::click((9, 5));
        let player = h.player;
        run_turn(&mut h.ctx(), player);
        h.intent = PlayerIntent::default();
        let mut step = run_turn(&mut h.ctx(), player).unwrap();
        step.apply_immediately(&mut h.ctx());

        h.level.add_enemy(&enemies::WIGGLY_WORM, (6, 8), 0.5, &mut h.rng);
        h.level.reshade((6, 5));
        run_turn(&mut h.ctx(), player).unwrap();
        assert_eq!(target_of(&h), Some((7, 5)));
    }
}
