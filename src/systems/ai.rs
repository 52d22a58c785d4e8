//! AI decision-making for enemies.
//!
//! Each enemy runs a small state machine: it sleeps until the player
//! wanders close, roams between random floor tiles, attacks while it has
//! the player in sight, and chases the player's last known tile for a few
//! turns after losing sight of them.

use hecs::Entity;
use log::debug;
use rand::Rng;

use crate::actions::{Action, Melee, Movement, Shove, TurnContext, Wait};
use crate::components::{entity_coord, AiState, EnemyBrain, EnemyKind, Pather, PlayerData};
use crate::constants::*;
use crate::geometry::TileCoord;

/// Decide an enemy's next action. `None` means "think again next frame",
/// used right after a state change and when a route vanished.
pub fn run_turn(ctx: &mut TurnContext, enemy: Entity) -> Option<Box<dyn Action>> {
    puffin::profile_function!();

    let here = entity_coord(&ctx.level.world, enemy)?;
    let player = ctx.player;
    let player_at = entity_coord(&ctx.level.world, player)?;
    let chase_to = ctx
        .level
        .world
        .get::<&PlayerData>(player)
        .map(|data| data.last_position)
        .unwrap_or(player_at);

    let player_lock = ctx.level.line_of_sight(here, player_at);
    let brain = {
        let mut brain = ctx.level.world.get::<&mut EnemyBrain>(enemy).ok()?;
        brain.player_lock = player_lock;
        *brain
    };
    let distance = ctx.pathfinder.heuristic(player_at, here);
    let in_range = distance <= ctx.level.vision_range as f32 && player_lock;

    match brain.state {
        AiState::Sleeping => {
            let roll = ctx.rng.gen_range(0..=distance.floor() as i32);
            if roll < WAKE_THRESHOLD {
                debug!("{:?} woke up at {:?}", brain.kind, here);
                set_state(ctx, enemy, AiState::Wandering);
            }
            Some(Box::new(Wait::new(enemy)))
        }
        AiState::Wandering => {
            if in_range {
                set_state(ctx, enemy, AiState::Attacking);
                clear_route(ctx, enemy);
                return None;
            }
            wander(ctx, enemy, here)
        }
        AiState::Attacking => {
            if !in_range {
                set_state(ctx, enemy, AiState::Chasing);
                set_chase_time(ctx, enemy, 0);
                set_target(ctx, enemy, Some(chase_to));
                return Some(Box::new(Wait::new(enemy)));
            }
            set_target(ctx, enemy, Some(chase_to));
            let Some(step) = next_step(ctx, enemy, here, chase_to) else {
                // Cornered or walled off: hold position
                set_target(ctx, enemy, None);
                return Some(Box::new(Wait::new(enemy)));
            };
            if distance < MELEE_REACH {
                let shove = brain.kind == EnemyKind::Spiderling
                    && ctx.rng.gen_range(0..SPIDERLING_SHOVE_ODDS) == 0;
                if shove {
                    return Some(Box::new(Shove::new(ctx, enemy, player)));
                }
                return Some(Box::new(Melee::new(ctx, enemy, player)));
            }
            Some(Box::new(Movement::new(ctx, enemy, step)))
        }
        AiState::Chasing => {
            if brain.chase_time > CHASE_GIVE_UP_TURNS {
                set_state(ctx, enemy, AiState::Wandering);
                clear_route(ctx, enemy);
                return Some(Box::new(Wait::new(enemy)));
            }
            if in_range {
                set_state(ctx, enemy, AiState::Attacking);
                clear_route(ctx, enemy);
                return None;
            }
            set_chase_time(ctx, enemy, brain.chase_time + 1);
            let step = next_step(ctx, enemy, here, chase_to).or_else(|| next_step(ctx, enemy, here, player_at));
            match step {
                Some(step) => Some(Box::new(Movement::new(ctx, enemy, step))),
                None => {
                    set_target(ctx, enemy, None);
                    Some(Box::new(Wait::new(enemy)))
                }
            }
        }
    }
}

fn wander(ctx: &mut TurnContext, enemy: Entity, here: TileCoord) -> Option<Box<dyn Action>> {
    let target = ctx.level.world.get::<&Pather>(enemy).ok()?.target;
    let Some(target) = target else {
        let pick = (
            here.0 + ctx.rng.gen_range(-WANDER_RADIUS..=WANDER_RADIUS),
            here.1 + ctx.rng.gen_range(-WANDER_RADIUS..=WANDER_RADIUS),
        );
        let is_floor = ctx.level.grid.get(pick.0, pick.1).is_some_and(|tile| tile.kind.is_floor());
        if !is_floor {
            return Some(Box::new(Wait::new(enemy)));
        }
        set_target(ctx, enemy, Some(pick));
        return None;
    };

    if target == here {
        clear_route(ctx, enemy);
        return Some(Box::new(Wait::new(enemy)));
    }
    match next_step(ctx, enemy, here, target) {
        Some(step) => Some(Box::new(Movement::new(ctx, enemy, step))),
        None => {
            set_target(ctx, enemy, None);
            None
        }
    }
}

/// Route toward `goal` and cache it; `None` when unreachable or already there
fn next_step(ctx: &mut TurnContext, enemy: Entity, here: TileCoord, goal: TileCoord) -> Option<TileCoord> {
    let blocked = ctx.level.non_walkables(enemy, Some(goal), ctx.player);
    let path = ctx.pathfinder.find_path(here, goal, &blocked, ctx.path_max_expansions);
    let step = path.as_ref().and_then(|path| path.first().copied());
    if let Ok(mut pather) = ctx.level.world.get::<&mut Pather>(enemy) {
        pather.path = path;
    }
    step
}

fn set_state(ctx: &mut TurnContext, enemy: Entity, state: AiState) {
    if let Ok(mut brain) = ctx.level.world.get::<&mut EnemyBrain>(enemy) {
        brain.state = state;
    }
}

fn set_chase_time(ctx: &mut TurnContext, enemy: Entity, turns: u32) {
    if let Ok(mut brain) = ctx.level.world.get::<&mut EnemyBrain>(enemy) {
        brain.chase_time = turns;
    }
}

fn set_target(ctx: &mut TurnContext, enemy: Entity, target: Option<TileCoord>) {
    if let Ok(mut pather) = ctx.level.world.get::<&mut Pather>(enemy) {
        pather.target = target;
    }
}

fn clear_route(ctx: &mut TurnContext, enemy: Entity) {
    if let Ok(mut pather) = ctx.level.world.get::<&mut Pather>(enemy) {
        pather.clear();
    }
}
