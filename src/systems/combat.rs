//! Combat system functions.
//!
//! Damage rolls, hit application, experience and the player's slow
//! per-turn upkeep. Every function tolerates entities that have already
//! died or been despawned.

use hecs::{Entity, World};
use log::info;
use rand::Rng;

use crate::components::{
    Actor, ActorKind, EnemyBrain, Health, Melee, Pather, PlayerData, StatusEffect, StatusKind, Weapon,
};
use crate::constants::*;
use crate::events::{EventQueue, GameEvent};
use crate::items::{ItemKind, UseEffect};
use crate::level::Level;

/// Randomize a base damage into `[floor(0.6d), floor(1.4d)]`, then scale a
/// surprise hit by 1.5 (rounded down).
pub fn roll_damage<R: Rng>(rng: &mut R, base: i32, surprise: bool) -> i32 {
    let low = (base as f32 * DAMAGE_MIN_MULT).floor() as i32;
    let high = (base as f32 * DAMAGE_MAX_MULT).floor() as i32;
    let rolled = if high > low { rng.gen_range(low..=high) } else { low };
    if surprise {
        (rolled as f32 * SURPRISE_MULTIPLIER).floor() as i32
    } else {
        rolled
    }
}

/// Unrandomized melee damage: base stat plus weapon and strength for the player
pub fn attack_base(world: &World, attacker: Entity) -> i32 {
    let base = world.get::<&Melee>(attacker).map(|melee| melee.damage).unwrap_or(0);
    let bonus = world.get::<&PlayerData>(attacker).map(|data| data.melee_bonus()).unwrap_or(0);
    base + bonus
}

/// A hit is a surprise when an enemy target has no lock on the player, or
/// when the player is struck while standing on a tile that is not visible.
pub fn is_surprise(level: &Level, target: Entity) -> bool {
    match level.actor_kind(target) {
        Some(ActorKind::Enemy(_)) => level
            .world
            .get::<&EnemyBrain>(target)
            .map(|brain| !brain.player_lock)
            .unwrap_or(false),
        Some(ActorKind::Player) => crate::components::entity_coord(&level.world, target)
            .map(|coord| !level.is_visible(coord))
            .unwrap_or(false),
        _ => false,
    }
}

/// Subtract health from a living target. Returns false when there was
/// nothing to hit. A player hit cancels click-to-move, and dropping below
/// one health reports the death exactly once.
pub fn apply_damage(world: &mut World, target: Entity, amount: i32, events: &mut EventQueue) -> bool {
    let died = {
        let Ok(mut health) = world.get::<&mut Health>(target) else {
            return false;
        };
        if health.is_dead() {
            return false;
        }
        health.current -= amount;
        health.is_dead()
    };

    let is_player = world.get::<&Actor>(target).is_ok_and(|actor| actor.is_player());
    if is_player {
        if let Ok(mut pather) = world.get::<&mut Pather>(target) {
            pather.clear();
        }
        if let Ok(mut data) = world.get::<&mut PlayerData>(target) {
            data.force_move = false;
        }
        if died {
            info!("The player has fallen");
            events.push(GameEvent::PlayerDied);
        }
    }
    true
}

/// Grant xp; every full 20 converts into skill points. Xp also banks regen.
pub fn add_xp(world: &mut World, player: Entity, amount: u32, events: &mut EventQueue) {
    if amount == 0 {
        return;
    }
    if let Ok(mut health) = world.get::<&mut Health>(player) {
        health.regen_points += REGEN_POINTS_PER_XP * amount as i32;
    }
    let Ok(mut data) = world.get::<&mut PlayerData>(player) else {
        return;
    };
    data.xp += amount;
    let points = data.xp / XP_PER_SKILL_POINT;
    if points > 0 {
        data.skill_points += points;
        data.xp -= points * XP_PER_SKILL_POINT;
        events.push(GameEvent::SkillPointsGained { points });
    } else {
        events.push(GameEvent::XpGained { amount });
    }
}

/// Once per whole turn: banked regeneration and status effect countdowns
pub fn player_turn_ping(world: &mut World, player: Entity) {
    if let Ok(mut health) = world.get::<&mut Health>(player) {
        if health.regen_points > 0 {
            health.regen_points -= 1;
        }
        if health.regen_time > 0 {
            health.regen_time -= 1;
        }
        if health.regen_time <= 0 && health.current < health.max && health.regen_points > 0 {
            health.heal(1);
            health.regen_time = health.regen_max;
        }
    }
    if let Ok(mut data) = world.get::<&mut PlayerData>(player) {
        for effect in data.effects.iter_mut() {
            effect.turns_left = effect.turns_left.saturating_sub(1);
        }
        data.effects.retain(|effect| effect.turns_left > 0);
    }
}

/// Apply an inventory item's effect to the player
pub fn use_item(world: &mut World, player: Entity, kind: ItemKind) {
    match kind.def().use_effect {
        UseEffect::Heal(amount) => {
            if let Ok(mut health) = world.get::<&mut Health>(player) {
                health.heal(amount);
            }
        }
        UseEffect::Nourish { heal, regen_points } => {
            if let Ok(mut health) = world.get::<&mut Health>(player) {
                health.heal(heal);
                health.regen_points += regen_points;
            }
        }
        UseEffect::Strength { bonus, turns } => {
            if let Ok(mut data) = world.get::<&mut PlayerData>(player) {
                data.effects.push(StatusEffect {
                    kind: StatusKind::Strength,
                    magnitude: bonus,
                    turns_left: turns,
                });
            }
        }
        UseEffect::Equip { damage } => {
            if let Ok(mut data) = world.get::<&mut PlayerData>(player) {
                if let Some(old) = data.weapon.replace(Weapon { kind, damage }) {
                    data.inventory.push(old.kind);
                }
            }
        }
    }
}
