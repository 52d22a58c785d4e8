use glam::Vec2;
use hecs::Entity;

use super::{face_toward, set_anim, snap_to_tile, with_transform, Action, ActionKind, ActionTimer, TurnContext};
use crate::components::{AnimState, Melee as MeleeStats};
use crate::constants::*;
use crate::events::GameEvent;
use crate::systems::combat;

/// A bite or swipe at an adjacent target. Damage is rolled when the attack
/// is chosen and lands exactly once, mid-lunge or on immediate resolution.
#[derive(Debug)]
pub struct Melee {
    actor: Entity,
    target: Entity,
    damage: i32,
    surprise: bool,
    cost: f64,
    timer: ActionTimer,
    applied: bool,
    /// Unit vector from attacker to target in pixel space
    direction: Vec2,
}

impl Melee {
    pub fn new(ctx: &mut TurnContext, actor: Entity, target: Entity) -> Self {
        let level = &*ctx.level;
        let surprise = combat::is_surprise(level, target);
        let base = combat::attack_base(&level.world, actor);
        let damage = combat::roll_damage(ctx.rng, base, surprise);
        let cost = level.world.get::<&MeleeStats>(actor).map(|melee| melee.time).unwrap_or(1.0);
        let direction = match (level.pixel_of(actor), level.pixel_of(target)) {
            (Some(from), Some(to)) => (to - from).normalize_or_zero(),
            _ => Vec2::ZERO,
        };
        Self {
            actor,
            target,
            damage,
            surprise,
            cost,
            timer: ActionTimer::new(MELEE_FRAMES),
            applied: false,
            direction,
        }
    }

    pub fn target(&self) -> Entity {
        self.target
    }

    pub fn damage(&self) -> i32 {
        self.damage
    }

    pub fn is_surprise(&self) -> bool {
        self.surprise
    }

    fn hit(&mut self, ctx: &mut TurnContext) {
        if self.applied {
            return;
        }
        self.applied = true;
        let position = ctx.level.pixel_of(self.target).unwrap_or(Vec2::ZERO);
        if combat::apply_damage(&mut ctx.level.world, self.target, self.damage, ctx.events) {
            ctx.events.push(GameEvent::AttackHit {
                attacker: self.actor,
                target: self.target,
                position,
                damage: self.damage,
                surprise: self.surprise,
            });
        }
    }
}

impl Action for Melee {
    fn kind(&self) -> ActionKind {
        ActionKind::Melee
    }

    fn actor(&self) -> Entity {
        self.actor
    }

    fn turn_increase(&self) -> f64 {
        self.cost
    }

    fn timer(&self) -> &ActionTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut ActionTimer {
        &mut self.timer
    }

    fn animate_step(&mut self, ctx: &mut TurnContext) {
        let remaining = self.timer.remaining;
        if self.timer.is_first_frame() {
            set_anim(ctx.level, self.actor, AnimState::Attack);
            face_toward(ctx.level, self.actor, Vec2::ZERO, self.direction);
        }

        let lunge = self.direction * LUNGE_STEP;
        if remaining > MELEE_IMPACT_FRAME {
            with_transform(ctx.level, self.actor, |transform| transform.position += lunge);
        } else if remaining == MELEE_IMPACT_FRAME {
            self.hit(ctx);
        } else if remaining > MELEE_RECOVER_FRAME {
            with_transform(ctx.level, self.actor, |transform| transform.position -= lunge);
        }

        if self.timer.is_last_frame() {
            snap_to_tile(ctx.level, self.actor);
            set_anim(ctx.level, self.actor, AnimState::Idle);
        }
    }

    fn apply_immediately(&mut self, ctx: &mut TurnContext) {
        self.hit(ctx);
        snap_to_tile(ctx.level, self.actor);
        set_anim(ctx.level, self.actor, AnimState::Idle);
    }
}
