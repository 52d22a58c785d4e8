use glam::Vec2;
use hecs::Entity;

use super::{face_toward, set_anim, snap_to_tile, with_transform, Action, ActionKind, ActionTimer, Fall, TurnContext};
use crate::components::{entity_coord, AnimState, Flying, Melee as MeleeStats};
use crate::constants::*;
use crate::events::GameEvent;
use crate::geometry::{tile_to_pixel, TileCoord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShoveOutcome {
    /// Target moved one tile away from the attacker
    Landed,
    /// Target was pushed into a pit and will fall
    IntoPit,
    /// Destination was blocked
    Bounced,
}

/// Push an adjacent target one tile directly away. Whether it lands is
/// decided mid-animation against the grid as it is at that moment.
#[derive(Debug)]
pub struct Shove {
    actor: Entity,
    target: Entity,
    origin: TileCoord,
    destination: TileCoord,
    cost: f64,
    timer: ActionTimer,
    outcome: Option<ShoveOutcome>,
    follow_up: Option<Box<dyn Action>>,
}

impl Shove {
    pub fn new(ctx: &TurnContext, actor: Entity, target: Entity) -> Self {
        let world = &ctx.level.world;
        let from = entity_coord(world, actor).unwrap_or((0, 0));
        let origin = entity_coord(world, target).unwrap_or(from);
        let destination = (origin.0 + (origin.0 - from.0), origin.1 + (origin.1 - from.1));
        let cost = world.get::<&MeleeStats>(actor).map(|melee| melee.time).unwrap_or(1.0);
        Self {
            actor,
            target,
            origin,
            destination,
            cost,
            timer: ActionTimer::new(SHOVE_FRAMES),
            outcome: None,
            follow_up: None,
        }
    }

    pub fn destination(&self) -> TileCoord {
        self.destination
    }

    pub fn outcome(&self) -> Option<ShoveOutcome> {
        self.outcome
    }

    fn decide(&mut self, ctx: &mut TurnContext) {
        if self.outcome.is_some() {
            return;
        }
        let level = &mut *ctx.level;
        if entity_coord(&level.world, self.target) != Some(self.origin) {
            self.outcome = Some(ShoveOutcome::Bounced);
            return;
        }

        let into_pit = level.grid.get(self.destination.0, self.destination.1).is_some_and(|tile| {
            tile.kind.is_pit() && tile.occupant.is_none()
        }) && level.world.get::<&Flying>(self.target).is_err();

        let outcome = if into_pit {
            level.relocate(self.target, self.destination);
            self.follow_up = Some(Box::new(Fall::new(self.target)));
            ShoveOutcome::IntoPit
        } else if level.is_free(self.destination) {
            level.relocate(self.target, self.destination);
            ShoveOutcome::Landed
        } else {
            ShoveOutcome::Bounced
        };

        let landed = outcome != ShoveOutcome::Bounced;
        if landed && self.target == ctx.player {
            level.reshade(self.destination);
        }
        ctx.events.push(GameEvent::Shoved { target: self.target, landed });
        self.outcome = Some(outcome);
    }

    /// Target sprite position for the current frame
    fn target_offset(&self) -> Vec2 {
        let push = tile_to_pixel(self.destination) - tile_to_pixel(self.origin);
        let windup = (SHOVE_FRAMES - SHOVE_DECISION_FRAME) as f32;
        let elapsed = self.timer.elapsed() as f32;
        match self.outcome {
            // Lean halfway toward the destination while undecided
            None => push * 0.5 * (elapsed / windup).min(1.0),
            Some(ShoveOutcome::Bounced) => {
                let back = (elapsed - windup) / SHOVE_DECISION_FRAME as f32;
                push * 0.5 * (1.0 - back).max(0.0)
            }
            // Relocated: measure from the new tile
            Some(_) => {
                let rest = (elapsed - windup) / SHOVE_DECISION_FRAME as f32;
                -push * 0.5 * (1.0 - rest).max(0.0)
            }
        }
    }
}

impl Action for Shove {
    fn kind(&self) -> ActionKind {
        ActionKind::Shove
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
        if self.timer.is_first_frame() {
            set_anim(ctx.level, self.actor, AnimState::Attack);
            if let Some(from) = ctx.level.pixel_of(self.actor) {
                face_toward(ctx.level, self.actor, from, tile_to_pixel(self.origin));
            }
        }
        if self.timer.remaining == SHOVE_DECISION_FRAME {
            self.decide(ctx);
        }

        if self.timer.is_last_frame() {
            snap_to_tile(ctx.level, self.target);
            snap_to_tile(ctx.level, self.actor);
            set_anim(ctx.level, self.actor, AnimState::Idle);
            return;
        }
        if let Some(base) = ctx.level.pixel_of(self.target) {
            let offset = self.target_offset();
            with_transform(ctx.level, self.target, |transform| transform.position = base + offset);
        }
    }

    fn apply_immediately(&mut self, ctx: &mut TurnContext) {
        self.decide(ctx);
        snap_to_tile(ctx.level, self.target);
        snap_to_tile(ctx.level, self.actor);
        set_anim(ctx.level, self.actor, AnimState::Idle);
    }

    fn take_follow_up(&mut self) -> Option<Box<dyn Action>> {
        self.follow_up.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::Harness;
    use crate::components::{NpcKind, Transform};
    use crate::spawning::enemies;
    use crate::tile::TileKind;

    #[test]
    fn test_shove_into_open_floor() {
        let mut h = Harness::new((5, 5));
        let worm = h.level.add_enemy(&enemies::WIGGLY_WORM, (6, 5), 0.5, &mut h.rng);
        let player = h.player;
        let mut shove = Shove::new(&h.ctx(), player, worm);
        assert_eq!(shove.destination(), (7, 5));
        h.animate_fully(&mut shove);
        assert_eq!(shove.outcome(), Some(ShoveOutcome::Landed));
        assert_eq!(h.level.occupant_at((7, 5)), Some(worm));
        assert_eq!(h.level.occupant_at((6, 5)), None);
        assert_eq!(h.level.world.get::<&Transform>(worm).unwrap().position, tile_to_pixel((7, 5)));
        assert!(h.events.iter().any(|e| matches!(e, GameEvent::Shoved { landed: true, .. })));
    }

    #[test]
    fn test_blocked_shove_bounces() {
        let mut h = Harness::new((5, 5));
        let worm = h.level.add_enemy(&enemies::WIGGLY_WORM, (5, 6), 0.5, &mut h.rng);
        h.level.add_npc(NpcKind::Maxwell, (5, 7));
        let player = h.player;
        let mut shove = Shove::new(&h.ctx(), player, worm);
        h.animate_fully(&mut shove);
        assert_eq!(shove.outcome(), Some(ShoveOutcome::Bounced));
        assert_eq!(h.level.occupant_at((5, 6)), Some(worm));
        assert_eq!(h.level.world.get::<&Transform>(worm).unwrap().position, tile_to_pixel((5, 6)));
    }

    #[test]
    fn test_shove_into_pit_queues_fall() {
        let mut h = Harness::new((5, 5));
        h.level.grid.set_kind(7, 7, TileKind::pit());
        let worm = h.level.add_enemy(&enemies::WIGGLY_WORM, (6, 6), 0.5, &mut h.rng);
        let player = h.player;
        let mut shove = Shove::new(&h.ctx(), player, worm);
        shove.apply_immediately(&mut h.ctx());
        assert_eq!(shove.outcome(), Some(ShoveOutcome::IntoPit));
        let fall = shove.take_follow_up().unwrap();
        assert_eq!(fall.actor(), worm);
        assert_eq!(fall.kind(), ActionKind::Fall);
    }

    #[test]
    fn test_shove_against_wall_bounces() {
        let mut h = Harness::new((2, 5));
        let worm = h.level.add_enemy(&enemies::WIGGLY_WORM, (1, 5), 0.5, &mut h.rng);
        let player = h.player;
        let mut shove = Shove::new(&h.ctx(), player, worm);
        shove.apply_immediately(&mut h.ctx());
        assert_eq!(shove.outcome(), Some(ShoveOutcome::Bounced));
        assert!(h.events.iter().any(|e| matches!(e, GameEvent::Shoved { landed: false, .. })));
    }
}
