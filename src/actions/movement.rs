use glam::Vec2;
use hecs::Entity;

use super::{face_toward, set_anim, with_transform, Action, ActionKind, ActionTimer, Fall, TurnContext};
use crate::components::{entity_coord, AnimState, Flying, TurnTaker};
use crate::constants::MOVE_FRAMES;
use crate::events::GameEvent;
use crate::geometry::{tile_to_pixel, TileCoord};
use crate::tile::Overlay;

/// One tile step. The tile changes hands on the first frame; the sprite
/// slides over the rest and snaps on the last.
#[derive(Debug)]
pub struct Movement {
    actor: Entity,
    from: TileCoord,
    to: TileCoord,
    cost: f64,
    timer: ActionTimer,
    started: bool,
    /// Destination was taken by someone else when the step began
    blocked: bool,
    finished: bool,
    follow_up: Option<Box<dyn Action>>,
}

impl Movement {
    pub fn new(ctx: &TurnContext, actor: Entity, to: TileCoord) -> Self {
        let world = &ctx.level.world;
        let from = entity_coord(world, actor).unwrap_or(to);
        let cost = world.get::<&TurnTaker>(actor).map(|turn| turn.move_time).unwrap_or(1.0);
        Self {
            actor,
            from,
            to,
            cost,
            timer: ActionTimer::new(MOVE_FRAMES),
            started: false,
            blocked: false,
            finished: false,
            follow_up: None,
        }
    }

    pub fn destination(&self) -> TileCoord {
        self.to
    }

    fn start(&mut self, ctx: &mut TurnContext) {
        if self.started {
            return;
        }
        self.started = true;
        let level = &mut *ctx.level;
        if !level.world.contains(self.actor) {
            self.blocked = true;
            return;
        }
        if level.occupant_at(self.to).is_some_and(|occupant| occupant != self.actor) {
            self.blocked = true;
            return;
        }
        level.relocate(self.actor, self.to);
        face_toward(level, self.actor, tile_to_pixel(self.from), tile_to_pixel(self.to));
        set_anim(level, self.actor, AnimState::Move);
        if self.actor == ctx.player {
            level.reshade(self.to);
        }
    }

    fn finish(&mut self, ctx: &mut TurnContext) {
        if self.finished {
            return;
        }
        self.finished = true;
        let level = &mut *ctx.level;
        set_anim(level, self.actor, AnimState::Idle);
        if self.blocked {
            with_transform(level, self.actor, |transform| transform.snap_to(self.from));
            return;
        }
        with_transform(level, self.actor, |transform| transform.snap_to(self.to));

        let Some(tile) = level.grid.get(self.to.0, self.to.1) else {
            return;
        };
        let into_pit = tile.kind.is_pit() && level.world.get::<&Flying>(self.actor).is_err();
        let overlay = tile.overlay;
        if into_pit {
            self.follow_up = Some(Box::new(Fall::new(self.actor)));
            return;
        }
        if self.actor == ctx.player {
            match overlay {
                Some(Overlay::Exit) => ctx.events.push(GameEvent::FloorTransition { to: level.floor + 1 }),
                Some(Overlay::Entrance) if level.floor > 0 => {
                    ctx.events.push(GameEvent::FloorTransition { to: level.floor - 1 })
                }
                _ => {}
            }
        }
    }
}

impl Action for Movement {
    fn kind(&self) -> ActionKind {
        ActionKind::Movement
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
            self.start(ctx);
        }
        if self.timer.is_last_frame() {
            self.finish(ctx);
            return;
        }
        if !self.blocked {
            let step: Vec2 = (tile_to_pixel(self.to) - tile_to_pixel(self.from)) / self.timer.duration as f32;
            with_transform(ctx.level, self.actor, |transform| transform.position += step);
        }
    }

    fn apply_immediately(&mut self, ctx: &mut TurnContext) {
        self.start(ctx);
        self.finish(ctx);
    }

    fn take_follow_up(&mut self) -> Option<Box<dyn Action>> {
        self.follow_up.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::Harness;
    use crate::components::Transform;

    #[test]
    fn test_step_moves_occupant_on_first_frame() {
        let mut h = Harness::new((5, 5));
        let player = h.player;
        let mut step = Movement::new(&h.ctx(), player, (6, 5));
        {
            let mut ctx = h.ctx();
            step.animate_step(&mut ctx);
        }
        step.timer_mut().tick();
        assert_eq!(h.level.occupant_at((6, 5)), Some(player));
        assert_eq!(h.level.occupant_at((5, 5)), None);
        assert!(!h.level.world.get::<&Transform>(player).unwrap().left_facing);

        h.animate_fully(&mut step);
        assert_eq!(h.level.world.get::<&Transform>(player).unwrap().position, tile_to_pixel((6, 5)));
        assert!(h.level.is_visible((9, 5)));
    }

    #[test]
    fn test_immediate_resolution_matches_animation() {
        let mut h = Harness::new((5, 5));
        let player = h.player;
        let mut step = Movement::new(&h.ctx(), player, (5, 4));
        step.apply_immediately(&mut h.ctx());
        assert_eq!(h.level.occupant_at((5, 4)), Some(player));
        assert_eq!(h.level.world.get::<&Transform>(player).unwrap().position, tile_to_pixel((5, 4)));
    }

    #[test]
    fn test_blocked_step_stays_put() {
        let mut h = Harness::new((5, 5));
        let npc = h.level.add_npc(crate::components::NpcKind::Maxwell, (6, 5));
        let player = h.player;
        let mut step = Movement::new(&h.ctx(), player, (6, 5));
        h.animate_fully(&mut step);
        assert_eq!(h.level.occupant_at((6, 5)), Some(npc));
        assert_eq!(h.level.occupant_at((5, 5)), Some(player));
        assert_eq!(h.level.world.get::<&Transform>(player).unwrap().position, tile_to_pixel((5, 5)));
    }

    #[test]
    fn test_exit_overlay_requests_descent() {
        let mut h = Harness::new((5, 5));
        h.level.grid.get_mut(6, 5).unwrap().overlay = Some(Overlay::Exit);
        let player = h.player;
        let mut step = Movement::new(&h.ctx(), player, (6, 5));
        step.apply_immediately(&mut h.ctx());
        assert!(h.events.iter().any(|e| matches!(e, GameEvent::FloorTransition { to: 2 })));
    }

    #[test]
    fn test_entering_pit_queues_fall() {
        let mut h = Harness::new((5, 5));
        h.level.grid.set_kind(6, 5, crate::tile::TileKind::pit());
        let player = h.player;
        let mut step = Movement::new(&h.ctx(), player, (6, 5));
        step.apply_immediately(&mut h.ctx());
        let fall = step.take_follow_up().unwrap();
        assert_eq!(fall.kind(), ActionKind::Fall);
        assert_eq!(fall.turn_increase(), 0.0);
    }
}
