use hecs::Entity;
use log::info;

use super::{with_transform, Action, ActionKind, ActionTimer, TurnContext};
use crate::components::Health;
use crate::constants::{FALL_FRAMES, FALL_SPIN_PER_FRAME};
use crate::events::GameEvent;

/// Drop through a pit. The player survives with half their health and
/// arrives on the floor below; anything else is lost.
#[derive(Debug)]
pub struct Fall {
    actor: Entity,
    timer: ActionTimer,
    landed: bool,
}

impl Fall {
    pub fn new(actor: Entity) -> Self {
        Self {
            actor,
            timer: ActionTimer::new(FALL_FRAMES),
            landed: false,
        }
    }

    fn land(&mut self, ctx: &mut TurnContext) {
        if self.landed {
            return;
        }
        self.landed = true;
        let level = &mut *ctx.level;
        let Ok(mut health) = level.world.get::<&mut Health>(self.actor) else {
            return;
        };
        if self.actor == ctx.player {
            health.current = (health.current / 2).max(1);
            drop(health);
            with_transform(level, self.actor, |transform| {
                transform.scale = 1.0;
                transform.alpha = 1.0;
                transform.rotation = 0.0;
            });
            info!("Fell from floor {}", level.floor);
            ctx.events.push(GameEvent::FloorTransition { to: level.floor + 1 });
        } else {
            health.current = 0;
        }
    }
}

impl Action for Fall {
    fn kind(&self) -> ActionKind {
        ActionKind::Fall
    }

    fn actor(&self) -> Entity {
        self.actor
    }

    fn turn_increase(&self) -> f64 {
        0.0
    }

    fn timer(&self) -> &ActionTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut ActionTimer {
        &mut self.timer
    }

    fn animate_step(&mut self, ctx: &mut TurnContext) {
        if self.timer.is_last_frame() {
            self.land(ctx);
            return;
        }
        let left = (self.timer.remaining - 1) as f32 / self.timer.duration as f32;
        with_transform(ctx.level, self.actor, |transform| {
            transform.scale = left;
            transform.alpha = left;
            transform.rotation += FALL_SPIN_PER_FRAME;
        });
    }

    fn apply_immediately(&mut self, ctx: &mut TurnContext) {
        self.land(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::Harness;
    use crate::components::Transform;
    use crate::spawning::enemies;

    #[test]
    fn test_player_survives_with_half_health() {
        let mut h = Harness::new((4, 4));
        let player = h.player;
        h.level.world.get::<&mut Health>(player).unwrap().current = 15;
        let mut fall = Fall::new(player);
        h.animate_fully(&mut fall);
        assert_eq!(h.level.world.get::<&Health>(player).unwrap().current, 7);
        assert!(h.events.iter().any(|e| matches!(e, GameEvent::FloorTransition { to: 2 })));
        assert_eq!(h.level.world.get::<&Transform>(player).unwrap().scale, 1.0);
    }

    #[test]
    fn test_fall_never_kills_the_player() {
        let mut h = Harness::new((4, 4));
        let player = h.player;
        h.level.world.get::<&mut Health>(player).unwrap().current = 1;
        Fall::new(player).apply_immediately(&mut h.ctx());
        assert_eq!(h.level.world.get::<&Health>(player).unwrap().current, 1);
    }

    #[test]
    fn test_enemy_is_lost() {
        let mut h = Harness::new((4, 4));
        let worm = h.level.add_enemy(&enemies::WIGGLY_WORM, (6, 6), 0.5, &mut h.rng);
        let mut fall = Fall::new(worm);
        h.animate_fully(&mut fall);
        fall.apply_immediately(&mut h.ctx());
        assert!(h.level.world.get::<&Health>(worm).unwrap().is_dead());
        assert!(h.events.is_empty());
    }
}
