//! Game simulation - one frame of input, turns, cleanup and event processing.

use glam::Vec2;
use log::{error, info};

use crate::actions::TurnContext;
use crate::components::Transform;
use crate::constants::FRAME_DT;
use crate::events::GameEvent;
use crate::input::{InputSource, PlayerIntent};
use crate::systems;
use crate::time_system::SchedulerState;

use super::{GamePhase, GameSession};

impl GameSession {
    /// Run one frame
    pub fn update(&mut self, input: &dyn InputSource) {
        puffin::profile_function!();
        self.frame += 1;

        self.tap.update(input);
        let clicked = input.left_click_edge() || input.tap_edge() || self.tap.tapped();
        // A click that closes a dialog is spent on the dialog
        let dialog_click = clicked && self.dialogs.pop().is_some();

        let follow = self.player_pixel();
        self.camera.update(input, &self.tap, follow);

        let fresh = PlayerIntent::from_input(input, &self.camera, &self.tap);
        if !dialog_click && fresh.clicked_tile.is_some() {
            self.latched.clicked_tile = fresh.clicked_tile;
            self.latched.shove = fresh.shove;
        }
        let intent = PlayerIntent {
            wait: fresh.wait,
            ..self.latched
        };

        if self.phase == GamePhase::InGame {
            self.step_turns(&intent);
        }

        self.level
            .remove_dead(&mut self.scheduler, self.player, &mut self.events, &mut self.rng);
        self.process_events();

        systems::tick_animators(&mut self.level.world, &self.level.grid, FRAME_DT);
        self.vfx.update(FRAME_DT);
    }

    fn step_turns(&mut self, intent: &PlayerIntent) {
        // The player's brain runs this frame when it heads an idle order
        let asks_player = self.dialogs.is_empty()
            && self.scheduler.state() == SchedulerState::Idle
            && self.scheduler.head().is_some_and(|(entity, _)| entity == self.player);

        let mut ctx = TurnContext {
            level: &mut self.level,
            player: self.player,
            events: &mut self.events,
            dialogs: &mut self.dialogs,
            rng: &mut self.rng,
            pathfinder: &self.pathfinder,
            intent,
            path_max_expansions: self.config.path_max_expansions,
        };
        self.scheduler.update(&mut ctx);

        if asks_player {
            self.latched = PlayerIntent::default();
        }
    }

    fn process_events(&mut self) {
        let events: Vec<GameEvent> = self.events.drain().collect();
        let mut transition = None;
        for event in &events {
            let anchor = self.player_pixel();
            self.vfx.handle_event(event, anchor);
            match event {
                GameEvent::FloorTransition { to } => {
                    // Only the first request of a frame counts
                    transition.get_or_insert(*to);
                }
                GameEvent::PlayerDied => {
                    if self.phase != GamePhase::GameOver {
                        info!("Game over on floor {}", self.level.floor);
                    }
                    self.phase = GamePhase::GameOver;
                }
                _ => {}
            }
        }

        if let Some(to) = transition {
            if self.phase == GamePhase::InGame {
                if let Err(err) = self.enter_floor(to) {
                    error!("Could not enter floor {}: {}", to, err);
                }
            }
        }
    }

    fn player_pixel(&self) -> Vec2 {
        self.level
            .world
            .get::<&Transform>(self.player)
            .map(|transform| transform.position)
            .unwrap_or(Vec2::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use crate::components::{entity_coord, Health, PlayerData};
    use crate::config::GameConfig;
    use crate::dialog::Dialog;
    use crate::engine::{GamePhase, GameSession};
    use crate::events::GameEvent;
    use crate::input::FrameInput;

    fn session() -> GameSession {
        GameSession::new(GameConfig::default()).unwrap()
    }

    #[test]
    fn test_tutorial_opens_with_minnie() {
        let mut s = session();
        let idle = FrameInput::default();
        for _ in 0..5 {
            s.update(&idle);
        }
        assert_eq!(s.level.tutorial_stage, 1);
        assert_eq!(s.dialogs.front().unwrap().speaker, "Minnie");
    }

    #[test]
    fn test_dialog_gates_turns_and_click_pops() {
        let mut s = session();
        s.level.tutorial_stage = 4;
        s.dialogs.push(Dialog::say("Minnie", "Hold on."));
        let before = s.scheduler.head();
        let idle = FrameInput::default();
        for _ in 0..10 {
            s.update(&idle);
        }
        assert_eq!(s.scheduler.head(), before);

        let click = FrameInput::click_at(s.camera.world_to_screen(glam::Vec2::ZERO));
        s.update(&click);
        assert!(s.dialogs.is_empty());
    }

    #[test]
    fn test_player_death_ends_game() {
        let mut s = session();
        s.level.world.get::<&mut Health>(s.player).unwrap().current = 0;
        s.events.push(GameEvent::PlayerDied);
        s.update(&FrameInput::default());
        assert_eq!(s.phase, GamePhase::GameOver);
        assert!(s.is_game_over());
    }

    #[test]
    fn test_transition_event_changes_floor() {
        let mut s = session();
        let xp = 5;
        s.level.world.get::<&mut PlayerData>(s.player).unwrap().xp = xp;
        s.events.push(GameEvent::FloorTransition { to: 1 });
        s.update(&FrameInput::default());
        assert_eq!(s.floor(), 1);
        assert!(s.has_cached(0));
        assert_eq!(s.level.world.get::<&PlayerData>(s.player).unwrap().xp, xp);
        assert_eq!(entity_coord(&s.level.world, s.player), Some(s.level.player_spawn));
    }
}
