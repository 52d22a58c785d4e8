//! Headless driver: plays a seeded session with a scripted player and logs
//! what happens. `RUST_LOG` controls verbosity.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use molehole::components::{entity_coord, Health, Pather, PlayerData};
use molehole::geometry::tile_to_pixel;
use molehole::input::FrameInput;
use molehole::render::RecordingSink;
use molehole::time_system::SchedulerState;
use molehole::{GameConfig, GameResult, GameSession};

const FRAMES: u64 = 20_000;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        warn!("Session failed: {}", err);
        std::process::exit(1);
    }
}

fn run() -> GameResult<()> {
    let config = GameConfig::default();
    let mut script = StdRng::seed_from_u64(config.seed ^ 0xfeed);
    let mut session = GameSession::new(config)?;
    let mut sink = RecordingSink::default();

    for _ in 0..FRAMES {
        let input = next_input(&session, &mut script);
        session.update(&input);

        sink.calls.clear();
        session.render(&mut sink);

        if session.is_game_over() {
            break;
        }
    }

    let player = session.player;
    let world = &session.level.world;
    let health = world.get::<&Health>(player).map(|h| h.current).unwrap_or(0);
    let (xp, skill_points) = world
        .get::<&PlayerData>(player)
        .map(|data| (data.xp, data.skill_points))
        .unwrap_or((0, 0));
    info!(
        "Stopped after {} frames on floor {} ({}): health {}, xp {}, skill points {}, turn {:.1}{}",
        session.frame(),
        session.floor(),
        session.level.zone.name(),
        health,
        xp,
        skill_points,
        session.scheduler.turn(),
        if session.is_game_over() { ", game over" } else { "" },
    );
    Ok(())
}

/// Click through dialogs, and send an idle player to a random tile they
/// have already seen.
fn next_input(session: &GameSession, script: &mut StdRng) -> FrameInput {
    // Clicks are edges: leave a gap between them
    if session.frame() % 2 == 1 {
        return FrameInput::default();
    }
    if !session.dialogs.is_empty() {
        return FrameInput::click_at(session.camera.world_to_screen(glam::Vec2::ZERO));
    }

    let player = session.player;
    let idle = session.scheduler.state() == SchedulerState::Idle
        && session.scheduler.head().is_some_and(|(entity, _)| entity == player)
        && session.level.world.get::<&Pather>(player).is_ok_and(|pather| pather.target.is_none());
    if !idle {
        return FrameInput::default();
    }

    let Some(here) = entity_coord(&session.level.world, player) else {
        return FrameInput::default();
    };
    let seen: Vec<(i32, i32)> = session
        .level
        .grid
        .find_all(|tile| tile.revealed && tile.is_walkable())
        .into_iter()
        .filter(|&coord| coord != here)
        .collect();
    if seen.is_empty() {
        return FrameInput::default();
    }
    let goal = seen[script.gen_range(0..seen.len())];
    FrameInput::click_at(session.camera.world_to_screen(tile_to_pixel(goal)))
}
