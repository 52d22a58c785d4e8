//! End-to-end scenarios over the public API.

mod common;

use common::Arena;
use molehole::actions::{Action, Melee};
use molehole::components::{entity_coord, ActorKind, Health, NpcKind, TurnTaker};
use molehole::dungeon_gen::DungeonGenerator;
use molehole::events::GameEvent;
use molehole::input::{FrameInput, PlayerIntent};
use molehole::rooms::RoomLibrary;
use molehole::spawning::enemies;
use molehole::time_system::{SchedulerState, TurnScheduler};
use molehole::{GameConfig, GameSession};

fn next_turn(arena: &Arena, entity: hecs::Entity) -> f64 {
    arena.level.world.get::<&TurnTaker>(entity).unwrap().next_turn
}

fn with_hp(arena: &mut Arena, entity: hecs::Entity, hp: i32) {
    let mut health = arena.level.world.get::<&mut Health>(entity).unwrap();
    health.current = hp;
    health.max = hp;
}

#[test]
fn floor_zero_opens_in_marshalls_room() {
    let config = GameConfig {
        seed: 1234,
        ..GameConfig::default()
    };
    let session = GameSession::new(config).unwrap();
    let level = &session.level;
    let spawn = level.player_spawn;

    let tile = level.grid.get(spawn.0, spawn.1).unwrap();
    assert!(tile.is_walkable());
    assert!(tile.revealed);
    assert_eq!(tile.occupant, Some(session.player));

    // The family: Minnie at the bedside, the other three in the pit room
    let pit = level.room("pitRoom").unwrap();
    let mut in_pit = Vec::new();
    let mut elsewhere = Vec::new();
    for &npc in &level.npcs {
        let Some(ActorKind::Npc(kind)) = level.actor_kind(npc) else {
            panic!("non-npc in npc list");
        };
        if pit.contains(entity_coord(&level.world, npc).unwrap()) {
            in_pit.push(kind);
        } else {
            elsewhere.push(kind);
        }
    }
    assert_eq!(in_pit.len(), 3);
    for kind in [NpcKind::Michael, NpcKind::Maxwell, NpcKind::Magnolia] {
        assert!(in_pit.contains(&kind));
    }
    assert_eq!(elsewhere, vec![NpcKind::Minnie]);

    assert!(level.exit.is_none());
    assert!(level.room("exitRoom").is_none());
    assert!(level.enemies.is_empty());
}

#[test]
fn same_seed_rebuilds_the_same_floor() {
    let library = RoomLibrary::builtin().unwrap();
    let a = DungeonGenerator::generate(&library, 4, 77, 5).unwrap();
    let b = DungeonGenerator::generate(&library, 4, 77, 5).unwrap();
    assert_eq!(a.rooms, b.rooms);
    assert_eq!(a.player_spawn, b.player_spawn);
    assert_eq!(a.enemies.len(), b.enemies.len());
}

#[test]
fn earlier_turn_acts_first() {
    let mut arena = Arena::new((3, 3));
    arena.intent = PlayerIntent::wait();
    let npc = arena.level.add_npc(NpcKind::Maxwell, (10, 10));
    arena.level.world.get::<&mut TurnTaker>(npc).unwrap().next_turn = 0.5;
    arena.level.world.get::<&mut TurnTaker>(arena.player).unwrap().next_turn = 0.0;

    let mut scheduler = TurnScheduler::new();
    scheduler.initialize(&arena.level);
    assert_eq!(scheduler.head(), Some((arena.player, 0.0)));

    scheduler.update(&mut arena.ctx());
    let cost = scheduler.pending().unwrap().turn_increase();
    assert_eq!(scheduler.pending().unwrap().actor(), arena.player);
    assert_eq!(next_turn(&arena, arena.player), cost);

    let (head, _) = scheduler.head().unwrap();
    if cost > 0.5 {
        assert_eq!(head, npc);
    } else {
        assert_eq!(head, arena.player);
    }
    assert_eq!(next_turn(&arena, npc), 0.5);
}

#[test]
fn melee_lands_exactly_once() {
    let mut arena = Arena::new((5, 5));
    let worm = arena.level.add_enemy(&enemies::WIGGLY_WORM, (6, 5), 5.0, &mut arena.rng);
    with_hp(&mut arena, worm, 100);

    let player = arena.player;
    let mut melee = Melee::new(&mut arena.ctx(), player, worm);
    let damage = melee.damage();
    while !melee.timer().is_finished() {
        melee.animate_step(&mut arena.ctx());
        melee.timer_mut().tick();
    }
    // Resolving what is left must not strike again
    melee.apply_immediately(&mut arena.ctx());

    assert_eq!(arena.level.world.get::<&Health>(worm).unwrap().current, 100 - damage);
    let hits = arena.events.iter().filter(|e| matches!(e, GameEvent::AttackHit { .. })).count();
    assert_eq!(hits, 1);
}

#[test]
fn scheduled_melee_from_a_click() {
    let mut arena = Arena::new((5, 5));
    let worm = arena.level.add_enemy(&enemies::WIGGLY_WORM, (6, 5), 5.0, &mut arena.rng);
    with_hp(&mut arena, worm, 100);
    arena.intent = PlayerIntent::click((6, 5));

    let mut scheduler = TurnScheduler::new();
    scheduler.initialize(&arena.level);
    // First frame takes the click, the next starts the bite
    scheduler.update(&mut arena.ctx());
    scheduler.update(&mut arena.ctx());
    assert_eq!(scheduler.state(), SchedulerState::ActionPending);
    while scheduler.state() == SchedulerState::ActionPending {
        scheduler.update(&mut arena.ctx());
    }

    let dealt: Vec<i32> = arena
        .events
        .iter()
        .filter_map(|e| match e {
            GameEvent::AttackHit { target, damage, .. } if *target == worm => Some(*damage),
            _ => None,
        })
        .collect();
    assert_eq!(dealt.len(), 1);
    assert_eq!(arena.level.world.get::<&Health>(worm).unwrap().current, 100 - dealt[0]);
}

#[test]
fn dead_enemy_is_cleaned_up_in_one_pass() {
    let mut arena = Arena::new((3, 3));
    let worm = arena.level.add_enemy(&enemies::WIGGLY_WORM, (8, 8), 1.0, &mut arena.rng);
    let npc = arena.level.add_npc(NpcKind::Magnolia, (9, 9));
    let mut scheduler = TurnScheduler::new();
    scheduler.initialize(&arena.level);
    assert!(scheduler.contains(worm));

    arena.level.world.get::<&mut Health>(worm).unwrap().current = 0;
    arena.level.world.get::<&mut Health>(npc).unwrap().current = -2;
    arena
        .level
        .remove_dead(&mut scheduler, arena.player, &mut arena.events, &mut arena.rng);

    for (entity, coord) in [(worm, (8, 8)), (npc, (9, 9))] {
        assert!(!scheduler.contains(entity));
        assert!(!arena.level.world.contains(entity));
        assert_eq!(arena.level.occupant_at(coord), None);
    }
    assert!(arena.level.enemies.is_empty());
    assert!(arena.level.npcs.is_empty());
    assert!(scheduler.contains(arena.player));
    let deaths = arena.events.iter().filter(|e| matches!(e, GameEvent::EntityDied { .. })).count();
    assert_eq!(deaths, 2);
}

#[test]
fn session_round_trip_through_floors() {
    let mut session = GameSession::new(GameConfig::default()).unwrap();
    session.level.tutorial_stage = 4;
    let family = session.level.npcs.len();

    session.events.push(GameEvent::FloorTransition { to: 1 });
    session.update(&FrameInput::default());
    assert_eq!(session.floor(), 1);
    assert!(session.has_cached(0));
    let spawn = session.level.player_spawn;
    assert_eq!(entity_coord(&session.level.world, session.player), Some(spawn));

    session.events.push(GameEvent::FloorTransition { to: 0 });
    session.update(&FrameInput::default());
    assert_eq!(session.floor(), 0);
    assert_eq!(session.level.npcs.len(), family);
    assert_eq!(session.level.tutorial_stage, 4);
    assert!(session.has_cached(1));
}

#[test]
fn dialog_holds_the_world_still() {
    let mut session = GameSession::new(GameConfig::default()).unwrap();
    let idle = FrameInput::default();
    // Minnie acts first and fills the dialog queue
    session.update(&idle);
    assert!(!session.dialogs.is_empty());
    let turn = session.scheduler.turn();
    for _ in 0..30 {
        session.update(&idle);
    }
    assert_eq!(session.scheduler.turn(), turn);
}
