use std::time::Duration;

use metro_runners_core::{Command, Event};
use metro_runners_system_spawning::{Config, Spawning};
use metro_runners_world::{self as world, query, Config as WorldConfig, World};

#[test]
fn spawning_replay_is_deterministic() {
    let first = replay(0x4d59_5df4_d0f3_3173, 300);
    let second = replay(0x4d59_5df4_d0f3_3173, 300);
    assert_eq!(first, second);
    assert!(first.iter().any(|command| matches!(command, Command::SpawnObstacle { .. })));
    assert!(first.iter().any(|command| matches!(command, Command::SpawnGem { .. })));
}

#[test]
fn world_holds_at_most_one_obstacle_and_one_gem() {
    let mut world = World::new();
    let mut spawning = Spawning::new(Config::new(9));
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartRun, &mut events);

    for tick in 0..400u64 {
        run_spawning(&mut world, &mut spawning, &mut Vec::new());
        world::apply(
            &mut world,
            Command::Tick {
                now: Duration::from_millis(tick * 33),
            },
            &mut events,
        );
        assert!(query::obstacles(&world).len() <= 1);
        assert!(query::gems(&world).len() <= 1);
    }
}

#[test]
fn no_gems_spawn_while_the_boss_is_present() {
    let mut world = World::with_config(WorldConfig {
        boss_score_threshold: 20,
        ..WorldConfig::default()
    });
    let mut spawning = Spawning::new(Config::new(3));
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartRun, &mut events);

    for tick in 0..200u64 {
        run_spawning(&mut world, &mut spawning, &mut events);
        world::apply(
            &mut world,
            Command::Tick {
                now: Duration::from_millis(tick * 33),
            },
            &mut events,
        );
    }

    let boss_at = events
        .iter()
        .position(|event| matches!(event, Event::BossSpawned))
        .expect("boss never spawned");
    let run_end = events[boss_at..]
        .iter()
        .position(|event| matches!(event, Event::RunEnded { .. }))
        .map_or(events.len(), |offset| boss_at + offset);
    assert!(!events[boss_at..run_end]
        .iter()
        .any(|event| matches!(event, Event::GemSpawned { .. })));
}

fn run_spawning(world: &mut World, spawning: &mut Spawning, events: &mut Vec<Event>) -> Vec<Command> {
    let mut commands = Vec::new();
    spawning.handle(&query::spawn_view(world), &mut commands);
    for command in commands.iter().cloned() {
        world::apply(world, command, events);
    }
    commands
}

fn replay(seed: u64, ticks: u64) -> Vec<Command> {
    let mut world = World::new();
    let mut spawning = Spawning::new(Config::new(seed));
    let mut events = Vec::new();
    let mut log = Vec::new();
    world::apply(&mut world, Command::StartRun, &mut events);

    for tick in 0..ticks {
        log.extend(run_spawning(&mut world, &mut spawning, &mut events));
        world::apply(
            &mut world,
            Command::Tick {
                now: Duration::from_millis(tick * 33),
            },
            &mut events,
        );
    }
    log
}
