use std::time::Duration;

use metro_runners_core::{
    Ability, Command, EntitySnapshot, Event, GemVariant, PlayerSnapshot, ProgressSnapshot,
};
use metro_runners_world::{self as world, query, Config, World};

#[test]
fn replay_is_identical_for_the_same_seed() {
    let first = replay(0x5eed);
    let second = replay(0x5eed);

    assert_eq!(first, second, "replay diverged between runs");
    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::ObstacleSpawned { .. })));
    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::ProjectileFired { .. })));
}

#[test]
fn recycled_obstacles_follow_the_world_seed() {
    let first = replay(1);
    let second = replay(2);

    assert_ne!(
        first.obstacle_trace, second.obstacle_trace,
        "different seeds recycled obstacles identically"
    );
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    obstacle_trace: Vec<EntitySnapshot>,
    player: PlayerSnapshot,
    progress: ProgressSnapshot,
}

fn replay(seed: u64) -> ReplayOutcome {
    let mut world = World::with_config(Config {
        rng_seed: seed,
        ..Config::default()
    });
    let mut events = Vec::new();
    let mut obstacle_trace = Vec::new();

    for command in scripted_commands() {
        world::apply(&mut world, command, &mut events);
        obstacle_trace.extend(query::obstacles(&world));
    }

    ReplayOutcome {
        events,
        obstacle_trace,
        player: query::player(&world),
        progress: query::progress(&world),
    }
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = vec![
        Command::StartRun,
        Command::SpawnObstacle { x: 1100.0, y: 60.0 },
    ];

    for tick in 0..600u64 {
        let now = Duration::from_millis(tick * 33);
        if tick % 45 == 0 {
            commands.push(Command::UseAbility {
                ability: Ability::Shoot,
                at: now,
            });
        }
        if tick % 80 == 10 {
            commands.push(Command::SpawnGem {
                x: 1000.0,
                y: 400.0,
                variant: GemVariant::new((tick % 4) as u8),
            });
        }
        commands.push(Command::Tick { now });
    }

    commands
}
