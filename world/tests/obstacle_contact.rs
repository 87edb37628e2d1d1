use std::time::Duration;

use metro_runners_core::{Command, DamageCause, Event, GamePhase, RunOutcome};
use metro_runners_world::{apply, query, World};

const FRAME_MS: u64 = 33;

fn tick(world: &mut World, index: u64) -> Vec<Event> {
    let mut events = Vec::new();
    apply(
        world,
        Command::Tick {
            now: Duration::from_millis(index * FRAME_MS),
        },
        &mut events,
    );
    events
}

#[test]
fn ramming_obstacle_damages_grounded_player_once_per_cooldown() {
    let mut world = World::new();
    let mut events = Vec::new();
    apply(&mut world, Command::StartRun, &mut events);

    let mut index = 0;
    while !query::player(&world).on_ground {
        let _ = tick(&mut world, index);
        index += 1;
        assert!(index < 100, "player never landed");
    }

    apply(
        &mut world,
        Command::SpawnObstacle { x: 600.0, y: 420.0 },
        &mut events,
    );

    let mut hits = Vec::new();
    while query::phase(&world) == GamePhase::Active {
        for event in tick(&mut world, index) {
            if let Event::PlayerDamaged {
                amount,
                cause: DamageCause::Obstacle,
                ..
            } = event
            {
                assert_eq!(amount, 2);
                hits.push(index * FRAME_MS);
            }
        }
        index += 1;
        assert!(index < 500, "run never ended");
    }

    assert_eq!(
        query::phase(&world),
        GamePhase::GameOver {
            outcome: RunOutcome::Defeat,
        }
    );
    assert_eq!(hits.len(), 2, "hits at {hits:?}");
    assert!(hits[1] - hits[0] >= 1000);
}

#[test]
fn pushed_player_keeps_touching_the_obstacle() {
    let mut world = World::new();
    let mut events = Vec::new();
    apply(&mut world, Command::StartRun, &mut events);
    for index in 0..15 {
        let _ = tick(&mut world, index);
    }
    apply(
        &mut world,
        Command::SpawnObstacle { x: 500.0, y: 420.0 },
        &mut events,
    );

    for index in 15..25 {
        let _ = tick(&mut world, index);
    }

    let player = query::player(&world).rect;
    let obstacle = query::obstacles(&world)[0].rect;
    assert!(player.intersects(&obstacle));
    assert!(player.left() < 350.0);
}
