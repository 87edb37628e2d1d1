use std::time::Duration;

use metro_runners_core::{Command, Event, InputAction};
use metro_runners_system_input::{Input, InputContext, LoopControl};
use metro_runners_world::{self as world, query, World};
use proptest::prelude::*;

fn frame(input: &mut Input, world: &mut World, actions: &[InputAction], now: Duration) -> Vec<Event> {
    let player = query::player(world);
    let context = InputContext {
        phase: query::phase(world),
        gravity_switches: player.gravity_switches,
    };
    let mut commands = Vec::new();
    assert_eq!(
        input.handle(actions, now, context, &mut commands),
        LoopControl::Continue
    );

    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn started_world() -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartRun, &mut events);
    world
}

proptest! {
    #[test]
    fn dashes_respect_the_slower_of_both_gates(
        offsets in prop::collection::vec(1u64..4000, 1..60),
    ) {
        let mut input = Input::default();
        let mut world = started_world();
        let mut at = 0u64;
        let mut dashes: Vec<u64> = Vec::new();

        for offset in offsets {
            at += offset;
            let events = frame(&mut input, &mut world, &[InputAction::Dash], Duration::from_millis(at));
            if events.iter().any(|event| matches!(event, Event::Dashed { .. })) {
                dashes.push(at);
            }
        }

        for pair in dashes.windows(2) {
            prop_assert!(pair[1] - pair[0] >= 10_000, "dashes at {pair:?}");
        }
    }
}

#[test]
fn slash_passes_both_gates_at_their_boundary() {
    let mut input = Input::default();
    let mut world = started_world();

    let first = frame(&mut input, &mut world, &[InputAction::Slash], Duration::ZERO);
    assert_eq!(first, vec![Event::SlashStarted]);

    for tick in 0..10u64 {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                now: Duration::from_millis(tick * 33),
            },
            &mut events,
        );
    }
    assert!(query::sword(&world).is_none());

    let early = frame(&mut input, &mut world, &[InputAction::Slash], Duration::from_millis(1999));
    assert!(early.is_empty());

    let on_time = frame(&mut input, &mut world, &[InputAction::Slash], Duration::from_millis(2000));
    assert_eq!(on_time, vec![Event::SlashStarted]);
}

#[test]
fn double_gravity_press_in_one_frame_uses_one_switch() {
    let mut input = Input::default();
    let mut world = started_world();

    let events = frame(
        &mut input,
        &mut world,
        &[InputAction::SwitchGravity, InputAction::SwitchGravity],
        Duration::ZERO,
    );
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::GravitySwitched { .. }))
            .count(),
        1
    );
    assert_eq!(query::player(&world).gravity_switches, 1);
}

#[test]
fn controller_burst_cooldown_binds_shoot() {
    use metro_runners_core::{Ability, AbilityRejection};

    let mut input = Input::default();
    let mut world = started_world();

    let first = frame(&mut input, &mut world, &[InputAction::Shoot], Duration::ZERO);
    assert_eq!(first, vec![Event::BurstStarted { projectiles: 3 }]);

    let input_open = frame(&mut input, &mut world, &[InputAction::Shoot], Duration::from_millis(1000));
    assert_eq!(
        input_open,
        vec![Event::AbilityRejected {
            ability: Ability::Shoot,
            reason: AbilityRejection::CoolingDown,
        }]
    );

    let both_open = frame(&mut input, &mut world, &[InputAction::Shoot], Duration::from_millis(2000));
    assert_eq!(both_open, vec![Event::BurstStarted { projectiles: 3 }]);
}
