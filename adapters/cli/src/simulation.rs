//! Fixed-order frame pipeline driving the world and its systems.

use metro_runners_core::{Command, Event};
use metro_runners_rendering::{FrameInput, FrameOutcome, Scene};
use metro_runners_system_input::{Input, InputContext, LoopControl};
use metro_runners_system_spawning::{Config as SpawningConfig, Spawning};
use metro_runners_world::{self as world, query, Config as WorldConfig, World};

use crate::{clock::TimeSource, scene};

/// Owns the world together with the systems that feed it commands.
#[derive(Debug)]
pub(crate) struct Simulation<T> {
    world: World,
    input: Input,
    spawning: Spawning,
    clock: T,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl<T: TimeSource> Simulation<T> {
    pub(crate) fn new(world_config: WorldConfig, spawning_config: SpawningConfig, clock: T) -> Self {
        Self {
            world: World::with_config(world_config),
            input: Input::default(),
            spawning: Spawning::new(spawning_config),
            clock,
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Runs one tick: input, spawning, world tick, then scene population.
    pub(crate) fn step(&mut self, input: &FrameInput, scene: &mut Scene) -> FrameOutcome {
        let now = self.clock.now();
        self.events.clear();

        let player = query::player(&self.world);
        let context = InputContext {
            phase: query::phase(&self.world),
            gravity_switches: player.gravity_switches,
        };
        let control = self
            .input
            .handle(&input.actions, now, context, &mut self.commands);
        if control == LoopControl::Quit {
            self.commands.clear();
            return FrameOutcome::Exit;
        }
        self.flush_commands();

        self.spawning
            .handle(&query::spawn_view(&self.world), &mut self.commands);
        self.flush_commands();

        world::apply(&mut self.world, Command::Tick { now }, &mut self.events);

        scene::populate(&self.world, now, &self.events, scene);
        FrameOutcome::Continue
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    #[cfg(test)]
    pub(crate) fn world(&self) -> &World {
        &self.world
    }
}

#[cfg(test)]
mod tests {
    use std::{rc::Rc, time::Duration};

    use metro_runners_core::{GamePhase, InputAction, RunOutcome, START_BUTTON};
    use metro_runners_rendering::SoundCue;

    use super::*;
    use crate::clock::ManualClock;

    const FRAME: Duration = Duration::from_millis(33);

    fn simulation() -> (Simulation<Rc<ManualClock>>, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::default());
        let simulation = Simulation::new(
            WorldConfig::default(),
            SpawningConfig::new(11),
            Rc::clone(&clock),
        );
        (simulation, clock)
    }

    fn click_start() -> FrameInput {
        FrameInput {
            actions: vec![InputAction::Click {
                x: START_BUTTON.center_x(),
                y: START_BUTTON.center_y(),
            }],
        }
    }

    #[test]
    fn clicking_start_begins_a_run_and_spawns_entities() {
        let (mut simulation, clock) = simulation();
        let mut scene = Scene::default();

        let outcome = simulation.step(&click_start(), &mut scene);

        assert_eq!(outcome, FrameOutcome::Continue);
        assert_eq!(query::phase(simulation.world()), GamePhase::Active);
        assert_eq!(query::obstacles(simulation.world()).len(), 1);
        assert_eq!(query::gems(simulation.world()).len(), 1);
        assert_eq!(query::progress(simulation.world()).score, 1);

        clock.advance(FRAME);
        let _ = simulation.step(&FrameInput::default(), &mut scene);
        assert_eq!(query::obstacles(simulation.world()).len(), 1);
        assert_eq!(query::progress(simulation.world()).score, 2);
    }

    #[test]
    fn menu_frames_do_not_spawn() {
        let (mut simulation, clock) = simulation();
        let mut scene = Scene::default();

        for _ in 0..5 {
            clock.advance(FRAME);
            let _ = simulation.step(&FrameInput::default(), &mut scene);
        }

        assert_eq!(query::phase(simulation.world()), GamePhase::Menu);
        assert!(query::obstacles(simulation.world()).is_empty());
        assert_eq!(query::tick_index(simulation.world()), 5);
    }

    #[test]
    fn shooting_queues_the_shoot_sound() {
        let (mut simulation, clock) = simulation();
        let mut scene = Scene::default();
        let _ = simulation.step(&click_start(), &mut scene);

        clock.advance(FRAME);
        let shoot = FrameInput {
            actions: vec![InputAction::Shoot],
        };
        let _ = simulation.step(&shoot, &mut scene);

        assert!(scene.sounds.contains(&SoundCue::Shoot));
    }

    #[test]
    fn quit_only_exits_after_a_run() {
        let (mut simulation, clock) = simulation();
        let mut scene = Scene::default();
        let quit = FrameInput {
            actions: vec![InputAction::Quit],
        };

        assert_eq!(simulation.step(&quit, &mut scene), FrameOutcome::Continue);

        let _ = simulation.step(&click_start(), &mut scene);
        let mut frames = 0;
        while !matches!(
            query::phase(simulation.world()),
            GamePhase::GameOver { .. }
        ) {
            clock.advance(FRAME);
            let _ = simulation.step(&FrameInput::default(), &mut scene);
            frames += 1;
            assert!(frames < 10_000, "run never ended");
        }

        assert!(matches!(
            query::phase(simulation.world()),
            GamePhase::GameOver {
                outcome: RunOutcome::Defeat
            }
        ));
        assert_eq!(simulation.step(&quit, &mut scene), FrameOutcome::Exit);
    }
}
