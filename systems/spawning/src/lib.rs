#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting obstacle and gem
//! spawn commands.

use metro_runners_core::{Command, GemVariant, SpawnView, PLAY_HEIGHT, PLAY_WIDTH};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const MIN_SPAWN_DISTANCE: i32 = 100;
const MAX_SPAWN_DISTANCE: i32 = 500;
const MIN_SPAWN_TOP: i32 = (PLAY_HEIGHT / 2.0) as i32;
const MAX_SPAWN_TOP: i32 = (PLAY_HEIGHT - 50.0) as i32;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that keeps one obstacle and one gem in play during a run.
#[derive(Debug)]
pub struct Spawning {
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Emits spawn commands for every empty entity group.
    ///
    /// Nothing spawns outside a run, and gems stay away while the boss is
    /// present.
    pub fn handle(&mut self, view: &SpawnView, out: &mut Vec<Command>) {
        if !view.phase.is_running() {
            return;
        }

        if view.obstacles == 0 {
            let (x, y) = self.spawn_point();
            out.push(Command::SpawnObstacle { x, y });
        }

        if view.gems == 0 && !view.boss_present {
            let (x, y) = self.spawn_point();
            let variant = GemVariant::new(self.rng.gen_range(0..GemVariant::COUNT));
            out.push(Command::SpawnGem { x, y, variant });
        }
    }

    fn spawn_point(&mut self) -> (f32, f32) {
        let distance = self.rng.gen_range(MIN_SPAWN_DISTANCE..=MAX_SPAWN_DISTANCE);
        let top = self.rng.gen_range(MIN_SPAWN_TOP..=MAX_SPAWN_TOP);
        (PLAY_WIDTH + distance as f32, top as f32)
    }
}
