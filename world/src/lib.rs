#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Metro Runners.

mod collision;
mod entities;
mod player;
mod progression;

use std::time::Duration;

use metro_runners_core::{
    Ability, AbilityRejection, BackgroundVariant, Command, Cooldown, DamageCause, EntityId, Event,
    GamePhase, GemVariant, GravityDirection, Rect, RunOutcome,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    entities::{
        advance_group, Background, Boss, Fate, Gem, Motion, MotionContext, Obstacle, Projectile,
        Sword,
    },
    player::Player,
    progression::Progress,
};

const DEFAULT_RNG_SEED: u64 = 0x6d65_7472_6f5f_7275;
const DEFAULT_BOSS_SCORE_THRESHOLD: u32 = 2500;
const DEFAULT_ENTITY_SPEED: f32 = 10.0;
const DEFAULT_LANE_SCROLL_SPEED: f32 = 10.0;
const DEFAULT_MENU_SCROLL_SPEED: f32 = 1.0;
const DEFAULT_DAMAGE_COOLDOWN: Duration = Duration::from_millis(1000);
const BACKGROUND_WIDTH: f32 = 2400.0;

const OFF_MAP_LEFT_LIMIT: f32 = 0.0;
const OFF_MAP_RIGHT_LIMIT: f32 = 650.0;
const OFF_MAP_LEFT_DAMAGE: i32 = 10;
const OFF_MAP_RIGHT_DAMAGE: i32 = 5;

/// Tunable parameters of a world.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Seed for the generator that recycles obstacles.
    pub rng_seed: u64,
    /// Score at which the boss appears.
    pub boss_score_threshold: u32,
    /// Units per tick obstacles travel to the left.
    pub obstacle_speed: f32,
    /// Units per tick gems travel to the left.
    pub gem_speed: f32,
    /// Units per tick the lane background scrolls.
    pub lane_scroll_speed: f32,
    /// Units per tick the menu background scrolls.
    pub menu_scroll_speed: f32,
    /// Minimum time between two obstacle hits on the player.
    pub damage_cooldown: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rng_seed: DEFAULT_RNG_SEED,
            boss_score_threshold: DEFAULT_BOSS_SCORE_THRESHOLD,
            obstacle_speed: DEFAULT_ENTITY_SPEED,
            gem_speed: DEFAULT_ENTITY_SPEED,
            lane_scroll_speed: DEFAULT_LANE_SCROLL_SPEED,
            menu_scroll_speed: DEFAULT_MENU_SCROLL_SPEED,
            damage_cooldown: DEFAULT_DAMAGE_COOLDOWN,
        }
    }
}

/// Represents the authoritative Metro Runners world state.
#[derive(Debug)]
pub struct World {
    config: Config,
    phase: GamePhase,
    player: Player,
    obstacles: Vec<Obstacle>,
    gems: Vec<Gem>,
    projectiles: Vec<Projectile>,
    sword: Option<Sword>,
    boss: Option<Boss>,
    lane: Background,
    menu: Background,
    progress: Progress,
    damage_cooldown: Cooldown,
    rng: ChaCha8Rng,
    next_entity: u32,
    tick_index: u64,
}

impl World {
    /// Creates a new world showing the menu with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a new world showing the menu with the provided configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            phase: GamePhase::Menu,
            player: Player::new(),
            obstacles: Vec::new(),
            gems: Vec::new(),
            projectiles: Vec::new(),
            sword: None,
            boss: None,
            lane: Background::new(BACKGROUND_WIDTH, config.lane_scroll_speed),
            menu: Background::new(BACKGROUND_WIDTH, config.menu_scroll_speed),
            progress: Progress::new(),
            damage_cooldown: Cooldown::new(config.damage_cooldown),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            next_entity: 0,
            tick_index: 0,
            config,
        }
    }

    fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_entity);
        self.next_entity = self.next_entity.wrapping_add(1);
        id
    }

    fn set_phase(&mut self, to: GamePhase, out_events: &mut Vec<Event>) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        log::info!("phase changed from {from:?} to {to:?}");
        out_events.push(Event::PhaseChanged { from, to });
    }

    fn use_ability(&mut self, ability: Ability, at: Duration, out_events: &mut Vec<Event>) {
        let outcome = if self.phase.is_running() {
            self.activate(ability, at)
        } else {
            Err(AbilityRejection::NotRunning)
        };

        match outcome {
            Ok(event) => out_events.push(event),
            Err(reason) => {
                log::debug!("{ability:?} rejected: {reason:?}");
                out_events.push(Event::AbilityRejected { ability, reason });
            }
        }
    }

    fn activate(&mut self, ability: Ability, at: Duration) -> Result<Event, AbilityRejection> {
        match ability {
            Ability::SwitchGravity => {
                let direction = self.player.switch_gravity()?;
                if let Some(sword) = self.sword.as_mut() {
                    sword.flipped = !sword.flipped;
                }
                Ok(Event::GravitySwitched { direction })
            }
            Ability::Shoot => {
                let projectiles = self.player.start_burst(at)?;
                Ok(Event::BurstStarted { projectiles })
            }
            Ability::Dash => {
                let distance = self.player.dash(at)?;
                Ok(Event::Dashed { distance })
            }
            Ability::Slash => {
                if self.sword.is_some() {
                    return Err(AbilityRejection::SwingInProgress);
                }
                self.player.slash(at)?;
                self.sword = Some(Sword::new(
                    self.player.rect,
                    self.player.sword_size(),
                    self.player.gravity() == GravityDirection::Up,
                ));
                Ok(Event::SlashStarted)
            }
        }
    }

    fn spawn_obstacle(&mut self, x: f32, y: f32, out_events: &mut Vec<Event>) {
        if !self.phase.is_running() || !self.obstacles.is_empty() {
            log::debug!("obstacle spawn at ({x}, {y}) ignored");
            return;
        }
        let obstacle = self.next_entity_id();
        self.obstacles
            .push(Obstacle::new(obstacle, x, y, self.config.obstacle_speed));
        out_events.push(Event::ObstacleSpawned { obstacle });
    }

    fn spawn_gem(&mut self, x: f32, y: f32, variant: GemVariant, out_events: &mut Vec<Event>) {
        if !self.phase.is_running() || !self.gems.is_empty() || self.boss.is_some() {
            log::debug!("gem spawn at ({x}, {y}) ignored");
            return;
        }
        let gem = self.next_entity_id();
        self.gems
            .push(Gem::new(gem, x, y, variant, self.config.gem_speed));
        out_events.push(Event::GemSpawned { gem, variant });
    }

    fn tick(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
            now,
        });

        let mut context = MotionContext {
            now,
            anchor: self.player.rect,
            rng: &mut self.rng,
        };
        let _ = self.menu.advance(&mut context);

        if !self.phase.is_running() {
            return;
        }

        if let Some(outcome) = self.resolve_interactions(now, out_events) {
            self.end_run(outcome, out_events);
            return;
        }

        let score = self.progress.add_score(1);
        if self.phase == GamePhase::Active && score >= self.config.boss_score_threshold {
            self.spawn_boss(out_events);
        }

        self.advance_entities(now, out_events);

        if let Some(outcome) = self.apply_off_map_penalty(out_events) {
            self.end_run(outcome, out_events);
        }
    }

    fn spawn_boss(&mut self, out_events: &mut Vec<Event>) {
        self.boss = Some(Boss::new());
        self.lane.variant = BackgroundVariant::Boss;
        log::info!("boss spawned at score {}", self.progress.score);
        out_events.push(Event::BossSpawned);
        self.set_phase(GamePhase::BossActive, out_events);
    }

    fn advance_entities(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        let mut context = MotionContext {
            now,
            anchor: self.player.rect,
            rng: &mut self.rng,
        };
        let _ = self.lane.advance(&mut context);
        advance_group(&mut self.gems, &mut context);

        let obstacles: Vec<Rect> = self.obstacles.iter().map(|obstacle| obstacle.rect).collect();
        if let Some((x, y)) = self.player.advance(now, &obstacles) {
            let projectile = self.next_entity_id();
            self.projectiles.push(Projectile::new(projectile, x, y, now));
            out_events.push(Event::ProjectileFired { projectile });
        }

        // Obstacles move after the player is pushed out, so a ramming
        // obstacle still overlaps when the next tick's resolver runs.
        let mut context = MotionContext {
            now,
            anchor: self.player.rect,
            rng: &mut self.rng,
        };
        advance_group(&mut self.obstacles, &mut context);
        advance_group(&mut self.projectiles, &mut context);
        if self.sword.as_mut().map(|sword| sword.advance(&mut context)) == Some(Fate::Despawn) {
            self.sword = None;
        }
        if let Some(boss) = self.boss.as_mut() {
            let _ = boss.advance(&mut context);
        }
    }

    fn apply_off_map_penalty(&mut self, out_events: &mut Vec<Event>) -> Option<RunOutcome> {
        let center = self.player.rect.center_x();
        let (amount, cause) = if center <= OFF_MAP_LEFT_LIMIT {
            (OFF_MAP_LEFT_DAMAGE, DamageCause::OffMapLeft)
        } else if center >= OFF_MAP_RIGHT_LIMIT {
            (OFF_MAP_RIGHT_DAMAGE, DamageCause::OffMapRight)
        } else {
            return None;
        };

        let died = self.player.take_damage(amount);
        out_events.push(Event::PlayerDamaged {
            amount,
            health: self.player.health(),
            cause,
        });
        died.then_some(RunOutcome::Defeat)
    }

    fn end_run(&mut self, outcome: RunOutcome, out_events: &mut Vec<Event>) {
        let score = self.progress.score;
        log::info!("run ended with {outcome:?} at score {score}");
        self.reset_run();
        out_events.push(Event::RunEnded { outcome, score });
        self.set_phase(GamePhase::GameOver { outcome }, out_events);
    }

    fn reset_run(&mut self) {
        self.player = Player::new();
        self.obstacles.clear();
        self.gems.clear();
        self.projectiles.clear();
        self.sword = None;
        self.boss = None;
        self.lane.variant = BackgroundVariant::Normal;
        self.progress = Progress::new();
        self.damage_cooldown.reset();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartRun => {
            if world.phase == GamePhase::Menu {
                world.set_phase(GamePhase::Active, out_events);
            }
        }
        Command::ReturnToMenu => {
            if matches!(world.phase, GamePhase::GameOver { .. }) {
                world.set_phase(GamePhase::Menu, out_events);
            }
        }
        Command::UseAbility { ability, at } => world.use_ability(ability, at, out_events),
        Command::SpawnObstacle { x, y } => world.spawn_obstacle(x, y, out_events),
        Command::SpawnGem { x, y, variant } => world.spawn_gem(x, y, variant, out_events),
        Command::Tick { now } => world.tick(now, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use metro_runners_core::{
        BackgroundSnapshot, BossSnapshot, CooldownReadiness, EntitySnapshot, GamePhase,
        PlayerSnapshot, ProgressSnapshot, SpawnView, SwordSnapshot,
    };

    /// Reports the current phase of the game.
    #[must_use]
    pub fn phase(world: &World) -> GamePhase {
        world.phase
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Captures score and upgrade progress of the current run.
    #[must_use]
    pub fn progress(world: &World) -> ProgressSnapshot {
        world.progress.snapshot()
    }

    /// Elapsed fraction of each controller cooldown at `now`.
    #[must_use]
    pub fn cooldown_readiness(world: &World, now: Duration) -> CooldownReadiness {
        world.player.readiness(now)
    }

    /// Captures the live obstacles.
    #[must_use]
    pub fn obstacles(world: &World) -> Vec<EntitySnapshot> {
        world.obstacles.iter().map(|obstacle| obstacle.snapshot()).collect()
    }

    /// Captures the live gems; the snapshot frame carries the gem variant.
    #[must_use]
    pub fn gems(world: &World) -> Vec<EntitySnapshot> {
        world.gems.iter().map(|gem| gem.snapshot()).collect()
    }

    /// Captures the projectiles in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<EntitySnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| projectile.snapshot())
            .collect()
    }

    /// Captures the sword while a swing is in progress.
    #[must_use]
    pub fn sword(world: &World) -> Option<SwordSnapshot> {
        world.sword.as_ref().map(|sword| sword.snapshot())
    }

    /// Captures the boss while it is present.
    #[must_use]
    pub fn boss(world: &World) -> Option<BossSnapshot> {
        world.boss.as_ref().map(|boss| boss.snapshot())
    }

    /// Captures the lane background drawn during a run.
    #[must_use]
    pub fn lane_background(world: &World) -> BackgroundSnapshot {
        world.lane.snapshot()
    }

    /// Captures the background drawn behind the menu.
    #[must_use]
    pub fn menu_background(world: &World) -> BackgroundSnapshot {
        world.menu.snapshot()
    }

    /// Summarises what the spawning system needs to decide on new entities.
    #[must_use]
    pub fn spawn_view(world: &World) -> SpawnView {
        SpawnView {
            phase: world.phase,
            obstacles: world.obstacles.len(),
            gems: world.gems.len(),
            boss_present: world.boss.is_some(),
        }
    }
}
