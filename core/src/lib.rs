#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Metro Runners engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what happened. Presentation reads immutable snapshots and maps
//! events onto sound cues; it never writes back into the world.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Title shown in the window decoration.
pub const GAME_TITLE: &str = "Metro Runners";

/// Width of the play area measured in world units.
pub const PLAY_WIDTH: f32 = 923.72;

/// Height of the play area measured in world units.
pub const PLAY_HEIGHT: f32 = 480.0;

/// Number of simulation ticks executed per second of wall-clock time.
pub const TICK_RATE_HZ: u32 = 30;

/// Maximum number of gravity switches allowed between boundary contacts.
pub const MAX_GRAVITY_SWITCHES: u32 = 2;

/// Screen-space area of the menu start button.
pub const START_BUTTON: Rect = Rect::new(310.0, 300.0, 287.0, 62.0);

/// Axis-aligned rectangle expressed in world units with a top-left origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and dimensions.
    ///
    /// Negative dimensions are not meaningful and are treated as zero by the
    /// intersection tests.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Horizontal size of the rectangle.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.width.max(0.0)
    }

    /// Vertical size of the rectangle.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.height.max(0.0)
    }

    /// X coordinate of the left edge.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.x
    }

    /// X coordinate of the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width()
    }

    /// Y coordinate of the top edge.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.y
    }

    /// Y coordinate of the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height()
    }

    /// X coordinate of the rectangle centre.
    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.x + self.width() / 2.0
    }

    /// Y coordinate of the rectangle centre.
    #[must_use]
    pub fn center_y(&self) -> f32 {
        self.y + self.height() / 2.0
    }

    /// Moves the rectangle so its left edge sits at `value`.
    pub fn set_left(&mut self, value: f32) {
        self.x = value;
    }

    /// Moves the rectangle so its right edge sits at `value`.
    pub fn set_right(&mut self, value: f32) {
        self.x = value - self.width();
    }

    /// Moves the rectangle so its top edge sits at `value`.
    pub fn set_top(&mut self, value: f32) {
        self.y = value;
    }

    /// Moves the rectangle so its bottom edge sits at `value`.
    pub fn set_bottom(&mut self, value: f32) {
        self.y = value - self.height();
    }

    /// Offsets the rectangle by the provided deltas.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// Reports whether two rectangles overlap with a non-zero area.
    ///
    /// Rectangles that merely share an edge do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Reports whether the point lies inside the rectangle.
    ///
    /// The left and top edges are inclusive, the right and bottom edges are not.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.left() && x < self.right() && y >= self.top() && y < self.bottom()
    }
}

/// Direction gravity pulls the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GravityDirection {
    /// Player falls towards the bottom of the play area.
    #[default]
    Down,
    /// Player falls towards the top of the play area.
    Up,
}

impl GravityDirection {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Down => Self::Up,
            Self::Up => Self::Down,
        }
    }

    /// Sign applied to vertical motion in screen coordinates.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Down => 1.0,
            Self::Up => -1.0,
        }
    }
}

/// Result of a finished run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunOutcome {
    /// The player ran out of health.
    Defeat,
    /// The boss was defeated.
    Victory,
}

/// High-level state of the game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen waiting for the start button.
    #[default]
    Menu,
    /// Regular run with obstacles and gems.
    Active,
    /// Run in which the boss has appeared.
    BossActive,
    /// Run has ended and awaits restart or quit.
    GameOver {
        /// How the run finished.
        outcome: RunOutcome,
    },
}

impl GamePhase {
    /// Reports whether the run simulation advances in this phase.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Active | Self::BossActive)
    }
}

/// Player abilities that are gated by cooldowns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// Inverts the direction of gravity.
    SwitchGravity,
    /// Starts a projectile burst.
    Shoot,
    /// Displaces the player to the right.
    Dash,
    /// Swings the sword.
    Slash,
}

/// Reasons the world declines an ability request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityRejection {
    /// No run is in progress.
    NotRunning,
    /// The ability has not recovered from its previous use.
    CoolingDown,
    /// Gravity was switched too often since the last boundary contact.
    SwitchLimitReached,
    /// A sword swing is still in progress.
    SwingInProgress,
}

/// Upgrade phases cycled through by collecting gems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// Adds one projectile to each burst.
    Projectile,
    /// Enlarges the sword.
    Sword,
    /// Extends the dash and shortens its cooldown.
    Dash,
}

impl UpgradeKind {
    /// Upgrade phases in cycle order.
    pub const ALL: [UpgradeKind; 3] = [Self::Projectile, Self::Sword, Self::Dash];

    /// Phase that follows this one in the cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Projectile => Self::Sword,
            Self::Sword => Self::Dash,
            Self::Dash => Self::Projectile,
        }
    }

    /// Position of the phase within [`UpgradeKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Projectile => 0,
            Self::Sword => 1,
            Self::Dash => 2,
        }
    }
}

/// Visual variant assigned to a gem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GemVariant(u8);

impl GemVariant {
    /// Number of distinct gem variants.
    pub const COUNT: u8 = 4;

    /// Creates a variant, wrapping values outside the supported range.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value % Self::COUNT)
    }

    /// Retrieves the variant index.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Unique identifier assigned to obstacles, gems and projectiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new identifier with the provided value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Weapons able to destroy obstacles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weapon {
    /// A projectile from a burst.
    Projectile,
    /// The swinging sword.
    Sword,
}

/// Sources of player damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageCause {
    /// Running into an obstacle from the left.
    Obstacle,
    /// Drifting past the left edge of the play area.
    OffMapLeft,
    /// Drifting too far towards the right of the play area.
    OffMapRight,
}

/// Variants of the scrolling lane background.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackgroundVariant {
    /// Regular lane artwork.
    #[default]
    Normal,
    /// Artwork shown while the boss is present.
    Boss,
}

/// Discrete input actions delivered by an adapter for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputAction {
    /// Request to invert gravity.
    SwitchGravity,
    /// Request to start a projectile burst.
    Shoot,
    /// Request to dash.
    Dash,
    /// Request to swing the sword.
    Slash,
    /// Request to return to the menu after a run ended.
    Restart,
    /// Request to leave the game after a run ended.
    Quit,
    /// Primary pointer click at the provided screen coordinates.
    Click {
        /// Horizontal coordinate of the click.
        x: f32,
        /// Vertical coordinate of the click.
        y: f32,
    },
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Leaves the menu and begins a new run.
    StartRun,
    /// Leaves the end-game screen and shows the menu.
    ReturnToMenu,
    /// Requests that the player controller use an ability.
    UseAbility {
        /// Ability to activate.
        ability: Ability,
        /// Wall-clock time at which the request was issued.
        at: Duration,
    },
    /// Places a new obstacle with its top-left corner at the provided point.
    SpawnObstacle {
        /// Left edge of the obstacle.
        x: f32,
        /// Top edge of the obstacle.
        y: f32,
    },
    /// Places a new gem with its top-left corner at the provided point.
    SpawnGem {
        /// Left edge of the gem.
        x: f32,
        /// Top edge of the gem.
        y: f32,
        /// Visual variant of the gem.
        variant: GemVariant,
    },
    /// Advances the simulation by one fixed tick.
    Tick {
        /// Wall-clock time at which the tick starts.
        now: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the world advanced by one tick.
    TimeAdvanced {
        /// Number of ticks processed since the world was created.
        tick: u64,
        /// Wall-clock time of the tick.
        now: Duration,
    },
    /// Announces that the game moved to a new phase.
    PhaseChanged {
        /// Phase before the transition.
        from: GamePhase,
        /// Phase after the transition.
        to: GamePhase,
    },
    /// The world declined an ability request.
    AbilityRejected {
        /// Ability that was requested.
        ability: Ability,
        /// Why the request was declined.
        reason: AbilityRejection,
    },
    /// Gravity was inverted.
    GravitySwitched {
        /// Direction gravity pulls after the switch.
        direction: GravityDirection,
    },
    /// A projectile burst started.
    BurstStarted {
        /// Number of projectiles the burst will fire.
        projectiles: u32,
    },
    /// A projectile left the player.
    ProjectileFired {
        /// Identifier of the new projectile.
        projectile: EntityId,
    },
    /// The player dashed to the right.
    Dashed {
        /// Horizontal distance covered by the dash.
        distance: f32,
    },
    /// A sword swing started.
    SlashStarted,
    /// An obstacle entered the world.
    ObstacleSpawned {
        /// Identifier of the obstacle.
        obstacle: EntityId,
    },
    /// A gem entered the world.
    GemSpawned {
        /// Identifier of the gem.
        gem: EntityId,
        /// Visual variant of the gem.
        variant: GemVariant,
    },
    /// The player lost health.
    PlayerDamaged {
        /// Health removed by the hit.
        amount: i32,
        /// Health remaining after the hit.
        health: i32,
        /// What caused the damage.
        cause: DamageCause,
    },
    /// An obstacle was destroyed by the player.
    ObstacleDestroyed {
        /// Identifier of the destroyed obstacle.
        obstacle: EntityId,
        /// Weapon that destroyed it.
        weapon: Weapon,
        /// Score after the kill was credited.
        score: u32,
    },
    /// The player picked up a gem.
    GemCollected {
        /// Identifier of the collected gem.
        gem: EntityId,
        /// Gems collected towards the current upgrade phase.
        gems: u32,
    },
    /// An upgrade phase completed.
    UpgradeApplied {
        /// Upgrade that was granted.
        kind: UpgradeKind,
        /// Gems required the next time this phase comes around.
        next_threshold: u32,
    },
    /// The boss entered the world.
    BossSpawned,
    /// The boss was hit by projectiles.
    BossDamaged {
        /// Boss health remaining after the hit.
        health: i32,
    },
    /// A run finished and the world was reset.
    RunEnded {
        /// How the run finished.
        outcome: RunOutcome,
        /// Score reached before the reset.
        score: u32,
    },
}

/// Time-gated ability slot measured against wall-clock instants.
///
/// A slot that was never used is ready. Afterwards it becomes ready again once
/// at least `duration` elapsed since the last use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cooldown {
    duration: Duration,
    last_used: Option<Duration>,
}

impl Cooldown {
    /// Creates a ready cooldown with the provided duration.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            last_used: None,
        }
    }

    /// Duration that must elapse between uses.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Replaces the duration that must elapse between uses.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Reports whether the slot may be used at `now`.
    #[must_use]
    pub fn is_ready(&self, now: Duration) -> bool {
        match self.last_used {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.duration,
        }
    }

    /// Records a use at `now` when ready and reports whether it happened.
    pub fn try_trigger(&mut self, now: Duration) -> bool {
        if !self.is_ready(now) {
            return false;
        }
        self.last_used = Some(now);
        true
    }

    /// Fraction of the cooldown that has elapsed at `now`, clamped to `[0, 1]`.
    #[must_use]
    pub fn readiness(&self, now: Duration) -> f32 {
        match self.last_used {
            None => 1.0,
            Some(_) if self.duration.is_zero() => 1.0,
            Some(last) => {
                let elapsed = now.saturating_sub(last).as_secs_f32();
                (elapsed / self.duration.as_secs_f32()).min(1.0)
            }
        }
    }

    /// Forgets the last use so the slot is ready again.
    pub fn reset(&mut self) {
        self.last_used = None;
    }
}

/// Immutable representation of the player used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Bounding box of the player.
    pub rect: Rect,
    /// Current health.
    pub health: i32,
    /// Direction gravity currently pulls.
    pub gravity: GravityDirection,
    /// Gravity switches used since the last boundary contact.
    pub gravity_switches: u32,
    /// Whether the player touches the bottom boundary.
    pub on_ground: bool,
    /// Whether the player touches the top boundary.
    pub on_ceiling: bool,
    /// Frame of the run animation.
    pub frame: u32,
}

/// Immutable representation of an obstacle, gem or projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Identifier of the entity.
    pub id: EntityId,
    /// Bounding box of the entity.
    pub rect: Rect,
    /// Animation frame or visual variant of the entity.
    pub frame: u32,
}

/// Immutable representation of the sword.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwordSnapshot {
    /// Bounding box of the sword.
    pub rect: Rect,
    /// Frame of the swing animation.
    pub frame: u32,
    /// Whether the sword is drawn upside down.
    pub flipped: bool,
}

/// Immutable representation of the boss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossSnapshot {
    /// Bounding box of the boss.
    pub rect: Rect,
    /// Current health.
    pub health: i32,
    /// Frame of the boss animation.
    pub frame: u32,
}

/// Immutable representation of a scrolling background.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundSnapshot {
    /// Left edge of the background tile.
    pub left: f32,
    /// Width of the background tile.
    pub width: f32,
    /// Artwork variant.
    pub variant: BackgroundVariant,
}

/// Score and upgrade progress of the current run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Points collected during the run.
    pub score: u32,
    /// Gems collected towards the active upgrade phase.
    pub gems: u32,
    /// Upgrade phase the gems count towards.
    pub phase: UpgradeKind,
    /// Gems required to complete the active phase.
    pub threshold: u32,
}

/// Elapsed fraction of each controller cooldown, used for HUD icons.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CooldownReadiness {
    /// Readiness of the projectile burst.
    pub shoot: f32,
    /// Readiness of the dash.
    pub dash: f32,
    /// Readiness of the sword swing.
    pub slash: f32,
}

/// Summary consumed by the spawning system each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnView {
    /// Current game phase.
    pub phase: GamePhase,
    /// Number of live obstacles.
    pub obstacles: usize,
    /// Number of live gems.
    pub gems: usize,
    /// Whether the boss is present.
    pub boss_present: bool,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Cooldown, GamePhase, GemVariant, Rect, RunOutcome, UpgradeKind, START_BUTTON};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn rect_round_trips_through_bincode() {
        assert_round_trip(&Rect::new(350.0, 220.0, 100.0, 100.0));
    }

    #[test]
    fn game_over_phase_round_trips_through_bincode() {
        assert_round_trip(&GamePhase::GameOver {
            outcome: RunOutcome::Victory,
        });
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let left = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!left.intersects(&right));

        let overlapping = Rect::new(9.5, 9.5, 10.0, 10.0);
        assert!(left.intersects(&overlapping));
    }

    #[test]
    fn edge_setters_preserve_size() {
        let mut rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        rect.set_right(300.0);
        rect.set_bottom(430.0);
        assert_eq!(rect, Rect::new(200.0, 380.0, 100.0, 50.0));
    }

    #[test]
    fn start_button_contains_its_origin_but_not_its_far_corner() {
        assert!(START_BUTTON.contains_point(310.0, 300.0));
        assert!(START_BUTTON.contains_point(500.0, 330.0));
        assert!(!START_BUTTON.contains_point(597.0, 362.0));
        assert!(!START_BUTTON.contains_point(100.0, 100.0));
    }

    #[test]
    fn upgrade_cycle_has_period_three() {
        for kind in UpgradeKind::ALL {
            assert_eq!(kind.next().next().next(), kind);
            assert_ne!(kind.next(), kind);
        }
    }

    #[test]
    fn gem_variant_wraps_out_of_range_values() {
        assert_eq!(GemVariant::new(5).get(), 1);
    }

    #[test]
    fn cooldown_boundary_is_inclusive() {
        let mut cooldown = Cooldown::new(Duration::from_millis(1000));
        assert!(cooldown.try_trigger(Duration::from_millis(50)));
        assert!(!cooldown.is_ready(Duration::from_millis(1049)));
        assert!(cooldown.is_ready(Duration::from_millis(1050)));
    }

    #[test]
    fn cooldown_readiness_grows_towards_one() {
        let mut cooldown = Cooldown::new(Duration::from_secs(2));
        assert!((cooldown.readiness(Duration::ZERO) - 1.0).abs() < f32::EPSILON);
        assert!(cooldown.try_trigger(Duration::from_secs(1)));
        assert!((cooldown.readiness(Duration::from_secs(2)) - 0.5).abs() < 1e-6);
        assert!((cooldown.readiness(Duration::from_secs(10)) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_length_cooldown_is_always_ready() {
        let mut cooldown = Cooldown::new(Duration::ZERO);
        assert!(cooldown.try_trigger(Duration::from_secs(3)));
        assert!(cooldown.try_trigger(Duration::from_secs(3)));
        assert!((cooldown.readiness(Duration::from_secs(3)) - 1.0).abs() < f32::EPSILON);
    }
}
