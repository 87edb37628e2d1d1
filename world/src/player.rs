//! Player controller: gravity, abilities, burst fire and obstacle blocking.

use std::time::Duration;

use metro_runners_core::{
    AbilityRejection, Cooldown, CooldownReadiness, GravityDirection, PlayerSnapshot, Rect,
    UpgradeKind, MAX_GRAVITY_SWITCHES, PLAY_HEIGHT,
};

const PLAYER_SIZE: f32 = 100.0;
const PLAYER_START_LEFT: f32 = 350.0;
const PLAYER_START_TOP: f32 = 220.0;
const GRAVITY_SPEED: f32 = 15.0;

pub(crate) const MAX_HEALTH: i32 = 100;
pub(crate) const MIN_HEALTH: i32 = -10;

const RUN_FRAMES: u32 = 6;
const TICKS_PER_RUN_FRAME: u32 = 2;

const BASE_BURST_SIZE: u32 = 3;
const BURST_SPACING: Duration = Duration::from_millis(100);
const BURST_COOLDOWN: Duration = Duration::from_secs(2);

const BASE_DASH_DISTANCE: f32 = 100.0;
const DASH_UPGRADE_DISTANCE: f32 = 25.0;
const BASE_DASH_COOLDOWN: Duration = Duration::from_secs(10);
const DASH_UPGRADE_COOLDOWN_CUT: Duration = Duration::from_millis(1500);

const SLASH_COOLDOWN: Duration = Duration::from_secs(2);

const BASE_SWORD_SIZE: f32 = 200.0;
const SWORD_UPGRADE_SIZE: f32 = 50.0;

/// Boundary contacts observed by the resolver this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Contact {
    pub(crate) on_ground: bool,
    pub(crate) on_ceiling: bool,
}

impl Contact {
    const fn any(self) -> bool {
        self.on_ground || self.on_ceiling
    }
}

#[derive(Clone, Copy, Debug)]
struct Burst {
    fired: u32,
    last_shot: Duration,
}

#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) rect: Rect,
    health: i32,
    gravity: GravityDirection,
    gravity_switches: u32,
    contact: Contact,
    frame: u32,
    frame_ticks: u32,
    burst_size: u32,
    burst: Option<Burst>,
    burst_cooldown: Cooldown,
    dash_distance: f32,
    dash_cooldown: Cooldown,
    slash_cooldown: Cooldown,
    sword_size: f32,
}

impl Player {
    pub(crate) fn new() -> Self {
        Self {
            rect: Rect::new(PLAYER_START_LEFT, PLAYER_START_TOP, PLAYER_SIZE, PLAYER_SIZE),
            health: MAX_HEALTH,
            gravity: GravityDirection::Down,
            gravity_switches: 0,
            contact: Contact::default(),
            frame: 0,
            frame_ticks: 0,
            burst_size: BASE_BURST_SIZE,
            burst: None,
            burst_cooldown: Cooldown::new(BURST_COOLDOWN),
            dash_distance: BASE_DASH_DISTANCE,
            dash_cooldown: Cooldown::new(BASE_DASH_COOLDOWN),
            slash_cooldown: Cooldown::new(SLASH_COOLDOWN),
            sword_size: BASE_SWORD_SIZE,
        }
    }

    pub(crate) const fn health(&self) -> i32 {
        self.health
    }

    pub(crate) const fn gravity(&self) -> GravityDirection {
        self.gravity
    }

    pub(crate) const fn sword_size(&self) -> f32 {
        self.sword_size
    }

    /// Removes health, keeping it inside the supported range, and reports
    /// whether the player died.
    pub(crate) fn take_damage(&mut self, amount: i32) -> bool {
        self.health = (self.health - amount).clamp(MIN_HEALTH, MAX_HEALTH);
        self.health <= MIN_HEALTH
    }

    /// Records this tick's boundary contacts; touching either boundary
    /// restores the gravity switches.
    pub(crate) fn set_contact(&mut self, contact: Contact) {
        self.contact = contact;
        if contact.any() {
            self.gravity_switches = 0;
        }
    }

    pub(crate) fn switch_gravity(&mut self) -> Result<GravityDirection, AbilityRejection> {
        if self.gravity_switches >= MAX_GRAVITY_SWITCHES {
            return Err(AbilityRejection::SwitchLimitReached);
        }
        self.gravity_switches += 1;
        self.gravity = self.gravity.flipped();
        Ok(self.gravity)
    }

    /// Starts a burst and returns the number of projectiles it will fire.
    pub(crate) fn start_burst(&mut self, now: Duration) -> Result<u32, AbilityRejection> {
        if !self.burst_cooldown.try_trigger(now) {
            return Err(AbilityRejection::CoolingDown);
        }
        self.burst = Some(Burst {
            fired: 0,
            last_shot: now,
        });
        Ok(self.burst_size)
    }

    /// Moves the player to the right and returns the distance covered.
    pub(crate) fn dash(&mut self, now: Duration) -> Result<f32, AbilityRejection> {
        if !self.dash_cooldown.try_trigger(now) {
            return Err(AbilityRejection::CoolingDown);
        }
        self.rect.translate(self.dash_distance, 0.0);
        Ok(self.dash_distance)
    }

    pub(crate) fn slash(&mut self, now: Duration) -> Result<(), AbilityRejection> {
        if self.slash_cooldown.try_trigger(now) {
            Ok(())
        } else {
            Err(AbilityRejection::CoolingDown)
        }
    }

    pub(crate) fn apply_upgrade(&mut self, kind: UpgradeKind) {
        match kind {
            UpgradeKind::Projectile => self.burst_size += 1,
            UpgradeKind::Sword => self.sword_size += SWORD_UPGRADE_SIZE,
            UpgradeKind::Dash => {
                let cooldown = self
                    .dash_cooldown
                    .duration()
                    .saturating_sub(DASH_UPGRADE_COOLDOWN_CUT);
                self.dash_cooldown.set_duration(cooldown);
                self.dash_distance += DASH_UPGRADE_DISTANCE;
            }
        }
    }

    /// Applies gravity, animation, obstacle blocking and burst fire for one
    /// tick. Returns the spawn point of a projectile when one is due.
    pub(crate) fn advance(&mut self, now: Duration, obstacles: &[Rect]) -> Option<(f32, f32)> {
        self.fall();
        self.animate();
        for obstacle in obstacles {
            if self.rect.intersects(obstacle) {
                self.resolve_obstacle(*obstacle);
            }
        }
        self.fire(now)
    }

    fn fall(&mut self) {
        self.rect.translate(0.0, GRAVITY_SPEED * self.gravity.sign());
        if self.rect.top() < 0.0 {
            self.rect.set_top(0.0);
        }
        if self.rect.bottom() > PLAY_HEIGHT {
            self.rect.set_bottom(PLAY_HEIGHT);
        }
    }

    fn animate(&mut self) {
        self.frame_ticks += 1;
        if self.frame_ticks >= TICKS_PER_RUN_FRAME {
            self.frame_ticks = 0;
            self.frame = (self.frame + 1) % RUN_FRAMES;
        }
    }

    pub(crate) fn resolve_obstacle(&mut self, obstacle: Rect) {
        if self.contact.any() {
            if self.rect.right() >= obstacle.left() {
                self.rect.set_right(obstacle.left());
            }
            return;
        }

        let overlap_right = self.rect.right() - obstacle.left();
        let overlap_left = obstacle.right() - self.rect.left();
        let overlap_down = self.rect.bottom() - obstacle.top();
        let overlap_up = obstacle.bottom() - self.rect.top();
        let smallest = overlap_right
            .min(overlap_left)
            .min(overlap_down)
            .min(overlap_up);

        if smallest == overlap_right {
            self.rect.set_right(obstacle.left());
        } else if smallest == overlap_left {
            self.rect.set_left(obstacle.right());
        } else if smallest == overlap_down {
            if self.gravity == GravityDirection::Down {
                self.rect.set_bottom(obstacle.top());
            }
        } else if self.gravity == GravityDirection::Up {
            self.rect.set_top(obstacle.bottom());
        }
    }

    fn fire(&mut self, now: Duration) -> Option<(f32, f32)> {
        let burst = self.burst.as_mut()?;
        if now.saturating_sub(burst.last_shot) <= BURST_SPACING {
            return None;
        }
        burst.fired += 1;
        burst.last_shot = now;
        if burst.fired >= self.burst_size {
            self.burst = None;
        }
        Some((self.rect.right(), self.rect.center_y()))
    }

    pub(crate) fn readiness(&self, now: Duration) -> CooldownReadiness {
        CooldownReadiness {
            shoot: self.burst_cooldown.readiness(now),
            dash: self.dash_cooldown.readiness(now),
            slash: self.slash_cooldown.readiness(now),
        }
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            rect: self.rect,
            health: self.health,
            gravity: self.gravity,
            gravity_switches: self.gravity_switches,
            on_ground: self.contact.on_ground,
            on_ceiling: self.contact.on_ceiling,
            frame: self.frame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn falls_fifteen_units_and_stops_at_floor() {
        let mut player = Player::new();
        let _ = player.advance(ms(0), &[]);
        assert!((player.rect.top() - 235.0).abs() < f32::EPSILON);

        for _ in 0..50 {
            let _ = player.advance(ms(0), &[]);
        }
        assert!((player.rect.bottom() - PLAY_HEIGHT).abs() < f32::EPSILON);
    }

    #[test]
    fn third_gravity_switch_without_contact_is_rejected() {
        let mut player = Player::new();
        assert_eq!(player.switch_gravity(), Ok(GravityDirection::Up));
        assert_eq!(player.switch_gravity(), Ok(GravityDirection::Down));
        assert_eq!(
            player.switch_gravity(),
            Err(AbilityRejection::SwitchLimitReached)
        );

        player.set_contact(Contact {
            on_ground: true,
            on_ceiling: false,
        });
        assert_eq!(player.switch_gravity(), Ok(GravityDirection::Up));
    }

    #[test]
    fn burst_fires_one_projectile_per_spacing_interval() {
        let mut player = Player::new();
        assert_eq!(player.start_burst(ms(1000)), Ok(3));

        assert_eq!(player.advance(ms(1100), &[]), None);
        let fired: Vec<_> = [1101, 1150, 1202, 1303, 1404]
            .into_iter()
            .filter_map(|at| player.advance(ms(at), &[]))
            .collect();
        assert_eq!(fired.len(), 3);
        assert!((fired[0].0 - player.rect.right()).abs() < f32::EPSILON);
    }

    #[test]
    fn burst_reuse_waits_for_controller_cooldown() {
        let mut player = Player::new();
        assert!(player.start_burst(ms(0)).is_ok());
        assert_eq!(player.start_burst(ms(1999)), Err(AbilityRejection::CoolingDown));
        assert!(player.start_burst(ms(2000)).is_ok());
    }

    #[test]
    fn dash_upgrades_saturate_cooldown_at_zero() {
        let mut player = Player::new();
        for _ in 0..8 {
            player.apply_upgrade(UpgradeKind::Dash);
        }
        assert!(player.dash(ms(0)).is_ok());
        assert_eq!(player.dash(ms(0)), Ok(BASE_DASH_DISTANCE + 8.0 * DASH_UPGRADE_DISTANCE));
    }

    #[test]
    fn grounded_player_is_only_blocked_on_the_right() {
        let mut player = Player::new();
        player.rect = Rect::new(350.0, 380.0, 100.0, 100.0);
        player.set_contact(Contact {
            on_ground: true,
            on_ceiling: false,
        });
        player.resolve_obstacle(Rect::new(420.0, 400.0, 100.0, 50.0));
        assert!((player.rect.right() - 420.0).abs() < f32::EPSILON);
        assert!((player.rect.top() - 380.0).abs() < f32::EPSILON);
    }

    #[test]
    fn airborne_player_lands_on_obstacle_top() {
        let mut player = Player::new();
        player.rect = Rect::new(350.0, 210.0, 100.0, 100.0);
        player.resolve_obstacle(Rect::new(330.0, 300.0, 100.0, 50.0));
        assert!((player.rect.bottom() - 300.0).abs() < f32::EPSILON);
    }

    #[test]
    fn airborne_player_is_pushed_off_the_obstacle_right_edge() {
        let mut player = Player::new();
        player.rect = Rect::new(350.0, 200.0, 100.0, 100.0);
        player.resolve_obstacle(Rect::new(280.0, 230.0, 100.0, 50.0));
        assert!((player.rect.left() - 380.0).abs() < f32::EPSILON);
        assert!((player.rect.top() - 200.0).abs() < f32::EPSILON);
    }

    #[test]
    fn inverted_player_rests_under_obstacle_bottom() {
        let mut player = Player::new();
        assert_eq!(player.switch_gravity(), Ok(GravityDirection::Up));
        player.rect = Rect::new(350.0, 290.0, 100.0, 100.0);
        player.resolve_obstacle(Rect::new(300.0, 250.0, 200.0, 50.0));
        assert!((player.rect.top() - 300.0).abs() < f32::EPSILON);
        assert!((player.rect.left() - 350.0).abs() < f32::EPSILON);
    }

    #[test]
    fn downward_overlap_is_ignored_while_gravity_points_up() {
        let mut player = Player::new();
        assert_eq!(player.switch_gravity(), Ok(GravityDirection::Up));
        player.rect = Rect::new(350.0, 210.0, 100.0, 100.0);
        player.resolve_obstacle(Rect::new(330.0, 300.0, 100.0, 50.0));
        assert_eq!(player.rect, Rect::new(350.0, 210.0, 100.0, 100.0));
    }

    #[test]
    fn rises_to_ceiling_and_stops_at_top() {
        let mut player = Player::new();
        assert_eq!(player.switch_gravity(), Ok(GravityDirection::Up));
        let _ = player.advance(ms(0), &[]);
        assert!((player.rect.top() - 205.0).abs() < f32::EPSILON);

        for _ in 0..50 {
            let _ = player.advance(ms(0), &[]);
        }
        assert!(player.rect.top().abs() < f32::EPSILON);
        assert!((player.rect.bottom() - PLAYER_SIZE).abs() < f32::EPSILON);
    }

    #[test]
    fn health_never_drops_below_minimum() {
        let mut player = Player::new();
        assert!(!player.take_damage(109));
        assert!(player.take_damage(500));
        assert_eq!(player.health(), MIN_HEALTH);
    }
}
