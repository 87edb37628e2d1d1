//! Pairwise interaction rules evaluated at the start of every running tick.

use std::time::Duration;

use metro_runners_core::{DamageCause, Event, Rect, RunOutcome, Weapon, PLAY_HEIGHT, PLAY_WIDTH};

use crate::{player::Contact, World};

const TOP_BOUNDARY: Rect = Rect::new(0.0, 0.0, PLAY_WIDTH, 1.0);
const BOTTOM_BOUNDARY: Rect = Rect::new(0.0, PLAY_HEIGHT - 5.0, PLAY_WIDTH, 1.0);

const OBSTACLE_DAMAGE: i32 = 2;
const KILL_SCORE: u32 = 40;
const BOSS_DAMAGE: i32 = 4;

impl World {
    /// Runs every interaction rule in order and reports a finished run.
    pub(crate) fn resolve_interactions(
        &mut self,
        now: Duration,
        out_events: &mut Vec<Event>,
    ) -> Option<RunOutcome> {
        self.resolve_boundaries();
        if self.resolve_obstacle_contact(now, out_events) {
            return Some(RunOutcome::Defeat);
        }
        self.resolve_projectile_hits(out_events);
        if self.resolve_boss_hits(out_events) {
            return Some(RunOutcome::Victory);
        }
        self.resolve_gem_pickups(out_events);
        self.resolve_sword_hits(out_events);
        None
    }

    fn resolve_boundaries(&mut self) {
        let player = self.player.rect;
        let on_ceiling = player.intersects(&TOP_BOUNDARY);
        let on_ground = !on_ceiling && player.intersects(&BOTTOM_BOUNDARY);
        self.player.set_contact(Contact {
            on_ground,
            on_ceiling,
        });
    }

    /// Returns `true` when the hit killed the player.
    fn resolve_obstacle_contact(&mut self, now: Duration, out_events: &mut Vec<Event>) -> bool {
        let player = self.player.rect;
        let rammed = self.obstacles.iter().any(|obstacle| {
            obstacle.rect.intersects(&player) && player.left() < obstacle.rect.left()
        });
        if !rammed || !self.damage_cooldown.try_trigger(now) {
            return false;
        }

        let died = self.player.take_damage(OBSTACLE_DAMAGE);
        out_events.push(Event::PlayerDamaged {
            amount: OBSTACLE_DAMAGE,
            health: self.player.health(),
            cause: DamageCause::Obstacle,
        });
        died
    }

    fn resolve_projectile_hits(&mut self, out_events: &mut Vec<Event>) {
        let mut index = 0;
        while index < self.projectiles.len() {
            let rect = self.projectiles[index].rect;
            let Some(hit) = self
                .obstacles
                .iter()
                .position(|obstacle| obstacle.rect.intersects(&rect))
            else {
                index += 1;
                continue;
            };

            let obstacle = self.obstacles.remove(hit);
            let _ = self.projectiles.remove(index);
            let score = self.progress.add_score(KILL_SCORE);
            out_events.push(Event::ObstacleDestroyed {
                obstacle: obstacle.id,
                weapon: Weapon::Projectile,
                score,
            });
        }
    }

    /// Returns `true` when the boss was defeated.
    fn resolve_boss_hits(&mut self, out_events: &mut Vec<Event>) -> bool {
        let Some(boss) = self.boss.as_mut() else {
            return false;
        };

        let target = boss.rect;
        let before = self.projectiles.len();
        self.projectiles
            .retain(|projectile| !projectile.rect.intersects(&target));
        if self.projectiles.len() == before {
            return false;
        }

        let defeated = boss.take_damage(BOSS_DAMAGE);
        out_events.push(Event::BossDamaged {
            health: boss.health,
        });
        defeated
    }

    fn resolve_gem_pickups(&mut self, out_events: &mut Vec<Event>) {
        let player = self.player.rect;
        let (collected, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut self.gems)
            .into_iter()
            .partition(|gem| gem.rect.intersects(&player));
        self.gems = remaining;

        for gem in collected {
            let upgrade = self.progress.collect_gem();
            out_events.push(Event::GemCollected {
                gem: gem.id,
                gems: self.progress.gems(),
            });
            if let Some(upgrade) = upgrade {
                self.player.apply_upgrade(upgrade.kind);
                log::info!(
                    "{:?} upgrade applied, next threshold {}",
                    upgrade.kind,
                    upgrade.next_threshold
                );
                out_events.push(Event::UpgradeApplied {
                    kind: upgrade.kind,
                    next_threshold: upgrade.next_threshold,
                });
            }
        }
    }

    fn resolve_sword_hits(&mut self, out_events: &mut Vec<Event>) {
        let Some(blade) = self.sword.as_ref().map(|sword| sword.rect) else {
            return;
        };

        let (destroyed, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut self.obstacles)
            .into_iter()
            .partition(|obstacle| obstacle.rect.intersects(&blade));
        self.obstacles = remaining;

        for obstacle in destroyed {
            let score = self.progress.add_score(KILL_SCORE);
            out_events.push(Event::ObstacleDestroyed {
                obstacle: obstacle.id,
                weapon: Weapon::Sword,
                score,
            });
        }
    }
}
