//! Per-entity motion models advanced once per running tick.

use std::time::Duration;

use metro_runners_core::{
    BackgroundVariant, BackgroundSnapshot, BossSnapshot, EntityId, EntitySnapshot, GemVariant,
    Rect, SwordSnapshot, PLAY_WIDTH,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

const OBSTACLE_WIDTH: f32 = 100.0;
const OBSTACLE_HEIGHT: f32 = 50.0;
const OBSTACLE_RECYCLE_BOTTOM_MIN: i32 = 50;
const OBSTACLE_RECYCLE_BOTTOM_MAX: i32 = 430;

const GEM_SIZE: f32 = 35.0;

const PROJECTILE_SIZE: f32 = 25.0;
const PROJECTILE_SPEED: f32 = 15.0;
const PROJECTILE_FRAMES: u32 = 4;
const PROJECTILE_FRAME_INTERVAL: Duration = Duration::from_millis(2);

const SWORD_FRAMES: u32 = 5;
const SWORD_OFFSET_X: f32 = -50.0;
const SWORD_OFFSET_Y: f32 = -60.0;

const BOSS_SIZE: f32 = 300.0;
const BOSS_START_LEFT: f32 = 1300.0;
const BOSS_START_TOP: f32 = 80.0;
const BOSS_SPEED: f32 = 50.0;
const BOSS_REST_MARGIN: f32 = 100.0;
const BOSS_FRAMES: u32 = 5;
pub(crate) const BOSS_MAX_HEALTH: i32 = 100;
pub(crate) const BOSS_MIN_HEALTH: i32 = -4;

/// Whether an entity survives the tick it was advanced in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Fate {
    Keep,
    Despawn,
}

/// Inputs shared by every motion model during a tick.
pub(crate) struct MotionContext<'a> {
    pub(crate) now: Duration,
    pub(crate) anchor: Rect,
    pub(crate) rng: &'a mut ChaCha8Rng,
}

/// Per-tick update rule implemented by every entity kind.
pub(crate) trait Motion {
    fn advance(&mut self, context: &mut MotionContext<'_>) -> Fate;
}

/// Advances every member of the group and drops the ones that despawned.
pub(crate) fn advance_group<T: Motion>(group: &mut Vec<T>, context: &mut MotionContext<'_>) {
    group.retain_mut(|entity| entity.advance(context) == Fate::Keep);
}

#[derive(Clone, Debug)]
pub(crate) struct Obstacle {
    pub(crate) id: EntityId,
    pub(crate) rect: Rect,
    speed: f32,
}

impl Obstacle {
    pub(crate) fn new(id: EntityId, x: f32, y: f32, speed: f32) -> Self {
        Self {
            id,
            rect: Rect::new(x, y, OBSTACLE_WIDTH, OBSTACLE_HEIGHT),
            speed,
        }
    }

    pub(crate) fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            rect: self.rect,
            frame: 0,
        }
    }
}

impl Motion for Obstacle {
    fn advance(&mut self, context: &mut MotionContext<'_>) -> Fate {
        self.rect.translate(-self.speed, 0.0);
        if self.rect.right() < 0.0 {
            let bottom = context
                .rng
                .gen_range(OBSTACLE_RECYCLE_BOTTOM_MIN..=OBSTACLE_RECYCLE_BOTTOM_MAX);
            self.rect.set_left(PLAY_WIDTH);
            self.rect.set_bottom(bottom as f32);
        }
        Fate::Keep
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Gem {
    pub(crate) id: EntityId,
    pub(crate) rect: Rect,
    pub(crate) variant: GemVariant,
    speed: f32,
}

impl Gem {
    pub(crate) fn new(id: EntityId, x: f32, y: f32, variant: GemVariant, speed: f32) -> Self {
        Self {
            id,
            rect: Rect::new(x, y, GEM_SIZE, GEM_SIZE),
            variant,
            speed,
        }
    }

    pub(crate) fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            rect: self.rect,
            frame: u32::from(self.variant.get()),
        }
    }
}

impl Motion for Gem {
    fn advance(&mut self, _context: &mut MotionContext<'_>) -> Fate {
        self.rect.translate(-self.speed, 0.0);
        if self.rect.right() < 0.0 {
            Fate::Despawn
        } else {
            Fate::Keep
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: EntityId,
    pub(crate) rect: Rect,
    frame: u32,
    last_frame_change: Duration,
}

impl Projectile {
    /// Creates a projectile whose top-left corner sits at the provided point.
    pub(crate) fn new(id: EntityId, x: f32, y: f32, now: Duration) -> Self {
        Self {
            id,
            rect: Rect::new(x, y, PROJECTILE_SIZE, PROJECTILE_SIZE),
            frame: 0,
            last_frame_change: now,
        }
    }

    pub(crate) fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            rect: self.rect,
            frame: self.frame,
        }
    }
}

impl Motion for Projectile {
    fn advance(&mut self, context: &mut MotionContext<'_>) -> Fate {
        if context.now.saturating_sub(self.last_frame_change) > PROJECTILE_FRAME_INTERVAL {
            self.frame = (self.frame + 1) % PROJECTILE_FRAMES;
            self.last_frame_change = context.now;
        }
        self.rect.translate(PROJECTILE_SPEED, 0.0);
        if self.rect.left() > PLAY_WIDTH {
            Fate::Despawn
        } else {
            Fate::Keep
        }
    }
}

/// Melee weapon that follows the player while a swing plays out.
#[derive(Clone, Debug)]
pub(crate) struct Sword {
    pub(crate) rect: Rect,
    frame: u32,
    pub(crate) flipped: bool,
}

impl Sword {
    pub(crate) fn new(anchor: Rect, size: f32, flipped: bool) -> Self {
        Self {
            rect: Self::placed(anchor, size),
            frame: 0,
            flipped,
        }
    }

    fn placed(anchor: Rect, size: f32) -> Rect {
        Rect::new(
            anchor.left() + SWORD_OFFSET_X,
            anchor.top() + SWORD_OFFSET_Y,
            size,
            size,
        )
    }

    pub(crate) fn snapshot(&self) -> SwordSnapshot {
        SwordSnapshot {
            rect: self.rect,
            frame: self.frame,
            flipped: self.flipped,
        }
    }
}

impl Motion for Sword {
    fn advance(&mut self, context: &mut MotionContext<'_>) -> Fate {
        self.rect = Self::placed(context.anchor, self.rect.width());
        self.frame += 1;
        if self.frame >= SWORD_FRAMES {
            Fate::Despawn
        } else {
            Fate::Keep
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Boss {
    pub(crate) rect: Rect,
    pub(crate) health: i32,
    frame: u32,
}

impl Boss {
    pub(crate) fn new() -> Self {
        Self {
            rect: Rect::new(BOSS_START_LEFT, BOSS_START_TOP, BOSS_SIZE, BOSS_SIZE),
            health: BOSS_MAX_HEALTH,
            frame: 0,
        }
    }

    /// Applies damage and reports whether the boss has been defeated.
    pub(crate) fn take_damage(&mut self, amount: i32) -> bool {
        self.health = (self.health - amount).clamp(BOSS_MIN_HEALTH, BOSS_MAX_HEALTH);
        self.health <= BOSS_MIN_HEALTH
    }

    pub(crate) fn snapshot(&self) -> BossSnapshot {
        BossSnapshot {
            rect: self.rect,
            health: self.health,
            frame: self.frame,
        }
    }
}

impl Motion for Boss {
    fn advance(&mut self, _context: &mut MotionContext<'_>) -> Fate {
        if self.rect.right() >= PLAY_WIDTH + BOSS_REST_MARGIN {
            self.rect.translate(-BOSS_SPEED, 0.0);
        }
        self.frame = (self.frame + 1) % BOSS_FRAMES;
        Fate::Keep
    }
}

/// Horizontally scrolling backdrop that wraps once its right edge is visible.
#[derive(Clone, Debug)]
pub(crate) struct Background {
    left: f32,
    width: f32,
    speed: f32,
    pub(crate) variant: BackgroundVariant,
}

impl Background {
    pub(crate) const fn new(width: f32, speed: f32) -> Self {
        Self {
            left: 0.0,
            width,
            speed,
            variant: BackgroundVariant::Normal,
        }
    }

    pub(crate) fn snapshot(&self) -> BackgroundSnapshot {
        BackgroundSnapshot {
            left: self.left,
            width: self.width,
            variant: self.variant,
        }
    }
}

impl Motion for Background {
    fn advance(&mut self, _context: &mut MotionContext<'_>) -> Fate {
        self.left -= self.speed;
        if self.left + self.width <= PLAY_WIDTH {
            self.left = 0.0;
        }
        Fate::Keep
    }
}
