use metro_runners_core::{ProgressSnapshot, UpgradeKind};

const BASE_THRESHOLD: u32 = 10;
const THRESHOLD_STEP: u32 = 5;

/// Upgrade granted by a collected gem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Upgrade {
    pub(crate) kind: UpgradeKind,
    pub(crate) next_threshold: u32,
}

/// Score and gem progress through the three-phase upgrade cycle.
#[derive(Clone, Debug)]
pub(crate) struct Progress {
    pub(crate) score: u32,
    gems: u32,
    phase: UpgradeKind,
    thresholds: [u32; 3],
}

impl Progress {
    pub(crate) const fn new() -> Self {
        Self {
            score: 0,
            gems: 0,
            phase: UpgradeKind::Projectile,
            thresholds: [BASE_THRESHOLD; 3],
        }
    }

    pub(crate) const fn gems(&self) -> u32 {
        self.gems
    }

    pub(crate) fn add_score(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    /// Counts a gem towards the active phase, completing it when the threshold
    /// is reached.
    pub(crate) fn collect_gem(&mut self) -> Option<Upgrade> {
        self.gems += 1;
        let index = self.phase.index();
        if self.gems < self.thresholds[index] {
            return None;
        }

        let kind = self.phase;
        self.gems = 0;
        self.thresholds[index] += THRESHOLD_STEP;
        self.phase = kind.next();
        Some(Upgrade {
            kind,
            next_threshold: self.thresholds[index],
        })
    }

    pub(crate) fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            score: self.score,
            gems: self.gems,
            phase: self.phase,
            threshold: self.thresholds[self.phase.index()],
        }
    }
}
