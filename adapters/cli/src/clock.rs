use std::time::{Duration, Instant};

/// Source of the wall-clock instants fed to the simulation.
pub(crate) trait TimeSource {
    /// Time elapsed since the source was created.
    fn now(&self) -> Duration;
}

/// Monotonic clock anchored at process start.
#[derive(Debug)]
pub(crate) struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock advanced explicitly by tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ManualClock {
    now: std::cell::Cell<Duration>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }
}

#[cfg(test)]
impl TimeSource for std::rc::Rc<ManualClock> {
    fn now(&self) -> Duration {
        self.now.get()
    }
}
