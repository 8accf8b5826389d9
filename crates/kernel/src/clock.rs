use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of monotonic timestamps, measured from an arbitrary origin.
pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTimeSource {
    origin: Instant,
}

impl MonotonicTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTimeSource {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Time source that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    now: Cell<Duration>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Time source that advances by a fixed step every time it is read.
///
/// The first read returns zero.
#[derive(Debug)]
pub struct FixedStepTimeSource {
    step: Duration,
    next: Cell<Duration>,
}

impl FixedStepTimeSource {
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            next: Cell::new(Duration::ZERO),
        }
    }

    /// Step of `1 / hz` seconds. Zero is treated as one.
    pub fn from_hz(hz: u32) -> Self {
        Self::new(Duration::from_secs(1) / hz.max(1))
    }

    pub fn step(&self) -> Duration {
        self.step
    }
}

impl TimeSource for FixedStepTimeSource {
    fn now(&self) -> Duration {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}

/// Frame clock: elapsed seconds between consecutive samples.
#[derive(Debug)]
pub struct Clock<S = MonotonicTimeSource> {
    source: S,
    last: Option<Duration>,
}

impl Clock<MonotonicTimeSource> {
    pub fn monotonic() -> Self {
        Self::new(MonotonicTimeSource::new())
    }
}

impl<S: TimeSource> Clock<S> {
    pub fn new(source: S) -> Self {
        Self { source, last: None }
    }

    /// Seconds since the previous sample. The first sample returns `0.0`.
    pub fn sample(&mut self) -> f64 {
        let now = self.source.now();
        let elapsed = match self.last {
            Some(last) => now.saturating_sub(last),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        elapsed.as_secs_f64()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
