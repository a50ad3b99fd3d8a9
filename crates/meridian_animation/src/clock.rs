//! Time sources
//!
//! The scheduler never reads the system time directly. It asks an injected
//! [`Clock`], which lets hosts reuse their own frame clock and lets tests step
//! time deterministically.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Timestamp or duration in clock ticks (milliseconds for the provided clocks)
pub type Ticks = i64;

/// Fraction of `duration` elapsed between `start` and `now`, clamped to `[0, 1]`
///
/// A `now` earlier than `start` counts as zero elapsed time. A zero duration
/// is complete as soon as `start` is reached.
pub(crate) fn elapsed_fraction(start: Ticks, duration: Ticks, now: Ticks) -> f64 {
    if duration <= 0 {
        return if now >= start { 1.0 } else { 0.0 };
    }
    let elapsed = now.saturating_sub(start).max(0);
    (elapsed as f64 / duration as f64).clamp(0.0, 1.0)
}

/// A monotonic time provider
pub trait Clock {
    fn now(&self) -> Ticks;
}

/// Wall clock backed by [`Instant`], counting milliseconds since creation
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Ticks {
        Ticks::try_from(self.origin.elapsed().as_millis()).unwrap_or(Ticks::MAX)
    }
}

/// Manually driven clock
///
/// Clones share the same underlying time, so a test can keep one handle and
/// hand another to the scheduler.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Ticks>>,
}

impl ManualClock {
    pub fn new(start: Ticks) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, now: Ticks) {
        self.now.set(now);
    }

    pub fn advance(&self, delta: Ticks) {
        self.now.set(self.now.get().saturating_add(delta));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Ticks {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Ticks {
        (**self).now()
    }
}
