//! Animation entries
//!
//! An [`AnimationEntry`] is one transition between two opaque payloads. It is
//! active during a sub-window of its parent cycle and reasons in its own local
//! `[0, 1]` progress, so several entries can share one cycle (move during the
//! first half, fade during the second) without knowing about each other.

use std::fmt;

use crate::clock::{elapsed_fraction, Ticks};
use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::interpolate::Interpolate;

/// Callback invoked with the entry and its eased local progress
pub type StepCallback<T> = Box<dyn FnMut(&AnimationEntry<T>, f64)>;

/// Callback invoked once when the entry completes
pub type CompleteCallback<T> = Box<dyn FnOnce(&AnimationEntry<T>)>;

/// A single timed transition from `start` to `end`
pub struct AnimationEntry<T> {
    start: T,
    end: T,
    window_start: f64,
    window_end: f64,
    easing: Easing,
    on_step: Option<StepCallback<T>>,
    on_complete: Option<CompleteCallback<T>>,
    // Stamped by the scheduler when the entry joins a cycle
    pub(crate) start_ticks: Ticks,
    pub(crate) duration_ticks: Ticks,
}

impl<T> AnimationEntry<T> {
    /// Create an entry spanning the whole cycle with linear easing
    pub fn new(start: T, end: T) -> Self {
        Self {
            start,
            end,
            window_start: 0.0,
            window_end: 1.0,
            easing: Easing::Linear,
            on_step: None,
            on_complete: None,
            start_ticks: 0,
            duration_ticks: 0,
        }
    }

    /// Create a builder for an entry
    pub fn builder(start: T, end: T) -> AnimationEntryBuilder<T> {
        AnimationEntryBuilder {
            entry: Self::new(start, end),
        }
    }

    pub fn start(&self) -> &T {
        &self.start
    }

    pub fn end(&self) -> &T {
        &self.end
    }

    /// Start of the active window as a fraction of the parent cycle
    pub fn window_start(&self) -> f64 {
        self.window_start
    }

    /// End of the active window as a fraction of the parent cycle
    pub fn window_end(&self) -> f64 {
        self.window_end
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Timestamp at which the scheduler started this entry
    pub fn start_ticks(&self) -> Ticks {
        self.start_ticks
    }

    /// Length of the parent cycle as seen by this entry
    pub fn duration_ticks(&self) -> Ticks {
        self.duration_ticks
    }

    /// Global progress of this entry's cycle at `now`, clamped to `[0, 1]`
    pub fn progress_at(&self, now: Ticks) -> f64 {
        elapsed_fraction(self.start_ticks, self.duration_ticks, now)
    }

    /// Whether `global_progress` lies inside this entry's window
    pub fn contains(&self, global_progress: f64) -> bool {
        global_progress >= self.window_start && global_progress <= self.window_end
    }

    /// Map global progress into this entry's eased local progress
    ///
    /// Returns `None` outside the window. The eased value is not clamped.
    pub fn local_progress(&self, global_progress: f64) -> Option<f64> {
        if !self.contains(global_progress) {
            return None;
        }
        let span = self.window_end - self.window_start;
        let t = ((global_progress - self.window_start) / span).clamp(0.0, 1.0);
        Some(self.easing.apply(t))
    }

    /// Evaluate the entry at `global_progress`
    ///
    /// Invokes the step callback and returns `true` while the window contains
    /// the progress. Before the window opens and after it closes the entry is
    /// inert and returns `false`.
    pub fn evaluate(&mut self, global_progress: f64) -> bool {
        let Some(local) = self.local_progress(global_progress) else {
            return false;
        };

        // The callback borrows the entry, so it is parked outside it for the call
        if let Some(mut on_step) = self.on_step.take() {
            on_step(&*self, local);
            self.on_step = Some(on_step);
        }
        true
    }

    /// Run the completion callback, consuming the entry
    pub fn complete(mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(&self);
        }
    }

    pub fn has_step_callback(&self) -> bool {
        self.on_step.is_some()
    }

    pub fn has_complete_callback(&self) -> bool {
        self.on_complete.is_some()
    }
}

impl<T: Interpolate> AnimationEntry<T> {
    /// Blend `start` towards `end` by an (already eased) progress value
    pub fn value_at(&self, progress: f64) -> T {
        self.start.interpolate(&self.end, progress)
    }
}

impl<T: fmt::Debug> fmt::Debug for AnimationEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationEntry")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("window", &(self.window_start..=self.window_end))
            .field("easing", &self.easing)
            .field("on_step", &self.on_step.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("start_ticks", &self.start_ticks)
            .field("duration_ticks", &self.duration_ticks)
            .finish()
    }
}

/// Builder for [`AnimationEntry`]
pub struct AnimationEntryBuilder<T> {
    entry: AnimationEntry<T>,
}

impl<T> AnimationEntryBuilder<T> {
    /// Restrict the entry to `[start, end]` of the parent cycle
    pub fn window(mut self, start: f64, end: f64) -> Self {
        self.entry.window_start = start;
        self.entry.window_end = end;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.entry.easing = easing;
        self
    }

    /// Set the per-step callback
    pub fn on_step<F: FnMut(&AnimationEntry<T>, f64) + 'static>(mut self, f: F) -> Self {
        self.entry.on_step = Some(Box::new(f));
        self
    }

    /// Set the completion callback
    pub fn on_complete<F: FnOnce(&AnimationEntry<T>) + 'static>(mut self, f: F) -> Self {
        self.entry.on_complete = Some(Box::new(f));
        self
    }

    /// Validate the window and build the entry
    pub fn build(self) -> Result<AnimationEntry<T>> {
        let (start, end) = (self.entry.window_start, self.entry.window_end);
        // Negated so NaN bounds are rejected too
        if !(0.0 <= start && start < end && end <= 1.0) {
            return Err(AnimationError::InvalidWindow { start, end });
        }
        Ok(self.entry)
    }
}
