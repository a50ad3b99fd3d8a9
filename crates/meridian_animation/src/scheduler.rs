//! Animation scheduler
//!
//! Owns the entries of the running cycle and advances them from the host's
//! frame loop. One call to [`AnimationScheduler::tick`] per rendered frame
//! computes the cycle progress, steps every active entry in registration
//! order and retires entries whose window has been traversed.
//!
//! Cycle lifecycle: `Idle -> Running -> (Completed | Cancelled | Finished) -> Idle`.
//!
//! # Caller contract
//!
//! Callbacks run inside `tick` and `finish` while the scheduler is mutably
//! borrowed, so they cannot reach back into it through a plain `&mut`. A
//! scheduler shared through `Rc<RefCell<_>>` must not be borrowed from inside
//! its own callbacks; the borrow fails and the behavior is undefined from the
//! scheduler's point of view. Calls from several threads must be serialized by
//! the host.
//!
//! A callback that panics unwinds straight to the driver. The entry it
//! belonged to is never invoked again: completion callbacks run after their
//! entry has left the active set, and an entry whose step callback unwinds is
//! removed while the panic propagates.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::clock::{elapsed_fraction, Clock, SystemClock, Ticks};
use crate::config::{SchedulerConfig, StartPolicy};
use crate::entry::AnimationEntry;
use crate::error::{AnimationError, Result};

new_key_type! {
    /// Handle to an entry registered with a scheduler
    pub struct EntryId;
}

/// Whether a cycle is in flight
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Running,
}

/// How the last cycle ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Progress reached the end of the cycle
    Completed,
    /// Aborted with [`AnimationScheduler::cancel`]; no completion callbacks fired
    Cancelled,
    /// Ended early with [`AnimationScheduler::finish`]; all completion callbacks fired
    Finished,
}

/// Result of a single tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No cycle is running, nothing was evaluated
    Idle,
    /// The cycle is still running; the host should schedule another frame
    Running,
    /// The cycle completed during this tick and the scheduler is idle again
    Completed,
}

impl TickOutcome {
    /// Whether the host needs to redraw after this tick
    pub fn needs_redraw(self) -> bool {
        !matches!(self, TickOutcome::Idle)
    }
}

#[derive(Clone, Copy, Debug)]
struct Cycle {
    start: Ticks,
    end: Ticks,
}

impl Cycle {
    fn duration(&self) -> Ticks {
        self.end.saturating_sub(self.start)
    }

    fn progress_at(&self, now: Ticks) -> f64 {
        elapsed_fraction(self.start, self.duration(), now)
    }
}

/// The animation scheduler that ticks all active entries
pub struct AnimationScheduler<T, C: Clock = SystemClock> {
    config: SchedulerConfig,
    clock: C,
    entries: SlotMap<EntryId, AnimationEntry<T>>,
    /// Registration order; slot order is reused and cannot stand in for it
    order: Vec<EntryId>,
    cycle: Option<Cycle>,
    progress: f64,
    last_outcome: Option<CycleOutcome>,
}

/// Removes the stepped entry if its callback unwinds
struct StepGuard<'a, T> {
    entries: &'a mut SlotMap<EntryId, AnimationEntry<T>>,
    id: EntryId,
}

impl<T> Drop for StepGuard<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() && self.entries.remove(self.id).is_some() {
            debug!("dropped animation entry whose step callback panicked");
        }
    }
}

impl<T> AnimationScheduler<T, SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl<T> Default for AnimationScheduler<T, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Clock> AnimationScheduler<T, C> {
    pub fn with_clock(clock: C) -> Self {
        Self::with_config(SchedulerConfig::default(), clock)
    }

    pub fn with_config(config: SchedulerConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            entries: SlotMap::with_key(),
            order: Vec::new(),
            cycle: None,
            progress: 0.0,
            last_outcome: None,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Start a cycle of `duration` ticks driving `entries`
    ///
    /// The clock's current time becomes the cycle start. While a cycle is
    /// running the configured [`StartPolicy`] decides between rejecting the
    /// call and merging the entries into the running cycle.
    pub fn start_cycle<I>(&mut self, duration: Ticks, entries: I) -> Result<Vec<EntryId>>
    where
        I: IntoIterator<Item = AnimationEntry<T>>,
    {
        self.prune_order();

        if duration < 0 {
            return Err(AnimationError::InvalidDuration(duration));
        }

        let now = self.clock.now();
        let end = now.saturating_add(duration);

        if let Some(cycle) = self.cycle.as_mut() {
            if self.config.start_policy == StartPolicy::Reject {
                return Err(AnimationError::AlreadyRunning);
            }
            cycle.end = cycle.end.max(end);
            debug!(
                "merging entries into running cycle, end extended to {}",
                cycle.end
            );
        } else {
            self.cycle = Some(Cycle { start: now, end });
            self.progress = 0.0;
            self.last_outcome = None;
        }

        let ids: Vec<EntryId> = entries
            .into_iter()
            .map(|mut entry| {
                entry.start_ticks = now;
                entry.duration_ticks = duration;
                let id = self.entries.insert(entry);
                self.order.push(id);
                id
            })
            .collect();

        debug!(
            "registered {} animation entries at {} for {} ticks ({} active)",
            ids.len(),
            now,
            duration,
            self.entries.len()
        );
        Ok(ids)
    }

    /// Advance the running cycle using the injected clock
    pub fn tick(&mut self) -> TickOutcome {
        let now = self.clock.now();
        self.tick_at(now)
    }

    /// Advance the running cycle to `now`
    pub fn tick_at(&mut self, now: Ticks) -> TickOutcome {
        self.prune_order();

        let Some(cycle) = self.cycle else {
            return TickOutcome::Idle;
        };
        self.progress = cycle.progress_at(now);
        trace!(
            "animation tick at {}: progress {:.4}, {} active",
            now,
            self.progress,
            self.entries.len()
        );

        let mut retired: SmallVec<[EntryId; 8]> = SmallVec::new();
        for index in 0..self.order.len() {
            let id = self.order[index];
            let mut guard = StepGuard {
                entries: &mut self.entries,
                id,
            };
            let Some(entry) = guard.entries.get_mut(id) else {
                continue;
            };

            let progress = entry.progress_at(now);
            entry.evaluate(progress);
            // Also retires windows the cycle jumped over between two ticks
            let traversed = progress >= entry.window_end();
            drop(guard);

            if traversed {
                retired.push(id);
                if let Some(entry) = self.entries.remove(id) {
                    entry.complete();
                }
            }
        }
        if !retired.is_empty() {
            self.order.retain(|id| !retired.contains(id));
            debug!("retired {} animation entries", retired.len());
        }

        if self.progress >= 1.0 {
            self.end_cycle(CycleOutcome::Completed);
            return TickOutcome::Completed;
        }
        TickOutcome::Running
    }

    /// Abort the running cycle
    ///
    /// Pending entries are dropped without their completion callbacks. Side
    /// effects of earlier steps are not rolled back. Returns `false` if
    /// no cycle was running.
    pub fn cancel(&mut self) -> bool {
        self.prune_order();

        if self.cycle.take().is_none() {
            return false;
        }
        debug!("cancelled animation cycle with {} pending entries", self.entries.len());
        self.entries.clear();
        self.order.clear();
        self.last_outcome = Some(CycleOutcome::Cancelled);
        true
    }

    /// Remove a single entry without completing it
    ///
    /// The cycle keeps running until its end even if no entries remain.
    pub fn cancel_entry(&mut self, id: EntryId) -> Option<AnimationEntry<T>> {
        let entry = self.entries.remove(id)?;
        self.order.retain(|other| *other != id);
        Some(entry)
    }

    /// End the running cycle now, completing every pending entry
    ///
    /// Completion callbacks fire in registration order. Returns `false` if no
    /// cycle was running.
    pub fn finish(&mut self) -> bool {
        self.prune_order();

        if self.cycle.is_none() {
            return false;
        }
        self.progress = 1.0;
        self.end_cycle(CycleOutcome::Finished);
        true
    }

    pub fn is_running(&self) -> bool {
        self.cycle.is_some()
    }

    pub fn state(&self) -> CycleState {
        if self.is_running() {
            CycleState::Running
        } else {
            CycleState::Idle
        }
    }

    /// How the most recent cycle ended, `None` while one is running or before the first
    pub fn last_outcome(&self) -> Option<CycleOutcome> {
        self.last_outcome
    }

    /// Cycle progress computed by the last tick
    ///
    /// Measured over the whole cycle, including extensions from merged starts.
    /// Entries merged into a running cycle step against their own start and
    /// duration, so their progress can differ; read it per entry with
    /// `entry(id).map(|e| e.progress_at(now))`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Start timestamp of the running cycle
    pub fn cycle_start(&self) -> Option<Ticks> {
        self.cycle.map(|cycle| cycle.start)
    }

    /// Total duration of the running cycle, including merged extensions
    pub fn cycle_duration(&self) -> Option<Ticks> {
        self.cycle.map(|cycle| cycle.duration())
    }

    pub fn active_count(&self) -> usize {
        self.entries.len()
    }

    pub fn entry(&self, id: EntryId) -> Option<&AnimationEntry<T>> {
        self.entries.get(id)
    }

    /// Active entry ids in registration order
    pub fn entry_ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.order.iter().copied().filter(|id| self.entries.contains_key(*id))
    }

    fn end_cycle(&mut self, outcome: CycleOutcome) {
        // Everything leaves the active set before any callback runs; entries
        // after a panicking completion are dropped with the unwinding vec
        self.cycle = None;
        self.last_outcome = Some(outcome);

        let entries = &mut self.entries;
        let pending: Vec<AnimationEntry<T>> = std::mem::take(&mut self.order)
            .into_iter()
            .filter_map(|id| entries.remove(id))
            .collect();
        entries.clear();

        debug!("animation cycle {:?} with {} pending entries", outcome, pending.len());
        for entry in pending {
            entry.complete();
        }
    }

    /// Forget ids of entries retired by a callback that unwound mid-tick
    fn prune_order(&mut self) {
        let entries = &self.entries;
        self.order.retain(|id| entries.contains_key(*id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn scheduler() -> (AnimationScheduler<f64, ManualClock>, ManualClock) {
        let clock = ManualClock::new(0);
        (AnimationScheduler::with_clock(clock.clone()), clock)
    }

    fn counted(window: (f64, f64), completions: &Rc<Cell<u32>>) -> AnimationEntry<f64> {
        let sink = completions.clone();
        AnimationEntry::builder(0.0, 1.0)
            .window(window.0, window.1)
            .on_complete(move |_| sink.set(sink.get() + 1))
            .build()
            .unwrap()
    }

    #[test]
    fn test_idle_tick() {
        let (mut scheduler, _) = scheduler();
        assert_eq!(scheduler.tick_at(100), TickOutcome::Idle);
        assert!(!scheduler.tick_at(100).needs_redraw());
        assert_eq!(scheduler.state(), CycleState::Idle);
        assert_eq!(scheduler.last_outcome(), None);
    }

    #[test]
    fn test_start_records_clock_time() {
        let (mut scheduler, clock) = scheduler();
        clock.set(5000);
        let ids = scheduler
            .start_cycle(1000, [AnimationEntry::new(0.0, 1.0)])
            .unwrap();

        assert_eq!(scheduler.cycle_start(), Some(5000));
        assert_eq!(scheduler.cycle_duration(), Some(1000));
        let entry = scheduler.entry(ids[0]).unwrap();
        assert_eq!(entry.start_ticks(), 5000);
        assert_eq!(entry.duration_ticks(), 1000);
        assert_eq!(scheduler.state(), CycleState::Running);
    }

    #[test]
    fn test_quarter_progress() {
        let (mut scheduler, clock) = scheduler();
        clock.set(100);
        let seen = Rc::new(Cell::new(-1.0));
        let sink = seen.clone();
        let entry = AnimationEntry::builder(0.0, 1.0)
            .on_step(move |_, p| sink.set(p))
            .build()
            .unwrap();
        scheduler.start_cycle(1000, [entry]).unwrap();

        assert_eq!(scheduler.tick_at(350), TickOutcome::Running);
        assert_eq!(scheduler.progress(), 0.25);
        assert_eq!(seen.get(), 0.25);
    }

    #[test]
    fn test_negative_duration_rejected() {
        let (mut scheduler, _) = scheduler();
        let err = scheduler.start_cycle(-1, Vec::new()).unwrap_err();
        assert_eq!(err, AnimationError::InvalidDuration(-1));
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_zero_duration_completes_on_first_tick() {
        let (mut scheduler, _) = scheduler();
        let completions = Rc::new(Cell::new(0));
        scheduler
            .start_cycle(0, [counted((0.0, 1.0), &completions)])
            .unwrap();
        assert_eq!(scheduler.tick_at(0), TickOutcome::Completed);
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn test_empty_cycle_runs_to_end() {
        let (mut scheduler, _) = scheduler();
        scheduler.start_cycle(100, Vec::new()).unwrap();
        assert_eq!(scheduler.tick_at(50), TickOutcome::Running);
        assert_eq!(scheduler.tick_at(100), TickOutcome::Completed);
        assert_eq!(scheduler.last_outcome(), Some(CycleOutcome::Completed));
    }

    #[test]
    fn test_regressed_clock_clamps_to_zero() {
        let (mut scheduler, clock) = scheduler();
        clock.set(1000);
        let steps = Rc::new(RefCell::new(Vec::new()));
        let sink = steps.clone();
        let entry = AnimationEntry::builder(0.0, 1.0)
            .on_step(move |_, p| sink.borrow_mut().push(p))
            .build()
            .unwrap();
        scheduler.start_cycle(1000, [entry]).unwrap();

        assert_eq!(scheduler.tick_at(400), TickOutcome::Running);
        assert_eq!(scheduler.progress(), 0.0);
        assert_eq!(*steps.borrow(), vec![0.0]);
    }

    #[test]
    fn test_cancel_entry() {
        let (mut scheduler, _) = scheduler();
        let completions = Rc::new(Cell::new(0));
        let ids = scheduler
            .start_cycle(
                100,
                [counted((0.0, 1.0), &completions), counted((0.0, 1.0), &completions)],
            )
            .unwrap();

        let removed = scheduler.cancel_entry(ids[0]).unwrap();
        assert!(removed.has_complete_callback());
        assert!(scheduler.cancel_entry(ids[0]).is_none());
        assert_eq!(scheduler.entry_ids().collect::<Vec<_>>(), vec![ids[1]]);

        scheduler.tick_at(100);
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn test_cancel_when_idle() {
        let (mut scheduler, _) = scheduler();
        assert!(!scheduler.cancel());
        assert!(!scheduler.finish());
    }
}
