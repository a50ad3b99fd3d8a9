//! Scheduler configuration

/// What `start_cycle` does when a cycle is already running
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StartPolicy {
    /// Fail with [`AnimationError::AlreadyRunning`](crate::AnimationError::AlreadyRunning)
    /// and leave the running cycle untouched.
    #[default]
    Reject,
    /// Add the new entries to the running cycle. Each merged entry keeps its
    /// own start time and duration; the cycle ends once the last one does.
    Merge,
}

/// Configuration for an [`AnimationScheduler`](crate::AnimationScheduler)
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    pub start_policy: StartPolicy,
}

impl SchedulerConfig {
    /// Builder: set the start policy
    pub fn with_start_policy(mut self, policy: StartPolicy) -> Self {
        self.start_policy = policy;
        self
    }
}
