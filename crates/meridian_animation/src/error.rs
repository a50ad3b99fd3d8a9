//! Animation error types

use crate::clock::Ticks;
use thiserror::Error;

/// Errors raised while building entries or starting cycles
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// Entry window is empty, reversed or outside `[0, 1]`
    #[error("invalid animation window [{start}, {end}]: expected 0 <= start < end <= 1")]
    InvalidWindow { start: f64, end: f64 },

    /// A cycle is already running and the scheduler rejects concurrent starts
    #[error("an animation cycle is already running")]
    AlreadyRunning,

    /// Cycle duration is negative
    #[error("invalid cycle duration: {0} ticks")]
    InvalidDuration(Ticks),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
