//! Meridian Animation Engine
//!
//! Timing core for smooth map transitions: pans, zooms, fades and shape
//! morphs. The engine decides *when* and *how far*; what is animated stays
//! with the caller, who receives eased progress through callbacks and applies
//! it to its own state.
//!
//! # Features
//!
//! - **Windowed entries**: many transitions share one cycle, each active
//!   during its own slice of it
//! - **Easing**: a closed catalog of progress mappings, overshoot included
//! - **Deterministic ticking**: entries step in registration order against an
//!   injectable clock
//!
//! # Example
//!
//! ```rust
//! use meridian_animation::{AnimationEntry, AnimationScheduler, Easing, ManualClock};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let clock = ManualClock::new(0);
//! let mut scheduler = AnimationScheduler::with_clock(clock.clone());
//!
//! let zoom = Rc::new(Cell::new(1.0));
//! let target = zoom.clone();
//! let entry = AnimationEntry::builder(1.0, 4.0)
//!     .easing(Easing::EaseInOut)
//!     .on_step(move |e, p| target.set(e.value_at(p)))
//!     .build()
//!     .unwrap();
//!
//! scheduler.start_cycle(300, [entry]).unwrap();
//! clock.advance(300);
//! scheduler.tick();
//!
//! assert_eq!(zoom.get(), 4.0);
//! assert!(!scheduler.is_running());
//! ```

pub mod clock;
pub mod config;
pub mod easing;
pub mod entry;
pub mod error;
pub mod interpolate;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock, Ticks};
pub use config::{SchedulerConfig, StartPolicy};
pub use easing::Easing;
pub use entry::{AnimationEntry, AnimationEntryBuilder, CompleteCallback, StepCallback};
pub use error::{AnimationError, Result};
pub use interpolate::Interpolate;
pub use scheduler::{AnimationScheduler, CycleOutcome, CycleState, EntryId, TickOutcome};
