//! `hop-nav`: position smoothing and the navigation state machine.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                           |
//! |------------|--------------------------------------------------------------------|
//! | [`filter`] | `RawFix`, `SmoothedPosition`, `PositionFilter`, `FilterConfig`     |
//! | [`engine`] | `NavigationEngine`, `NavThresholds`, `NavEvent`, `NavPhase`        |
//!
//! # Update model
//!
//! Raw fixes are smoothed first; everything downstream reads the smoothed
//! estimate only:
//!
//! 1. `PositionFilter::update` folds a [`RawFix`] into the running estimate.
//! 2. `NavigationEngine::update` takes the smoothed position plus the fix
//!    timestamp, checks arrival, then step advance, then rebase, and returns
//!    the [`NavEvent`]s that fired.
//! 3. The caller (hop-app) forwards the same position to the camera director
//!    and the events to its observer.
//!
//! The engine never reads a clock.  All windows (passing hysteresis, rebase
//! interval) are measured between fix timestamps, so a replayed walk makes
//! identical decisions.

pub mod engine;
pub mod filter;


pub use engine::{NavEvent, NavPhase, NavThresholds, NavigationEngine, NavigationSession};
pub use filter::{FilterConfig, PositionFilter, RawFix, SmoothedPosition};
