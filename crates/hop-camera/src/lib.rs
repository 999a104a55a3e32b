//! `hop-camera`: map-camera directives driven by the smoothed position.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`directive`] | `CameraDirective`, `Padding`, `CameraSink` and sinks      |
//! | [`director`]  | `CameraDirector<S>`, `CameraConfig`, preset constants     |
//!
//! # Follow mode
//!
//! While navigating, every smoothed position is offered to
//! [`CameraDirector::follow`].  Most are dropped: the camera only moves when
//! the throttle interval has passed *and* the walker moved or turned enough.
//! The zoom never steps back out during a session, so a walker slowing down
//! does not see the map pump in and out.

pub mod directive;
pub mod director;

#[cfg(test)]
mod tests;

pub use directive::{CameraDirective, CameraSink, LogSink, NullSink, Padding};
pub use director::{CameraConfig, CameraDirector};
