//! Camera directives and the sink they are sent to.

use tracing::debug;

use hop_core::GeoPoint;

/// Screen-edge insets in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Padding {
    pub top:    f64,
    pub right:  f64,
    pub bottom: f64,
    pub left:   f64,
}

impl Padding {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self { top, right, bottom, left }
    }
}

/// One camera move.  `bearing: None` leaves the map's rotation untouched.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CameraDirective {
    pub center:       GeoPoint,
    pub zoom:         f64,
    pub pitch:        f64,
    pub bearing:      Option<f64>,
    pub animation_ms: u64,
    pub padding:      Option<Padding>,
}

/// Receives camera directives.  Fire-and-forget: the director never waits
/// for or inspects the outcome.
pub trait CameraSink: Send {
    fn apply(&mut self, directive: CameraDirective);
}

/// Records every directive.  Used by tests and replay tooling.
impl CameraSink for Vec<CameraDirective> {
    fn apply(&mut self, directive: CameraDirective) {
        self.push(directive);
    }
}

impl<S: CameraSink + ?Sized> CameraSink for Box<S> {
    fn apply(&mut self, directive: CameraDirective) {
        (**self).apply(directive);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl CameraSink for NullSink {
    fn apply(&mut self, _directive: CameraDirective) {}
}

/// Logs each directive at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl CameraSink for LogSink {
    fn apply(&mut self, d: CameraDirective) {
        debug!(
            center = %d.center,
            zoom = d.zoom,
            pitch = d.pitch,
            bearing = ?d.bearing,
            animation_ms = d.animation_ms,
            "camera"
        );
    }
}
