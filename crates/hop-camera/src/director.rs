//! The camera director: navigation follow mode plus one-shot presets.

use tracing::debug;

use hop_core::{shortest_rotation, GeoBounds, GeoPoint, Stop, Timestamp};
use hop_nav::SmoothedPosition;
use hop_route::RouteState;

use crate::{CameraDirective, CameraSink, Padding};

// ── Presets ───────────────────────────────────────────────────────────────────

const RECENTER_ZOOM: f64 = 16.0;
const RECENTER_PITCH: f64 = 30.0;
const RECENTER_MS: u64 = 450;

const OVERVIEW_ZOOM: f64 = 15.5;
const OVERVIEW_MS: u64 = 450;

const FOCUS_ZOOM: f64 = 17.2;
const FOCUS_MS: u64 = 500;
const FOCUS_PADDING: Padding = Padding::new(40.0, 40.0, 200.0, 40.0);

const ROUTE_OVERVIEW_ZOOM: f64 = 16.8;
const ROUTE_FALLBACK_ZOOM: f64 = 17.2;
const ROUTE_OVERVIEW_MS: u64 = 600;

// ── CameraConfig ──────────────────────────────────────────────────────────────

/// Follow-mode tuning.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CameraConfig {
    /// Minimum time between follow directives.
    pub throttle_ms:         u64,
    /// Movement from the last applied center that justifies a new directive.
    pub min_move_m:          f64,
    /// Heading change that justifies a new directive.
    pub min_heading_deg:     f64,
    pub nav_zoom_base:       f64,
    /// Extra zoom at `nav_zoom_speed_max` and above.
    pub nav_zoom_delta:      f64,
    pub nav_zoom_speed_max:  f64,
    pub nav_pitch:           f64,
    pub follow_animation_ms: u64,
    pub begin_animation_ms:  u64,
    /// Rotate the map with the walker's heading.
    pub rotate_with_heading: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            throttle_ms:         320,
            min_move_m:          3.5,
            min_heading_deg:     10.0,
            nav_zoom_base:       18.0,
            nav_zoom_delta:      0.15,
            nav_zoom_speed_max:  2.0,
            nav_pitch:           45.0,
            follow_animation_ms: 300,
            begin_animation_ms:  250,
            rotate_with_heading: false,
        }
    }
}

impl CameraConfig {
    /// Speed-dependent navigation zoom, before the no-zoom-out floor.
    pub fn target_zoom(&self, speed: f64) -> f64 {
        let spd = if speed.is_finite() { speed.clamp(0.0, self.nav_zoom_speed_max) } else { 0.0 };
        self.nav_zoom_base + (spd / self.nav_zoom_speed_max) * self.nav_zoom_delta
    }
}

// ── CameraState ───────────────────────────────────────────────────────────────

/// What follow mode last sent to the sink.
#[derive(Copy, Clone, Debug, Default)]
struct CameraState {
    last_center:  Option<GeoPoint>,
    last_zoom:    Option<f64>,
    last_bearing: f64,
    last_at:      Option<Timestamp>,
}

// ── CameraDirector ────────────────────────────────────────────────────────────

/// Issues directives to a [`CameraSink`].
///
/// # Type parameter
///
/// `S` is the sink; `Vec<CameraDirective>` records, [`crate::LogSink`] logs.
pub struct CameraDirector<S: CameraSink> {
    config:     CameraConfig,
    state:      CameraState,
    navigating: bool,
    sink:       S,
}

impl<S: CameraSink> CameraDirector<S> {
    pub fn new(config: CameraConfig, sink: S) -> Self {
        Self { config, state: CameraState::default(), navigating: false, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    #[inline]
    pub fn is_following(&self) -> bool {
        self.navigating
    }

    /// Enter follow mode with an immediate directive at base zoom.
    ///
    /// Throttling and the zoom floor restart from this directive.
    pub fn begin_navigation(&mut self, pos: &SmoothedPosition, now: Timestamp) -> CameraDirective {
        let c = self.config;
        let heading = if pos.heading.is_finite() { pos.heading } else { 0.0 };
        let directive = CameraDirective {
            center:       pos.position(),
            zoom:         c.nav_zoom_base,
            pitch:        c.nav_pitch,
            bearing:      c.rotate_with_heading.then_some(heading),
            animation_ms: c.begin_animation_ms,
            padding:      None,
        };
        self.state = CameraState {
            last_center:  Some(directive.center),
            last_zoom:    Some(directive.zoom),
            last_bearing: heading,
            last_at:      Some(now),
        };
        self.navigating = true;
        self.sink.apply(directive);
        directive
    }

    /// Leave follow mode.  Nothing is sent.
    pub fn end_navigation(&mut self) {
        self.navigating = false;
        self.state = CameraState::default();
    }

    /// Offer a position in follow mode.  Returns the directive if one was
    /// sent.
    pub fn follow(&mut self, pos: &SmoothedPosition, now: Timestamp) -> Option<CameraDirective> {
        if !self.navigating {
            return None;
        }
        let c = self.config;
        let s = self.state;

        if let Some(last) = s.last_at
            && now.since(last) < c.throttle_ms
        {
            return None;
        }

        let center = pos.position();
        let moved = s.last_center.is_none_or(|prev| prev.distance_m(center) >= c.min_move_m);
        let heading = if pos.heading.is_finite() { pos.heading } else { s.last_bearing };
        let turned = shortest_rotation(s.last_bearing, heading).abs() >= c.min_heading_deg;
        if !(moved || turned) {
            return None;
        }

        let target = c.target_zoom(pos.speed);
        let zoom = s.last_zoom.map_or(target, |z| z.max(target));
        let directive = CameraDirective {
            center,
            zoom,
            pitch: c.nav_pitch,
            bearing: c.rotate_with_heading.then_some(heading),
            animation_ms: c.follow_animation_ms,
            padding: None,
        };
        debug!(zoom, moved, turned, "camera follow");

        self.state = CameraState {
            last_center:  Some(center),
            last_zoom:    Some(zoom),
            last_bearing: heading,
            last_at:      Some(now),
        };
        self.sink.apply(directive);
        Some(directive)
    }

    /// Snap to the walker, rotated to their heading.
    pub fn recenter(&mut self, pos: &SmoothedPosition) -> CameraDirective {
        let heading = if pos.heading.is_finite() { pos.heading } else { 0.0 };
        self.emit(CameraDirective {
            center:       pos.position(),
            zoom:         RECENTER_ZOOM,
            pitch:        RECENTER_PITCH,
            bearing:      Some(heading),
            animation_ms: RECENTER_MS,
            padding:      None,
        })
    }

    /// Flat, zoomed-out view around the walker.
    pub fn overview(&mut self, pos: &SmoothedPosition) -> CameraDirective {
        self.emit(CameraDirective {
            center:       pos.position(),
            zoom:         OVERVIEW_ZOOM,
            pitch:        0.0,
            bearing:      None,
            animation_ms: OVERVIEW_MS,
            padding:      None,
        })
    }

    /// Frame a stop, leaving room at the bottom for the detail sheet.
    pub fn focus_stop(&mut self, stop: &Stop) -> CameraDirective {
        self.emit(CameraDirective {
            center:       stop.position(),
            zoom:         FOCUS_ZOOM,
            pitch:        0.0,
            bearing:      None,
            animation_ms: FOCUS_MS,
            padding:      Some(FOCUS_PADDING),
        })
    }

    /// Frame a freshly loaded route.
    ///
    /// Routed paths center on their bounds; straight-line fallbacks center
    /// on the destination.
    pub fn route_overview(&mut self, route: &RouteState, destination: &Stop) -> CameraDirective {
        let bounds = if route.is_fallback { None } else { GeoBounds::from_points(&route.polyline) };
        let (center, zoom) = match bounds {
            Some(b) => (b.center(), ROUTE_OVERVIEW_ZOOM),
            None => (destination.position(), ROUTE_FALLBACK_ZOOM),
        };
        self.emit(CameraDirective {
            center,
            zoom,
            pitch: 0.0,
            bearing: None,
            animation_ms: ROUTE_OVERVIEW_MS,
            padding: None,
        })
    }

    fn emit(&mut self, directive: CameraDirective) -> CameraDirective {
        self.sink.apply(directive);
        directive
    }
}
