//! Exponential smoothing of raw location fixes.

use hop_core::{normalize_bearing, shortest_rotation, GeoPoint, Timestamp};

// ── RawFix ────────────────────────────────────────────────────────────────────

/// One reading from the location source.
///
/// Platforms report "unknown" heading or speed with sentinels (negative or
/// NaN); the filter treats any such value as absent.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawFix {
    pub lat:       f64,
    pub lng:       f64,
    /// Degrees clockwise from north.
    pub heading:   Option<f64>,
    /// Metres per second.
    pub speed:     Option<f64>,
    pub timestamp: Timestamp,
}

impl RawFix {
    /// Fix with position and time only.
    pub fn at(position: GeoPoint, timestamp: Timestamp) -> Self {
        Self { lat: position.lat, lng: position.lng, heading: None, speed: None, timestamp }
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    #[inline]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    fn valid_heading(&self) -> Option<f64> {
        self.heading.filter(|h| h.is_finite())
    }

    fn valid_speed(&self) -> Option<f64> {
        self.speed.filter(|s| s.is_finite() && *s >= 0.0)
    }
}

// ── SmoothedPosition ──────────────────────────────────────────────────────────

/// The filter's running estimate.  `heading` is always in `[0, 360)`.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmoothedPosition {
    pub lat:     f64,
    pub lng:     f64,
    pub heading: f64,
    pub speed:   f64,
}

impl SmoothedPosition {
    #[inline]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

// ── FilterConfig ──────────────────────────────────────────────────────────────

/// EMA weights given to each new reading.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FilterConfig {
    pub location_alpha: f64,
    pub speed_alpha:    f64,
    pub heading_alpha:  f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { location_alpha: 0.25, speed_alpha: 0.35, heading_alpha: 0.30 }
    }
}

// ── PositionFilter ────────────────────────────────────────────────────────────

/// Owns the smoothed estimate.  [`latest`](Self::latest) is the one place
/// downstream code reads the current position from.
#[derive(Debug, Default)]
pub struct PositionFilter {
    config:  FilterConfig,
    current: Option<SmoothedPosition>,
}

impl PositionFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config, current: None }
    }

    /// Fold `fix` into the estimate and return the new value.
    ///
    /// The first fix seeds the estimate directly (heading 0 and speed 0 when
    /// absent).  A fix with non-finite coordinates is dropped and the
    /// previous estimate returned, which is `None` only before any usable
    /// fix.
    pub fn update(&mut self, fix: &RawFix) -> Option<SmoothedPosition> {
        if !(fix.lat.is_finite() && fix.lng.is_finite()) {
            return self.current;
        }

        let next = match self.current {
            None => SmoothedPosition {
                lat:     fix.lat,
                lng:     fix.lng,
                heading: normalize_bearing(fix.valid_heading().unwrap_or(0.0)),
                speed:   fix.valid_speed().unwrap_or(0.0),
            },
            Some(prev) => {
                let c = &self.config;
                let target_heading = fix.valid_heading().unwrap_or(prev.heading);
                let dh = shortest_rotation(prev.heading, target_heading);
                SmoothedPosition {
                    lat:     ema(prev.lat, fix.lat, c.location_alpha),
                    lng:     ema(prev.lng, fix.lng, c.location_alpha),
                    heading: normalize_bearing(prev.heading + c.heading_alpha * dh),
                    speed:   ema(prev.speed, fix.valid_speed().unwrap_or(0.0), c.speed_alpha),
                }
            }
        };

        self.current = Some(next);
        Some(next)
    }

    /// Most recent estimate, or `None` before the first fix.
    #[inline]
    pub fn latest(&self) -> Option<SmoothedPosition> {
        self.current
    }

    /// Forget the estimate; the next fix seeds afresh.
    pub fn reset(&mut self) {
        self.current = None;
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }
}

#[inline]
fn ema(prev: f64, sample: f64, alpha: f64) -> f64 {
    prev + alpha * (sample - prev)
}
