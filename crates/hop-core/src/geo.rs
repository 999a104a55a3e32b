//! Geographic coordinate type and the pure geo helpers every component
//! shares.
//!
//! `GeoPoint` uses `f64`.  Walking navigation compares distances against
//! thresholds of a few metres, and single precision only resolves ~1 m at
//! the equator, so the extra width is worth it here.

use std::fmt;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Metres per degree of latitude used by the degree-box approximation.
pub const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Lower bound on `cos(lat)` when sizing longitude degrees.  Keeps the box
/// finite near the poles.
pub const MIN_COS_LAT: f64 = 0.2;

const CARDINALS: [&str; 8] = [
    "north", "northeast", "east", "southeast", "south", "southwest", "west", "northwest",
];

// ── GeoPoint ──────────────────────────────────────────────────────────────────

/// A WGS-84 coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build from a wire-order `[lng, lat]` pair (GeoJSON convention).
    #[inline]
    pub fn from_lng_lat([lng, lat]: [f64; 2]) -> Self {
        Self { lat, lng }
    }

    /// Wire-order `[lng, lat]` pair.
    #[inline]
    pub fn to_lng_lat(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lng * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

// ── Bearings ──────────────────────────────────────────────────────────────────

/// Fold any finite bearing into `[0, 360)`.
///
/// `rem_euclid` can return exactly `360.0` for tiny negative inputs, which
/// would break the half-open range, so that case is folded to zero.
#[inline]
pub fn normalize_bearing(bearing: f64) -> f64 {
    let b = bearing.rem_euclid(360.0);
    if b >= 360.0 { 0.0 } else { b }
}

/// Signed shortest rotation in degrees from `from` to `to`, in `[-180, 180)`.
///
/// `((to - from + 540) mod 360) - 180`: positive is clockwise.
#[inline]
pub fn shortest_rotation(from: f64, to: f64) -> f64 {
    (to - from + 540.0).rem_euclid(360.0) - 180.0
}

/// Map a bearing to one of eight compass words.
///
/// Absent or NaN bearings yield the neutral `"forward"`.
pub fn cardinal_from_bearing(bearing: Option<f64>) -> &'static str {
    match bearing {
        Some(b) if b.is_finite() => {
            let idx = (normalize_bearing(b) / 45.0).round() as usize % CARDINALS.len();
            CARDINALS[idx]
        }
        _ => "forward",
    }
}

// ── Degree boxes ──────────────────────────────────────────────────────────────

/// Half-extent of a lat/lng box, in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DegreeBox {
    pub d_lat: f64,
    pub d_lng: f64,
}

/// Convert a metre radius at latitude `lat` into a degree half-extent.
///
/// Longitude degrees shrink with `cos(lat)`; the factor is clamped to
/// [`MIN_COS_LAT`] so the box never blows up near the poles.
pub fn bounding_box_for_radius(lat: f64, radius_m: f64) -> DegreeBox {
    let cos_lat = lat.to_radians().cos().max(MIN_COS_LAT);
    DegreeBox {
        d_lat: radius_m / METERS_PER_DEG_LAT,
        d_lng: radius_m / (METERS_PER_DEG_LAT * cos_lat),
    }
}

// ── GeoBounds ─────────────────────────────────────────────────────────────────

/// Axis-aligned lat/lng extent of a set of points.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    pub min: GeoPoint,
    pub max: GeoPoint,
}

impl GeoBounds {
    /// Bounds of `points`, or `None` when the slice is empty.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut b = GeoBounds { min: *first, max: *first };
        for p in rest {
            b.min.lat = b.min.lat.min(p.lat);
            b.min.lng = b.min.lng.min(p.lng);
            b.max.lat = b.max.lat.max(p.lat);
            b.max.lng = b.max.lng.max(p.lng);
        }
        Some(b)
    }

    #[inline]
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min.lat + self.max.lat) * 0.5,
            (self.min.lng + self.max.lng) * 0.5,
        )
    }
}

/// Sum of haversine segment lengths along `points`.
pub fn path_length_m(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|w| w[0].distance_m(w[1])).sum()
}
