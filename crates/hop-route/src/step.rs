//! Route steps and their maneuver metadata.

use std::fmt;

use hop_core::GeoPoint;

// ── Modifier ──────────────────────────────────────────────────────────────────

/// Direction qualifier attached to a maneuver.
///
/// For `Arrive` steps the modifier names the side of the street the
/// destination is on (`left`/`right`/`straight`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Modifier {
    UTurn,
    SharpRight,
    Right,
    SlightRight,
    Straight,
    SlightLeft,
    Left,
    SharpLeft,
}

impl Modifier {
    /// Parse a routing-service modifier string.  Unknown strings are `None`.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "uturn" => Modifier::UTurn,
            "sharp right" => Modifier::SharpRight,
            "right" => Modifier::Right,
            "slight right" => Modifier::SlightRight,
            "straight" => Modifier::Straight,
            "slight left" => Modifier::SlightLeft,
            "left" => Modifier::Left,
            "sharp left" => Modifier::SharpLeft,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::UTurn => "uturn",
            Modifier::SharpRight => "sharp right",
            Modifier::Right => "right",
            Modifier::SlightRight => "slight right",
            Modifier::Straight => "straight",
            Modifier::SlightLeft => "slight left",
            Modifier::Left => "left",
            Modifier::SharpLeft => "sharp left",
        }
    }

    #[inline]
    pub fn is_left(self) -> bool {
        matches!(self, Modifier::SlightLeft | Modifier::Left | Modifier::SharpLeft)
    }

    #[inline]
    pub fn is_right(self) -> bool {
        matches!(self, Modifier::SlightRight | Modifier::Right | Modifier::SharpRight)
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Maneuver ──────────────────────────────────────────────────────────────────

/// What the walker does at a step's location.  Closed set; wire types the
/// navigation core has no special handling for collapse into `Continue`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Maneuver {
    Depart,
    Turn(Option<Modifier>),
    /// Roundabout with the exit number to take, when known.
    Roundabout(Option<u32>),
    NewName,
    /// Arrival, with the side of the street when known.
    Arrive(Option<Modifier>),
    Continue,
}

impl Maneuver {
    /// Build from the wire `type` / `modifier` / `exit` triple.
    pub fn from_wire(kind: Option<&str>, modifier: Option<&str>, exit: Option<u32>) -> Self {
        let modifier = modifier.and_then(Modifier::parse);
        match kind {
            Some("depart" | "start") => Maneuver::Depart,
            Some("turn") => Maneuver::Turn(modifier),
            Some("roundabout") => Maneuver::Roundabout(exit),
            Some("new name") => Maneuver::NewName,
            Some("arrive") => Maneuver::Arrive(modifier),
            _ => Maneuver::Continue,
        }
    }

    #[inline]
    pub fn is_arrive(self) -> bool {
        matches!(self, Maneuver::Arrive(_))
    }
}

// ── Step ──────────────────────────────────────────────────────────────────────

/// One maneuver segment of a walking route.  Immutable once fetched.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    /// Ready-made instruction text from the routing service, if any.
    pub instruction:   Option<String>,
    /// Name of the road or path the step continues on.
    pub road_name:     Option<String>,
    pub distance_m:    f64,
    pub duration_s:    f64,
    /// Where the maneuver happens.
    pub location:      GeoPoint,
    pub maneuver:      Maneuver,
    /// Heading after the maneuver, degrees.
    pub bearing_after: Option<f64>,
}

impl Step {
    /// A bare step with no text or bearing metadata.
    pub fn new(location: GeoPoint, maneuver: Maneuver, distance_m: f64, duration_s: f64) -> Self {
        Self {
            instruction: None,
            road_name: None,
            distance_m,
            duration_s,
            location,
            maneuver,
            bearing_after: None,
        }
    }
}

/// Index of the step in `steps` whose location is closest to `pos`.
///
/// Earliest index wins ties.  Returns `None` for an empty slice.
pub fn nearest_step(steps: &[Step], pos: GeoPoint) -> Option<(usize, f64)> {
    steps
        .iter()
        .enumerate()
        .map(|(i, s)| (i, pos.distance_m(s.location)))
        .fold(None, |best, (i, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((i, d)),
        })
}
