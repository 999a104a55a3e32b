//! Static boarding-point reference data.

use std::fmt;

use crate::{GeoPoint, StopId};

/// A transit boarding point.  Loaded once at startup and read-only to the
/// navigation core.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    pub id:   StopId,
    pub name: String,
    pub lat:  f64,
    pub lng:  f64,
}

impl Stop {
    pub fn new(id: impl Into<StopId>, name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self { id: id.into(), name: name.into(), lat, lng }
    }

    #[inline]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.id)
    }
}
