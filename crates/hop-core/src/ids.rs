//! Strongly typed stop identifier.
//!
//! Stop ids come from GTFS-style feeds (`"0310JDN"`), so unlike numeric
//! graph ids they are strings.  The newtype keeps them from being mixed up
//! with stop names, which are also strings.

use std::borrow::Borrow;
use std::fmt;

/// Unique identifier of a boarding point.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StopId(pub String);

impl StopId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StopId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for StopId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for StopId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
