//! Navigation time model.
//!
//! # Design
//!
//! Every temporal rule in the core (the 1 s passing window, the rebase
//! interval, the camera throttle) is evaluated against a `Timestamp` carried
//! by the position fix rather than by reading a wall clock.  Replaying the
//! same fix sequence therefore always reproduces the same decisions.
//!
//! The unit is milliseconds on a monotonic clock.  The epoch is whatever the
//! location source uses; only differences are meaningful.

use std::fmt;
use std::time::Duration;

/// A monotonic instant in milliseconds.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    #[inline]
    pub fn from_millis(ms: u64) -> Self {
        Timestamp(ms)
    }

    #[inline]
    pub fn from_secs(secs: u64) -> Self {
        Timestamp(secs * 1_000)
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed from `earlier` to `self`.
    ///
    /// Saturates at zero so an out-of-order fix never produces a huge
    /// elapsed value.
    #[inline]
    pub fn since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Timestamp {
    type Output = Timestamp;
    #[inline]
    fn add(self, rhs: u64) -> Timestamp {
        Timestamp(self.0 + rhs)
    }
}

impl std::ops::Add<Duration> for Timestamp {
    type Output = Timestamp;
    #[inline]
    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0 + rhs.as_millis() as u64)
    }
}

impl std::ops::Sub for Timestamp {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Timestamp) -> u64 {
        self.since(rhs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t+{}.{:03}s", self.0 / 1_000, self.0 % 1_000)
    }
}
