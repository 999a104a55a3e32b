//! `hop-core`: foundational types for the `hopln` navigation core.
//!
//! This crate is a dependency of every other `hop-*` crate.  It has no
//! `hop-*` dependencies and nothing from outside but an optional `serde`.
//!
//! # What lives here
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`geo`]     | `GeoPoint`, haversine, bearings, degree boxes, bounds       |
//! | [`ids`]     | `StopId`                                                    |
//! | [`stop`]    | `Stop`: static boarding-point reference data               |
//! | [`time`]    | `Timestamp` (monotonic milliseconds)                        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod geo;
pub mod ids;
pub mod stop;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::{
    bounding_box_for_radius, cardinal_from_bearing, normalize_bearing, shortest_rotation,
    path_length_m, DegreeBox, GeoBounds, GeoPoint,
};
pub use ids::StopId;
pub use stop::Stop;
pub use time::Timestamp;
