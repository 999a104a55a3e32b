//! `hop-spatial`: the static stop set and the queries run against it.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`index`]  | `ProximityIndex`: nearest-N, viewport, and name search    |
//! | [`loader`] | `load_stops_csv`, `load_stops_reader` (GTFS `stops.txt`)   |
//! | [`error`]  | `SpatialError`, `SpatialResult<T>`                         |
//!
//! # Ownership
//!
//! The index is an explicitly constructed value that owns its stops.  Build
//! it once at startup (typically from CSV) and pass it by reference; nothing
//! in this crate is global.

pub mod error;
pub mod index;
pub mod loader;


pub use error::{SpatialError, SpatialResult};
pub use index::{radius_for_zoom, ProximityIndex, MAX_VIEWPORT_STOPS, SEARCH_LIMIT};
pub use loader::{load_stops_csv, load_stops_reader};
