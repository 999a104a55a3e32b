//! CSV stop loader.
//!
//! # CSV format
//!
//! GTFS `stops.txt` columns; any other columns are ignored.  Upper-case
//! headers (as exported by some GIS tools) are accepted too.
//!
//! ```csv
//! stop_id,stop_name,stop_lat,stop_lon
//! 0110ASA,Asmara Road,-1.2610,36.8160
//! 0310JDN,Donholm Stage,-1.2974,36.8897
//! ```
//!
//! Rows repeating an earlier `stop_id` are skipped with a warning; the first
//! occurrence wins.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use hop_core::Stop;

use crate::{SpatialError, SpatialResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StopRecord {
    #[serde(alias = "STOP_ID")]
    stop_id:   String,
    #[serde(alias = "STOP_NAME")]
    stop_name: String,
    #[serde(alias = "STOP_LAT")]
    stop_lat:  f64,
    #[serde(alias = "STOP_LON")]
    stop_lon:  f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load every stop from a CSV file.
pub fn load_stops_csv(path: &Path) -> SpatialResult<Vec<Stop>> {
    let file = std::fs::File::open(path)?;
    let stops = load_stops_reader(file)?;
    info!(path = %path.display(), stops = stops.len(), "stops loaded");
    Ok(stops)
}

/// Like [`load_stops_csv`] but accepts any `Read` source.
pub fn load_stops_reader<R: Read>(reader: R) -> SpatialResult<Vec<Stop>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut seen = HashSet::new();
    let mut stops = Vec::new();

    for result in csv_reader.deserialize::<StopRecord>() {
        let row = result.map_err(|e| SpatialError::Parse(e.to_string()))?;

        let valid = row.stop_lat.is_finite()
            && row.stop_lon.is_finite()
            && (-90.0..=90.0).contains(&row.stop_lat)
            && (-180.0..=180.0).contains(&row.stop_lon);
        if !valid {
            return Err(SpatialError::InvalidCoordinate {
                id:  row.stop_id,
                lat: row.stop_lat,
                lng: row.stop_lon,
            });
        }

        if !seen.insert(row.stop_id.clone()) {
            warn!(stop = %row.stop_id, "duplicate stop id; keeping first");
            continue;
        }
        stops.push(Stop::new(row.stop_id, row.stop_name, row.stop_lat, row.stop_lon));
    }

    Ok(stops)
}
