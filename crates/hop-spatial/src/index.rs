//! The proximity index over the static stop set.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over `[lat, lng]` points answers the viewport's
//! bounding-box query.  The box is a cheap over-approximation of the radius;
//! candidates are then filtered by true haversine distance.  Nearest-N and
//! search run a linear scan, which is fast enough for city-sized stop sets
//! and keeps tie ordering exact.

use std::collections::HashMap;

use rstar::{RTree, RTreeObject, AABB};

use hop_core::{bounding_box_for_radius, GeoPoint, Stop, StopId};

use crate::{load_stops_csv, SpatialResult};

/// Cap on stops returned for one viewport, before the selected stop.
pub const MAX_VIEWPORT_STOPS: usize = 400;

/// Default number of name-search results.
pub const SEARCH_LIMIT: usize = 10;

/// Query radius for a map zoom level, or `None` when stops are hidden.
pub fn radius_for_zoom(zoom: f64) -> Option<f64> {
    match zoom {
        z if z < 13.0 => None,
        z if z < 14.0 => Some(1_800.0),
        z if z < 15.0 => Some(1_100.0),
        z if z < 16.0 => Some(700.0),
        z if z < 17.0 => Some(450.0),
        _ => Some(320.0),
    }
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// `[lat, lng]` point plus the stop's position in `ProximityIndex::stops`.
#[derive(Clone)]
struct StopEntry {
    point: [f64; 2],
    idx:   usize,
}

impl RTreeObject for StopEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

// ── ProximityIndex ────────────────────────────────────────────────────────────

pub struct ProximityIndex {
    /// In load order.  Ties in every query resolve by this order.
    stops: Vec<Stop>,
    by_id: HashMap<StopId, usize>,
    tree:  RTree<StopEntry>,
}

impl ProximityIndex {
    /// Build from `stops`.  A repeated id keeps its first occurrence for
    /// [`get`](Self::get); both copies stay visible to spatial queries.
    pub fn new(stops: Vec<Stop>) -> Self {
        let mut by_id = HashMap::with_capacity(stops.len());
        for (i, s) in stops.iter().enumerate() {
            by_id.entry(s.id.clone()).or_insert(i);
        }
        let entries = stops
            .iter()
            .enumerate()
            .map(|(idx, s)| StopEntry { point: [s.lat, s.lng], idx })
            .collect();
        Self { stops, by_id, tree: RTree::bulk_load(entries) }
    }

    /// Load a GTFS-style CSV and index it.
    pub fn from_csv(path: &std::path::Path) -> SpatialResult<Self> {
        Ok(Self::new(load_stops_csv(path)?))
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn get(&self, id: &str) -> Option<&Stop> {
        self.by_id.get(id).map(|&i| &self.stops[i])
    }

    /// The `n` stops closest to `pos`, ascending by distance.
    pub fn nearest(&self, pos: GeoPoint, n: usize) -> Vec<(&Stop, f64)> {
        let mut all: Vec<(&Stop, f64)> =
            self.stops.iter().map(|s| (s, pos.distance_m(s.position()))).collect();
        // Stable: equal distances keep load order.
        all.sort_by(|a, b| a.1.total_cmp(&b.1));
        all.truncate(n);
        all
    }

    /// Stops to draw for a map view centred on `center` at `zoom`.
    ///
    /// Within the zoom's radius, nearest first, capped at
    /// [`MAX_VIEWPORT_STOPS`].  `selected` is appended when it would
    /// otherwise be missing, including at zoom levels where stops are
    /// hidden.
    pub fn within_viewport(
        &self,
        center:   GeoPoint,
        zoom:     f64,
        selected: Option<&StopId>,
    ) -> Vec<&Stop> {
        let mut hits: Vec<(usize, f64)> = match radius_for_zoom(zoom) {
            None => Vec::new(),
            Some(radius) => {
                let half = bounding_box_for_radius(center.lat, radius);
                let envelope = AABB::from_corners(
                    [center.lat - half.d_lat, center.lng - half.d_lng],
                    [center.lat + half.d_lat, center.lng + half.d_lng],
                );
                self.tree
                    .locate_in_envelope(&envelope)
                    .map(|e| (e.idx, center.distance_m(self.stops[e.idx].position())))
                    .filter(|&(_, d)| d <= radius)
                    .collect()
            }
        };

        // R-tree order is arbitrary; break distance ties by load order.
        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        hits.truncate(MAX_VIEWPORT_STOPS);

        let mut out: Vec<&Stop> = hits.into_iter().map(|(i, _)| &self.stops[i]).collect();
        if let Some(sel) = selected.and_then(|id| self.get(id.as_str()))
            && !out.iter().any(|s| s.id == sel.id)
        {
            out.push(sel);
        }
        out
    }

    /// Case-insensitive substring search on stop names.
    ///
    /// Earlier matches rank first, then stops nearer `near`, then load
    /// order.  An empty query matches every stop, ranked by distance alone.
    pub fn search(&self, query: &str, near: Option<GeoPoint>, limit: usize) -> Vec<&Stop> {
        let needle = query.trim().to_lowercase();
        let mut hits: Vec<(usize, usize, f64)> = self
            .stops
            .iter()
            .enumerate()
            .filter_map(|(i, s)| {
                let at = if needle.is_empty() {
                    0
                } else {
                    s.name.to_lowercase().find(&needle)?
                };
                let d = near.map_or(0.0, |p| p.distance_m(s.position()));
                Some((i, at, d))
            })
            .collect();

        hits.sort_by(|a, b| a.1.cmp(&b.1).then(a.2.total_cmp(&b.2)).then(a.0.cmp(&b.0)));
        hits.into_iter().take(limit).map(|(i, _, _)| &self.stops[i]).collect()
    }
}
