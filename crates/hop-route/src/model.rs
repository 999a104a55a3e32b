//! The route model: current path, step list, and fetch bookkeeping.
//!
//! # Lifecycle
//!
//! ```text
//! select stop ─► begin_fetch ─► (routing call, off the update loop) ─► complete_fetch
//!                    │                                                     │
//!                    └─ same stop id as last time: no request              └─ stale id: discarded
//! ```
//!
//! Whatever the service returns, a completed fetch always leaves a usable
//! [`RouteState`] with at least one step: routing failures and responses
//! without geometry degrade to a straight line with a single synthetic
//! `Arrive` step.

use tracing::{debug, info, warn};

use hop_core::geo::path_length_m;
use hop_core::{GeoPoint, Stop, StopId};

use crate::instructions::{format_distance, format_duration};
use crate::service::{RouteResponse, RoutingService};
use crate::step::{nearest_step, Maneuver, Step};
use crate::RouteResult;

/// Assumed walking pace for fallback durations, m/s.
pub const WALKING_SPEED_MPS: f64 = 1.35;

// ── RouteState ────────────────────────────────────────────────────────────────

/// Geometry, steps, and progress of the active route.
///
/// `current_step` is private: it only moves through [`advance_to`] (never
/// backwards) and [`seed_step`] (session start).
///
/// [`advance_to`]: RouteState::advance_to
/// [`seed_step`]: RouteState::seed_step
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteState {
    /// Path to draw, in travel order.
    pub polyline:    Vec<GeoPoint>,
    /// Never empty.
    pub steps:       Vec<Step>,
    pub distance_m:  f64,
    pub duration_s:  f64,
    /// `true` when this is the straight-line fallback rather than a routed
    /// path.
    pub is_fallback: bool,
    current_step:    usize,
}

impl RouteState {
    /// Straight line from `origin` to `destination` with one synthetic
    /// arrive step.
    pub fn fallback(origin: GeoPoint, destination: &Stop, walking_speed_mps: f64) -> Self {
        let arrive = synthetic_arrive(origin, destination, walking_speed_mps);
        Self {
            polyline:     vec![origin, destination.position()],
            distance_m:   arrive.distance_m,
            duration_s:   arrive.duration_s,
            steps:        vec![arrive],
            is_fallback:  true,
            current_step: 0,
        }
    }

    /// Build from a service response, or fall back when the geometry is
    /// unusable (fewer than two points).
    pub fn from_response(
        response:          RouteResponse,
        origin:            GeoPoint,
        destination:       &Stop,
        walking_speed_mps: f64,
    ) -> Self {
        if response.geometry.len() < 2 {
            warn!(stop = %destination.id, "route has no usable geometry; using straight line");
            return Self::fallback(origin, destination, walking_speed_mps);
        }

        let distance_m = response
            .distance_m
            .unwrap_or_else(|| path_length_m(&response.geometry));
        let duration_s = response
            .duration_s
            .unwrap_or(distance_m / walking_speed_mps);

        let steps = if response.steps.is_empty() {
            vec![synthetic_arrive(origin, destination, walking_speed_mps)]
        } else {
            response.steps
        };

        // The first step may lie behind the walker; start from the closest.
        let current_step = nearest_step(&steps, origin).map_or(0, |(i, _)| i);

        Self {
            polyline: response.geometry,
            steps,
            distance_m,
            duration_s,
            is_fallback: false,
            current_step,
        }
    }

    #[inline]
    pub fn current_step_index(&self) -> usize {
        self.current_step
    }

    #[inline]
    pub fn last_step_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    #[inline]
    pub fn is_on_last_step(&self) -> bool {
        self.current_step >= self.last_step_index()
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.current_step)
    }

    pub fn next_step(&self) -> Option<&Step> {
        self.steps.get(self.current_step + 1)
    }

    /// Move forward to `idx`, clamped to the last step.
    ///
    /// Requests that would move backwards are ignored.  Returns `true` if the
    /// index changed.
    pub fn advance_to(&mut self, idx: usize) -> bool {
        let idx = idx.min(self.last_step_index());
        if idx > self.current_step {
            self.current_step = idx;
            true
        } else {
            false
        }
    }

    /// Place the progress cursor at `idx` (clamped) regardless of direction.
    /// Only used when a navigation session starts.
    pub fn seed_step(&mut self, idx: usize) {
        self.current_step = idx.min(self.last_step_index());
    }

    /// `"1.2 km • ~15 min"`.
    pub fn summary(&self) -> String {
        let duration = format_duration(self.duration_s);
        if duration.is_empty() {
            format_distance(self.distance_m)
        } else {
            format!("{} • {}", format_distance(self.distance_m), duration)
        }
    }
}

fn synthetic_arrive(origin: GeoPoint, destination: &Stop, walking_speed_mps: f64) -> Step {
    let distance_m = origin.distance_m(destination.position());
    Step {
        instruction: Some(format!("Walk to {}", destination.name)),
        ..Step::new(
            destination.position(),
            Maneuver::Arrive(None),
            distance_m,
            distance_m / walking_speed_mps,
        )
    }
}

// ── RouteRequest ──────────────────────────────────────────────────────────────

/// An in-flight route fetch, handed out by [`RouteModel::begin_fetch`] and
/// returned with the outcome to [`RouteModel::complete_fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin:      GeoPoint,
    pub destination: Stop,
    /// Fetch generation; only the latest one may complete.
    pub generation:  u64,
}

// ── RouteModel ────────────────────────────────────────────────────────────────

/// Holds at most one route, for the currently selected destination.
#[derive(Debug)]
pub struct RouteModel {
    walking_speed_mps: f64,
    /// Destination of the current (possibly still loading) route.
    fetched_for:       Option<StopId>,
    state:             Option<RouteState>,
    /// Bumped by every `begin_fetch` and `clear_route`.
    generation:        u64,
    /// Generation of the fetch still awaiting completion.
    pending:           Option<u64>,
}

impl Default for RouteModel {
    fn default() -> Self {
        Self::new(WALKING_SPEED_MPS)
    }
}

impl RouteModel {
    pub fn new(walking_speed_mps: f64) -> Self {
        Self { walking_speed_mps, fetched_for: None, state: None, generation: 0, pending: None }
    }

    /// Start a fetch for `destination` unless one was already made for the
    /// same stop id.
    ///
    /// A new destination drops the old route immediately, so nothing stale
    /// is visible while the request is in flight.
    pub fn begin_fetch(&mut self, origin: GeoPoint, destination: &Stop) -> Option<RouteRequest> {
        if self.fetched_for.as_ref() == Some(&destination.id) {
            debug!(stop = %destination.id, "route already fetched for stop");
            return None;
        }
        self.clear_route();
        self.generation += 1;
        self.pending = Some(self.generation);
        self.fetched_for = Some(destination.id.clone());
        Some(RouteRequest { origin, destination: destination.clone(), generation: self.generation })
    }

    /// Install the outcome of `request`.
    ///
    /// Returns `false` (and changes nothing) unless `request` is the latest
    /// fetch and nothing has been installed for it yet.  A fetch issued for
    /// an earlier selection of the same stop is stale too.
    pub fn complete_fetch(
        &mut self,
        request: RouteRequest,
        outcome: RouteResult<RouteResponse>,
    ) -> bool {
        if self.pending != Some(request.generation) {
            debug!(
                stop = %request.destination.id,
                generation = request.generation,
                "discarding stale route completion"
            );
            return false;
        }
        self.pending = None;

        let state = match outcome {
            Ok(response) => RouteState::from_response(
                response,
                request.origin,
                &request.destination,
                self.walking_speed_mps,
            ),
            Err(e) => {
                warn!(stop = %request.destination.id, error = %e, "routing failed; using straight line");
                RouteState::fallback(request.origin, &request.destination, self.walking_speed_mps)
            }
        };

        info!(
            stop = %request.destination.id,
            steps = state.steps.len(),
            distance_m = state.distance_m,
            fallback = state.is_fallback,
            "route ready"
        );
        self.state = Some(state);
        true
    }

    /// Fetch and install in one call.  Returns `true` if a request was made
    /// and its result installed.
    pub async fn fetch_route<S: RoutingService + ?Sized>(
        &mut self,
        service:     &S,
        origin:      GeoPoint,
        destination: &Stop,
    ) -> bool {
        let Some(request) = self.begin_fetch(origin, destination) else {
            return false;
        };
        let outcome = service.walking_route(request.origin, destination.position()).await;
        self.complete_fetch(request, outcome)
    }

    /// Forget the route and the destination it was fetched for.
    pub fn clear_route(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.fetched_for = None;
        self.state = None;
    }

    pub fn state(&self) -> Option<&RouteState> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut RouteState> {
        self.state.as_mut()
    }

    pub fn fetched_for(&self) -> Option<&StopId> {
        self.fetched_for.as_ref()
    }

    /// A fetch was issued and has not completed yet.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }
}
