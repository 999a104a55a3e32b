//! The `Navigator`: one owner for every piece of navigation state.
//!
//! Nothing here is async and nothing blocks.  The event loop in
//! [`crate::app`] feeds fixes, commands, and route completions in one at a
//! time; tests can do the same directly.

use tracing::{debug, info, warn};

use hop_camera::{CameraDirective, CameraDirector, CameraSink};
use hop_core::{GeoPoint, Stop, Timestamp};
use hop_nav::{NavEvent, NavPhase, NavigationEngine, PositionFilter, RawFix, SmoothedPosition};
use hop_route::{instruction_text, RouteModel, RouteRequest, RouteResponse, RouteResult, RouteState};
use hop_spatial::{ProximityIndex, SEARCH_LIMIT};
use hop_store::{KeyValueStore, RecentStops};

use crate::{AppError, AppResult, NavObserver, PermissionState};

/// Selection, route, navigation session, and camera for one walker.
///
/// # Type parameters
///
/// - `S: CameraSink`: where camera directives go.
/// - `K: KeyValueStore`: backend for the recents list.
pub struct Navigator<S: CameraSink, K: KeyValueStore> {
    pub(crate) index:         ProximityIndex,
    pub(crate) filter:        PositionFilter,
    pub(crate) route:         RouteModel,
    pub(crate) engine:        NavigationEngine,
    pub(crate) camera:        CameraDirector<S>,
    pub(crate) recents:       RecentStops<K>,
    pub(crate) nearest_count: usize,
    permission:               PermissionState,
    selected:                 Option<Stop>,
    /// Start was requested before the route arrived.
    start_requested:          bool,
    /// Timestamp of the newest fix; the clock for command handling.
    last_fix_at:              Option<Timestamp>,
}

impl<S: CameraSink, K: KeyValueStore> Navigator<S, K> {
    pub(crate) fn from_parts(
        index:         ProximityIndex,
        filter:        PositionFilter,
        route:         RouteModel,
        engine:        NavigationEngine,
        camera:        CameraDirector<S>,
        recents:       RecentStops<K>,
        nearest_count: usize,
    ) -> Self {
        Self {
            index,
            filter,
            route,
            engine,
            camera,
            recents,
            nearest_count,
            permission: PermissionState::Unknown,
            selected: None,
            start_requested: false,
            last_fix_at: None,
        }
    }

    // ── Permission ────────────────────────────────────────────────────────

    pub fn set_permission<O: NavObserver>(&mut self, state: PermissionState, obs: &mut O) {
        self.permission = state;
        obs.on_permission(state);
        if state == PermissionState::Denied {
            self.end_navigation(obs);
        }
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    // ── Selection ─────────────────────────────────────────────────────────

    /// Make `id` the destination.
    ///
    /// Re-selecting the current stop changes nothing.  A different stop ends
    /// any navigation and drops the old route; the new route is requested
    /// through [`take_route_request`](Self::take_route_request).
    pub fn select_stop<O: NavObserver>(&mut self, id: &str, obs: &mut O) -> AppResult<()> {
        let stop = self
            .index
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::UnknownStop(id.to_owned()))?;
        if self.selected.as_ref().is_some_and(|s| s.id == stop.id) {
            debug!(stop = %stop.id, "already selected");
            return Ok(());
        }

        self.end_navigation(obs);
        self.engine.stop();
        self.route.clear_route();
        self.recents.push(stop.clone());
        self.camera.focus_stop(&stop);
        obs.on_selection(Some(&stop));
        self.selected = Some(stop);
        Ok(())
    }

    /// Drop the selection, its route, and any navigation.
    pub fn close<O: NavObserver>(&mut self, obs: &mut O) {
        self.end_navigation(obs);
        self.engine.stop();
        self.route.clear_route();
        if self.selected.take().is_some() {
            obs.on_selection(None);
        }
        if let Some(pos) = self.filter.latest() {
            self.camera.overview(&pos);
        }
    }

    pub fn selected(&self) -> Option<&Stop> {
        self.selected.as_ref()
    }

    // ── Routing ───────────────────────────────────────────────────────────

    /// A route fetch to issue now, if the selection has none and the
    /// position is known.
    pub fn take_route_request(&mut self) -> Option<RouteRequest> {
        let stop = self.selected.as_ref()?;
        if self.route.fetched_for() == Some(&stop.id) {
            return None;
        }
        let origin = self.filter.latest()?.position();
        self.route.begin_fetch(origin, stop)
    }

    /// Install the outcome of a fetch.  Stale completions are ignored.
    pub fn complete_route<O: NavObserver>(
        &mut self,
        request: RouteRequest,
        outcome: RouteResult<RouteResponse>,
        obs:     &mut O,
    ) {
        if !self.route.complete_fetch(request, outcome) {
            return;
        }
        if let (Some(stop), Some(route)) = (self.selected.as_ref(), self.route.state()) {
            self.camera.route_overview(route, stop);
            obs.on_route_ready(route, stop);
        }
        if self.start_requested {
            self.start_requested = false;
            if let Err(e) = self.start_navigation(obs) {
                warn!(error = %e, "deferred navigation start failed");
            }
        }
    }

    pub fn route(&self) -> Option<&RouteState> {
        self.route.state()
    }

    pub fn is_route_loading(&self) -> bool {
        self.route.is_loading()
    }

    // ── Navigation ────────────────────────────────────────────────────────

    /// Start navigating to the selection.
    ///
    /// Returns `Ok(false)` when the route is still loading; navigation then
    /// starts as soon as it arrives.
    pub fn start_navigation<O: NavObserver>(&mut self, obs: &mut O) -> AppResult<bool> {
        if self.permission == PermissionState::Denied {
            return Err(AppError::PermissionDenied);
        }
        let Some(stop) = self.selected.clone() else {
            return Err(AppError::NoSelection);
        };
        if self.engine.is_navigating() {
            return Ok(true);
        }
        let Some(route) = self.route.state_mut() else {
            info!(stop = %stop.id, "navigation will start once the route is ready");
            self.start_requested = true;
            return Ok(false);
        };

        let now = self.last_fix_at.unwrap_or(Timestamp::ZERO);
        let pos = self.filter.latest();
        self.engine.start(stop.clone(), pos.as_ref(), route, now);
        if let Some(p) = pos {
            self.camera.begin_navigation(&p, now);
        }
        obs.on_navigation_started(&stop);
        Ok(true)
    }

    /// Stop navigating and frame the destination again.
    pub fn stop_navigation<O: NavObserver>(&mut self, obs: &mut O) {
        self.end_navigation(obs);
        self.engine.stop();
        if let Some(stop) = &self.selected {
            self.camera.focus_stop(stop);
        }
    }

    /// Start when idle, stop otherwise.  Returns whether navigation is now
    /// active or pending.
    pub fn toggle_navigation<O: NavObserver>(&mut self, obs: &mut O) -> AppResult<bool> {
        if self.engine.is_navigating() || self.start_requested {
            self.stop_navigation(obs);
            Ok(false)
        } else {
            self.start_navigation(obs).map(|_| true)
        }
    }

    pub fn phase(&self) -> NavPhase {
        self.engine.phase()
    }

    /// Sentence for the step the walker is heading to.
    pub fn current_instruction(&self) -> Option<String> {
        let stop = self.selected.as_ref()?;
        let step = self.route.state()?.current_step()?;
        Some(instruction_text(step, &stop.name))
    }

    /// Leave follow mode and drop the pending-start flag.  Notifies only
    /// when a session was active.
    fn end_navigation<O: NavObserver>(&mut self, obs: &mut O) {
        let active = self.engine.is_navigating() || self.start_requested;
        self.start_requested = false;
        self.camera.end_navigation();
        if active {
            self.engine.stop();
            obs.on_navigation_ended();
        }
    }

    // ── Position ──────────────────────────────────────────────────────────

    /// Process one raw fix: smooth it, advance navigation, move the camera.
    pub fn on_fix<O: NavObserver>(&mut self, fix: &RawFix, obs: &mut O) -> Vec<NavEvent> {
        if !(fix.lat.is_finite() && fix.lng.is_finite()) {
            debug!("dropping fix with invalid coordinates");
            return Vec::new();
        }
        let Some(pos) = self.filter.update(fix) else {
            return Vec::new();
        };
        let now = fix.timestamp;
        self.last_fix_at = Some(now);
        obs.on_position(&pos);

        if !self.engine.is_navigating() {
            return Vec::new();
        }
        let Some(route) = self.route.state_mut() else {
            return Vec::new();
        };
        let events = self.engine.update(&pos, now, route);
        for &event in &events {
            obs.on_event(event, route);
        }

        if self.engine.is_navigating() {
            if self.camera.is_following() {
                self.camera.follow(&pos, now);
            } else {
                self.camera.begin_navigation(&pos, now);
            }
        } else if events.contains(&NavEvent::Arrived) {
            self.camera.end_navigation();
            obs.on_navigation_ended();
        }
        events
    }

    pub fn position(&self) -> Option<SmoothedPosition> {
        self.filter.latest()
    }

    // ── Stops ─────────────────────────────────────────────────────────────

    /// The default "nearest stops" list.  Empty until the position is known.
    pub fn nearest_stops(&self) -> Vec<(&Stop, f64)> {
        match self.filter.latest() {
            Some(pos) => self.index.nearest(pos.position(), self.nearest_count),
            None => Vec::new(),
        }
    }

    pub fn viewport_stops(&self, center: GeoPoint, zoom: f64) -> Vec<&Stop> {
        self.index.within_viewport(center, zoom, self.selected.as_ref().map(|s| &s.id))
    }

    pub fn search(&self, query: &str) -> Vec<&Stop> {
        self.index.search(query, self.filter.latest().map(|p| p.position()), SEARCH_LIMIT)
    }

    pub fn recents(&self) -> &[Stop] {
        self.recents.items()
    }

    pub fn stops(&self) -> &ProximityIndex {
        &self.index
    }

    // ── Camera ────────────────────────────────────────────────────────────

    pub fn recenter(&mut self) -> Option<CameraDirective> {
        let pos = self.filter.latest()?;
        Some(self.camera.recenter(&pos))
    }

    pub fn overview(&mut self) -> Option<CameraDirective> {
        let pos = self.filter.latest()?;
        Some(self.camera.overview(&pos))
    }

    pub fn camera(&self) -> &CameraDirector<S> {
        &self.camera
    }
}
