//! Observer trait for UI updates and diagnostics.

use tracing::info;

use hop_core::Stop;
use hop_nav::{NavEvent, SmoothedPosition};
use hop_route::{instruction_text, RouteState};

use crate::PermissionState;

/// Callbacks invoked by the [`Navigator`][crate::Navigator] as state
/// changes.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait NavObserver {
    fn on_permission(&mut self, _state: PermissionState) {}

    /// Called for every accepted fix with the new smoothed estimate.
    fn on_position(&mut self, _pos: &SmoothedPosition) {}

    fn on_selection(&mut self, _stop: Option<&Stop>) {}

    /// A route (possibly the straight-line fallback) was installed.
    fn on_route_ready(&mut self, _route: &RouteState, _destination: &Stop) {}

    fn on_navigation_started(&mut self, _destination: &Stop) {}

    /// A navigation event fired.  `route` reflects the step index after it.
    fn on_event(&mut self, _event: NavEvent, _route: &RouteState) {}

    /// Navigation ended by stop, close, or arrival.
    fn on_navigation_ended(&mut self) {}
}

/// A [`NavObserver`] that does nothing.
pub struct NoopObserver;

impl NavObserver for NoopObserver {}

/// Logs state changes at `info`.
#[derive(Default)]
pub struct LogObserver {
    destination: Option<String>,
}

impl NavObserver for LogObserver {
    fn on_permission(&mut self, state: PermissionState) {
        info!(?state, "location permission");
    }

    fn on_selection(&mut self, stop: Option<&Stop>) {
        self.destination = stop.map(|s| s.name.clone());
        match stop {
            Some(s) => info!(stop = %s, "selected"),
            None => info!("selection cleared"),
        }
    }

    fn on_route_ready(&mut self, route: &RouteState, destination: &Stop) {
        info!(
            to = %destination.name,
            summary = %route.summary(),
            steps = route.steps.len(),
            fallback = route.is_fallback,
            "route"
        );
    }

    fn on_navigation_started(&mut self, destination: &Stop) {
        info!(to = %destination.name, "navigating");
    }

    fn on_event(&mut self, event: NavEvent, route: &RouteState) {
        let name = self.destination.as_deref().unwrap_or("your stop");
        match event {
            NavEvent::StepAdvanced { from, to } | NavEvent::Rebased { from, to } => {
                let next = route.current_step().map(|s| instruction_text(s, name));
                info!(from, to, next = next.as_deref().unwrap_or(""), "step");
            }
            NavEvent::ArrivingSoon => info!("arriving soon"),
            NavEvent::Arrived => info!(at = name, "arrived"),
        }
    }

    fn on_navigation_ended(&mut self) {
        info!("navigation ended");
    }
}
