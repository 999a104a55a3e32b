//! The navigation engine: step advance, rebase, and arrival detection.
//!
//! # Per-update order
//!
//! ```text
//! update(pos, now)
//!   ├─ distance to destination ≤ arrival_m        → Arrived (stop here)
//!   ├─ distance ≤ arrival_soon_m, first time      → ArrivingSoon
//!   ├─ current step passed  OR  next step closer  → StepAdvanced
//!   └─ otherwise, rebase interval elapsed         → maybe Rebased
//! ```
//!
//! "Passed" is either coming within `advance_m` of the step, or having come
//! within `pass_min_m` and then receded by `pass_hysteresis_m` for longer
//! than `pass_window_ms`.  The second form catches walkers who cut a corner
//! and never get within `advance_m`.

use tracing::{debug, info};

use hop_core::{Stop, Timestamp};
use hop_route::{nearest_step, RouteState};

use crate::SmoothedPosition;

// ── NavThresholds ─────────────────────────────────────────────────────────────

/// Distances (metres) and windows (milliseconds) that drive the engine.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavThresholds {
    pub advance_m:            f64,
    pub arrival_soon_m:       f64,
    pub arrival_m:            f64,
    pub pass_min_m:           f64,
    pub pass_hysteresis_m:    f64,
    pub pass_window_ms:       u64,
    pub next_closer_margin_m: f64,
    pub rebase_interval_ms:   u64,
    pub rebase_margin_m:      f64,
}

impl Default for NavThresholds {
    fn default() -> Self {
        Self {
            advance_m:            12.0,
            arrival_soon_m:       6.0,
            arrival_m:            3.0,
            pass_min_m:           25.0,
            pass_hysteresis_m:    6.0,
            pass_window_ms:       1_000,
            next_closer_margin_m: 8.0,
            rebase_interval_ms:   4_000,
            rebase_margin_m:      8.0,
        }
    }
}

// ── Phase, session, events ────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavPhase {
    #[default]
    Idle,
    Navigating,
    Arrived,
}

/// Exists from `start` until `stop` or hard arrival.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationSession {
    pub destination:  Stop,
    /// Set once the "arriving soon" event has fired.
    pub arrival_soon: bool,
}

/// What happened during one update.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavEvent {
    /// Step `from` was completed.  `from == to` means the final step was
    /// passed; that is reported once per session.
    StepAdvanced { from: usize, to: usize },
    /// Progress jumped forward over skipped steps.
    Rebased { from: usize, to: usize },
    ArrivingSoon,
    Arrived,
}

// ── StepTracker ───────────────────────────────────────────────────────────────

/// Closest approach to the current step plus the rebase clock.
#[derive(Copy, Clone, Debug)]
struct StepTracker {
    min_dist:         f64,
    min_at:           Timestamp,
    last_rebase:      Option<Timestamp>,
    last_step_passed: bool,
}

impl StepTracker {
    fn cleared() -> Self {
        Self {
            min_dist:         f64::INFINITY,
            min_at:           Timestamp::ZERO,
            last_rebase:      None,
            last_step_passed: false,
        }
    }

    fn reset_min(&mut self, now: Timestamp) {
        self.min_dist = f64::INFINITY;
        self.min_at = now;
    }

    fn observe(&mut self, dist: f64, now: Timestamp) {
        if dist < self.min_dist {
            self.min_dist = dist;
            self.min_at = now;
        }
    }
}

// ── NavigationEngine ──────────────────────────────────────────────────────────

/// Idle → Navigating → Arrived → Idle state machine over a [`RouteState`].
///
/// The engine owns no route; the caller passes the active `RouteState` into
/// every call, and the engine is the only thing that moves its step index.
#[derive(Debug)]
pub struct NavigationEngine {
    thresholds: NavThresholds,
    phase:      NavPhase,
    session:    Option<NavigationSession>,
    tracker:    StepTracker,
}

impl Default for NavigationEngine {
    fn default() -> Self {
        Self::new(NavThresholds::default())
    }
}

impl NavigationEngine {
    pub fn new(thresholds: NavThresholds) -> Self {
        Self {
            thresholds,
            phase: NavPhase::Idle,
            session: None,
            tracker: StepTracker::cleared(),
        }
    }

    /// Begin a session towards `destination`.
    ///
    /// With a known position the route's step index is seeded to the nearest
    /// step (in either direction) and the closest-approach tracker starts
    /// from that distance.  The rebase clock starts unset, so the first
    /// update may rebase.
    pub fn start(
        &mut self,
        destination: Stop,
        position:    Option<&SmoothedPosition>,
        route:       &mut RouteState,
        now:         Timestamp,
    ) {
        self.tracker = StepTracker::cleared();
        self.tracker.min_at = now;

        if let Some(pos) = position
            && let Some((idx, dist)) = nearest_step(&route.steps, pos.position())
        {
            route.seed_step(idx);
            self.tracker.min_dist = dist;
        }

        info!(
            stop = %destination.id,
            step = route.current_step_index(),
            steps = route.steps.len(),
            "navigation started"
        );
        self.session = Some(NavigationSession { destination, arrival_soon: false });
        self.phase = NavPhase::Navigating;
    }

    /// End the session and clear all step tracking.
    pub fn stop(&mut self) {
        if self.phase == NavPhase::Navigating {
            info!("navigation stopped");
        }
        self.phase = NavPhase::Idle;
        self.session = None;
        self.tracker = StepTracker::cleared();
    }

    /// Process one smoothed position.  Ignored unless navigating.
    pub fn update(
        &mut self,
        pos:   &SmoothedPosition,
        now:   Timestamp,
        route: &mut RouteState,
    ) -> Vec<NavEvent> {
        let mut events = Vec::new();
        if self.phase != NavPhase::Navigating {
            return events;
        }
        let Some(session) = self.session.as_mut() else {
            return events;
        };
        let t = &self.thresholds;
        let here = pos.position();

        // ── Arrival ───────────────────────────────────────────────────────
        let to_destination = here.distance_m(session.destination.position());
        if to_destination <= t.arrival_m {
            info!(stop = %session.destination.id, distance_m = to_destination, "arrived");
            self.phase = NavPhase::Arrived;
            self.session = None;
            self.tracker = StepTracker::cleared();
            events.push(NavEvent::Arrived);
            return events;
        }
        if to_destination <= t.arrival_soon_m && !session.arrival_soon {
            session.arrival_soon = true;
            debug!(distance_m = to_destination, "arriving soon");
            events.push(NavEvent::ArrivingSoon);
        }

        // ── Step advance ──────────────────────────────────────────────────
        let idx = route.current_step_index();
        let Some(step) = route.current_step() else {
            return events;
        };
        let dist = here.distance_m(step.location);
        self.tracker.observe(dist, now);

        let passed = dist <= t.advance_m
            || (self.tracker.min_dist <= t.pass_min_m
                && dist > self.tracker.min_dist + t.pass_hysteresis_m
                && now.since(self.tracker.min_at) > t.pass_window_ms);
        let next_closer = route
            .next_step()
            .is_some_and(|next| here.distance_m(next.location) < dist - t.next_closer_margin_m);

        if passed || next_closer {
            if route.is_on_last_step() {
                if !self.tracker.last_step_passed {
                    self.tracker.last_step_passed = true;
                    debug!(step = idx, distance_m = dist, "final step passed");
                    events.push(NavEvent::StepAdvanced { from: idx, to: idx });
                }
            } else if route.advance_to(idx + 1) {
                debug!(from = idx, to = idx + 1, distance_m = dist, passed, next_closer, "step advanced");
                events.push(NavEvent::StepAdvanced { from: idx, to: idx + 1 });
            }
            self.tracker.reset_min(now);
            return events;
        }

        // ── Rebase ────────────────────────────────────────────────────────
        let due = self
            .tracker
            .last_rebase
            .is_none_or(|last| now.since(last) > t.rebase_interval_ms);
        if due {
            let (best_idx, best_dist) = route
                .steps
                .iter()
                .enumerate()
                .skip(idx + 1)
                .fold((idx, dist), |(bi, bd), (i, s)| {
                    let d = here.distance_m(s.location);
                    if d < bd - t.rebase_margin_m { (i, d) } else { (bi, bd) }
                });
            if best_idx != idx && route.advance_to(best_idx) {
                debug!(from = idx, to = best_idx, distance_m = best_dist, "rebased");
                self.tracker.min_dist = best_dist;
                self.tracker.min_at = now;
                events.push(NavEvent::Rebased { from: idx, to: best_idx });
            }
            self.tracker.last_rebase = Some(now);
        }

        events
    }

    #[inline]
    pub fn phase(&self) -> NavPhase {
        self.phase
    }

    #[inline]
    pub fn is_navigating(&self) -> bool {
        self.phase == NavPhase::Navigating
    }

    pub fn session(&self) -> Option<&NavigationSession> {
        self.session.as_ref()
    }

    pub fn thresholds(&self) -> &NavThresholds {
        &self.thresholds
    }
}
