//! Integration tests for hop-app.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use hop_camera::CameraDirective;
use hop_core::geo::EARTH_RADIUS_M;
use hop_core::{GeoPoint, Stop, StopId, Timestamp};
use hop_nav::{NavEvent, NavPhase, RawFix, SmoothedPosition};
use hop_route::{Maneuver, RouteError, RouteResponse, RouteResult, RouteState, RoutingService, Step};
use hop_spatial::ProximityIndex;
use hop_store::{KeyValueStore, MemoryStore};

use crate::{AppConfig, AppError, NavObserver, Navigator, NavigatorBuilder, PermissionState};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn north(m: f64) -> GeoPoint {
    GeoPoint::new((m / EARTH_RADIUS_M).to_degrees(), 0.0)
}

/// Ten stops every 50 m along the meridian: `S0` at 0 m … `S9` at 450 m.
fn line_of_stops() -> ProximityIndex {
    let stops = (0..10)
        .map(|i| {
            let p = north(i as f64 * 50.0);
            Stop::new(format!("S{i}"), format!("Stage {i}"), p.lat, p.lng)
        })
        .collect();
    ProximityIndex::new(stops)
}

type TestNavigator = Navigator<Vec<CameraDirective>, MemoryStore>;

fn navigator() -> TestNavigator {
    NavigatorBuilder::new(line_of_stops(), Vec::new(), MemoryStore::new())
        .build()
        .unwrap()
}

fn fix(p: GeoPoint, t_ms: u64) -> RawFix {
    RawFix::at(p, Timestamp::from_millis(t_ms))
}

/// Depart at 0 m, turn at 100 m, arrive at `destination`.
fn three_steps(destination: GeoPoint) -> RouteResponse {
    let points = [north(0.0), north(100.0), destination];
    RouteResponse {
        distance_m: Some(200.0),
        duration_s: Some(150.0),
        geometry:   points.to_vec(),
        steps:      vec![
            Step::new(points[0], Maneuver::Depart, 100.0, 75.0),
            Step::new(points[1], Maneuver::Turn(None), 100.0, 75.0),
            Step::new(points[2], Maneuver::Arrive(None), 0.0, 0.0),
        ],
    }
}

/// Walk from 10 m to 200 m at 10 m/s of fixes, then stand still at 200 m
/// long enough for the smoothed position to settle.
fn walk_fixes(start_ms: u64) -> Vec<RawFix> {
    let mut fixes: Vec<RawFix> = (1..=20)
        .map(|i| fix(north(i as f64 * 10.0), start_ms + i * 1_000))
        .collect();
    fixes.extend((21..=40).map(|i| fix(north(200.0), start_ms + i * 1_000)));
    fixes
}

struct StraightService;

#[async_trait]
impl RoutingService for StraightService {
    async fn walking_route(
        &self,
        _origin:     GeoPoint,
        destination: GeoPoint,
    ) -> RouteResult<RouteResponse> {
        Ok(three_steps(destination))
    }
}

#[derive(Default)]
struct Recorder {
    permissions: Vec<PermissionState>,
    selections:  Vec<Option<StopId>>,
    positions:   usize,
    routes:      usize,
    started:     usize,
    ended:       usize,
    events:      Vec<NavEvent>,
}

impl NavObserver for Recorder {
    fn on_permission(&mut self, state: PermissionState) {
        self.permissions.push(state);
    }

    fn on_position(&mut self, _pos: &SmoothedPosition) {
        self.positions += 1;
    }

    fn on_selection(&mut self, stop: Option<&Stop>) {
        self.selections.push(stop.map(|s| s.id.clone()));
    }

    fn on_route_ready(&mut self, _route: &RouteState, _destination: &Stop) {
        self.routes += 1;
    }

    fn on_navigation_started(&mut self, _destination: &Stop) {
        self.started += 1;
    }

    fn on_event(&mut self, event: NavEvent, _route: &RouteState) {
        self.events.push(event);
    }

    fn on_navigation_ended(&mut self) {
        self.ended += 1;
    }
}

impl Recorder {
    fn count(&self, event: NavEvent) -> usize {
        self.events.iter().filter(|&&e| e == event).count()
    }
}

/// Select `id`, learn the position, and install the canned route.
fn routed_to(nav: &mut TestNavigator, obs: &mut Recorder, id: &str) {
    nav.select_stop(id, obs).unwrap();
    nav.on_fix(&fix(north(0.0), 0), obs);
    let request = nav.take_route_request().unwrap();
    let destination = request.destination.position();
    nav.complete_route(request, Ok(three_steps(destination)), obs);
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use super::*;

    #[test]
    fn empty_json_is_all_defaults() {
        let config = AppConfig::from_json_str("{}").unwrap();
        assert_eq!(config.nearest_count, 5);
        assert_eq!(config.walking_speed_mps, 1.35);
        assert_eq!(config.filter.location_alpha, 0.25);
        assert_eq!(config.navigation.arrival_m, 3.0);
        assert_eq!(config.camera.throttle_ms, 320);
        assert!(config.stops_csv.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let json = r#"{
            "camera": { "rotate_with_heading": true },
            "navigation": { "advance_m": 15.0 },
            "stops_csv": "data/stops.txt"
        }"#;
        let config = AppConfig::from_json_str(json).unwrap();
        assert!(config.camera.rotate_with_heading);
        assert_eq!(config.camera.min_move_m, 3.5);
        assert_eq!(config.navigation.advance_m, 15.0);
        assert_eq!(config.navigation.arrival_soon_m, 6.0);
        assert_eq!(config.stops_csv.as_deref(), Some(std::path::Path::new("data/stops.txt")));
    }

    #[test]
    fn out_of_range_alpha_is_rejected() {
        let err = AppConfig::from_json_str(r#"{"filter": {"speed_alpha": 0.0}}"#).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("speed_alpha")));
    }

    #[test]
    fn arrival_radius_larger_than_soft_radius_is_rejected() {
        let json = r#"{"navigation": {"arrival_m": 10.0, "arrival_soon_m": 6.0}}"#;
        assert!(matches!(AppConfig::from_json_str(json), Err(AppError::Config(_))));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(AppConfig::from_json_str("{"), Err(AppError::Json(_))));
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hop.json");
        std::fs::write(&path, r#"{"nearest_count": 3}"#).unwrap();
        assert_eq!(AppConfig::from_json_file(&path).unwrap().nearest_count, 3);
    }
}

// ── NavigatorBuilder ──────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let nav = navigator();
        assert_eq!(nav.stops().len(), 10);
        assert_eq!(nav.phase(), NavPhase::Idle);
        assert_eq!(nav.permission(), PermissionState::Unknown);
        assert!(nav.recents().is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = AppConfig::default();
        config.filter.location_alpha = 1.5;
        let result = NavigatorBuilder::new(line_of_stops(), Vec::new(), MemoryStore::new())
            .config(config)
            .build();
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn empty_stop_set_is_rejected() {
        let result = NavigatorBuilder::new(ProximityIndex::new(Vec::new()), Vec::new(), MemoryStore::new())
            .build();
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn recents_are_loaded_from_the_store() {
        let mut store = MemoryStore::new();
        let mut obs = Recorder::default();
        {
            let mut nav = NavigatorBuilder::new(line_of_stops(), Vec::new(), store.clone())
                .build()
                .unwrap();
            nav.select_stop("S3", &mut obs).unwrap();
            nav.select_stop("S7", &mut obs).unwrap();
            // The clone shares nothing; copy the persisted value across.
            let saved = nav.recents.store().get(hop_store::RECENTS_KEY).unwrap().unwrap();
            store.set(hop_store::RECENTS_KEY, &saved).unwrap();
        }

        let nav = NavigatorBuilder::new(line_of_stops(), Vec::new(), store).build().unwrap();
        let ids: Vec<&str> = nav.recents().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["S7", "S3"]);
    }
}

// ── Selection and routing ─────────────────────────────────────────────────────

#[cfg(test)]
mod selection {
    use super::*;

    #[test]
    fn unknown_stop_is_an_error() {
        let mut nav = navigator();
        let err = nav.select_stop("nope", &mut Recorder::default()).unwrap_err();
        assert!(matches!(err, AppError::UnknownStop(id) if id == "nope"));
        assert!(nav.selected().is_none());
    }

    #[test]
    fn select_focuses_camera_and_records_recent() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        nav.select_stop("S2", &mut obs).unwrap();

        assert_eq!(nav.selected().map(|s| s.id.as_str()), Some("S2"));
        assert_eq!(nav.recents()[0].id.as_str(), "S2");
        assert_eq!(obs.selections, vec![Some(StopId::new("S2"))]);

        let last = nav.camera().sink().last().unwrap();
        assert_eq!(last.zoom, 17.2);
        assert!(last.center.distance_m(north(100.0)) < 0.01);
    }

    #[test]
    fn reselecting_same_stop_changes_nothing() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        nav.select_stop("S2", &mut obs).unwrap();
        let directives = nav.camera().sink().len();
        nav.select_stop("S2", &mut obs).unwrap();

        assert_eq!(nav.camera().sink().len(), directives);
        assert_eq!(obs.selections.len(), 1);
        assert_eq!(nav.recents().len(), 1);
    }

    #[test]
    fn route_is_requested_once_position_is_known() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        nav.select_stop("S4", &mut obs).unwrap();
        assert!(nav.take_route_request().is_none());

        nav.on_fix(&fix(north(0.0), 0), &mut obs);
        let request = nav.take_route_request().unwrap();
        assert_eq!(request.destination.id.as_str(), "S4");
        assert!(nav.is_route_loading());
        assert!(nav.take_route_request().is_none());
    }

    #[test]
    fn failed_fetch_installs_straight_line() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        nav.select_stop("S4", &mut obs).unwrap();
        nav.on_fix(&fix(north(0.0), 0), &mut obs);
        let request = nav.take_route_request().unwrap();
        nav.complete_route(request, Err(RouteError::Status { status: 503 }), &mut obs);

        let route = nav.route().unwrap();
        assert!(route.is_fallback);
        assert_eq!(route.steps.len(), 1);
        assert_eq!(obs.routes, 1);
        assert!(!nav.is_route_loading());
    }

    #[test]
    fn stale_route_is_discarded() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        nav.select_stop("S4", &mut obs).unwrap();
        nav.on_fix(&fix(north(0.0), 0), &mut obs);
        let old = nav.take_route_request().unwrap();

        nav.select_stop("S6", &mut obs).unwrap();
        let new = nav.take_route_request().unwrap();

        nav.complete_route(old, Ok(three_steps(north(200.0))), &mut obs);
        assert!(nav.route().is_none());
        assert_eq!(obs.routes, 0);

        nav.complete_route(new, Ok(three_steps(north(300.0))), &mut obs);
        assert!(nav.route().is_some());
        assert_eq!(obs.routes, 1);
    }

    #[test]
    fn route_for_earlier_selection_of_same_stop_is_discarded() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        nav.select_stop("S4", &mut obs).unwrap();
        nav.on_fix(&fix(north(0.0), 0), &mut obs);
        let first = nav.take_route_request().unwrap();
        nav.select_stop("S6", &mut obs).unwrap();
        let detour = nav.take_route_request().unwrap();
        nav.select_stop("S4", &mut obs).unwrap();
        let current = nav.take_route_request().unwrap();

        nav.complete_route(first.clone(), Ok(three_steps(north(200.0))), &mut obs);
        assert!(nav.route().is_none());
        assert!(nav.is_route_loading());
        assert_eq!(obs.routes, 0);

        nav.complete_route(current.clone(), Ok(three_steps(north(200.0))), &mut obs);
        assert_eq!(obs.routes, 1);
        assert!(nav.start_navigation(&mut obs).unwrap());
        for i in 1..=12 {
            nav.on_fix(&fix(north(i as f64 * 10.0), i * 1_000), &mut obs);
        }
        let step = nav.route().unwrap().current_step_index();

        // Late or repeated completions must not reset progress mid-session.
        nav.complete_route(first, Ok(three_steps(north(200.0))), &mut obs);
        nav.complete_route(detour, Ok(three_steps(north(300.0))), &mut obs);
        nav.complete_route(current, Ok(three_steps(north(200.0))), &mut obs);
        assert_eq!(nav.route().unwrap().current_step_index(), step);
        assert_eq!(obs.routes, 1);
        assert_eq!(obs.started, 1);
        assert_eq!(nav.phase(), NavPhase::Navigating);
    }

    #[test]
    fn route_ready_frames_the_route() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        routed_to(&mut nav, &mut obs, "S4");
        let last = nav.camera().sink().last().unwrap();
        assert_eq!(last.animation_ms, 600);
        assert_eq!(last.zoom, 16.8);
        assert!(last.center.distance_m(north(100.0)) < 0.5);
    }

    #[test]
    fn close_clears_selection_and_route() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        routed_to(&mut nav, &mut obs, "S4");
        nav.close(&mut obs);

        assert!(nav.selected().is_none());
        assert!(nav.route().is_none());
        assert_eq!(obs.selections.last(), Some(&None));
        assert_eq!(nav.camera().sink().last().unwrap().pitch, 0.0);
    }

    #[test]
    fn nearest_and_search_use_position() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        assert!(nav.nearest_stops().is_empty());

        nav.on_fix(&fix(north(120.0), 0), &mut obs);
        let ids: Vec<&str> = nav.nearest_stops().iter().map(|(s, _)| s.id.as_str()).collect();
        assert_eq!(ids, ["S2", "S3", "S1", "S4", "S0"]);

        let hits = nav.search("stage");
        assert_eq!(hits.len(), 10);
        assert_eq!(hits[0].id.as_str(), "S2");
    }

    #[test]
    fn viewport_always_includes_selection() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        nav.select_stop("S9", &mut obs).unwrap();
        let visible = nav.viewport_stops(north(0.0), 17.5);
        assert!(visible.iter().any(|s| s.id.as_str() == "S9"));
        assert!(visible.iter().any(|s| s.id.as_str() == "S0"));
    }
}

// ── Navigation ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod navigation {
    use super::*;

    #[test]
    fn start_requires_selection() {
        let mut nav = navigator();
        let err = nav.start_navigation(&mut Recorder::default()).unwrap_err();
        assert!(matches!(err, AppError::NoSelection));
    }

    #[test]
    fn start_refused_when_permission_denied() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        nav.select_stop("S4", &mut obs).unwrap();
        nav.set_permission(PermissionState::Denied, &mut obs);

        let err = nav.start_navigation(&mut obs).unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));
        assert_eq!(obs.permissions, vec![PermissionState::Denied]);
        assert_eq!(nav.phase(), NavPhase::Idle);
    }

    #[test]
    fn start_waits_for_route() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        nav.select_stop("S4", &mut obs).unwrap();
        assert!(!nav.start_navigation(&mut obs).unwrap());
        assert_eq!(nav.phase(), NavPhase::Idle);

        nav.on_fix(&fix(north(0.0), 0), &mut obs);
        let request = nav.take_route_request().unwrap();
        nav.complete_route(request, Ok(three_steps(north(200.0))), &mut obs);

        assert_eq!(nav.phase(), NavPhase::Navigating);
        assert_eq!(obs.started, 1);
        assert!(nav.camera().is_following());
    }

    #[test]
    fn walk_reaches_destination() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        routed_to(&mut nav, &mut obs, "S4");
        assert!(nav.start_navigation(&mut obs).unwrap());
        assert!(nav.current_instruction().unwrap().starts_with("Head"));

        for f in walk_fixes(0) {
            nav.on_fix(&f, &mut obs);
        }

        assert_eq!(nav.phase(), NavPhase::Arrived);
        assert!(obs.events.iter().any(|e| matches!(e, NavEvent::StepAdvanced { .. })));
        assert_eq!(obs.count(NavEvent::ArrivingSoon), 1);
        assert_eq!(obs.count(NavEvent::Arrived), 1);
        assert_eq!(obs.ended, 1);
        assert!(!nav.camera().is_following());
    }

    #[test]
    fn toggle_starts_then_stops() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        routed_to(&mut nav, &mut obs, "S4");

        assert!(nav.toggle_navigation(&mut obs).unwrap());
        assert_eq!(nav.phase(), NavPhase::Navigating);
        assert!(!nav.toggle_navigation(&mut obs).unwrap());
        assert_eq!(nav.phase(), NavPhase::Idle);
        assert_eq!(obs.ended, 1);
        // Stopping frames the destination again.
        assert_eq!(nav.camera().sink().last().unwrap().zoom, 17.2);
    }

    #[test]
    fn selecting_another_stop_ends_navigation() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        routed_to(&mut nav, &mut obs, "S4");
        nav.start_navigation(&mut obs).unwrap();

        nav.select_stop("S1", &mut obs).unwrap();
        assert_eq!(nav.phase(), NavPhase::Idle);
        assert_eq!(obs.ended, 1);
        assert!(nav.route().is_none());
    }

    #[test]
    fn invalid_fix_is_ignored() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        nav.on_fix(&fix(north(50.0), 0), &mut obs);
        let before = nav.position().unwrap();

        let events = nav.on_fix(&RawFix::at(GeoPoint::new(f64::NAN, 0.0), Timestamp::from_millis(1_000)), &mut obs);
        assert!(events.is_empty());
        assert_eq!(nav.position().unwrap(), before);
        assert_eq!(obs.positions, 1);
    }

    #[test]
    fn recenter_needs_position() {
        let mut nav = navigator();
        assert!(nav.recenter().is_none());
        nav.on_fix(&fix(north(0.0), 0), &mut Recorder::default());
        let directive = nav.recenter().unwrap();
        assert_eq!(directive.zoom, 16.0);
        assert_eq!(nav.overview().unwrap().zoom, 15.5);
    }
}

// ── Event loop ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod event_loop {
    use super::*;
    use crate::{run, ChannelSource, Command, ReplaySource};

    fn routing() -> Arc<dyn RoutingService> {
        Arc::new(StraightService)
    }

    #[tokio::test]
    async fn select_start_and_walk_to_arrival() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        let (mut source, fix_tx) = ChannelSource::new();
        let (cmd_tx, cmd_rx) = mpsc::channel(8);

        let driver = async move {
            cmd_tx.send(Command::SelectStop(StopId::new("S4"))).await.unwrap();
            cmd_tx.send(Command::StartNavigation).await.unwrap();
            fix_tx.send(fix(north(0.0), 0)).await.unwrap();
            // Let the spawned fetch finish.
            tokio::time::sleep(Duration::from_millis(50)).await;
            for f in walk_fixes(0) {
                fix_tx.send(f).await.unwrap();
            }
        };

        let (result, ()) = tokio::join!(
            run(&mut nav, routing(), &mut source, cmd_rx, &mut obs),
            driver,
        );
        result.unwrap();

        assert_eq!(obs.permissions, vec![PermissionState::Granted]);
        assert_eq!(obs.routes, 1);
        assert_eq!(obs.started, 1);
        assert_eq!(obs.count(NavEvent::Arrived), 1);
        assert_eq!(nav.phase(), NavPhase::Arrived);
        assert_eq!(nav.recents()[0].id.as_str(), "S4");
    }

    #[tokio::test]
    async fn denied_permission_still_serves_commands() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        let mut source = ChannelSource::denied();
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        cmd_tx.send(Command::SelectStop(StopId::new("S1"))).await.unwrap();
        cmd_tx.send(Command::StartNavigation).await.unwrap();
        drop(cmd_tx);

        run(&mut nav, routing(), &mut source, cmd_rx, &mut obs).await.unwrap();

        assert_eq!(nav.permission(), PermissionState::Denied);
        assert_eq!(obs.permissions, vec![PermissionState::Denied]);
        assert_eq!(nav.selected().map(|s| s.id.as_str()), Some("S1"));
        assert_eq!(nav.phase(), NavPhase::Idle);
        assert_eq!(obs.started, 0);
    }

    #[tokio::test]
    async fn shutdown_ends_the_loop() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        let (mut source, _fix_tx) = ChannelSource::new();
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        cmd_tx.send(Command::Overview).await.unwrap();
        cmd_tx.send(Command::Shutdown).await.unwrap();

        run(&mut nav, routing(), &mut source, cmd_rx, &mut obs).await.unwrap();
        assert_eq!(obs.permissions, vec![PermissionState::Granted]);
    }

    #[tokio::test]
    async fn rejected_command_does_not_stop_the_loop() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        let mut source = ChannelSource::denied();
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        cmd_tx.send(Command::SelectStop(StopId::new("missing"))).await.unwrap();
        cmd_tx.send(Command::SelectStop(StopId::new("S2"))).await.unwrap();
        drop(cmd_tx);

        run(&mut nav, routing(), &mut source, cmd_rx, &mut obs).await.unwrap();
        assert_eq!(nav.selected().map(|s| s.id.as_str()), Some("S2"));
    }

    #[tokio::test]
    async fn replay_source_feeds_every_fix() {
        let mut nav = navigator();
        let mut obs = Recorder::default();
        let fixes = walk_fixes(0);
        let count = fixes.len();
        let mut source = ReplaySource::new(fixes);
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>(1);
        drop(cmd_tx);

        run(&mut nav, routing(), &mut source, cmd_rx, &mut obs).await.unwrap();

        assert_eq!(obs.positions, count);
        assert!(nav.position().unwrap().position().distance_m(north(200.0)) < 1.0);
    }
}
