//! Unit tests for hop-camera.

use hop_core::geo::EARTH_RADIUS_M;
use hop_core::{GeoPoint, Stop, Timestamp};
use hop_nav::SmoothedPosition;

use crate::{CameraConfig, CameraDirective, CameraDirector};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn north(m: f64) -> GeoPoint {
    GeoPoint::new((m / EARTH_RADIUS_M).to_degrees(), 0.0)
}

fn pos(m: f64, heading: f64, speed: f64) -> SmoothedPosition {
    let p = north(m);
    SmoothedPosition { lat: p.lat, lng: p.lng, heading, speed }
}

fn ms(t: u64) -> Timestamp {
    Timestamp::from_millis(t)
}

fn director() -> CameraDirector<Vec<CameraDirective>> {
    CameraDirector::new(CameraConfig::default(), Vec::new())
}

fn navigating() -> CameraDirector<Vec<CameraDirective>> {
    let mut d = director();
    d.begin_navigation(&pos(0.0, 0.0, 0.0), ms(0));
    d
}

// ── Follow mode ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod follow {
    use super::*;

    #[test]
    fn begin_sends_immediately_at_base_zoom() {
        let mut d = director();
        let first = d.begin_navigation(&pos(0.0, 90.0, 2.0), ms(0));
        assert_eq!(first.zoom, 18.0);
        assert_eq!(first.pitch, 45.0);
        assert_eq!(first.animation_ms, 250);
        assert_eq!(first.bearing, None);
        assert_eq!(d.sink().len(), 1);
        assert!(d.is_following());
    }

    #[test]
    fn ignored_outside_navigation() {
        let mut d = director();
        assert!(d.follow(&pos(50.0, 0.0, 1.0), ms(5_000)).is_none());
        assert!(d.sink().is_empty());
    }

    #[test]
    fn throttled_within_interval() {
        let mut d = navigating();
        assert!(d.follow(&pos(10.0, 0.0, 1.0), ms(319)).is_none());
        let sent = d.follow(&pos(10.0, 0.0, 1.0), ms(320)).unwrap();
        assert_eq!(sent.animation_ms, 300);
        assert_eq!(sent.pitch, 45.0);
        assert_eq!(d.sink().len(), 2);
    }

    #[test]
    fn small_moves_are_dropped() {
        let mut d = navigating();
        assert!(d.follow(&pos(3.0, 0.0, 1.0), ms(1_000)).is_none());
        assert!(d.follow(&pos(3.6, 0.0, 1.0), ms(2_000)).is_some());
        // Measured from the last applied center, not the last offered one.
        assert!(d.follow(&pos(5.0, 0.0, 1.0), ms(3_000)).is_none());
        assert!(d.follow(&pos(7.2, 0.0, 1.0), ms(4_000)).is_some());
    }

    #[test]
    fn heading_change_alone_triggers() {
        let mut d = navigating();
        assert!(d.follow(&pos(0.0, 9.0, 0.0), ms(1_000)).is_none());
        assert!(d.follow(&pos(0.0, 350.0, 0.0), ms(2_000)).is_some());
        // NaN heading keeps the last bearing: no turn, no move.
        assert!(d.follow(&pos(0.0, f64::NAN, 0.0), ms(3_000)).is_none());
    }

    #[test]
    fn bearing_only_when_rotating() {
        let config = CameraConfig { rotate_with_heading: true, ..CameraConfig::default() };
        let mut d = CameraDirector::new(config, Vec::new());
        d.begin_navigation(&pos(0.0, 30.0, 0.0), ms(0));
        let sent = d.follow(&pos(10.0, 45.0, 0.0), ms(1_000)).unwrap();
        assert_eq!(sent.bearing, Some(45.0));
    }

    #[test]
    fn zoom_tracks_speed_but_never_backs_out() {
        let mut d = navigating();
        let fast = d.follow(&pos(10.0, 0.0, 5.0), ms(1_000)).unwrap();
        assert!((fast.zoom - 18.15).abs() < 1e-12);
        let slow = d.follow(&pos(20.0, 0.0, 0.0), ms(2_000)).unwrap();
        assert!((slow.zoom - 18.15).abs() < 1e-12);
    }

    #[test]
    fn end_then_begin_resets_floor() {
        let mut d = navigating();
        d.follow(&pos(10.0, 0.0, 2.0), ms(1_000));
        d.end_navigation();
        assert!(!d.is_following());
        let again = d.begin_navigation(&pos(10.0, 0.0, 0.0), ms(2_000));
        assert_eq!(again.zoom, 18.0);
    }

    #[test]
    fn target_zoom_scale() {
        let c = CameraConfig::default();
        assert_eq!(c.target_zoom(0.0), 18.0);
        assert!((c.target_zoom(1.0) - 18.075).abs() < 1e-12);
        assert!((c.target_zoom(-3.0) - 18.0).abs() < 1e-12);
        assert!((c.target_zoom(f64::NAN) - 18.0).abs() < 1e-12);
    }
}

// ── Zoom floor property ───────────────────────────────────────────────────────

#[cfg(test)]
mod zoom_props {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn applied_zoom_never_decreases(
            walk in prop::collection::vec((0.0f64..20.0, 0.0f64..360.0, -1.0f64..4.0, 0u64..1_500), 1..80)
        ) {
            let mut d = navigating();
            let (mut along, mut now) = (0.0, 0u64);
            for (step, heading, speed, dt) in walk {
                along += step;
                now += dt;
                d.follow(&pos(along, heading, speed), ms(now));
            }
            let zooms: Vec<f64> = d.sink().iter().map(|c| c.zoom).collect();
            prop_assert!(zooms.windows(2).all(|w| w[1] >= w[0]));
            prop_assert!(zooms.iter().all(|z| (18.0..=18.15 + 1e-12).contains(z)));
        }
    }
}

// ── Presets ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod presets {
    use super::*;
    use crate::Padding;
    use hop_route::{RouteState, WALKING_SPEED_MPS};

    #[test]
    fn recenter_and_overview() {
        let mut d = director();
        let r = d.recenter(&pos(0.0, 123.0, 0.0));
        assert_eq!((r.zoom, r.pitch, r.bearing, r.animation_ms), (16.0, 30.0, Some(123.0), 450));
        let o = d.overview(&pos(0.0, 123.0, 0.0));
        assert_eq!((o.zoom, o.pitch, o.bearing, o.animation_ms), (15.5, 0.0, None, 450));
        assert_eq!(d.sink().len(), 2);
    }

    #[test]
    fn focus_stop_pads_for_sheet() {
        let mut d = director();
        let stop = Stop::new("S1", "Stage", -1.28, 36.82);
        let f = d.focus_stop(&stop);
        assert_eq!(f.center, stop.position());
        assert_eq!(f.zoom, 17.2);
        assert_eq!(f.animation_ms, 500);
        assert_eq!(f.padding, Some(Padding::new(40.0, 40.0, 200.0, 40.0)));
    }

    #[test]
    fn route_overview_centers_on_bounds() {
        let mut d = director();
        let dest = Stop::new("S2", "Far", north(200.0).lat, 0.0);
        let mut route = RouteState::fallback(north(0.0), &dest, WALKING_SPEED_MPS);
        route.is_fallback = false;
        route.polyline = vec![north(0.0), GeoPoint::new(north(100.0).lat, 0.002), north(200.0)];

        let c = d.route_overview(&route, &dest);
        assert_eq!(c.zoom, 16.8);
        assert_eq!(c.animation_ms, 600);
        assert!((c.center.lat - north(100.0).lat).abs() < 1e-12);
        assert!((c.center.lng - 0.001).abs() < 1e-12);
    }

    #[test]
    fn fallback_route_centers_on_destination() {
        let mut d = director();
        let dest = Stop::new("S2", "Far", 0.01, 0.01);
        let route = RouteState::fallback(GeoPoint::new(0.0, 0.0), &dest, WALKING_SPEED_MPS);
        let c = d.route_overview(&route, &dest);
        assert_eq!(c.center, dest.position());
        assert_eq!(c.zoom, 17.2);
    }
}
