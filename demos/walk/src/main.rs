//! walk: replay a synthetic walk to a bus stop through the full navigator.
//!
//! Ten stops around Nairobi's CBD, a walker starting outside Times Tower,
//! and an L-shaped route north then east to Hilton.  Fixes carry seeded
//! jitter so the filter and the step tracker have something to do.
//!
//! ```text
//! cargo run -p walk                     # canned route, in-memory recents
//! cargo run -p walk -- hop.json         # config file (stops_csv, state_dir, …)
//! MAPBOX_ACCESS_TOKEN=pk.… cargo run -p walk   # live walking directions
//! ```

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tracing::info;

use hop_app::{logging, run, AppConfig, Command, LogObserver, NavigatorBuilder, ReplaySource};
use hop_camera::LogSink;
use hop_core::geo::{normalize_bearing, path_length_m, EARTH_RADIUS_M};
use hop_core::{GeoPoint, StopId, Timestamp};
use hop_nav::RawFix;
use hop_route::{
    DirectionsClient, Maneuver, Modifier, RouteResponse, RouteResult, RoutingService, Step,
    WALKING_SPEED_MPS,
};
use hop_spatial::{load_stops_csv, load_stops_reader, ProximityIndex};
use hop_store::{FileStore, KeyValueStore, MemoryStore};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:            u64   = 7;
const DESTINATION:     &str  = "0120HLT";
const START:           GeoPoint = GeoPoint { lat: -1.2921, lng: 36.8219 };
const WALK_SPEED_MPS:  f64   = 1.4;
const FIX_INTERVAL_MS: u64   = 1_000;
const JITTER_M:        f64   = 1.5;
const JITTER_DEG:      f64   = 6.0;
/// Fixes repeated at the stop so the smoothed position settles.
const DWELL_FIXES:     u64   = 20;
/// Wall-clock pause between replayed fixes.
const REPLAY_PACE:     Duration = Duration::from_millis(20);

const STOPS_CSV: &str = "\
stop_id,stop_name,stop_lat,stop_lon\n\
0110KNC,Kencom,-1.2850,36.8250\n\
0120HLT,Hilton,-1.2865,36.8225\n\
0130ARC,Archives,-1.2840,36.8268\n\
0140GPO,GPO,-1.2875,36.8200\n\
0150RLY,Railways,-1.2905,36.8260\n\
0160BUS,Bus Station,-1.2880,36.8285\n\
0170UHR,Uhuru Highway,-1.2930,36.8175\n\
0180NYY,Nyayo House,-1.2890,36.8215\n\
0190TMS,Times Tower,-1.2912,36.8230\n\
0200CTH,City Hall,-1.2870,36.8240\n\
";

// ── Canned routing ────────────────────────────────────────────────────────────

/// North along the start meridian, then east to the destination.
fn corner_for(destination: GeoPoint) -> GeoPoint {
    GeoPoint::new(destination.lat, START.lng)
}

struct LShapedRoute;

#[async_trait]
impl RoutingService for LShapedRoute {
    async fn walking_route(
        &self,
        origin:      GeoPoint,
        destination: GeoPoint,
    ) -> RouteResult<RouteResponse> {
        let corner = corner_for(destination);
        let geometry = vec![origin, corner, destination];
        let first = origin.distance_m(corner);
        let second = corner.distance_m(destination);

        let mut depart = Step::new(origin, Maneuver::Depart, first, first / WALKING_SPEED_MPS);
        depart.road_name = Some("Moi Avenue".into());
        depart.bearing_after = Some(bearing(origin, corner));
        let mut turn = Step::new(
            corner,
            Maneuver::Turn(Some(Modifier::Right)),
            second,
            second / WALKING_SPEED_MPS,
        );
        turn.road_name = Some("Kenyatta Avenue".into());
        let arrive = Step::new(destination, Maneuver::Arrive(Some(Modifier::Left)), 0.0, 0.0);

        let distance = path_length_m(&geometry);
        Ok(RouteResponse {
            distance_m: Some(distance),
            duration_s: Some(distance / WALKING_SPEED_MPS),
            geometry,
            steps: vec![depart, turn, arrive],
        })
    }
}

// ── Synthetic walk ────────────────────────────────────────────────────────────

/// Flat-earth bearing from `a` to `b`; fine over a few hundred metres.
fn bearing(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_north = b.lat - a.lat;
    let d_east = (b.lng - a.lng) * a.lat.to_radians().cos();
    normalize_bearing(d_east.atan2(d_north).to_degrees())
}

fn jitter(p: GeoPoint, rng: &mut SmallRng) -> GeoPoint {
    let dn = rng.gen_range(-JITTER_M..JITTER_M);
    let de = rng.gen_range(-JITTER_M..JITTER_M);
    GeoPoint::new(
        p.lat + (dn / EARTH_RADIUS_M).to_degrees(),
        p.lng + (de / (EARTH_RADIUS_M * p.lat.to_radians().cos())).to_degrees(),
    )
}

fn synthetic_walk(path: &[GeoPoint], rng: &mut SmallRng) -> Vec<RawFix> {
    let mut fixes = Vec::new();
    let mut t = 0;
    let mut push = |p: GeoPoint, heading: f64, speed: f64, rng: &mut SmallRng| {
        let fix = RawFix::at(jitter(p, rng), Timestamp::from_millis(t))
            .with_heading(normalize_bearing(heading + rng.gen_range(-JITTER_DEG..JITTER_DEG)))
            .with_speed(speed);
        fixes.push(fix);
        t += FIX_INTERVAL_MS;
    };

    for leg in path.windows(2) {
        let (a, b) = (leg[0], leg[1]);
        let heading = bearing(a, b);
        let n = (a.distance_m(b) / WALK_SPEED_MPS).ceil().max(1.0) as u32;
        for k in 0..n {
            let f = k as f64 / n as f64;
            let p = GeoPoint::new(a.lat + f * (b.lat - a.lat), a.lng + f * (b.lng - a.lng));
            let speed = WALK_SPEED_MPS + rng.gen_range(-0.2..0.2);
            push(p, heading, speed, rng);
        }
    }
    if let Some(&end) = path.last() {
        for _ in 0..DWELL_FIXES {
            push(end, 0.0, 0.0, rng);
        }
    }
    fixes
}

// ── Main ──────────────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logging::init("info");

    let mut config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_json_file(Path::new(&path))?,
        None => AppConfig::default(),
    };
    if let Ok(token) = std::env::var("MAPBOX_ACCESS_TOKEN") {
        config.directions.access_token = token;
    }

    let stops = match &config.stops_csv {
        Some(path) => load_stops_csv(path)?,
        None => load_stops_reader(Cursor::new(STOPS_CSV))?,
    };
    let index = ProximityIndex::new(stops);
    let destination = index
        .get(DESTINATION)
        .map(|s| s.position())
        .ok_or_else(|| anyhow::anyhow!("stop {DESTINATION} missing from stop set"))?;

    let routing: Arc<dyn RoutingService> = if config.directions.access_token.is_empty() {
        info!("no access token; using the canned route");
        Arc::new(LShapedRoute)
    } else {
        Arc::new(DirectionsClient::new(config.directions.clone())?)
    };

    let store: Box<dyn KeyValueStore> = match &config.state_dir {
        Some(dir) => Box::new(FileStore::new(dir)?),
        None => Box::new(MemoryStore::new()),
    };

    let mut navigator = NavigatorBuilder::new(index, LogSink, store).config(config).build()?;

    let mut rng = SmallRng::seed_from_u64(SEED);
    let fixes = synthetic_walk(&[START, corner_for(destination), destination], &mut rng);
    info!(fixes = fixes.len(), "walk generated");
    let mut source = ReplaySource::new(fixes).paced(REPLAY_PACE);

    let (commands, command_rx) = mpsc::channel(8);
    commands.send(Command::SelectStop(StopId::new(DESTINATION))).await?;
    commands.send(Command::StartNavigation).await?;
    drop(commands);

    let t0 = Instant::now();
    let mut observer = LogObserver::default();
    run(&mut navigator, routing, &mut source, command_rx, &mut observer).await?;

    println!("\n=== walk finished in {:.1?} ===", t0.elapsed());
    println!("phase: {:?}", navigator.phase());
    if let Some(route) = navigator.route() {
        println!("route: {}", route.summary());
    }
    println!("nearest stops:");
    for (stop, d) in navigator.nearest_stops() {
        println!("  {:>6.0} m  {}", d, stop);
    }
    println!("recents: {}", navigator.recents().len());
    Ok(())
}
