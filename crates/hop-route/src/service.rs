//! Routing-service trait and response decoding.
//!
//! # Pluggability
//!
//! The route model calls routing through the [`RoutingService`] trait so the
//! HTTP client can be swapped for a canned or offline implementation (tests,
//! replay demos) without touching the navigation core.
//!
//! # Wire format
//!
//! Responses follow the Directions JSON shape: a `routes` array (the first
//! entry is used), each with `distance`, `duration`, a GeoJSON `geometry`,
//! and `legs[0].steps[*].maneuver`.  Coordinates are `[lng, lat]`.

use async_trait::async_trait;
use serde::Deserialize;

use hop_core::GeoPoint;

use crate::step::{Maneuver, Step};
use crate::{RouteError, RouteResult};

// ── RouteResponse ─────────────────────────────────────────────────────────────

/// A successfully decoded walking route, before the route model applies its
/// fallback rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteResponse {
    /// Total distance reported by the service, metres.
    pub distance_m: Option<f64>,
    /// Total duration reported by the service, seconds.
    pub duration_s: Option<f64>,
    /// Full-resolution path.  May be empty or a single point, which the
    /// route model treats as "no usable geometry".
    pub geometry:   Vec<GeoPoint>,
    /// Steps of the first leg, in travel order.
    pub steps:      Vec<Step>,
}

// ── RoutingService trait ──────────────────────────────────────────────────────

/// Pluggable walking-route provider.
///
/// Implementations must be `Send + Sync` because the event loop runs each
/// fetch on a spawned task while position updates keep flowing.
#[async_trait]
pub trait RoutingService: Send + Sync {
    /// Fetch a walking route from `origin` to `destination`.
    ///
    /// Any failure (transport, status, decode, empty route list) is an
    /// `Err`; callers do not distinguish between them.
    async fn walking_route(
        &self,
        origin:      GeoPoint,
        destination: GeoPoint,
    ) -> RouteResult<RouteResponse>;
}

// ── Wire decoding ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct DirectionsBody {
    #[serde(default)]
    routes:  Vec<WireRoute>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct WireRoute {
    distance: Option<f64>,
    duration: Option<f64>,
    geometry: Option<WireGeometry>,
    #[serde(default)]
    legs:     Vec<WireLeg>,
}

#[derive(Deserialize)]
struct WireGeometry {
    #[serde(default)]
    coordinates: Vec<Vec<f64>>,
}

#[derive(Deserialize)]
struct WireLeg {
    #[serde(default)]
    steps: Vec<WireStep>,
}

#[derive(Deserialize)]
struct WireStep {
    name:     Option<String>,
    distance: Option<f64>,
    duration: Option<f64>,
    maneuver: Option<WireManeuver>,
}

#[derive(Deserialize)]
struct WireManeuver {
    instruction:   Option<String>,
    location:      Option<[f64; 2]>,
    #[serde(rename = "type")]
    kind:          Option<String>,
    modifier:      Option<String>,
    bearing_after: Option<f64>,
    exit:          Option<u32>,
}

/// Decode a routing-service reply.
///
/// `status` is the HTTP status code; anything outside 2xx is an error
/// regardless of the body.  Steps without a maneuver location are pinned to
/// `destination`.
pub fn decode_directions(
    status:      u16,
    body:        &[u8],
    destination: GeoPoint,
) -> RouteResult<RouteResponse> {
    if !(200..300).contains(&status) {
        return Err(RouteError::Status { status });
    }

    let parsed: DirectionsBody = serde_json::from_slice(body)?;
    let Some(route) = parsed.routes.into_iter().next() else {
        return Err(RouteError::NoRoute { message: parsed.message });
    };

    let geometry = route
        .geometry
        .map(|g| {
            g.coordinates
                .iter()
                .filter(|c| c.len() >= 2)
                .map(|c| GeoPoint::from_lng_lat([c[0], c[1]]))
                .collect()
        })
        .unwrap_or_default();

    let steps = route
        .legs
        .into_iter()
        .next()
        .map(|leg| leg.steps.into_iter().map(|s| decode_step(s, destination)).collect())
        .unwrap_or_default();

    Ok(RouteResponse {
        distance_m: route.distance,
        duration_s: route.duration,
        geometry,
        steps,
    })
}

fn decode_step(step: WireStep, destination: GeoPoint) -> Step {
    let m = step.maneuver;
    let (instruction, location, kind, modifier, bearing_after, exit) = match m {
        Some(m) => (m.instruction, m.location, m.kind, m.modifier, m.bearing_after, m.exit),
        None => (None, None, None, None, None, None),
    };

    Step {
        instruction,
        road_name: step.name.filter(|n| !n.is_empty()),
        distance_m: step.distance.unwrap_or(0.0),
        duration_s: step.duration.unwrap_or(0.0),
        location: location.map(GeoPoint::from_lng_lat).unwrap_or(destination),
        maneuver: Maneuver::from_wire(kind.as_deref(), modifier.as_deref(), exit),
        bearing_after,
    }
}
