//! HTTP routing client for Directions-compatible walking endpoints.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use hop_core::GeoPoint;

use crate::service::{decode_directions, RouteResponse, RoutingService};
use crate::{RouteError, RouteResult};

/// Default public Directions endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Connection settings for [`DirectionsClient`].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DirectionsConfig {
    /// Scheme + host, no trailing slash.
    pub base_url:     String,
    /// Access token appended as `access_token`.  Empty means none.
    pub access_token: String,
    /// Routing profile path segment, e.g. `mapbox/walking`.
    pub profile:      String,
    pub timeout_secs: u64,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            base_url:     DEFAULT_BASE_URL.to_owned(),
            access_token: String::new(),
            profile:      "mapbox/walking".to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// [`RoutingService`] backed by an async `reqwest` client.
pub struct DirectionsClient {
    client: reqwest::Client,
    config: DirectionsConfig,
}

impl DirectionsClient {
    pub fn new(config: DirectionsConfig) -> RouteResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RouteError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Request URL for a walk from `origin` to `destination`.
    pub fn url(&self, origin: GeoPoint, destination: GeoPoint) -> String {
        let mut url = format!(
            "{}/directions/v5/{}/{},{};{},{}?geometries=geojson&overview=full&steps=true",
            self.config.base_url,
            self.config.profile,
            origin.lng,
            origin.lat,
            destination.lng,
            destination.lat,
        );
        if !self.config.access_token.is_empty() {
            url.push_str("&access_token=");
            url.push_str(&self.config.access_token);
        }
        url
    }
}

#[async_trait]
impl RoutingService for DirectionsClient {
    async fn walking_route(
        &self,
        origin:      GeoPoint,
        destination: GeoPoint,
    ) -> RouteResult<RouteResponse> {
        let response = self.client.get(self.url(origin, destination)).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!(status, bytes = body.len(), "directions response");
        decode_directions(status, &body, destination)
    }
}
