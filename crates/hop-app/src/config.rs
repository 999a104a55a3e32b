//! Application configuration.
//!
//! Every section defaults to the tuned constants, so a config file only needs
//! the fields it changes:
//!
//! ```json
//! {
//!   "stops_csv": "data/stops.txt",
//!   "state_dir": "state",
//!   "directions": { "access_token": "pk.…" },
//!   "camera": { "rotate_with_heading": true }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use hop_camera::CameraConfig;
use hop_nav::{FilterConfig, NavThresholds};
use hop_route::{DirectionsConfig, WALKING_SPEED_MPS};

use crate::{AppError, AppResult};

/// Size of the default "nearest stops" list.
pub const DEFAULT_NEAREST_COUNT: usize = 5;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub filter:            FilterConfig,
    pub navigation:        NavThresholds,
    pub camera:            CameraConfig,
    pub directions:        DirectionsConfig,
    /// Pace used for fallback routes and missing durations, m/s.
    pub walking_speed_mps: f64,
    pub nearest_count:     usize,
    /// GTFS-style stops file.
    pub stops_csv:         Option<PathBuf>,
    /// Directory for persisted state (recents).  `None` keeps it in memory.
    pub state_dir:         Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            filter:            FilterConfig::default(),
            navigation:        NavThresholds::default(),
            camera:            CameraConfig::default(),
            directions:        DirectionsConfig::default(),
            walking_speed_mps: WALKING_SPEED_MPS,
            nearest_count:     DEFAULT_NEAREST_COUNT,
            stops_csv:         None,
            state_dir:         None,
        }
    }
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> AppResult<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Reject values that would make the core misbehave silently.
    pub fn validate(&self) -> AppResult<()> {
        let f = &self.filter;
        for (name, alpha) in [
            ("filter.location_alpha", f.location_alpha),
            ("filter.speed_alpha", f.speed_alpha),
            ("filter.heading_alpha", f.heading_alpha),
        ] {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(AppError::Config(format!("{name} must be in (0, 1], got {alpha}")));
            }
        }

        let n = &self.navigation;
        if !(n.arrival_m > 0.0 && n.arrival_m <= n.arrival_soon_m) {
            return Err(AppError::Config(format!(
                "navigation.arrival_m ({}) must be positive and at most arrival_soon_m ({})",
                n.arrival_m, n.arrival_soon_m
            )));
        }

        if !(self.walking_speed_mps > 0.0 && self.walking_speed_mps.is_finite()) {
            return Err(AppError::Config(format!(
                "walking_speed_mps must be positive, got {}",
                self.walking_speed_mps
            )));
        }

        if !(self.camera.nav_zoom_speed_max > 0.0) {
            return Err(AppError::Config("camera.nav_zoom_speed_max must be positive".into()));
        }
        Ok(())
    }
}
