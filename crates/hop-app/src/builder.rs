//! Fluent builder for constructing a [`Navigator`].

use hop_camera::{CameraDirector, CameraSink};
use hop_nav::{NavigationEngine, PositionFilter};
use hop_route::RouteModel;
use hop_spatial::ProximityIndex;
use hop_store::{KeyValueStore, RecentStops};

use crate::{AppConfig, AppError, AppResult, Navigator};

/// Fluent builder for [`Navigator<S, K>`].
///
/// # Required inputs
///
/// - [`ProximityIndex`]: the loaded stop set
/// - `S: CameraSink`: receives camera directives
/// - `K: KeyValueStore`: persists the recents list
///
/// # Optional inputs
///
/// | Method       | Default                 |
/// |--------------|-------------------------|
/// | `.config(c)` | `AppConfig::default()`  |
///
/// # Example
///
/// ```rust,ignore
/// let index = ProximityIndex::from_csv(path)?;
/// let mut nav = NavigatorBuilder::new(index, LogSink, MemoryStore::new())
///     .config(config)
///     .build()?;
/// nav.select_stop("S1", &mut NoopObserver)?;
/// ```
pub struct NavigatorBuilder<S: CameraSink, K: KeyValueStore> {
    index:  ProximityIndex,
    sink:   S,
    store:  K,
    config: Option<AppConfig>,
}

impl<S: CameraSink, K: KeyValueStore> NavigatorBuilder<S, K> {
    pub fn new(index: ProximityIndex, sink: S, store: K) -> Self {
        Self { index, sink, store, config: None }
    }

    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Validate the config and assemble the navigator.  Recents are loaded
    /// from the store here.
    pub fn build(self) -> AppResult<Navigator<S, K>> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        if self.index.is_empty() {
            return Err(AppError::Config("stop set is empty".into()));
        }
        if config.nearest_count == 0 {
            return Err(AppError::Config("nearest_count must be at least 1".into()));
        }

        Ok(Navigator::from_parts(
            self.index,
            PositionFilter::new(config.filter),
            RouteModel::new(config.walking_speed_mps),
            NavigationEngine::new(config.navigation),
            CameraDirector::new(config.camera, self.sink),
            RecentStops::load(self.store),
            config.nearest_count,
        ))
    }
}
