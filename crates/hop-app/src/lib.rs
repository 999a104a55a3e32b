//! `hop-app`: wires the hopln crates into a running navigator.
//!
//! # Event loop
//!
//! ```text
//! source.start()         : Granted / Denied
//! loop:
//!   ① Route    : if the selection has no route and the position is known,
//!                 spawn a fetch on the RoutingService.
//!   ② Commands : select / clear / start / stop / toggle / recenter / overview.
//!   ③ Routes   : install finished fetches; stale ones are dropped.
//!   ④ Fixes    : filter → navigation engine → camera → observer.
//! ```
//!
//! # Cargo features
//!
//! | Feature  | Effect                                        |
//! |----------|-----------------------------------------------|
//! | `sqlite` | Enables `hop_store::SqliteStore` for recents. |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use hop_app::{logging, run, ChannelSource, LogObserver, NavigatorBuilder};
//!
//! logging::init("info");
//! let index = ProximityIndex::from_csv(Path::new("stops.txt"))?;
//! let mut nav = NavigatorBuilder::new(index, LogSink, MemoryStore::new()).build()?;
//! let (mut source, fixes) = ChannelSource::new();
//! run(&mut nav, routing, &mut source, commands, &mut LogObserver::default()).await?;
//! ```

pub mod app;
pub mod builder;
pub mod config;
pub mod error;
pub mod location;
pub mod logging;
pub mod navigator;
pub mod observer;

#[cfg(test)]
mod tests;

pub use app::{run, Command};
pub use builder::NavigatorBuilder;
pub use config::{AppConfig, DEFAULT_NEAREST_COUNT};
pub use error::{AppError, AppResult};
pub use location::{ChannelSource, LocationSource, PermissionState, ReplaySource};
pub use navigator::Navigator;
pub use observer::{LogObserver, NavObserver, NoopObserver};
