//! `hop-store`: small persistent state outside the navigation core.
//!
//! Backends implement [`KeyValueStore`]; string values in, string values
//! out.  Three are provided:
//!
//! | Feature   | Backend        | Storage                                     |
//! |-----------|----------------|---------------------------------------------|
//! | *(none)*  | `MemoryStore`  | process memory                              |
//! | *(none)*  | `FileStore`    | one `<key>.json` file per key in a directory |
//! | `sqlite`  | `SqliteStore`  | a `kv` table in an SQLite database          |
//!
//! [`RecentStops`] sits on top of any backend and never surfaces an error:
//! reads fall back to an empty list and failed writes are logged.
//!
//! # Usage
//!
//! ```rust,ignore
//! use hop_store::{FileStore, RecentStops};
//!
//! let store = FileStore::new(Path::new("./state"))?;
//! let mut recents = RecentStops::load(store);
//! recents.push(stop.clone());
//! ```

pub mod error;
pub mod file;
pub mod kv;
pub mod recents;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use kv::{KeyValueStore, MemoryStore};
pub use recents::{RecentStops, MAX_RECENTS, RECENTS_KEY};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
