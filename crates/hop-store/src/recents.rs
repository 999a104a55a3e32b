//! Recently chosen destination stops.

use std::collections::HashSet;

use tracing::{debug, warn};

use hop_core::Stop;

use crate::KeyValueStore;

/// Storage key for the recents list.
pub const RECENTS_KEY: &str = "stop-recents-v1";

/// Entries kept, most recent first.
pub const MAX_RECENTS: usize = 6;

/// Most-recent-first list of stops, deduplicated by id, persisted as a JSON
/// array under [`RECENTS_KEY`].
///
/// Persistence is best effort.  Nothing here returns an error.
pub struct RecentStops<S: KeyValueStore> {
    store: S,
    items: Vec<Stop>,
}

impl<S: KeyValueStore> RecentStops<S> {
    /// Read the list from `store`.  Missing or unreadable data gives an
    /// empty list.  Repeated ids keep only their first (most recent) entry.
    pub fn load(store: S) -> Self {
        let items = match store.get(RECENTS_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<Stop>>(&json) {
                Ok(mut items) => {
                    let mut seen = HashSet::new();
                    items.retain(|s| seen.insert(s.id.clone()));
                    items.truncate(MAX_RECENTS);
                    items
                }
                Err(e) => {
                    warn!(error = %e, "discarding unreadable recents");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read recents");
                Vec::new()
            }
        };
        debug!(count = items.len(), "recents loaded");
        Self { store, items }
    }

    /// Move `stop` to the front, dropping any older entry with the same id
    /// and anything past [`MAX_RECENTS`].
    pub fn push(&mut self, stop: Stop) {
        self.items.retain(|s| s.id != stop.id);
        self.items.insert(0, stop);
        self.items.truncate(MAX_RECENTS);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        if let Err(e) = self.store.remove(RECENTS_KEY) {
            warn!(error = %e, "failed to clear recents");
        }
    }

    pub fn items(&self) -> &[Stop] {
        &self.items
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.items)
            .map_err(crate::StoreError::from)
            .and_then(|json| self.store.set(RECENTS_KEY, &json));
        if let Err(e) = result {
            warn!(error = %e, "failed to save recents");
        }
    }
}
