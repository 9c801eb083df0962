//! In-process window store.

use std::collections::BTreeSet;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::{StoreError, WindowStore};

/// One window entry: a millisecond score plus a unique member string that
/// keeps same-millisecond requests distinct.
type Entry = (u64, String);

/// An in-process `WindowStore` backed by a concurrent map of sorted sets.
///
/// Each key owns an ordered set of `(score, member)` entries, the shape a
/// Redis sorted set would hold. The per-key map entry serializes evict+record
/// within this process, which satisfies the atomicity contract; the count
/// read takes its own, later lock acquisition.
#[derive(Debug, Default)]
pub struct InMemoryWindowStore {
    windows: DashMap<String, BTreeSet<Entry>>,
}

impl InMemoryWindowStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            windows: DashMap::new(),
        }
    }

    /// Evict entries below `cutoff_millis` across all keys and drop keys left
    /// empty.
    ///
    /// Per-key eviction only runs when a key receives traffic, so windows of
    /// keys that went quiet linger until this sweep. The embedding process
    /// should call it periodically.
    pub fn cleanup(&self, cutoff_millis: u64) {
        self.windows.retain(|_key, window| {
            let live = window.split_off(&(cutoff_millis, String::new()));
            *window = live;
            !window.is_empty()
        });

        debug!(
            remaining = self.windows.len(),
            "window store cleanup complete"
        );
    }

    /// Number of keys currently tracked.
    pub fn key_count(&self) -> usize {
        self.windows.len()
    }
}

#[async_trait]
impl WindowStore for InMemoryWindowStore {
    async fn evict_and_record(
        &self,
        key: &str,
        cutoff_millis: u64,
        score_millis: u64,
        member: &str,
    ) -> Result<(), StoreError> {
        let mut entry = self.windows.entry(key.to_string()).or_default();
        let window = entry.value_mut();

        // split_off keeps everything at or above the cutoff; the cutoff is an
        // exclusive lower bound for eviction.
        let live = window.split_off(&(cutoff_millis, String::new()));
        *window = live;
        window.insert((score_millis, member.to_string()));

        Ok(())
    }

    async fn count(&self, key: &str) -> Result<u64, StoreError> {
        Ok(self.windows.get(key).map(|w| w.len() as u64).unwrap_or(0))
    }
}
