//! Window store abstraction.
//!
//! The sliding window lives in an ordered time-series store keyed by client
//! key. Any store offering an atomic evict+record and a cardinality read
//! satisfies the contract; an in-process implementation ships with the crate.

mod memory;

pub use memory::InMemoryWindowStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a window store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store is unreachable or rejected the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store did not answer within its deadline.
    #[error("store operation timed out: {0}")]
    Timeout(String),
}

/// Ordered time-series store backing the sliding window log.
///
/// Implementations keep, per key, a set of entries ordered by a millisecond
/// score. `evict_and_record` must be atomic with respect to other callers on
/// the same key: no caller may observe the evict without the record, and two
/// concurrent calls must not interleave in a way that loses an entry.
///
/// Neither operation is safe to retry blindly: a retried record leaves a
/// duplicate entry unless the caller tolerates it.
#[async_trait]
pub trait WindowStore: Send + Sync {
    /// Atomically remove every entry for `key` with a score strictly below
    /// `cutoff_millis`, then insert a new entry at `score_millis`.
    ///
    /// `member` must be unique per call so that two requests landing in the
    /// same millisecond are never collapsed into one entry.
    async fn evict_and_record(
        &self,
        key: &str,
        cutoff_millis: u64,
        score_millis: u64,
        member: &str,
    ) -> Result<(), StoreError>;

    /// Current number of entries recorded for `key`.
    async fn count(&self, key: &str) -> Result<u64, StoreError>;
}
