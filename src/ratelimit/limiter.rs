//! Core rate limiter implementation.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::{FailurePolicy, RateLimitConfig};
use crate::error::Result;
use crate::store::{StoreError, WindowStore};

use super::decision::{ClientKey, Decision, DenialReason};
use super::identity::{IdentifierResolver, RequestContext};
use super::observe::DenialObserver;

/// Sliding-window-log admission controller.
///
/// One instance is shared across all concurrently handled requests. It holds
/// no per-request state, never mutates its configuration, and holds no
/// in-process lock across a store round-trip.
///
/// Per request: resolve the client key, evict the key's expired entries and
/// record the current timestamp as one atomic store operation, read the
/// window cardinality, and compare it against the threshold. The count read
/// is deliberately outside the atomic unit, so under a concurrent burst on
/// one key the observed count may already include later arrivals; the window
/// is eventually exact, momentarily racy.
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<dyn WindowStore>,
    resolver: Arc<dyn IdentifierResolver>,
    observer: Option<Arc<dyn DenialObserver>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a new rate limiter over `store`, attributing requests with
    /// `resolver`.
    ///
    /// Fails when the configuration is invalid (non-positive window or
    /// threshold); nothing is deferred to the first request.
    pub fn new(
        config: RateLimitConfig,
        store: Arc<dyn WindowStore>,
        resolver: Arc<dyn IdentifierResolver>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            resolver,
            observer: None,
            clock: Arc::new(SystemClock),
        })
    }

    /// Attach an observer notified on rate-exceeded denials.
    ///
    /// The observer only fires when `enable_logging` is set.
    pub fn with_observer(mut self, observer: Arc<dyn DenialObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Replace the clock. Primarily useful for testing.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The configuration this limiter was built with.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Decide whether `request` may proceed.
    ///
    /// Store failures never escape: they are resolved by the configured
    /// failure policy and logged.
    pub async fn evaluate(&self, request: &RequestContext) -> Decision {
        let Some(key) = self.resolver.resolve(request) else {
            if self.config.deny_undefined_identifier {
                debug!("denying request with unresolved client identifier");
                return Decision::Deny(DenialReason::MissingIdentifier);
            }
            // Anonymous traffic passes through without consuming any quota;
            // the store is not touched at all.
            return Decision::Allow;
        };

        match self.admit(&key).await {
            Ok(decision) => decision,
            Err(error) => self.apply_failure_policy(&key, error),
        }
    }

    /// Run the window update and threshold check for a resolved key.
    async fn admit(&self, key: &ClientKey) -> std::result::Result<Decision, StoreError> {
        // One clock reading feeds both the eviction cutoff and the new
        // entry's score, so the entry recorded below can never fall outside
        // its own window.
        let now = self.clock.now_millis();
        let cutoff = now.saturating_sub(self.config.time_window_millis());

        // A fresh member per request keeps two same-millisecond arrivals as
        // two entries; score alone would let the store collapse them.
        let member = Uuid::new_v4().to_string();

        trace!(key = %key, now, cutoff, "recording request in window");

        self.store
            .evict_and_record(key.as_str(), cutoff, now, &member)
            .await?;

        let count = self.store.count(key.as_str()).await?;

        if count > self.config.max_requests {
            debug!(
                key = %key,
                count,
                limit = self.config.max_requests,
                "rate limit exceeded"
            );
            self.notify_denied(key, count);
            return Ok(Decision::Deny(DenialReason::RateExceeded {
                count,
                limit: self.config.max_requests,
            }));
        }

        Ok(Decision::Allow)
    }

    /// Resolve a store failure into a decision per the configured policy.
    fn apply_failure_policy(&self, key: &ClientKey, error: StoreError) -> Decision {
        match self.config.failure_policy {
            FailurePolicy::FailOpen => {
                warn!(key = %key, %error, "window store failed, admitting (fail-open)");
                Decision::Allow
            }
            FailurePolicy::FailClosed => {
                warn!(key = %key, %error, "window store failed, denying (fail-closed)");
                Decision::Deny(DenialReason::StoreUnavailable)
            }
        }
    }

    /// Best-effort denial notification. A panicking observer is contained
    /// and logged; it never alters the decision.
    fn notify_denied(&self, key: &ClientKey, count: u64) {
        if !self.config.enable_logging {
            return;
        }
        let Some(observer) = &self.observer else {
            return;
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            observer.on_denied(key, count, self.config.max_requests);
        }));
        if outcome.is_err() {
            warn!(key = %key, "denial observer panicked");
        }
    }
}
