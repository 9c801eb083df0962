//! Denial observation side-channel.

use tracing::info;

use super::decision::ClientKey;

/// Side-channel notified when a request is denied for rate exceedance.
///
/// Observers run after the decision is made and cannot change it. The limiter
/// contains a panicking observer, so an implementation failure never blocks
/// or fails the request it was reporting on.
pub trait DenialObserver: Send + Sync {
    /// Called once per rate-exceeded denial.
    fn on_denied(&self, key: &ClientKey, count: u64, limit: u64);
}

/// Any plain function of the denial works as an observer.
impl<F> DenialObserver for F
where
    F: Fn(&ClientKey, u64, u64) + Send + Sync,
{
    fn on_denied(&self, key: &ClientKey, count: u64, limit: u64) {
        self(key, count, limit)
    }
}

/// Observer that emits a `tracing` event per denial.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DenialObserver for TracingObserver {
    fn on_denied(&self, key: &ClientKey, count: u64, limit: u64) {
        info!(
            client = %key,
            count,
            limit,
            "client has passed the rate limit"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_closure_observer() {
        let seen: Arc<Mutex<Vec<(String, u64, u64)>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let observer = move |key: &ClientKey, count: u64, limit: u64| {
            sink.lock().push((key.to_string(), count, limit));
        };

        observer.on_denied(&ClientKey::new("a"), 11, 10);

        let seen = seen.lock();
        assert_eq!(seen.as_slice(), &[("a".to_string(), 11, 10)]);
    }
}
