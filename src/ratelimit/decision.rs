//! Decision types and the client key.

use std::fmt;

/// Identifies the rate-limited subject.
///
/// The key is an opaque string, typically derived from the peer network
/// address or an application-level token. It is not validated for emptiness.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey(String);

impl ClientKey {
    /// Create a new client key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice, the form the window store sees.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ClientKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for ClientKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// The outcome of one admission evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The request may proceed to the next pipeline stage.
    Allow,
    /// The request must be terminated at the pipeline boundary.
    Deny(DenialReason),
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// No client identifier could be resolved and policy requires blocking.
    MissingIdentifier,
    /// The key's window holds more entries than the configured threshold.
    RateExceeded {
        /// Entries observed in the window, including the current request.
        count: u64,
        /// The configured threshold.
        limit: u64,
    },
    /// The window store was unreachable and the policy is fail-closed.
    StoreUnavailable,
}

impl Decision {
    /// Whether the request may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// The terminal HTTP status a pipeline shim should emit, or `None` when
    /// the request is allowed through.
    ///
    /// A missing identifier is a policy block (403), distinct from rate
    /// exceedance (429).
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Decision::Allow => None,
            Decision::Deny(DenialReason::MissingIdentifier) => Some(403),
            Decision::Deny(_) => Some(429),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_key_display() {
        let key = ClientKey::new("192.168.1.1");
        assert_eq!(key.to_string(), "192.168.1.1");
        assert_eq!(key.as_str(), "192.168.1.1");
    }

    #[test]
    fn test_client_key_equality() {
        assert_eq!(ClientKey::from("a"), ClientKey::new("a".to_string()));
        assert_ne!(ClientKey::from("a"), ClientKey::from("b"));
    }

    #[test]
    fn test_empty_key_is_valid() {
        let key = ClientKey::new("");
        assert_eq!(key.as_str(), "");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Decision::Allow.status_code(), None);
        assert!(Decision::Allow.is_allowed());

        let forbidden = Decision::Deny(DenialReason::MissingIdentifier);
        assert_eq!(forbidden.status_code(), Some(403));
        assert!(!forbidden.is_allowed());

        let exceeded = Decision::Deny(DenialReason::RateExceeded {
            count: 11,
            limit: 10,
        });
        assert_eq!(exceeded.status_code(), Some(429));

        let unavailable = Decision::Deny(DenialReason::StoreUnavailable);
        assert_eq!(unavailable.status_code(), Some(429));
    }
}
