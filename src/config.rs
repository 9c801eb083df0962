//! Configuration for the windowgate rate limiter.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{Result, WindowgateError};

/// Policy applied when the window store is unreachable during an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Admit the request, protecting availability at the cost of protection.
    FailOpen,
    /// Deny the request, protecting the backend at the cost of availability.
    FailClosed,
}

/// Configuration for a rate limiter.
///
/// The value is fixed at construction: every evaluation reads it, nothing
/// mutates it, and no ambient default is consulted at call time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Width of the sliding window in seconds.
    #[serde(default = "default_time_window_secs")]
    pub time_window_secs: u64,

    /// Maximum requests admitted per window per client key.
    #[serde(default = "default_max_requests")]
    pub max_requests: u64,

    /// Whether to deny requests whose client identifier cannot be resolved.
    #[serde(default = "default_deny_undefined_identifier")]
    pub deny_undefined_identifier: bool,

    /// Whether rate-exceeded denials are reported to the observer.
    #[serde(default)]
    pub enable_logging: bool,

    /// Behavior when the window store fails mid-evaluation.
    #[serde(default = "default_failure_policy")]
    pub failure_policy: FailurePolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            time_window_secs: default_time_window_secs(),
            max_requests: default_max_requests(),
            deny_undefined_identifier: default_deny_undefined_identifier(),
            enable_logging: false,
            failure_policy: default_failure_policy(),
        }
    }
}

fn default_time_window_secs() -> u64 {
    5
}

fn default_max_requests() -> u64 {
    10
}

fn default_deny_undefined_identifier() -> bool {
    true
}

fn default_failure_policy() -> FailurePolicy {
    FailurePolicy::FailOpen
}

impl RateLimitConfig {
    /// Width of the sliding window in milliseconds.
    pub fn time_window_millis(&self) -> u64 {
        self.time_window_secs.saturating_mul(1_000)
    }

    /// Check that the configuration is usable.
    ///
    /// Misconfiguration is fatal at construction time, never deferred to the
    /// first request.
    pub fn validate(&self) -> Result<()> {
        if self.time_window_secs == 0 {
            return Err(WindowgateError::Config(
                "time_window_secs must be greater than zero".to_string(),
            ));
        }
        if self.max_requests == 0 {
            return Err(WindowgateError::Config(
                "max_requests must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading rate limit configuration");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: RateLimitConfig = serde_yaml::from_str(yaml)
            .map_err(|e| WindowgateError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RateLimitConfig::default();
        assert_eq!(config.time_window_secs, 5);
        assert_eq!(config.max_requests, 10);
        assert!(config.deny_undefined_identifier);
        assert!(!config.enable_logging);
        assert_eq!(config.failure_policy, FailurePolicy::FailOpen);
    }

    #[test]
    fn test_time_window_millis() {
        let config = RateLimitConfig {
            time_window_secs: 5,
            ..Default::default()
        };
        assert_eq!(config.time_window_millis(), 5_000);
    }

    #[test]
    fn test_parse_yaml_with_defaults() {
        let yaml = r#"
max_requests: 100
"#;
        let config = RateLimitConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.max_requests, 100);
        assert_eq!(config.time_window_secs, 5);
        assert_eq!(config.failure_policy, FailurePolicy::FailOpen);
    }

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r#"
time_window_secs: 60
max_requests: 1000
deny_undefined_identifier: false
enable_logging: true
failure_policy: fail_closed
"#;
        let config = RateLimitConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.time_window_secs, 60);
        assert_eq!(config.max_requests, 1000);
        assert!(!config.deny_undefined_identifier);
        assert!(config.enable_logging);
        assert_eq!(config.failure_policy, FailurePolicy::FailClosed);
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = RateLimitConfig {
            time_window_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(WindowgateError::Config(_))
        ));
    }

    #[test]
    fn test_zero_max_requests_rejected() {
        let config = RateLimitConfig {
            max_requests: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(WindowgateError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let yaml = r#"
time_window_secs: 0
"#;
        assert!(RateLimitConfig::from_yaml(yaml).is_err());
    }
}
