//! Core runtime configuration.
//!
//! Resolved once at startup and passed into each component, so nothing in the
//! core reads process-wide state while serving a request.

use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// Default time a cached response stays fresh.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default cap on concurrent per-medication resolver fetches.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    cache_ttl: Duration,
    max_concurrent_fetches: usize,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(cache_ttl: Duration, max_concurrent_fetches: usize) -> CoreResult<Self> {
        if cache_ttl.is_zero() {
            return Err(CoreError::InvalidInput(
                "cache_ttl must be greater than zero".into(),
            ));
        }
        if max_concurrent_fetches == 0 {
            return Err(CoreError::InvalidInput(
                "max_concurrent_fetches must be at least 1".into(),
            ));
        }

        Ok(Self {
            cache_ttl,
            max_concurrent_fetches,
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_concurrent_fetches
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.max_concurrent_fetches(), 8);
    }

    #[test]
    fn test_rejects_zero_values() {
        assert!(CoreConfig::new(Duration::ZERO, 4).is_err());
        assert!(CoreConfig::new(Duration::from_secs(1), 0).is_err());
        assert!(CoreConfig::new(Duration::from_secs(1), 1).is_ok());
    }
}
