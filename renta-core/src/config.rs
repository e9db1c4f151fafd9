//! Engine configuration

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Default undo window: 24 hours after submission.
pub const DEFAULT_UNDO_WINDOW_HOURS: i64 = 24;

/// Default number of extra attempts for a failed conflict lookup.
pub const DEFAULT_CONFLICT_RETRY: u32 = 1;

/// Configuration for the edit engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How long after submission a batch stays reversible.
    pub undo_window_hours: i64,

    /// How many times a failed conflict lookup is retried before it
    /// becomes a blocking "could not verify" rejection.
    pub conflict_retry: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            undo_window_hours: DEFAULT_UNDO_WINDOW_HOURS,
            conflict_retry: DEFAULT_CONFLICT_RETRY,
        }
    }
}

impl EngineConfig {
    /// Create an EngineConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `RENTA_UNDO_WINDOW_HOURS`: Undo window in hours (default: 24)
    /// - `RENTA_CONFLICT_RETRY`: Conflict lookup retries (default: 1)
    pub fn from_env() -> Self {
        let undo_window_hours = std::env::var("RENTA_UNDO_WINDOW_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|h| *h > 0)
            .unwrap_or(DEFAULT_UNDO_WINDOW_HOURS);

        let conflict_retry = std::env::var("RENTA_CONFLICT_RETRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CONFLICT_RETRY);

        Self {
            undo_window_hours,
            conflict_retry,
        }
    }

    /// The undo window as a chrono duration.
    pub fn undo_window(&self) -> Duration {
        Duration::hours(self.undo_window_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.undo_window_hours, DEFAULT_UNDO_WINDOW_HOURS);
        assert_eq!(config.conflict_retry, DEFAULT_CONFLICT_RETRY);
        assert_eq!(config.undo_window(), Duration::hours(24));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Without environment variables set, should use defaults
        let config = EngineConfig::from_env();
        assert_eq!(config.undo_window_hours, DEFAULT_UNDO_WINDOW_HOURS);
        assert_eq!(config.conflict_retry, DEFAULT_CONFLICT_RETRY);
    }
}
