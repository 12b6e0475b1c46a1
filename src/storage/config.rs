//! Store Configuration

use std::time::Duration;

/// Default janitor cadence
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Run a background janitor that removes expired entries.
    /// When disabled, expiry is informational and entries live until deleted.
    pub enable_janitor: bool,

    /// Janitor sweep interval
    pub sweep_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enable_janitor: true,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the background janitor
    pub fn with_janitor(mut self, enabled: bool) -> Self {
        self.enable_janitor = enabled;
        self
    }

    /// Set janitor sweep interval
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.enable_janitor);
        assert_eq!(config.sweep_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_builder_chaining() {
        let config = StoreConfig::new()
            .with_janitor(false)
            .with_sweep_interval(Duration::from_millis(250));
        assert!(!config.enable_janitor);
        assert_eq!(config.sweep_interval, Duration::from_millis(250));
    }
}
