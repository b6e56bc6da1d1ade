//! Configuration loaded from `refgraph.toml`.
//!
//! Every field has a default so a missing or partial file is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{GraphError, Result};
use crate::graph::EdgeStrategy;

pub const DEFAULT_CONFIG_FILE: &str = "refgraph.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefgraphConfig {
    /// Where the latest graph snapshot is written.
    pub snapshot_path: PathBuf,
    /// Project-level ignore file, relative to the scanned root.
    pub ignore_file: String,
    /// Edge discovery strategy.
    pub strategy: EdgeStrategy,
    /// Emit an `analyzing` update every this many files.
    pub progress_interval: usize,
    /// Messages retained per subscriber before the oldest are dropped.
    pub channel_capacity: usize,
    /// Seconds a subscriber waits before receiving a keepalive.
    pub keepalive_secs: u64,
}

impl Default for RefgraphConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(".refgraph").join("graph.json"),
            ignore_file: ".gitignore".to_string(),
            strategy: EdgeStrategy::default(),
            progress_interval: 10,
            channel_capacity: 64,
            keepalive_secs: 15,
        }
    }
}

impl RefgraphConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Self::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| GraphError::Config(e.to_string()))?;
        if config.channel_capacity == 0 {
            return Err(GraphError::Config(
                "channel_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = RefgraphConfig::default();
        assert_eq!(config.snapshot_path, PathBuf::from(".refgraph/graph.json"));
        assert_eq!(config.ignore_file, ".gitignore");
        assert_eq!(config.strategy, EdgeStrategy::Substring);
        assert_eq!(config.keepalive(), Duration::from_secs(15));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = RefgraphConfig::from_toml("progress_interval = 3\nstrategy = \"resolved\"\n")
            .unwrap();
        assert_eq!(config.progress_interval, 3);
        assert_eq!(config.strategy, EdgeStrategy::Resolved);
        assert_eq!(config.channel_capacity, 64);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = RefgraphConfig::from_toml("channel_capacity = 0").unwrap_err();
        assert!(matches!(err, GraphError::Config(_)));
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert_eq!(RefgraphConfig::load(&missing), RefgraphConfig::default());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "snapshot_path = [").unwrap();
        assert_eq!(RefgraphConfig::load(&bad), RefgraphConfig::default());
    }
}
