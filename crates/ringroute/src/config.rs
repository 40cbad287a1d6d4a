//! TOML configuration for the `ringroute` CLI.
//!
//! When no config file is provided, [`CliConfig::load`] returns the
//! defaults: BLAKE3, 10 vnodes per node, no initial nodes.

use std::path::Path;

use anyhow::{Context, bail};
use ringroute_ring::HashAlgorithm;
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Ring construction.
    pub ring: RingSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[ring]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RingSection {
    /// Virtual nodes per node.
    pub replicas: usize,
    /// Hash function placing vnodes and keys: `"blake3"` or `"xxh3"`.
    pub hash: HashAlgorithm,
    /// Initial node keys.
    pub nodes: Vec<String>,
}

impl Default for RingSection {
    fn default() -> Self {
        Self {
            replicas: 10,
            hash: HashAlgorithm::default(),
            nodes: Vec::new(),
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read {}", p.display()))?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse config from a TOML string.
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Reject values the ring would refuse anyway, with a config-level message.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ring.replicas == 0 {
            bail!("[ring] replicas must be at least 1");
        }
        Ok(())
    }
}
