// ============================================================================
// File: src/config.rs
// Configuration structures and validation
// ============================================================================

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "docchat.json";

/// Client configuration, loaded from docchat.json
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Base URL of the document backend (e.g., "http://127.0.0.1:8000")
    pub server_url: String,

    /// Number of passages requested from /search
    pub top_k: usize,

    /// Whether to print the round-trip time of each query
    pub show_latency: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".to_string(),
            top_k: 3,
            show_latency: true,
        }
    }
}

impl Config {
    /// Load the configuration file.
    ///
    /// A missing file at the default location falls back to built-in
    /// defaults; a missing file the user asked for explicitly is an error.
    pub fn load(path: &Path, explicit: bool) -> Result<Self> {
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server_url.trim().is_empty() {
            return Err(anyhow!("Server URL is required"));
        }

        reqwest::Url::parse(&self.server_url)
            .map_err(|e| anyhow!("Server URL '{}' is invalid: {}", self.server_url, e))?;

        if self.top_k == 0 {
            return Err(anyhow!("top_k must be at least 1"));
        }

        Ok(())
    }
}
