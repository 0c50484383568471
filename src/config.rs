//! Runtime configuration
//!
//! Read from environment variables (a `.env` file is loaded by the CLI
//! before this runs); CLI flags override individual fields afterwards.

use std::path::PathBuf;

use crate::engine::DEFAULT_STEP_LIMIT;

/// Default OpenAI-compatible endpoint (LM Studio's local server)
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:1234/v1";
/// Default data directory for the JSON stores
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the OpenAI-compatible server
    pub base_url: String,
    /// Bearer token; optional because local servers usually ignore it
    pub api_key: Option<String>,
    /// Default model when neither node nor preset names one
    pub model: Option<String>,
    /// Directory holding workflows.json / tools.json / workflow_runs.json
    pub data_dir: PathBuf,
    /// Step budget per run
    pub step_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

impl Config {
    /// Build configuration from environment variables.
    ///
    /// - `FLOWLAB_BASE_URL`
    /// - `FLOWLAB_API_KEY` (falls back to `OPENAI_API_KEY`)
    /// - `FLOWLAB_MODEL`
    /// - `FLOWLAB_DATA_DIR`
    /// - `FLOWLAB_STEP_LIMIT`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("FLOWLAB_BASE_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("FLOWLAB_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .ok(),
            model: std::env::var("FLOWLAB_MODEL").ok(),
            data_dir: std::env::var("FLOWLAB_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            step_limit: std::env::var("FLOWLAB_STEP_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_STEP_LIMIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_server() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://127.0.0.1:1234/v1");
        assert_eq!(config.step_limit, DEFAULT_STEP_LIMIT);
        assert!(config.api_key.is_none());
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }
}
