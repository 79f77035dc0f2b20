//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONTENT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Paths to QuickSense data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory.
    pub root: PathBuf,
    /// Provider settings (`settings.json`), the durable key-value store.
    pub settings_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            settings_file: root.join("settings.json"),
            root,
        })
    }
}

/// Top-level QuickSense configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickSenseConfig {
    pub data_paths: DataPaths,
    /// How long the router waits for a content script to answer.
    pub content_timeout_ms: u64,
    /// Client-side timeout for provider HTTP calls.
    pub request_timeout_secs: u64,
    /// Origin of the extension's own pages; the content context never runs there.
    pub extension_origin: Option<String>,
}

impl QuickSenseConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let content_timeout_ms = std::env::var("QUICKSENSE_CONTENT_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CONTENT_TIMEOUT_MS);
        let request_timeout_secs = std::env::var("QUICKSENSE_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        let extension_origin = std::env::var("QUICKSENSE_EXTENSION_ORIGIN")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            data_paths,
            content_timeout_ms,
            request_timeout_secs,
            extension_origin,
        })
    }

    pub fn content_timeout(&self) -> Duration {
        Duration::from_millis(self.content_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
