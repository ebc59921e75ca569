//! Persistent configuration for touchpath.
//!
//! Stores user settings in `~/.touchpath/config.json`: the DevTools endpoint
//! to connect to and the default gesture settings. Command-line flags
//! override whatever is stored here.
//!
//! # Example
//!
//! ```no_run
//! use touchpath_core::config::TouchpathConfig;
//!
//! // Load (returns defaults if file doesn't exist)
//! let config = TouchpathConfig::load();
//! println!("connecting to {}", config.endpoint);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::gesture::{GestureConfig, DEFAULT_DELAY_MS};

const CONFIG_FILENAME: &str = "config.json";

/// Endpoint of a locally started Chrome with `--remote-debugging-port=9222`.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:9222";

/// Returns the touchpath data directory, `~/.touchpath`.
///
/// Falls back to `./.touchpath` when no home directory is known. The
/// directory is not created here; [`TouchpathConfig::save`] does that.
pub fn touchpath_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".touchpath")
}

/// Persistent touchpath configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchpathConfig {
    /// DevTools HTTP endpoint used for target discovery.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Default total gesture duration in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Default steps per transition; derived when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,

    /// Whether to draw the finger trail by default.
    #[serde(default = "default_draw")]
    pub draw: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_draw() -> bool {
    true
}

impl Default for TouchpathConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            delay_ms: DEFAULT_DELAY_MS,
            steps: None,
            draw: true,
        }
    }
}

impl TouchpathConfig {
    /// Path of the config file.
    pub fn path() -> PathBuf {
        touchpath_dir().join(CONFIG_FILENAME)
    }

    /// Load config from `~/.touchpath/config.json`.
    ///
    /// Returns [`Default`] if the file does not exist or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load config from an explicit path, with the same fallback as
    /// [`TouchpathConfig::load`].
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to `~/.touchpath/config.json`.
    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&Self::path())
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// The stored gesture defaults.
    pub fn gesture_config(&self) -> GestureConfig {
        GestureConfig {
            delay_ms: self.delay_ms,
            steps: self.steps,
            draw: self.draw,
        }
    }
}
