//! Configuration for the terminal emulator

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{ColorPalette, Size};
use crate::pty::WindowSize;
use crate::scanner::{Scanner, DEFAULT_MAX_SEQUENCE_LEN};
use crate::session::{
    default_shell, SessionOptions, DEFAULT_POLL_INTERVAL, DEFAULT_READ_CHUNK_SIZE,
    DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_TERM,
};

/// Terminal configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shell to run; `None` uses `SHELL`, then `/bin/sh`
    pub shell: Option<String>,
    /// `TERM` advertised to the shell
    pub term: String,
    /// Viewport width in columns
    pub columns: u16,
    /// Viewport height in rows
    pub rows: u16,
    /// Default colors and the palette SGR codes resolve through
    pub colors: ColorPalette,
    pub scanner: ScannerConfig,
    pub session: SessionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shell: None,
            term: DEFAULT_TERM.to_string(),
            columns: 80,
            rows: 24,
            colors: ColorPalette::default(),
            scanner: ScannerConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Scanner settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Sequences longer than this many bytes are discarded
    pub max_sequence_len: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_sequence_len: DEFAULT_MAX_SEQUENCE_LEN,
        }
    }
}

/// Session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Reader poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Maximum bytes per read
    pub read_chunk_size: usize,
    /// Bound on joining the reader at shutdown, in milliseconds
    pub shutdown_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT.as_millis() as u64,
        }
    }
}

impl SessionConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from default location or return default config
    pub fn load_or_default() -> Self {
        // Try to load from ~/.config/willow/config.json
        if let Some(config_path) = default_path() {
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("ignoring {}: {}", config_path.display(), e),
                }
            }
        }
        Self::default()
    }

    /// The configured shell, else `SHELL`, else `/bin/sh`
    pub fn resolve_shell(&self) -> String {
        self.shell
            .clone()
            .filter(|shell| !shell.is_empty())
            .unwrap_or_else(default_shell)
    }

    /// Viewport size
    pub fn size(&self) -> Size {
        Size::new(self.columns as usize, self.rows as usize)
    }

    /// Options for starting a session with this configuration
    pub fn session_options(&self) -> SessionOptions {
        let size = self.size();
        SessionOptions {
            shell: self.resolve_shell(),
            args: Vec::new(),
            size: WindowSize::new(size.cols as u16, size.rows as u16),
            term: self.term.clone(),
            poll_interval: Duration::from_millis(self.session.poll_interval_ms),
            read_chunk_size: self.session.read_chunk_size.max(1),
            shutdown_timeout: self.session.shutdown_timeout(),
        }
    }

    /// A scanner using this configuration's palette and bounds
    pub fn scanner(&self) -> Scanner {
        Scanner::with_palette(self.colors.clone())
            .with_max_sequence_len(self.scanner.max_sequence_len)
    }
}

/// `~/.config/willow/config.json`
pub fn default_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("willow")
            .join("config.json")
    })
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
