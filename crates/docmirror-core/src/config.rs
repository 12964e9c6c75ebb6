//! Configuration for docmirror.
//!
//! Settings live in a single TOML file, `config.toml`, in the platform config
//! directory. A missing file means defaults; a malformed file is an error.
//!
//! ## Resolution
//!
//! 1. `DOCMIRROR_CONFIG_DIR`, when set and non-empty
//! 2. The platform config directory (`directories::ProjectDirs`)
//!
//! `DOCMIRROR_LARK_CLI` overrides `[lark].binary` after the file is read.
//!
//! ## Example
//!
//! ```toml
//! [render]
//! download_assets = true
//! assets_dir_name = "assets"
//! table_image_max_width = 160
//!
//! [lark]
//! binary = "lark-cli"
//! timeout_secs = 120
//! retries = 1
//! ```

use crate::render::DEFAULT_TABLE_IMAGE_MAX_WIDTH;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the directory that holds `config.toml`.
pub const CONFIG_DIR_ENV: &str = "DOCMIRROR_CONFIG_DIR";
/// Environment variable overriding the `lark-cli` binary.
pub const LARK_CLI_ENV: &str = "DOCMIRROR_LARK_CLI";

const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendering and asset settings.
    pub render: RenderConfig,
    /// `lark-cli` collaborator settings.
    pub lark: LarkConfig,
}

/// `[render]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Download missing images and board snapshots.
    ///
    /// When disabled, only assets already on disk are reused and every other
    /// asset renders with the path it would have had.
    pub download_assets: bool,

    /// Name of the assets directory created next to the Markdown file.
    pub assets_dir_name: String,

    /// Maximum width, in pixels, of images embedded in table cells.
    pub table_image_max_width: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            download_assets: true,
            assets_dir_name: "assets".to_string(),
            table_image_max_width: DEFAULT_TABLE_IMAGE_MAX_WIDTH,
        }
    }
}

/// `[lark]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LarkConfig {
    /// Executable name or path of the Lark CLI.
    pub binary: String,
    /// Per-command timeout in seconds.
    pub timeout_secs: u64,
    /// Extra attempts for a command that timed out or failed.
    pub retries: u32,
}

impl Default for LarkConfig {
    fn default() -> Self {
        Self {
            binary: "lark-cli".to_string(),
            timeout_secs: 120,
            retries: 1,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when no file
    /// exists, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined or the
    /// file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let config = if path.exists() {
            Self::load_from(&path)?
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        Ok(config.with_binary_override(std::env::var(LARK_CLI_ENV).ok().as_deref()))
    }

    /// Load from an explicit file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Write to an explicit file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the file cannot
    /// be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }

    /// Replace the Lark binary when an override is present and non-empty.
    #[must_use]
    pub fn with_binary_override(mut self, binary: Option<&str>) -> Self {
        if let Some(binary) = binary.map(str::trim).filter(|b| !b.is_empty()) {
            self.lark.binary = binary.to_string();
        }
        self
    }

    /// Path of the default config file.
    ///
    /// # Errors
    ///
    /// Returns an error if no config directory can be determined.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    fn config_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }
        directories::ProjectDirs::from("dev", "docmirror", "docmirror")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| Error::Config("Failed to determine config directory".into()))
    }
}
