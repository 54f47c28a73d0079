//! Cdx configuration file handling

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration (cdx.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CdxConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub transitions: TransitionsConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Virtual screen size the sample screens lay out against
#[derive(Debug, Deserialize, Serialize)]
pub struct DisplayConfig {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
}

fn default_width() -> f32 {
    480.0
}

fn default_height() -> f32 {
    800.0
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Menu transition times
#[derive(Debug, Deserialize, Serialize)]
pub struct TransitionsConfig {
    #[serde(default = "default_transition_ms")]
    pub menu_on_ms: u64,
    #[serde(default = "default_transition_ms")]
    pub menu_off_ms: u64,
}

fn default_transition_ms() -> u64 {
    500
}

impl Default for TransitionsConfig {
    fn default() -> Self {
        Self {
            menu_on_ms: default_transition_ms(),
            menu_off_ms: default_transition_ms(),
        }
    }
}

impl TransitionsConfig {
    pub fn menu_on(&self) -> Duration {
        Duration::from_millis(self.menu_on_ms)
    }

    pub fn menu_off(&self) -> Duration {
        Duration::from_millis(self.menu_off_ms)
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DebugConfig {
    /// Log the screen stack after every frame
    #[serde(default)]
    pub trace_screens: bool,
    /// Draw the frame-rate counter
    #[serde(default)]
    pub show_fps: bool,
}

/// Where saved state lives; nothing is read or written when unset
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub state_file: Option<PathBuf>,
    #[serde(default)]
    pub scores_file: Option<PathBuf>,
}

impl CdxConfig {
    /// Load configuration from a file, or from `cdx.toml` in a directory
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config_path = if path.is_dir() {
            path.join("cdx.toml")
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            anyhow::bail!(
                "No config found at {}. Run `cdx init` to create one.",
                config_path.display()
            );
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: CdxConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(config)
    }

    /// The configuration `cdx init` writes: defaults plus storage files
    pub fn starter() -> Self {
        Self {
            storage: StorageConfig {
                state_file: Some(PathBuf::from("cdx_state.json")),
                scores_file: Some(PathBuf::from("cdx_scores.json")),
            },
            ..Self::default()
        }
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
