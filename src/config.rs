use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::theme::Theme;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub editor: EditorConfig,
    pub theme_name: String,
    pub log_level: String,
    #[serde(skip)]
    pub theme: Theme,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub tab_stop: usize,
    /// Extra Ctrl-Q presses needed to quit with unsaved changes
    pub quit_times: u32,
    /// Typed twice in insert mode, leaves to normal mode
    pub escape_chord: char,
    pub escape_chord_timeout_ms: u64,
    pub reparse_throttle_ms: u64,
    pub message_timeout_secs: u64,
    /// Oldest undo snapshots are dropped past this many; 0 keeps them all
    pub undo_limit: usize,
    pub tree_sitter: bool,
    pub system_clipboard: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_stop: 4,
            quit_times: 3,
            escape_chord: 'j',
            escape_chord_timeout_ms: 150,
            reparse_throttle_ms: 1000,
            message_timeout_secs: 5,
            undo_limit: 0,
            tree_sitter: true,
            system_clipboard: true,
        }
    }
}

impl EditorConfig {
    pub fn escape_chord_timeout(&self) -> Duration {
        Duration::from_millis(self.escape_chord_timeout_ms)
    }

    pub fn reparse_throttle(&self) -> Duration {
        Duration::from_millis(self.reparse_throttle_ms)
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_secs(self.message_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
            theme_name: String::from("classic"),
            log_level: String::from("info"),
            theme: Theme::classic(),
        }
    }
}

impl Config {
    /// Read the user's config file. A missing file gives the defaults.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
            Self::from_toml(&content)
                .with_context(|| format!("Failed to parse config: {}", config_path.display()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        if !Theme::available_themes().contains(&config.theme_name.to_lowercase().as_str()) {
            tracing::warn!(theme = %config.theme_name, "unknown theme, using classic");
        }
        config.theme = Theme::from_name(&config.theme_name);
        Ok(config)
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("com", "dim", "dim").context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}
