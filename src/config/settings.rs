use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::progress::calculator::StreakPolicy;

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "HABITLINE_CONFIG";

fn default_rate_window() -> u32 {
    30
}
fn default_trend_window() -> u32 {
    7
}
fn default_chart_window() -> u32 {
    30
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_rate_window")]
    pub rate_window_days: u32,
    #[serde(default = "default_trend_window")]
    pub trend_window_days: u32,
    #[serde(default = "default_chart_window")]
    pub chart_window_days: u32,
    #[serde(default)]
    pub streak_policy: StreakPolicy,
    /// Use `currentStreak`/`longestStreak` from the feed when the server sent them.
    #[serde(default = "default_true")]
    pub prefer_server_streaks: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            rate_window_days: default_rate_window(),
            trend_window_days: default_trend_window(),
            chart_window_days: default_chart_window(),
            streak_policy: StreakPolicy::default(),
            prefer_server_streaks: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Habits feed used when `--file` is not given.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "habitline")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    /// Explicit `--file` wins over the configured feed path.
    pub fn resolve_feed(&self, cli_file: Option<&Path>) -> Option<PathBuf> {
        cli_file
            .map(Path::to_path_buf)
            .or_else(|| self.feed.path.clone())
    }
}
