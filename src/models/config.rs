//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Source page and output layout
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// HTTP behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Self::default();
        }

        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Config load failed from {:?}: {}. Using defaults.", path, e);
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.tracker.state_file.trim().is_empty() {
            return Err(AppError::validation("tracker.state_file is empty"));
        }
        if self.tracker.extensions.is_empty() {
            return Err(AppError::validation("tracker.extensions is empty"));
        }
        url::Url::parse(&self.tracker.source_url).map_err(|e| {
            AppError::validation(format!(
                "tracker.source_url '{}' is not a valid URL: {e}",
                self.tracker.source_url
            ))
        })?;
        Ok(())
    }
}

/// Where plans come from and where results go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Page listing the procurement plan spreadsheets
    #[serde(default = "defaults::source_url")]
    pub source_url: String,

    /// Directory receiving JSON outputs and the state file
    #[serde(default = "defaults::output_dir")]
    pub output_dir: PathBuf,

    /// State file name inside `output_dir`
    #[serde(default = "defaults::state_file")]
    pub state_file: String,

    /// Link extensions treated as spreadsheets (without the dot)
    #[serde(default = "defaults::extensions")]
    pub extensions: Vec<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            source_url: defaults::source_url(),
            output_dir: defaults::output_dir(),
            state_file: defaults::state_file(),
            extensions: defaults::extensions(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between spreadsheet downloads in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Tracker defaults
    pub fn source_url() -> String {
        "https://dzp.agh.edu.pl/dla-jednostek-agh/plany-zamowien-publicznych".into()
    }
    pub fn output_dir() -> PathBuf {
        PathBuf::from("./cpv")
    }
    pub fn state_file() -> String {
        ".procurement_tracker.json".into()
    }
    pub fn extensions() -> Vec<String> {
        vec!["xls".into(), "xlsx".into()]
    }

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/94.0.4606.81 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        0
    }
}
