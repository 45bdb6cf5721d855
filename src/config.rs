//! Service configuration.
//!
//! Settings come from an optional TOML file, then from environment
//! variables (a `.env` file in the working directory is honoured via
//! `dotenv`). Every setting has a default, so the service runs with no
//! configuration at all.
//!
//! ```toml
//! regions_file = "regions.toml"
//!
//! [feed]
//! path = "data/all_month.geojson"
//!
//! [cache]
//! ttl_minutes = 60
//!
//! [analysis]
//! interval_days = 30
//!
//! [logging]
//! level = "info"
//! file = "quakemon.log"
//! timestamps = true
//! ```

use chrono::Duration;
use serde::Deserialize;
use std::path::Path;

use crate::analysis::DEFAULT_INTERVAL_DAYS;
use crate::cache::DEFAULT_TTL_MINUTES;
use crate::logging::LogLevel;
use crate::model::QuakeError;
use crate::regions::{builtin_regions, load_regions, Region};

pub const ENV_FEED_PATH: &str = "QUAKEMON_FEED_PATH";
pub const ENV_CACHE_TTL_MINUTES: &str = "QUAKEMON_CACHE_TTL_MINUTES";
pub const ENV_LOG_LEVEL: &str = "QUAKEMON_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "QUAKEMON_LOG_FILE";

/// Widest accepted time-series bucket: one century.
pub const MAX_INTERVAL_DAYS: i64 = 36_500;

// ---------------------------------------------------------------------------
// Config sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Alternative region catalog; the built-in catalog is used when unset.
    pub regions_file: Option<String>,
    pub feed: FeedConfig,
    pub cache: CacheConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub path: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            path: "all_month.geojson".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_minutes: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: DEFAULT_TTL_MINUTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub interval_days: i64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            interval_days: DEFAULT_INTERVAL_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Parses configuration from TOML text and validates it.
    pub fn from_toml(text: &str) -> Result<Self, QuakeError> {
        let config: Config =
            toml::from_str(text).map_err(|e| QuakeError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file. A missing file yields the defaults.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, QuakeError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| QuakeError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&text)
    }

    /// Full startup sequence: file, then `.env`, then process environment.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, QuakeError> {
        dotenv::dotenv().ok();
        let mut config = Self::load_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies environment-style overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), QuakeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_FEED_PATH) {
            self.feed.path = path;
        }
        if let Some(ttl) = lookup(ENV_CACHE_TTL_MINUTES) {
            self.cache.ttl_minutes = ttl.trim().parse().map_err(|_| {
                QuakeError::ConfigError(format!("{} must be an integer, got '{}'", ENV_CACHE_TTL_MINUTES, ttl))
            })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(file) = lookup(ENV_LOG_FILE) {
            self.logging.file = Some(file);
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), QuakeError> {
        if self.cache.ttl_minutes <= 0 {
            return Err(QuakeError::ConfigError(format!(
                "cache.ttl_minutes must be positive, got {}",
                self.cache.ttl_minutes
            )));
        }
        if Duration::try_minutes(self.cache.ttl_minutes).is_none() {
            return Err(QuakeError::ConfigError(format!(
                "cache.ttl_minutes is out of range, got {}",
                self.cache.ttl_minutes
            )));
        }
        if self.analysis.interval_days <= 0 || self.analysis.interval_days > MAX_INTERVAL_DAYS {
            return Err(QuakeError::ConfigError(format!(
                "analysis.interval_days must be between 1 and {}, got {}",
                MAX_INTERVAL_DAYS, self.analysis.interval_days
            )));
        }
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<LogLevel, QuakeError> {
        self.logging.level.parse()
    }

    /// Snapshot lifetime. Falls back to the default if the field was set
    /// out of range after validation.
    pub fn cache_ttl(&self) -> Duration {
        Duration::try_minutes(self.cache.ttl_minutes)
            .unwrap_or_else(|| Duration::minutes(DEFAULT_TTL_MINUTES))
    }

    /// The configured region catalog.
    pub fn regions(&self) -> Result<Vec<Region>, QuakeError> {
        match &self.regions_file {
            Some(path) => load_regions(path),
            None => Ok(builtin_regions()),
        }
    }
}
