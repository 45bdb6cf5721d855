//! Core data types for the seismic activity monitoring service.
//!
//! This module defines the shared domain model imported by all other modules:
//! the raw `Event` handed to us by the loader, the derived swarm/episode
//! structures, the rollup statistics, and the service error type.
//! It contains no analysis logic and no I/O.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Region identifier assigned when no catalog region matched an event.
pub const UNKNOWN_REGION: &str = "unknown";

// ---------------------------------------------------------------------------
// Raw events
// ---------------------------------------------------------------------------

/// A single reported earthquake, as supplied by the upstream loader.
///
/// Events are immutable once constructed. Coordinates and depth are not
/// validated here; the loader is responsible for handing us finite values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub magnitude: f64,
    pub place: String,
    pub time: DateTime<Utc>, // millisecond precision from the feed
    pub latitude: f64,
    pub longitude: f64,
    pub depth_km: f64,
    pub felt: Option<u32>,
    pub significance: u32,
    pub url: String,
    pub region: String, // UNKNOWN_REGION when geocoding found nothing
}

// ---------------------------------------------------------------------------
// Swarms
// ---------------------------------------------------------------------------

/// A short burst of events clustered around a seed event in time and space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwarmEvent {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Members in chronological order; the seed is always first.
    pub events: Vec<Event>,
    pub peak_magnitude: f64,
    pub total_count: usize,
    pub region: String,
    pub centroid: Centroid,
    pub duration_hours: f64,
}

/// Arithmetic mean of member coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub latitude: f64,
    pub longitude: f64,
}

// ---------------------------------------------------------------------------
// Episodes
// ---------------------------------------------------------------------------

/// Activity level of a single calendar day inside an episode, in ascending
/// order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DailyIntensity {
    Quiet,
    Low,
    Moderate,
    High,
    Extreme,
}

impl DailyIntensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            DailyIntensity::Quiet => "quiet",
            DailyIntensity::Low => "low",
            DailyIntensity::Moderate => "moderate",
            DailyIntensity::High => "high",
            DailyIntensity::Extreme => "extreme",
        }
    }
}

impl fmt::Display for DailyIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall classification of an episode, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeIntensity {
    Minor,
    Moderate,
    Significant,
    Major,
}

impl EpisodeIntensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            EpisodeIntensity::Minor => "minor",
            EpisodeIntensity::Moderate => "moderate",
            EpisodeIntensity::Significant => "significant",
            EpisodeIntensity::Major => "major",
        }
    }
}

impl fmt::Display for EpisodeIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All events that occurred on one UTC calendar day of an episode.
///
/// Quiet days inside an episode are represented with an empty event list and
/// zero-valued magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyActivityCluster {
    pub date: NaiveDate,
    pub events: Vec<Event>,
    pub count: usize,
    pub peak_magnitude: f64,
    pub mean_magnitude: f64,
    pub intensity: DailyIntensity,
}

/// A multi-day sequence of sustained activity, bounded on both sides by
/// quiet gaps longer than the episode gap threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwarmEpisode {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub events: Vec<Event>,
    /// One entry per calendar day from start to end inclusive, no gaps.
    pub daily_breakdown: Vec<DailyActivityCluster>,
    pub total_count: usize,
    pub peak_magnitude: f64,
    pub mean_magnitude: f64,
    pub centroid: Centroid,
    pub duration_days: usize,
    pub active_days: usize,
    pub peak_day: Option<NaiveDate>,
    pub intensity: EpisodeIntensity,
}

// ---------------------------------------------------------------------------
// Rollups
// ---------------------------------------------------------------------------

/// Summary statistics for one catalog region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    pub region: String,
    pub name: String,
    pub fault_line: String,
    pub county: String,
    pub total_count: usize,
    pub mean_magnitude: f64,
    pub max_magnitude: f64,
    pub mean_depth_km: f64,
    pub swarm_count: usize,
    pub events_per_year: f64,
    /// Unix epoch when the region has no events.
    pub last_activity: DateTime<Utc>,
}

/// One fixed-width bucket of a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub bucket_start: DateTime<Utc>,
    pub count: usize,
    pub max_magnitude: f64,
    pub mean_magnitude: f64,
    /// Sum of 10^(1.5 * M) over bucket members.
    pub energy: f64,
}

/// One bin of the magnitude histogram. `upper` is `None` for the open
/// "5+" bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeBucket {
    pub label: String,
    pub lower: f64,
    pub upper: Option<f64>,
    pub count: usize,
    pub percentage: f64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when loading events or configuration.
///
/// The analysis functions themselves never fail; empty input produces empty
/// or zero-valued output.
#[derive(Debug, Clone, PartialEq)]
pub enum QuakeError {
    /// A file could not be read.
    Io(String),
    /// A feed or catalog body could not be deserialized.
    ParseError(String),
    /// A configuration value was missing or malformed.
    ConfigError(String),
    /// The feed parsed but contained no usable events.
    EmptyFeed(String),
    /// A loader reported a failure of its own.
    LoaderFailed(String),
}

impl fmt::Display for QuakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuakeError::Io(msg) => write!(f, "I/O error: {}", msg),
            QuakeError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            QuakeError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            QuakeError::EmptyFeed(source) => write!(f, "No usable events in feed: {}", source),
            QuakeError::LoaderFailed(msg) => write!(f, "Loader failed: {}", msg),
        }
    }
}

impl std::error::Error for QuakeError {}

impl From<std::io::Error> for QuakeError {
    fn from(err: std::io::Error) -> Self {
        QuakeError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_ordering_is_ascending_severity() {
        assert!(DailyIntensity::Quiet < DailyIntensity::Low);
        assert!(DailyIntensity::High < DailyIntensity::Extreme);
        assert!(EpisodeIntensity::Minor < EpisodeIntensity::Moderate);
        assert!(EpisodeIntensity::Significant < EpisodeIntensity::Major);
    }

    #[test]
    fn test_intensity_serializes_lowercase() {
        let json = serde_json::to_string(&DailyIntensity::Extreme).unwrap();
        assert_eq!(json, "\"extreme\"");
        let json = serde_json::to_string(&EpisodeIntensity::Significant).unwrap();
        assert_eq!(json, "\"significant\"");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            QuakeError::ParseError("bad json".into()).to_string(),
            "Parse error: bad json"
        );
        assert_eq!(
            QuakeError::EmptyFeed("feed.geojson".into()).to_string(),
            "No usable events in feed: feed.geojson"
        );
    }
}
