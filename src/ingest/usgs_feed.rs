//! USGS earthquake GeoJSON feed parsing
//!
//! Parses the FeatureCollection format served by the USGS earthquake
//! catalog (summary feeds and FDSN `format=geojson` queries) into `Event`s.
//!
//! Format documentation: https://earthquake.usgs.gov/earthquakes/feed/v1.0/geojson.php

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::ingest::EventLoader;
use crate::model::{Event, QuakeError};
use crate::regions::{locate_region, Region};

// ============================================================================
// Feed Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub id: String,
    pub properties: FeatureProperties,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
pub struct FeatureProperties {
    pub mag: Option<f64>,
    pub place: Option<String>,
    pub time: i64, // epoch milliseconds
    pub felt: Option<u32>,
    pub sig: Option<u32>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    /// `[longitude, latitude, depth_km]`
    pub coordinates: Vec<f64>,
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a GeoJSON feed body, tagging each event with a region via `locate`.
///
/// Features without a magnitude or a usable point geometry are skipped.
/// Negative depths (events above the sea-level datum) are clamped to zero.
pub fn parse_feed<F>(json: &str, locate: F) -> Result<Vec<Event>, QuakeError>
where
    F: Fn(f64, f64) -> String,
{
    let collection: FeatureCollection =
        serde_json::from_str(json).map_err(|e| QuakeError::ParseError(e.to_string()))?;

    let mut events = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        if let Some(event) = feature_to_event(feature, &locate)? {
            events.push(event);
        }
    }
    Ok(events)
}

fn feature_to_event<F>(feature: Feature, locate: &F) -> Result<Option<Event>, QuakeError>
where
    F: Fn(f64, f64) -> String,
{
    let Some(magnitude) = feature.properties.mag else {
        return Ok(None);
    };
    let Some(geometry) = feature.geometry else {
        return Ok(None);
    };
    if geometry.coordinates.len() < 2 {
        return Ok(None);
    }
    let longitude = geometry.coordinates[0];
    let latitude = geometry.coordinates[1];
    let depth_km = geometry.coordinates.get(2).copied().unwrap_or(0.0).max(0.0);

    let time = DateTime::<Utc>::from_timestamp_millis(feature.properties.time).ok_or_else(|| {
        QuakeError::ParseError(format!(
            "feature {} has out-of-range time {}",
            feature.id, feature.properties.time
        ))
    })?;

    Ok(Some(Event {
        region: locate(latitude, longitude),
        id: feature.id,
        magnitude,
        place: feature.properties.place.unwrap_or_default(),
        time,
        latitude,
        longitude,
        depth_km,
        felt: feature.properties.felt,
        significance: feature.properties.sig.unwrap_or(0),
        url: feature.properties.url.unwrap_or_default(),
    }))
}

// ============================================================================
// File Loader
// ============================================================================

/// Loads events from a GeoJSON feed file previously saved to disk.
pub struct FeedFileLoader {
    path: PathBuf,
    regions: Vec<Region>,
}

impl FeedFileLoader {
    pub fn new<P: AsRef<Path>>(path: P, regions: Vec<Region>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            regions,
        }
    }
}

impl EventLoader for FeedFileLoader {
    fn load(&self) -> Result<Vec<Event>, QuakeError> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| QuakeError::Io(format!("{}: {}", self.path.display(), e)))?;
        let events = parse_feed(&text, |lat, lon| locate_region(&self.regions, lat, lon))?;
        if events.is_empty() {
            return Err(QuakeError::EmptyFeed(self.path.display().to_string()));
        }
        Ok(events)
    }

    fn describe(&self) -> String {
        format!("feed file {}", self.path.display())
    }
}

// ============================================================================
// Tests
// ============================================================================
