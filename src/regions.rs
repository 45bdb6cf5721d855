//! Region catalog for the seismic activity monitoring service.
//!
//! Defines the set of named regions whose activity we roll up, along with
//! the fault and county labels shown next to them. The built-in catalog
//! covers the California swarm areas we watch by default; a deployment can
//! swap it for its own list with `load_regions`.
//!
//! The analysis layer only uses regions as iteration keys plus
//! pass-through metadata. `locate_region` is the simple radius-based
//! geocoder used by the bundled feed loader.

use crate::geo::distance_km;
use crate::model::{QuakeError, UNKNOWN_REGION};
use serde::Deserialize;
use std::path::Path;

// ---------------------------------------------------------------------------
// Region metadata
// ---------------------------------------------------------------------------

/// Metadata for a single monitored region.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Region {
    /// Stable identifier stored on each `Event`.
    pub key: String,
    /// Human-readable name.
    pub name: String,
    /// Principal fault or seismic zone.
    pub fault_line: String,
    pub county: String,
    /// Centre of the region, WGS84.
    pub latitude: f64,
    pub longitude: f64,
    /// Events within this distance of the centre belong to the region.
    pub radius_km: f64,
}

fn region(
    key: &str,
    name: &str,
    fault_line: &str,
    county: &str,
    latitude: f64,
    longitude: f64,
    radius_km: f64,
) -> Region {
    Region {
        key: key.to_string(),
        name: name.to_string(),
        fault_line: fault_line.to_string(),
        county: county.to_string(),
        latitude,
        longitude,
        radius_km,
    }
}

/// The default catalog, ordered roughly north to south.
///
/// Centres are approximate; radii are chosen so neighbouring regions do not
/// overlap.
pub fn builtin_regions() -> Vec<Region> {
    vec![
        region(
            "geysers",
            "The Geysers",
            "Maacama Fault",
            "Sonoma",
            38.79,
            -122.76,
            15.0,
        ),
        region(
            "san-ramon",
            "San Ramon Valley",
            "Calaveras Fault",
            "Contra Costa",
            37.78,
            -121.97,
            15.0,
        ),
        region(
            "hollister",
            "Hollister",
            "Calaveras Fault",
            "San Benito",
            36.85,
            -121.40,
            20.0,
        ),
        region(
            "parkfield",
            "Parkfield",
            "San Andreas Fault",
            "Monterey",
            35.90,
            -120.43,
            20.0,
        ),
        region(
            "long-valley",
            "Long Valley Caldera",
            "Hilton Creek Fault",
            "Mono",
            37.65,
            -118.90,
            25.0,
        ),
        region(
            "coso",
            "Coso Volcanic Field",
            "Coso Range",
            "Inyo",
            36.03,
            -117.80,
            20.0,
        ),
        region(
            "ridgecrest",
            "Ridgecrest",
            "Little Lake Fault Zone",
            "Kern",
            35.70,
            -117.50,
            20.0,
        ),
        region(
            "salton-sea",
            "Salton Sea",
            "Brawley Seismic Zone",
            "Imperial",
            33.10,
            -115.60,
            35.0,
        ),
    ]
}

/// Returns the keys of all regions in `regions`, in catalog order.
pub fn all_region_keys(regions: &[Region]) -> Vec<&str> {
    regions.iter().map(|r| r.key.as_str()).collect()
}

/// Looks up a region by key. Returns `None` if not found.
pub fn find_region<'a>(regions: &'a [Region], key: &str) -> Option<&'a Region> {
    regions.iter().find(|r| r.key == key)
}

/// Assigns a point to the nearest region whose radius contains it.
///
/// Returns `UNKNOWN_REGION` when the point falls outside every region.
/// On an exact distance tie the earlier catalog entry wins.
pub fn locate_region(regions: &[Region], latitude: f64, longitude: f64) -> String {
    let mut best: Option<(&Region, f64)> = None;
    for r in regions {
        let d = distance_km(latitude, longitude, r.latitude, r.longitude);
        if d > r.radius_km {
            continue;
        }
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((r, d)),
        }
    }
    best.map(|(r, _)| r.key.clone())
        .unwrap_or_else(|| UNKNOWN_REGION.to_string())
}

// ---------------------------------------------------------------------------
// Catalog files
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RegionFile {
    #[serde(rename = "region", default)]
    regions: Vec<Region>,
}

/// Parses a catalog from TOML text with one `[[region]]` table per entry.
pub fn parse_regions(text: &str) -> Result<Vec<Region>, QuakeError> {
    let file: RegionFile =
        toml::from_str(text).map_err(|e| QuakeError::ParseError(e.to_string()))?;
    if file.regions.is_empty() {
        return Err(QuakeError::ConfigError(
            "region catalog contains no [[region]] entries".to_string(),
        ));
    }
    let mut seen = std::collections::HashSet::new();
    for r in &file.regions {
        if r.key == UNKNOWN_REGION {
            return Err(QuakeError::ConfigError(format!(
                "region key '{}' is reserved",
                UNKNOWN_REGION
            )));
        }
        if !seen.insert(r.key.as_str()) {
            return Err(QuakeError::ConfigError(format!(
                "duplicate region key '{}'",
                r.key
            )));
        }
    }
    Ok(file.regions)
}

/// Loads a region catalog from a TOML file.
pub fn load_regions<P: AsRef<Path>>(path: P) -> Result<Vec<Region>, QuakeError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| QuakeError::Io(format!("{}: {}", path.display(), e)))?;
    parse_regions(&text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_duplicate_region_keys() {
        let mut seen = std::collections::HashSet::new();
        for r in builtin_regions() {
            assert!(seen.insert(r.key.clone()), "duplicate region key '{}'", r.key);
        }
    }

    #[test]
    fn test_unknown_is_not_a_region_key() {
        assert!(find_region(&builtin_regions(), UNKNOWN_REGION).is_none());
    }

    #[test]
    fn test_builtin_regions_do_not_overlap() {
        // Overlapping regions would make locate_region depend on catalog order.
        let regions = builtin_regions();
        for (i, a) in regions.iter().enumerate() {
            for b in &regions[i + 1..] {
                let d = distance_km(a.latitude, a.longitude, b.latitude, b.longitude);
                assert!(
                    d > a.radius_km + b.radius_km,
                    "'{}' and '{}' overlap ({:.1} km apart)",
                    a.key,
                    b.key,
                    d
                );
            }
        }
    }

    #[test]
    fn test_find_region_returns_correct_entry() {
        let regions = builtin_regions();
        let r = find_region(&regions, "geysers").expect("geysers should be in catalog");
        assert_eq!(r.county, "Sonoma");
    }

    #[test]
    fn test_all_region_keys_matches_catalog_length() {
        let regions = builtin_regions();
        assert_eq!(all_region_keys(&regions).len(), regions.len());
    }

    #[test]
    fn test_locate_region_at_centre() {
        let regions = builtin_regions();
        assert_eq!(locate_region(&regions, 38.79, -122.76), "geysers");
        assert_eq!(locate_region(&regions, 33.10, -115.60), "salton-sea");
    }

    #[test]
    fn test_locate_region_outside_everything_is_unknown() {
        // Middle of the Pacific.
        assert_eq!(locate_region(&builtin_regions(), 30.0, -140.0), UNKNOWN_REGION);
    }

    #[test]
    fn test_parse_regions_from_toml() {
        let text = r#"
            [[region]]
            key = "mammoth"
            name = "Mammoth Mountain"
            fault_line = "Mono-Inyo Craters"
            county = "Mono"
            latitude = 37.63
            longitude = -119.03
            radius_km = 10.0
        "#;
        let regions = parse_regions(text).expect("valid catalog should parse");
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].key, "mammoth");
        assert_eq!(regions[0].radius_km, 10.0);
    }

    #[test]
    fn test_parse_regions_rejects_duplicates_and_empty() {
        let dup = r#"
            [[region]]
            key = "a"
            name = "A"
            fault_line = "F"
            county = "C"
            latitude = 0.0
            longitude = 0.0
            radius_km = 1.0

            [[region]]
            key = "a"
            name = "A again"
            fault_line = "F"
            county = "C"
            latitude = 1.0
            longitude = 1.0
            radius_km = 1.0
        "#;
        assert!(matches!(parse_regions(dup), Err(QuakeError::ConfigError(_))));
        assert!(matches!(parse_regions(""), Err(QuakeError::ConfigError(_))));
        assert!(matches!(parse_regions("[[region]]\nkey = 3"), Err(QuakeError::ParseError(_))));
    }
}
