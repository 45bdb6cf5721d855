//! Rollup statistics: time series, magnitude histogram, per-region stats.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::analysis::swarms::{swarms_in, SwarmParams};
use crate::model::{Event, MagnitudeBucket, RegionStats, TimeSeriesPoint};
use crate::regions::Region;

/// Default time-series bucket width.
pub const DEFAULT_INTERVAL_DAYS: i64 = 30;

const MS_PER_YEAR: f64 = 365.0 * 24.0 * 3_600_000.0;

/// `last_activity` for regions that have never recorded an event.
fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

/// Radiated-energy proxy from the Gutenberg-Richter energy relation.
pub fn energy_proxy(magnitude: f64) -> f64 {
    10f64.powf(1.5 * magnitude)
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

/// Buckets events into consecutive half-open `[start, start + interval)`
/// windows, starting at the earliest event and continuing until the window
/// start passes the latest event. Empty windows are kept with zero values.
///
/// Returns an empty series for empty input or a non-positive interval. An
/// interval too wide for the calendar puts the remaining events in one
/// final bucket.
pub fn generate_time_series(events: &[Event], interval_days: i64) -> Vec<TimeSeriesPoint> {
    if events.is_empty() || interval_days <= 0 {
        return Vec::new();
    }
    let mut sorted: Vec<&Event> = events.iter().collect();
    sorted.sort_by_key(|e| e.time);

    let interval = Duration::try_days(interval_days);
    let last_time = sorted[sorted.len() - 1].time;
    let mut bucket_start = sorted[0].time;
    let mut idx = 0;
    let mut points = Vec::new();

    while bucket_start <= last_time {
        let Some(bucket_end) = interval.and_then(|i| bucket_start.checked_add_signed(i)) else {
            points.push(build_point(bucket_start, &sorted[idx..]));
            break;
        };
        let from = idx;
        while idx < sorted.len() && sorted[idx].time < bucket_end {
            idx += 1;
        }
        points.push(build_point(bucket_start, &sorted[from..idx]));
        bucket_start = bucket_end;
    }
    points
}

fn build_point(bucket_start: DateTime<Utc>, members: &[&Event]) -> TimeSeriesPoint {
    let count = members.len();
    if count == 0 {
        return TimeSeriesPoint {
            bucket_start,
            count: 0,
            max_magnitude: 0.0,
            mean_magnitude: 0.0,
            energy: 0.0,
        };
    }
    TimeSeriesPoint {
        bucket_start,
        count,
        max_magnitude: members.iter().map(|e| e.magnitude).fold(f64::NEG_INFINITY, f64::max),
        mean_magnitude: members.iter().map(|e| e.magnitude).sum::<f64>() / count as f64,
        energy: members.iter().map(|e| energy_proxy(e.magnitude)).sum(),
    }
}

// ---------------------------------------------------------------------------
// Magnitude distribution
// ---------------------------------------------------------------------------

/// Fixed histogram bins: `[0,1)` through `[4,5)`, then `5+`.
const MAGNITUDE_BINS: &[(&str, f64, Option<f64>)] = &[
    ("0-1", 0.0, Some(1.0)),
    ("1-2", 1.0, Some(2.0)),
    ("2-3", 2.0, Some(3.0)),
    ("3-4", 3.0, Some(4.0)),
    ("4-5", 4.0, Some(5.0)),
    ("5+", 5.0, None),
];

/// Histogram of event magnitudes over the fixed bins.
///
/// Percentages are relative to the full input length; negative magnitudes
/// fall in no bin but still count toward the total.
pub fn magnitude_distribution(events: &[Event]) -> Vec<MagnitudeBucket> {
    let total = events.len();
    MAGNITUDE_BINS
        .iter()
        .map(|&(label, lower, upper)| {
            let count = events
                .iter()
                .filter(|e| e.magnitude >= lower && upper.is_none_or(|u| e.magnitude < u))
                .count();
            let percentage = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            };
            MagnitudeBucket {
                label: label.to_string(),
                lower,
                upper,
                count,
                percentage,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Region stats
// ---------------------------------------------------------------------------

/// Per-region rollups, one entry per catalog region in catalog order.
///
/// Regions with no events get a zero-valued record whose `last_activity` is
/// the Unix epoch.
pub fn region_stats(events: &[Event], regions: &[Region]) -> Vec<RegionStats> {
    let by_region = group_by_region(events);
    regions
        .iter()
        .map(|r| {
            let subset = by_region.get(r.key.as_str()).map(|v| v.as_slice()).unwrap_or(&[]);
            region_rollup(r, subset)
        })
        .collect()
}

/// Borrowed events keyed by region id, in input order.
pub(crate) fn group_by_region(events: &[Event]) -> HashMap<&str, Vec<&Event>> {
    let mut by_region: HashMap<&str, Vec<&Event>> = HashMap::new();
    for event in events {
        by_region.entry(event.region.as_str()).or_default().push(event);
    }
    by_region
}

/// Rollup for a single region given the events already filtered to it.
pub fn stats_for_region(region: &Region, events: &[Event]) -> RegionStats {
    region_rollup(region, &events.iter().collect::<Vec<_>>())
}

pub(crate) fn region_rollup(region: &Region, events: &[&Event]) -> RegionStats {
    let mut stats = RegionStats {
        region: region.key.clone(),
        name: region.name.clone(),
        fault_line: region.fault_line.clone(),
        county: region.county.clone(),
        total_count: 0,
        mean_magnitude: 0.0,
        max_magnitude: 0.0,
        mean_depth_km: 0.0,
        swarm_count: 0,
        events_per_year: 0.0,
        last_activity: epoch(),
    };
    if events.is_empty() {
        return stats;
    }

    let n = events.len() as f64;
    let first = events.iter().map(|e| e.time).min().unwrap_or(epoch());
    let last = events.iter().map(|e| e.time).max().unwrap_or(epoch());
    let years = ((last - first).num_milliseconds() as f64 / MS_PER_YEAR).max(1.0);

    stats.total_count = events.len();
    stats.mean_magnitude = events.iter().map(|e| e.magnitude).sum::<f64>() / n;
    stats.max_magnitude = events.iter().map(|e| e.magnitude).fold(f64::NEG_INFINITY, f64::max);
    stats.mean_depth_km = events.iter().map(|e| e.depth_km).sum::<f64>() / n;
    stats.swarm_count = swarms_in(events.to_vec(), &SwarmParams::default()).len();
    stats.events_per_year = events.len() as f64 / years;
    stats.last_activity = last;
    stats
}
