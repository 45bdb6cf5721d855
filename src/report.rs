//! Activity reports assembled from a single snapshot.
//!
//! A report bundles every analysis output for one snapshot so the
//! presentation layer never mixes results computed from different loads.
//! Per-region work is independent and runs on scoped threads, each over its
//! own read-only filtered view of the snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::thread::ScopedJoinHandle;

use crate::analysis::aggregate::{group_by_region, region_rollup};
use crate::analysis::episodes::episodes_in;
use crate::analysis::swarms::swarms_in;
use crate::analysis::{generate_time_series, magnitude_distribution, EpisodeParams, SwarmParams};
use crate::logging::{self, Component};
use crate::model::{
    Event, MagnitudeBucket, RegionStats, SwarmEpisode, SwarmEvent, TimeSeriesPoint,
};
use crate::regions::Region;

/// Everything the dashboard needs, computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    pub generated_at: DateTime<Utc>,
    pub event_count: usize,
    pub swarms: Vec<SwarmEvent>,
    pub episodes: Vec<SwarmEpisode>,
    pub region_stats: Vec<RegionStats>,
    pub time_series: Vec<TimeSeriesPoint>,
    pub magnitude_distribution: Vec<MagnitudeBucket>,
}

/// Swarms, episodes and rollup for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionActivity {
    pub region: String,
    pub swarms: Vec<SwarmEvent>,
    pub episodes: Vec<SwarmEpisode>,
    pub stats: RegionStats,
}

/// Runs the per-region analysis for every catalog region in parallel.
///
/// Output follows catalog order. Events outside the catalog are ignored.
pub fn analyze_regions(events: &[Event], regions: &[Region]) -> Vec<RegionActivity> {
    let by_region = group_by_region(events);

    std::thread::scope(|scope| {
        let handles: Vec<_> = regions
            .iter()
            .map(|region| {
                let subset: &[&Event] = by_region.get(region.key.as_str()).map(|v| v.as_slice()).unwrap_or(&[]);
                scope.spawn(move || analyze_region(region, subset))
            })
            .collect();
        join_in_order(handles)
    })
}

/// Joins scoped workers in spawn order. A worker panic is re-raised on the
/// calling thread with its original payload.
fn join_in_order<T>(handles: Vec<ScopedJoinHandle<'_, T>>) -> Vec<T> {
    handles
        .into_iter()
        .map(|handle| {
            handle.join().unwrap_or_else(|payload| {
                logging::error(Component::System, None, "Region worker panicked");
                std::panic::resume_unwind(payload)
            })
        })
        .collect()
}

fn analyze_region(region: &Region, events: &[&Event]) -> RegionActivity {
    let swarms = swarms_in(events.to_vec(), &SwarmParams::default());
    let episodes = episodes_in(events.to_vec(), &EpisodeParams::default());
    logging::log_analysis_summary(Component::Swarm, Some(&region.key), events.len(), swarms.len());
    logging::log_analysis_summary(Component::Episode, Some(&region.key), events.len(), episodes.len());
    RegionActivity {
        region: region.key.clone(),
        stats: region_rollup(region, events),
        swarms,
        episodes,
    }
}

/// Builds a full report from one snapshot.
///
/// Swarms and episodes are detected per region (events never cluster across
/// region boundaries), then merged most recent first. The time series and
/// histogram cover the whole snapshot, including events outside any region.
pub fn build_report(
    events: &[Event],
    regions: &[Region],
    interval_days: i64,
    generated_at: DateTime<Utc>,
) -> ActivityReport {
    let per_region = analyze_regions(events, regions);

    let mut swarms = Vec::new();
    let mut episodes = Vec::new();
    let mut region_stats = Vec::with_capacity(per_region.len());
    for activity in per_region {
        swarms.extend(activity.swarms);
        episodes.extend(activity.episodes);
        region_stats.push(activity.stats);
    }
    swarms.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    episodes.sort_by(|a, b| b.start_time.cmp(&a.start_time));

    let time_series = generate_time_series(events, interval_days);
    logging::log_analysis_summary(Component::Aggregate, None, events.len(), time_series.len());

    ActivityReport {
        generated_at,
        event_count: events.len(),
        swarms,
        episodes,
        region_stats,
        time_series,
        magnitude_distribution: magnitude_distribution(events),
    }
}
