//! Multi-week swarm episode detection.
//!
//! Events are bucketed by UTC calendar day. Consecutive active days stay in
//! the same episode as long as the quiet gap between them is at most
//! `max_gap_days`; a longer gap closes the episode. Each qualifying episode
//! carries a dense day-by-day breakdown, including days with no events.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::geo::centroid;
use crate::model::{DailyActivityCluster, DailyIntensity, Event, EpisodeIntensity, SwarmEpisode};

/// Segmentation thresholds for episode detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeParams {
    /// A gap of more than this many days between active dates splits episodes.
    pub max_gap_days: i64,
    /// Buffers with fewer events are not reported.
    pub min_events: usize,
}

impl Default for EpisodeParams {
    fn default() -> Self {
        Self {
            max_gap_days: 14,
            min_events: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classifies a single day. Count and magnitude rules are checked together
/// at each level, strongest level first.
pub fn classify_day(count: usize, peak_magnitude: f64) -> DailyIntensity {
    if count >= 20 || peak_magnitude >= 4.0 {
        DailyIntensity::Extreme
    } else if count >= 10 || peak_magnitude >= 3.5 {
        DailyIntensity::High
    } else if count >= 5 || peak_magnitude >= 3.0 {
        DailyIntensity::Moderate
    } else if count >= 2 {
        DailyIntensity::Low
    } else {
        DailyIntensity::Quiet
    }
}

/// Classifies a whole episode from its totals.
pub fn classify_episode(total_count: usize, peak_magnitude: f64, active_days: usize) -> EpisodeIntensity {
    if total_count >= 50 || peak_magnitude >= 4.5 || (active_days >= 10 && total_count >= 30) {
        EpisodeIntensity::Major
    } else if total_count >= 25 || peak_magnitude >= 4.0 || (active_days >= 7 && total_count >= 15) {
        EpisodeIntensity::Significant
    } else if total_count >= 12 || peak_magnitude >= 3.5 || active_days >= 5 {
        EpisodeIntensity::Moderate
    } else {
        EpisodeIntensity::Minor
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Detects episodes using the default thresholds (14-day gap, 5 events).
pub fn detect_swarm_episodes(events: &[Event]) -> Vec<SwarmEpisode> {
    detect_swarm_episodes_with(events, &EpisodeParams::default())
}

/// Detects episodes with explicit thresholds.
///
/// Output is ordered by start time, most recent first.
pub fn detect_swarm_episodes_with(events: &[Event], params: &EpisodeParams) -> Vec<SwarmEpisode> {
    episodes_in(events.iter().collect(), params)
}

/// Episode detection over borrowed events.
pub(crate) fn episodes_in(mut sorted: Vec<&Event>, params: &EpisodeParams) -> Vec<SwarmEpisode> {
    sorted.sort_by_key(|e| e.time);

    let mut by_date: BTreeMap<NaiveDate, Vec<&Event>> = BTreeMap::new();
    for event in sorted {
        by_date.entry(event.time.date_naive()).or_default().push(event);
    }

    let mut episodes = Vec::new();
    let mut buffer: Vec<&Event> = Vec::new();
    let mut buffer_dates: Vec<NaiveDate> = Vec::new();

    for (&date, day_events) in &by_date {
        if let Some(&prev) = buffer_dates.last() {
            if (date - prev).num_days() > params.max_gap_days {
                if let Some(ep) = close_buffer(&buffer, &buffer_dates, &by_date, params) {
                    episodes.push(ep);
                }
                buffer.clear();
                buffer_dates.clear();
            }
        }
        buffer.extend(day_events.iter().copied());
        buffer_dates.push(date);
    }
    if let Some(ep) = close_buffer(&buffer, &buffer_dates, &by_date, params) {
        episodes.push(ep);
    }

    episodes.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    episodes
}

fn close_buffer(
    buffer: &[&Event],
    dates: &[NaiveDate],
    by_date: &BTreeMap<NaiveDate, Vec<&Event>>,
    params: &EpisodeParams,
) -> Option<SwarmEpisode> {
    // The date check can't fail once the count check passes; kept as a guard.
    if buffer.len() < params.min_events || dates.is_empty() {
        return None;
    }
    Some(build_episode(buffer, dates[0], dates[dates.len() - 1], by_date))
}

fn build_episode(
    events: &[&Event],
    first_date: NaiveDate,
    last_date: NaiveDate,
    by_date: &BTreeMap<NaiveDate, Vec<&Event>>,
) -> SwarmEpisode {
    let first = events[0];
    let last = events[events.len() - 1];
    let total_count = events.len();
    let peak_magnitude = events.iter().map(|e| e.magnitude).fold(f64::NEG_INFINITY, f64::max);
    let mean_magnitude = events.iter().map(|e| e.magnitude).sum::<f64>() / total_count as f64;

    let mut daily_breakdown = Vec::new();
    let mut day = first_date;
    while day <= last_date {
        let members: &[&Event] = by_date.get(&day).map(|v| v.as_slice()).unwrap_or(&[]);
        daily_breakdown.push(build_day(day, members));
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    let active_days = daily_breakdown.iter().filter(|d| d.count >= 1).count();

    let mut peak_day = None;
    let mut peak_count = 0;
    for d in &daily_breakdown {
        if d.count > peak_count {
            peak_count = d.count;
            peak_day = Some(d.date);
        }
    }

    SwarmEpisode {
        id: format!("episode-{}-{}", first.id, last.id),
        start_time: first.time,
        end_time: last.time,
        events: events.iter().map(|e| (*e).clone()).collect(),
        duration_days: daily_breakdown.len(),
        daily_breakdown,
        total_count,
        peak_magnitude,
        mean_magnitude,
        centroid: centroid(events.iter().copied()),
        active_days,
        peak_day,
        intensity: classify_episode(total_count, peak_magnitude, active_days),
    }
}

fn build_day(date: NaiveDate, members: &[&Event]) -> DailyActivityCluster {
    let count = members.len();
    let (peak_magnitude, mean_magnitude) = if count == 0 {
        (0.0, 0.0)
    } else {
        let peak = members.iter().map(|e| e.magnitude).fold(f64::NEG_INFINITY, f64::max);
        let mean = members.iter().map(|e| e.magnitude).sum::<f64>() / count as f64;
        (peak, mean)
    };
    DailyActivityCluster {
        date,
        events: members.iter().map(|e| (*e).clone()).collect(),
        count,
        peak_magnitude,
        mean_magnitude,
        intensity: classify_day(count, peak_magnitude),
    }
}
