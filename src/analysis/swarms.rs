//! Short-burst swarm detection.
//!
//! A swarm is grown greedily from a seed event: every later, not yet claimed
//! event within the time window and within the radius of the *seed* joins
//! it. This is deliberately not a symmetric or density-based clustering;
//! downstream consumers depend on the seed-centred output.

use chrono::Duration;
use std::collections::HashSet;

use crate::geo::{centroid, event_distance_km};
use crate::model::{Event, SwarmEvent};

/// Clustering thresholds for swarm detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwarmParams {
    /// Maximum time from the seed to a member.
    pub window_hours: i64,
    /// Maximum distance from the seed to a member.
    pub radius_km: f64,
    /// Clusters smaller than this are discarded.
    pub min_events: usize,
}

impl Default for SwarmParams {
    fn default() -> Self {
        Self {
            window_hours: 72,
            radius_km: 10.0,
            min_events: 5,
        }
    }
}

/// Detects swarms using the default thresholds (72 h, 10 km, 5 events).
pub fn detect_swarms(events: &[Event]) -> Vec<SwarmEvent> {
    detect_swarms_with(events, &SwarmParams::default())
}

/// Detects swarms with explicit thresholds.
///
/// Output is ordered by start time, most recent first. The input is not
/// modified and may be in any order.
///
/// A seed whose cluster is too small is consumed, but the candidates it
/// gathered stay available to later seeds.
pub fn detect_swarms_with(events: &[Event], params: &SwarmParams) -> Vec<SwarmEvent> {
    swarms_in(events.iter().collect(), params)
}

/// Swarm detection over borrowed events, for callers that have already
/// grouped a snapshot without copying it.
pub(crate) fn swarms_in(mut sorted: Vec<&Event>, params: &SwarmParams) -> Vec<SwarmEvent> {
    // stable: equal timestamps keep input order
    sorted.sort_by_key(|e| e.time);

    // None: the window is wider than any representable span
    let window = Duration::try_hours(params.window_hours);
    let mut processed: HashSet<&str> = HashSet::new();
    let mut swarms = Vec::new();

    for (i, &seed) in sorted.iter().enumerate() {
        if processed.contains(seed.id.as_str()) {
            continue;
        }
        processed.insert(seed.id.as_str());

        let mut members: Vec<&Event> = vec![seed];
        for &candidate in &sorted[i + 1..] {
            // Sorted by time, so nothing further on can be inside the window.
            if window.is_some_and(|w| candidate.time - seed.time > w) {
                break;
            }
            if processed.contains(candidate.id.as_str()) {
                continue;
            }
            if event_distance_km(seed, candidate) <= params.radius_km {
                members.push(candidate);
            }
        }

        if members.len() < params.min_events {
            continue;
        }
        for member in &members[1..] {
            processed.insert(member.id.as_str());
        }
        swarms.push(build_swarm(seed, &members));
    }

    swarms.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    swarms
}

fn build_swarm(seed: &Event, members: &[&Event]) -> SwarmEvent {
    // members are already chronological: seed first, then scan order
    let start_time = members[0].time;
    let end_time = members[members.len() - 1].time;
    let peak_magnitude = members
        .iter()
        .map(|e| e.magnitude)
        .fold(f64::NEG_INFINITY, f64::max);

    SwarmEvent {
        id: format!("swarm-{}", seed.id),
        start_time,
        end_time,
        events: members.iter().map(|e| (*e).clone()).collect(),
        peak_magnitude,
        total_count: members.len(),
        region: seed.region.clone(),
        centroid: centroid(members.iter().copied()),
        duration_hours: (end_time - start_time).num_milliseconds() as f64 / 3_600_000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{event_at, t0};

    #[test]
    fn test_empty_input_yields_no_swarms() {
        assert!(detect_swarms(&[]).is_empty());
    }

    #[test]
    fn test_five_colocated_events_form_one_swarm() {
        let events: Vec<Event> = (0..5)
            .map(|i| {
                event_at(
                    &format!("ev{}", i),
                    2.0 + 0.25 * i as f64,
                    t0() + Duration::hours(i),
                    38.80,
                    -122.80,
                )
            })
            .collect();

        let swarms = detect_swarms(&events);
        assert_eq!(swarms.len(), 1);
        let s = &swarms[0];
        assert_eq!(s.total_count, 5);
        assert_eq!(s.peak_magnitude, 3.0);
        assert_eq!(s.id, "swarm-ev0");
        assert_eq!(s.start_time, t0());
        assert_eq!(s.end_time, t0() + Duration::hours(4));
        assert_eq!(s.duration_hours, 4.0);
        assert!((s.centroid.latitude - 38.80).abs() < 1e-12);
    }

    #[test]
    fn test_four_events_are_not_a_swarm() {
        let events: Vec<Event> = (0..4)
            .map(|i| event_at(&format!("ev{}", i), 2.0, t0() + Duration::hours(i), 38.8, -122.8))
            .collect();
        assert!(detect_swarms(&events).is_empty());
    }

    #[test]
    fn test_two_distant_groups_of_three_do_not_merge() {
        // 0.45 degrees of latitude is ~50 km.
        let mut events = Vec::new();
        for i in 0..3 {
            events.push(event_at(&format!("a{}", i), 2.0, t0() + Duration::minutes(i * 10), 38.80, -122.80));
            events.push(event_at(&format!("b{}", i), 2.0, t0() + Duration::minutes(i * 10 + 5), 39.25, -122.80));
        }
        assert!(detect_swarms(&events).is_empty());
    }

    #[test]
    fn test_window_is_measured_from_seed() {
        // Members spaced 20 h apart: the fifth is 80 h after the seed and
        // must not join even though it is 20 h after the fourth.
        let events: Vec<Event> = (0..5)
            .map(|i| event_at(&format!("ev{}", i), 2.0, t0() + Duration::hours(20 * i), 38.8, -122.8))
            .collect();
        let swarms = detect_swarms(&events);
        assert!(swarms.is_empty(), "80 h span must not produce a swarm from seed ev0");
    }

    #[test]
    fn test_radius_is_measured_from_seed() {
        // A chain of events 6 km apart: each is within 10 km of its
        // neighbour but the far end is 24 km from the seed.
        let step = 6.0 / 111.19;
        let events: Vec<Event> = (0..5)
            .map(|i| {
                event_at(
                    &format!("ev{}", i),
                    2.0,
                    t0() + Duration::hours(i),
                    38.0 + step * i as f64,
                    -122.0,
                )
            })
            .collect();
        assert!(detect_swarms(&events).is_empty());
    }

    #[test]
    fn test_radius_boundary_is_inclusive_just_inside_ten_km() {
        // Along a meridian haversine reduces to R * dlat, so these offsets
        // land at 9.99 km and 10.01 km from the seed.
        let km_per_degree = crate::geo::EARTH_RADIUS_KM.to_radians();
        let mut events: Vec<Event> = (0..4)
            .map(|i| event_at(&format!("ev{}", i), 2.0, t0() + Duration::hours(i), 38.0, -122.0))
            .collect();
        events.push(event_at("inside", 2.0, t0() + Duration::hours(4), 38.0 + 9.99 / km_per_degree, -122.0));
        events.push(event_at("outside", 2.0, t0() + Duration::hours(5), 38.0 + 10.01 / km_per_degree, -122.0));

        let swarms = detect_swarms(&events);
        assert_eq!(swarms.len(), 1);
        let ids: Vec<&str> = swarms[0].events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["ev0", "ev1", "ev2", "ev3", "inside"]);
    }

    #[test]
    fn test_oversized_window_does_not_panic() {
        let events: Vec<Event> = (0..5)
            .map(|i| event_at(&format!("ev{}", i), 2.0, t0() + Duration::days(365 * i), 38.8, -122.8))
            .collect();
        let params = SwarmParams { window_hours: i64::MAX, ..SwarmParams::default() };
        let swarms = detect_swarms_with(&events, &params);
        assert_eq!(swarms.len(), 1);
        assert_eq!(swarms[0].total_count, 5);
    }

    #[test]
    fn test_discarded_seed_candidates_remain_available() {
        // `lone` seeds first and gathers only x0 and x1, which is discarded.
        // x0 then seeds and claims x1..x4.
        let mut events = vec![event_at("lone", 1.0, t0(), 38.80, -122.80)];
        let near = 8.0 / 111.19;
        for i in 0..5 {
            let lat = if i < 2 { 38.80 + near / 2.0 } else { 38.80 + near * 1.5 };
            events.push(event_at(&format!("x{}", i), 2.0, t0() + Duration::hours(1 + i), lat, -122.80));
        }
        let swarms = detect_swarms(&events);
        assert_eq!(swarms.len(), 1);
        assert_eq!(swarms[0].id, "swarm-x0");
        assert_eq!(swarms[0].total_count, 5);
        assert!(swarms[0].events.iter().all(|e| e.id != "lone"));
    }

    #[test]
    fn test_tied_timestamps_keep_input_order_for_seeding() {
        let events: Vec<Event> = ["b", "a", "c", "d", "e"]
            .iter()
            .map(|id| event_at(id, 2.0, t0(), 38.8, -122.8))
            .collect();
        let swarms = detect_swarms(&events);
        assert_eq!(swarms.len(), 1);
        assert_eq!(swarms[0].id, "swarm-b");
        let ids: Vec<&str> = swarms[0].events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c", "d", "e"]);
    }

    #[test]
    fn test_output_is_most_recent_first() {
        let mut events = Vec::new();
        for i in 0..5 {
            events.push(event_at(&format!("old{}", i), 2.0, t0() + Duration::hours(i), 38.8, -122.8));
            events.push(event_at(&format!("new{}", i), 2.0, t0() + Duration::days(30) + Duration::hours(i), 38.8, -122.8));
        }
        let swarms = detect_swarms(&events);
        assert_eq!(swarms.len(), 2);
        assert_eq!(swarms[0].id, "swarm-new0");
        assert_eq!(swarms[1].id, "swarm-old0");
    }

    #[test]
    fn test_custom_params() {
        let events: Vec<Event> = (0..3)
            .map(|i| event_at(&format!("ev{}", i), 2.0, t0() + Duration::hours(i), 38.8, -122.8))
            .collect();
        let params = SwarmParams { min_events: 3, ..SwarmParams::default() };
        assert_eq!(detect_swarms_with(&events, &params).len(), 1);
    }
}
