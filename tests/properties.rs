//! Property-based tests for the swarm, episode and aggregate analyses.
//!
//! Uses proptest to check structural guarantees across many random event
//! collections confined to a small area so that clusters actually form.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use quakemon_service::analysis::{
    detect_swarm_episodes, detect_swarms, generate_time_series, magnitude_distribution,
};
use quakemon_service::geo::distance_km;
use quakemon_service::model::Event;
use std::collections::HashSet;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// (minutes offset, magnitude, lat, lon) tuples turned into events with
/// unique ids.
fn arb_events(max_len: usize) -> impl Strategy<Value = Vec<Event>> {
    prop::collection::vec(
        (0i64..(90 * 24 * 60), 0.0..9.99f64, 38.70..38.90f64, -122.90..-122.70f64),
        0..max_len,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (minutes, magnitude, latitude, longitude))| Event {
                id: format!("ev{:04}", i),
                magnitude,
                place: "test".to_string(),
                time: base_time() + Duration::minutes(minutes),
                latitude,
                longitude,
                depth_km: 3.0,
                felt: None,
                significance: 0,
                url: String::new(),
                region: "geysers".to_string(),
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// No event belongs to two swarms, and every member comes from the input.
    #[test]
    fn swarms_are_disjoint_subsets(events in arb_events(120)) {
        let input: HashSet<&str> = events.iter().map(|e| e.id.as_str()).collect();
        let mut seen = HashSet::new();
        for swarm in detect_swarms(&events) {
            for member in &swarm.events {
                prop_assert!(input.contains(member.id.as_str()));
                prop_assert!(seen.insert(member.id.clone()), "{} in two swarms", member.id);
            }
        }
    }

    /// Every member is within 72 h and 10 km of the seed, and members are
    /// chronological.
    #[test]
    fn swarm_members_stay_inside_seed_window(events in arb_events(120)) {
        for swarm in detect_swarms(&events) {
            let seed = &swarm.events[0];
            prop_assert_eq!(&swarm.id, &format!("swarm-{}", seed.id));
            prop_assert!(swarm.total_count >= 5);
            prop_assert_eq!(swarm.total_count, swarm.events.len());
            for member in &swarm.events {
                prop_assert!(member.time - seed.time <= Duration::hours(72));
                prop_assert!(member.time >= seed.time);
                let d = distance_km(seed.latitude, seed.longitude, member.latitude, member.longitude);
                prop_assert!(d <= 10.0, "member {} is {} km from seed", member.id, d);
            }
            prop_assert!(swarm.events.windows(2).all(|w| w[0].time <= w[1].time));
        }
    }

    /// Daily breakdowns are dense and account for every episode event.
    #[test]
    fn episode_days_cover_the_episode(events in arb_events(120)) {
        for ep in detect_swarm_episodes(&events) {
            prop_assert_eq!(ep.daily_breakdown.len(), ep.duration_days);
            let sum: usize = ep.daily_breakdown.iter().map(|d| d.count).sum();
            prop_assert_eq!(sum, ep.total_count);
            prop_assert_eq!(ep.daily_breakdown[0].date, ep.start_time.date_naive());
            prop_assert_eq!(ep.daily_breakdown[ep.duration_days - 1].date, ep.end_time.date_naive());
            for pair in ep.daily_breakdown.windows(2) {
                prop_assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
            }
            prop_assert!(ep.events.windows(2).all(|w| w[0].time <= w[1].time));
        }
    }

    /// Active days inside an episode are at most 14 days apart; separate
    /// episodes are more than 14 days apart.
    #[test]
    fn episodes_respect_the_gap_rule(events in arb_events(80)) {
        let episodes = detect_swarm_episodes(&events);
        for ep in &episodes {
            let active: Vec<_> = ep.daily_breakdown.iter().filter(|d| d.count > 0).map(|d| d.date).collect();
            for pair in active.windows(2) {
                prop_assert!((pair[1] - pair[0]).num_days() <= 14);
            }
        }
        // most recent first
        for pair in episodes.windows(2) {
            let newer_first = pair[0].start_time.date_naive();
            let older_last = pair[1].end_time.date_naive();
            prop_assert!((newer_first - older_last).num_days() > 14);
        }
    }

    /// With all magnitudes in [0, 10) every event lands in exactly one bin.
    #[test]
    fn distribution_accounts_for_every_event(events in arb_events(200)) {
        let total: usize = magnitude_distribution(&events).iter().map(|b| b.count).sum();
        prop_assert_eq!(total, events.len());
    }

    /// Time-series buckets partition the input.
    #[test]
    fn time_series_accounts_for_every_event(events in arb_events(200), interval in 1i64..60) {
        let total: usize = generate_time_series(&events, interval).iter().map(|p| p.count).sum();
        prop_assert_eq!(total, events.len());
    }

    /// Running the analyses twice on the same input gives equal output.
    #[test]
    fn analyses_are_idempotent(events in arb_events(120)) {
        prop_assert_eq!(detect_swarms(&events), detect_swarms(&events));
        prop_assert_eq!(detect_swarm_episodes(&events), detect_swarm_episodes(&events));
    }
}
