//! Activity analysis for the seismic monitoring service.
//!
//! Every function here is pure: it takes a borrowed slice of events, never
//! mutates it, and returns freshly built result structures.
//!
//! Submodules:
//! - `swarms`: greedy seed-centred clustering into short bursts.
//! - `episodes`: gap-segmented multi-week episodes with daily breakdowns.
//! - `aggregate`: time series, magnitude histogram, per-region rollups.

pub mod aggregate;
pub mod episodes;
pub mod swarms;

pub use aggregate::{
    generate_time_series, magnitude_distribution, region_stats, DEFAULT_INTERVAL_DAYS,
};
pub use episodes::{
    classify_day, classify_episode, detect_swarm_episodes, detect_swarm_episodes_with,
    EpisodeParams,
};
pub use swarms::{detect_swarms, detect_swarms_with, SwarmParams};
