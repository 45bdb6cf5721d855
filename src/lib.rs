//! Seismic swarm and episode monitoring.
//!
//! Ingests geotagged earthquake records and derives short-burst swarms,
//! multi-week episodes with daily intensity breakdowns, and rollup
//! statistics. The analysis layer is pure; the cache, ingest, config and
//! logging modules form the service shell around it.

pub mod analysis;
pub mod cache;
pub mod config;
pub mod geo;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod regions;
pub mod report;
