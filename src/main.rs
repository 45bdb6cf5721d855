//! `quakemon`: build an activity report from a saved USGS feed.
//!
//! Usage: `quakemon [config.toml]` (defaults to `./quakemon.toml`).
//! The report is written to stdout as JSON; logs go to stderr.

use std::process::ExitCode;

use chrono::Utc;
use quakemon_service::cache::SnapshotCache;
use quakemon_service::config::Config;
use quakemon_service::ingest::FeedFileLoader;
use quakemon_service::logging::{self, Component};
use quakemon_service::model::QuakeError;
use quakemon_service::report::build_report;

fn run() -> Result<(), QuakeError> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "quakemon.toml".to_string());
    let config = Config::load(&config_path)?;

    logging::init_logger(
        config.log_level()?,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    let regions = config.regions()?;
    logging::info(
        Component::System,
        None,
        &format!("Monitoring {} regions from {}", regions.len(), config.feed.path),
    );

    let loader = FeedFileLoader::new(&config.feed.path, regions.clone());
    let cache = SnapshotCache::new(loader, config.cache_ttl());
    let snapshot = cache.get()?;

    let report = build_report(&snapshot.events, &regions, config.analysis.interval_days, Utc::now());
    logging::info(
        Component::System,
        None,
        &format!(
            "Report: {} events, {} swarms, {} episodes",
            report.event_count,
            report.swarms.len(),
            report.episodes.len()
        ),
    );

    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| QuakeError::ParseError(format!("could not serialize report: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("quakemon: {}", e);
            ExitCode::FAILURE
        }
    }
}
