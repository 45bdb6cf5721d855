//! Event ingestion at the loader boundary.
//!
//! Retrieval from the upstream provider happens outside this crate; what
//! lives here is the parser for the USGS GeoJSON feed format and the
//! `EventLoader` seam the snapshot cache refreshes through.
//!
//! Submodules:
//! - `usgs_feed`: GeoJSON FeatureCollection parsing and a file-backed loader.

pub mod usgs_feed;

use crate::model::{Event, QuakeError};

/// Source of a complete event collection.
///
/// Each call returns a fresh, self-contained collection; the cache swaps it
/// in atomically, so a loader never needs to worry about readers.
pub trait EventLoader {
    fn load(&self) -> Result<Vec<Event>, QuakeError>;

    /// Short description used in log messages.
    fn describe(&self) -> String {
        "event loader".to_string()
    }
}

impl<L: EventLoader + ?Sized> EventLoader for &L {
    fn load(&self) -> Result<Vec<Event>, QuakeError> {
        (**self).load()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Adapts a closure into an `EventLoader`.
pub struct FnLoader<F>(pub F);

impl<F> EventLoader for FnLoader<F>
where
    F: Fn() -> Result<Vec<Event>, QuakeError>,
{
    fn load(&self) -> Result<Vec<Event>, QuakeError> {
        (self.0)()
    }
}

pub use usgs_feed::{parse_feed, FeedFileLoader};
