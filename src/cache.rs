//! Time-to-live snapshot of the loaded event collection.
//!
//! Scanning a multi-year catalog on every query is too slow, so the service
//! keeps the last complete load in memory and reuses it until it expires.
//!
//! # Snapshot semantics
//! Readers always receive an `Arc<Snapshot>` of a fully loaded collection.
//! A refresh builds the new collection without holding the data lock and
//! then swaps the `Arc` in one step, so nobody ever observes a partial load.
//! While one thread refreshes, other readers that already have a previous
//! snapshot get it back immediately instead of waiting.
//!
//! # Clock injection
//! Expiry is decided by a `Clock` rather than by calling `Utc::now()`
//! directly, so tests can move time forward deterministically.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, RwLock, TryLockError};

use crate::ingest::EventLoader;
use crate::logging::{self, Component};
use crate::model::{Event, QuakeError, UNKNOWN_REGION};

/// Default lifetime of a snapshot.
pub const DEFAULT_TTL_MINUTES: i64 = 60;

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    pub fn set(&self, t: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = t;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl<C: Clock> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One complete, immutable load of the event collection.
#[derive(Debug)]
pub struct Snapshot {
    pub events: Vec<Event>,
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.loaded_at
    }
}

#[derive(Default)]
struct CacheState {
    snapshot: Option<Arc<Snapshot>>,
    invalidated: bool,
    // bumped by every invalidate(); a reload only clears `invalidated` if
    // no invalidation arrived while it was loading
    generation: u64,
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

pub struct SnapshotCache<L, C = SystemClock> {
    loader: L,
    ttl: Duration,
    clock: C,
    state: RwLock<CacheState>,
    // held for the duration of a reload so only one runs at a time
    refresh: Mutex<()>,
}

impl<L: EventLoader> SnapshotCache<L, SystemClock> {
    pub fn new(loader: L, ttl: Duration) -> Self {
        Self::with_clock(loader, ttl, SystemClock)
    }
}

impl<L: EventLoader, C: Clock> SnapshotCache<L, C> {
    pub fn with_clock(loader: L, ttl: Duration, clock: C) -> Self {
        Self {
            loader,
            ttl,
            clock,
            state: RwLock::new(CacheState::default()),
            refresh: Mutex::new(()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the current snapshot, reloading it first if it is missing,
    /// expired, or invalidated.
    ///
    /// If a reload fails while an older snapshot exists, the older snapshot
    /// is returned and the failure is logged; the next call retries.
    pub fn get(&self) -> Result<Arc<Snapshot>, QuakeError> {
        let (current, fresh) = self.peek();
        if let (Some(snapshot), true) = (&current, fresh) {
            return Ok(Arc::clone(snapshot));
        }

        let _guard = match self.refresh.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                if let Some(previous) = current {
                    logging::debug(Component::Cache, None, "Refresh in flight, serving previous snapshot");
                    return Ok(previous);
                }
                self.refresh.lock().unwrap_or_else(|p| p.into_inner())
            }
            Err(TryLockError::Poisoned(p)) => p.into_inner(),
        };

        // Another thread may have finished a reload while we waited.
        let (current, fresh) = self.peek();
        if let (Some(snapshot), true) = (&current, fresh) {
            return Ok(Arc::clone(snapshot));
        }

        self.reload(current)
    }

    /// Marks the current snapshot expired. Readers keep receiving it until
    /// the next successful reload replaces it. A reload already in flight
    /// when this is called does not count as that reload.
    pub fn invalidate(&self) {
        let mut state = self.state.write().unwrap_or_else(|p| p.into_inner());
        state.invalidated = true;
        state.generation += 1;
        logging::debug(Component::Cache, None, "Snapshot invalidated");
    }

    /// Whether a snapshot exists and is still within its TTL.
    pub fn is_fresh(&self) -> bool {
        self.peek().1
    }

    fn peek(&self) -> (Option<Arc<Snapshot>>, bool) {
        let state = self.state.read().unwrap_or_else(|p| p.into_inner());
        let fresh = match &state.snapshot {
            Some(s) => !state.invalidated && s.age(self.clock.now()) < self.ttl,
            None => false,
        };
        (state.snapshot.clone(), fresh)
    }

    fn reload(&self, previous: Option<Arc<Snapshot>>) -> Result<Arc<Snapshot>, QuakeError> {
        let started = std::time::Instant::now();
        let generation = self.state.read().unwrap_or_else(|p| p.into_inner()).generation;
        match self.loader.load() {
            Ok(events) => {
                let unknown = events.iter().filter(|e| e.region == UNKNOWN_REGION).count();
                let snapshot = Arc::new(Snapshot {
                    events,
                    loaded_at: self.clock.now(),
                });
                {
                    let mut state = self.state.write().unwrap_or_else(|p| p.into_inner());
                    state.snapshot = Some(Arc::clone(&snapshot));
                    if state.generation == generation {
                        state.invalidated = false;
                    }
                }
                logging::log_refresh_summary(
                    snapshot.events.len(),
                    unknown,
                    started.elapsed().as_millis() as i64,
                );
                Ok(snapshot)
            }
            Err(err) => {
                logging::log_load_failure(&format!("Refresh from {}", self.loader.describe()), &err);
                match previous {
                    Some(stale) => {
                        logging::warn(Component::Cache, None, "Serving stale snapshot after failed refresh");
                        Ok(stale)
                    }
                    None => Err(err),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
