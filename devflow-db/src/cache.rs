//! Process-wide connection cache: at most one live handle and at most one
//! in-flight connection attempt.
//!
//! This is pure state - all decision logic (when to connect, what to do on
//! failure) lives in the connector. The cache is an explicit injected object
//! rather than a module-level global so tests construct a fresh one per case.

use std::sync::Mutex;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;

use crate::error::DbError;

/// An in-progress connection attempt. Any number of callers may await the
/// same attempt; all of them observe the identical outcome.
pub type Attempt<H> = Shared<BoxFuture<'static, Result<H, DbError>>>;

/// Outcome of an atomic cache lookup.
pub enum CacheLookup<H: Clone> {
    /// A live handle is cached; no I/O needed.
    Ready(H),
    /// Another caller's attempt is in flight; await it.
    Joined { id: u64, attempt: Attempt<H> },
    /// Nothing was cached; this caller's attempt is now published.
    Started { id: u64, attempt: Attempt<H> },
}

struct InFlight<H> {
    id: u64,
    attempt: Attempt<H>,
}

struct CacheState<H> {
    handle: Option<H>,
    in_flight: Option<InFlight<H>>,
    next_id: u64,
}

/// Holds the single shared handle and the single in-flight attempt.
pub struct ConnectionCache<H: Clone> {
    state: Mutex<CacheState<H>>,
}

impl<H: Clone> ConnectionCache<H> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState {
                handle: None,
                in_flight: None,
                next_id: 0,
            }),
        }
    }

    /// Snapshot of the current `(handle, attempt)` pair. Never fails.
    pub fn get(&self) -> (Option<H>, Option<Attempt<H>>) {
        let state = self.state.lock().expect("connection cache poisoned");
        (
            state.handle.clone(),
            state.in_flight.as_ref().map(|f| f.attempt.clone()),
        )
    }

    /// Check the cache and, if it holds neither a handle nor an attempt,
    /// publish the attempt built by `make` - all under one lock, so two
    /// callers racing past an empty cache cannot both start a handshake.
    ///
    /// The attempt is published before it is first polled; callers arriving
    /// during the handshake join it through [`CacheLookup::Joined`].
    pub fn get_or_publish<F>(&self, make: F) -> CacheLookup<H>
    where
        F: FnOnce() -> BoxFuture<'static, Result<H, DbError>>,
    {
        let mut state = self.state.lock().expect("connection cache poisoned");

        if let Some(handle) = &state.handle {
            return CacheLookup::Ready(handle.clone());
        }
        if let Some(in_flight) = &state.in_flight {
            return CacheLookup::Joined {
                id: in_flight.id,
                attempt: in_flight.attempt.clone(),
            };
        }

        let id = state.next_id;
        state.next_id += 1;
        let attempt = make().shared();
        state.in_flight = Some(InFlight {
            id,
            attempt: attempt.clone(),
        });
        CacheLookup::Started { id, attempt }
    }

    /// Install the established handle as the sole shared instance and clear
    /// the attempt marker. Idempotent: every caller that joined the same
    /// successful attempt installs a clone of the same handle.
    pub fn set_handle(&self, handle: H) {
        let mut state = self.state.lock().expect("connection cache poisoned");
        state.in_flight = None;
        state.handle = Some(handle);
    }

    /// Clear a failed attempt so the next call retries from scratch.
    ///
    /// The id guards against stale clears: a slow caller settling an old
    /// failed attempt must not tear down a successor attempt that another
    /// caller has already published.
    pub fn clear_attempt(&self, id: u64) {
        let mut state = self.state.lock().expect("connection cache poisoned");
        if state.in_flight.as_ref().is_some_and(|f| f.id == id) {
            state.in_flight = None;
        }
    }
}

impl<H: Clone> Default for ConnectionCache<H> {
    fn default() -> Self {
        Self::new()
    }
}
