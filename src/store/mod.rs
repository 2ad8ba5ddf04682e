//! The listing store: single owner of the visible collection.
//!
//! In [`StoreMode::Connected`] every mutation goes to the backend and is then
//! reconciled by re-listing, so the backend stays the authority on identities
//! and ordering. In [`StoreMode::Degraded`] the local collection is the
//! authority and mutations never touch the network. Degraded mode is only
//! entered on request; a failed call never switches modes by itself.

pub mod demo;
pub mod filter;

pub use demo::demo_listings;
pub use filter::filter_listings;

use crate::client::ListingSource;
use crate::error::{ListingError, Result};
use crate::models::{
    ListingDraft, ListingId, ListingPatch, ListingRecord, ListingStats, ListingStatus,
    LOCAL_ID_PREFIX,
};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

/// Where mutations are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Connected,
    Degraded,
}

/// Progress of the last load
#[derive(Debug, Clone, PartialEq)]
pub enum StoreStatus {
    Idle,
    Loading,
    Error(ListingError),
}

/// Everything a consumer needs to render
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub listings: Vec<ListingRecord>,
    pub mode: StoreMode,
    pub status: StoreStatus,
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            listings: Vec::new(),
            mode: StoreMode::Connected,
            status: StoreStatus::Idle,
        }
    }
}

/// What a refresh request ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The collection was replaced with this many listings
    Refreshed(usize),
    /// Degraded mode; the local collection is already authoritative
    Skipped,
    /// Another refresh was in flight, so this one was dropped
    Coalesced,
}

pub struct ListingStore {
    source: Arc<dyn ListingSource>,
    state: watch::Sender<StoreSnapshot>,
    refresh_gate: Mutex<()>,
    mutation_gate: Mutex<()>,
    local_seq: AtomicU64,
}

impl ListingStore {
    /// Create an empty, connected store on top of `source`
    pub fn new(source: Arc<dyn ListingSource>) -> Self {
        let (state, _) = watch::channel(StoreSnapshot::default());
        Self {
            source,
            state,
            refresh_gate: Mutex::new(()),
            mutation_gate: Mutex::new(()),
            local_seq: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.state.subscribe()
    }

    pub fn mode(&self) -> StoreMode {
        self.state.borrow().mode
    }

    pub fn status(&self) -> StoreStatus {
        self.state.borrow().status.clone()
    }

    pub fn listings(&self) -> Vec<ListingRecord> {
        self.state.borrow().listings.clone()
    }

    pub fn find(&self, id: &ListingId) -> Option<ListingRecord> {
        self.state
            .borrow()
            .listings
            .iter()
            .find(|listing| &listing.id == id)
            .cloned()
    }

    /// Current collection narrowed by a search term
    pub fn visible(&self, term: &str) -> Vec<ListingRecord> {
        filter_listings(&self.state.borrow().listings, term)
    }

    pub fn stats(&self) -> ListingStats {
        ListingStats::from_listings(&self.state.borrow().listings)
    }

    /// Re-fetch the collection from the backend.
    ///
    /// A failure is recorded in the status and returned; the previous
    /// collection stays in place.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        if self.mode() == StoreMode::Degraded {
            debug!("Degraded mode, skipping refresh");
            return Ok(RefreshOutcome::Skipped);
        }

        let Ok(_gate) = self.refresh_gate.try_lock() else {
            warn!("Refresh already in flight, ignoring request");
            return Ok(RefreshOutcome::Coalesced);
        };

        self.load(false).await
    }

    /// Manual retry: try the backend even when degraded, and go back to
    /// connected mode if it answers.
    pub async fn retry_connection(&self) -> Result<RefreshOutcome> {
        let Ok(_gate) = self.refresh_gate.try_lock() else {
            warn!("Refresh already in flight, ignoring retry");
            return Ok(RefreshOutcome::Coalesced);
        };

        info!("Retrying connection to {}", self.source.endpoint());
        self.load(true).await
    }

    /// Switch to local-only mode with `seed` as the collection
    pub fn enter_degraded(&self, seed: Vec<ListingRecord>) {
        info!("Entering degraded mode with {} local listings", seed.len());
        self.state.send_modify(|state| {
            state.listings = seed;
            state.mode = StoreMode::Degraded;
            state.status = StoreStatus::Idle;
        });
    }

    /// Add a listing. Returns the record as the backend (or degraded mode) assigned it.
    pub async fn create(&self, draft: ListingDraft) -> Result<ListingRecord> {
        draft.validate()?;
        let _mutation = self.mutation_gate.lock().await;

        match self.mode() {
            StoreMode::Degraded => {
                let record = ListingRecord::from_draft(self.next_local_id(), draft);
                info!("Added local listing {} ({})", record.id, record.unit_label);
                self.state
                    .send_modify(|state| state.listings.push(record.clone()));
                Ok(record)
            }
            StoreMode::Connected => {
                let created = self.source.create(&draft).await.map_err(|err| {
                    warn!("Error adding flat: {}", err);
                    err
                })?;
                self.reconcile().await;
                Ok(created)
            }
        }
    }

    /// Flip a listing between Available and Sold, returning the new status
    pub async fn update_status(&self, id: &ListingId) -> Result<ListingStatus> {
        let _mutation = self.mutation_gate.lock().await;

        let current = self
            .find(id)
            .ok_or_else(|| ListingError::NotFound(id.clone()))?;
        let next = current.status.toggled();
        let patch = ListingPatch::status(next);

        match self.mode() {
            StoreMode::Degraded => {
                self.state.send_modify(|state| {
                    if let Some(listing) = state.listings.iter_mut().find(|l| &l.id == id) {
                        listing.apply(&patch);
                    }
                });
            }
            StoreMode::Connected => {
                match self.source.update(id, &patch).await {
                    Ok(_) => {}
                    // Accepted, but the body was not a listing; the re-list below is authoritative.
                    Err(ListingError::Protocol(reason)) => {
                        warn!("Unexpected update response for {}: {}", id, reason);
                    }
                    Err(err) => {
                        warn!("Error updating status of {}: {}", id, err);
                        return Err(err);
                    }
                }
                self.reconcile().await;
            }
        }

        info!("Listing {} is now {}", id, next);
        Ok(next)
    }

    /// Delete a listing. Deleting one that is already gone is not an error.
    pub async fn remove(&self, id: &ListingId) -> Result<()> {
        let _mutation = self.mutation_gate.lock().await;

        match self.mode() {
            StoreMode::Degraded => {
                let mut removed = false;
                self.state.send_modify(|state| {
                    let before = state.listings.len();
                    state.listings.retain(|listing| &listing.id != id);
                    removed = state.listings.len() != before;
                });
                if !removed {
                    warn!("Listing {} was already absent", id);
                }
            }
            StoreMode::Connected => {
                match self.source.remove(id).await {
                    Ok(()) => {}
                    Err(ListingError::NotFound(_)) => {
                        warn!("Listing {} was already deleted on the backend", id);
                    }
                    Err(err) => {
                        warn!("Error deleting flat {}: {}", id, err);
                        return Err(err);
                    }
                }
                self.reconcile().await;
            }
        }

        Ok(())
    }

    /// Post-mutation refresh. Waits for any in-flight refresh instead of
    /// being dropped, so the mutation is always reflected.
    async fn reconcile(&self) {
        let _gate = self.refresh_gate.lock().await;
        if let Err(err) = self.load(false).await {
            warn!("Reconciliation failed, keeping previous listings: {}", err);
        }
    }

    /// Caller must hold `refresh_gate`.
    async fn load(&self, forced: bool) -> Result<RefreshOutcome> {
        self.state
            .send_modify(|state| state.status = StoreStatus::Loading);

        match self.source.list().await {
            Ok(listings) => {
                let count = listings.len();
                let mut applied = false;
                self.state.send_modify(|state| {
                    if forced || state.mode == StoreMode::Connected {
                        state.listings = listings;
                        state.mode = StoreMode::Connected;
                        state.status = StoreStatus::Idle;
                        applied = true;
                    } else if state.status == StoreStatus::Loading {
                        state.status = StoreStatus::Idle;
                    }
                });

                if !applied {
                    debug!("Entered degraded mode during refresh, discarding result");
                    return Ok(RefreshOutcome::Skipped);
                }
                info!("Loaded {} listings", count);
                Ok(RefreshOutcome::Refreshed(count))
            }
            Err(err) => {
                warn!("Failed to load listings from {}: {}", self.source.endpoint(), err);
                self.state.send_modify(|state| {
                    if forced || state.mode == StoreMode::Connected {
                        state.status = StoreStatus::Error(err.clone());
                    } else if state.status == StoreStatus::Loading {
                        state.status = StoreStatus::Idle;
                    }
                });
                Err(err)
            }
        }
    }

    fn next_local_id(&self) -> ListingId {
        let seq = self.local_seq.fetch_add(1, Ordering::Relaxed);
        ListingId::from(format!(
            "{}{}-{}",
            LOCAL_ID_PREFIX,
            Utc::now().timestamp_millis(),
            seq
        ))
    }
}
