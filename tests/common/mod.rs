#![allow(dead_code)]

use async_trait::async_trait;
use flat_ledger::{
    ListingDraft, ListingError, ListingId, ListingPatch, ListingRecord, ListingSource, Result,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

/// In-memory backend with call counters and failure injection
#[derive(Default)]
pub struct FakeSource {
    listings: Mutex<Vec<ListingRecord>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failures: Mutex<HashMap<&'static str, ListingError>>,
    next_id: AtomicU64,
    hold_lists: AtomicBool,
    release: Notify,
}

impl FakeSource {
    pub fn with_listings(listings: Vec<ListingRecord>) -> Self {
        Self {
            listings: Mutex::new(listings),
            next_id: AtomicU64::new(100),
            ..Self::default()
        }
    }

    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    /// Make every call to `op` fail with `err` until cleared
    pub fn fail_on(&self, op: &'static str, err: ListingError) {
        self.failures.lock().unwrap().insert(op, err);
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    /// Block `list` calls until `release_lists` is called
    pub fn hold_lists(&self, hold: bool) {
        self.hold_lists.store(hold, Ordering::SeqCst);
    }

    pub fn release_lists(&self) {
        self.release.notify_one();
    }

    pub fn backend_listings(&self) -> Vec<ListingRecord> {
        self.listings.lock().unwrap().clone()
    }

    fn enter(&self, op: &'static str) -> Result<()> {
        self.count(op);
        self.injected(op)
    }

    fn count(&self, op: &'static str) {
        *self.calls.lock().unwrap().entry(op).or_insert(0) += 1;
    }

    fn injected(&self, op: &'static str) -> Result<()> {
        match self.failures.lock().unwrap().get(op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ListingSource for FakeSource {
    async fn list(&self) -> Result<Vec<ListingRecord>> {
        self.count("list");
        if self.hold_lists.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        self.injected("list")?;
        Ok(self.backend_listings())
    }

    async fn create(&self, draft: &ListingDraft) -> Result<ListingRecord> {
        self.enter("create")?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = ListingRecord::from_draft(ListingId::from(id.to_string()), draft.clone());
        self.listings.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &ListingId, patch: &ListingPatch) -> Result<ListingRecord> {
        self.enter("update")?;
        let mut listings = self.listings.lock().unwrap();
        let listing = listings
            .iter_mut()
            .find(|listing| &listing.id == id)
            .ok_or_else(|| ListingError::NotFound(id.clone()))?;
        listing.apply(patch);
        Ok(listing.clone())
    }

    async fn remove(&self, id: &ListingId) -> Result<()> {
        self.enter("remove")?;
        let mut listings = self.listings.lock().unwrap();
        let before = listings.len();
        listings.retain(|listing| &listing.id != id);
        if listings.len() == before {
            return Err(ListingError::NotFound(id.clone()));
        }
        Ok(())
    }

    fn endpoint(&self) -> &str {
        "memory://flats"
    }
}

pub fn listing(id: &str, label: &str, kind: &str, price: f64) -> ListingRecord {
    ListingRecord::from_draft(ListingId::from(id), ListingDraft::new(label, kind, price))
}

pub fn three_listings() -> Vec<ListingRecord> {
    vec![
        listing("1", "A-101", "2BHK", 150_000.0),
        listing("2", "B-204", "3BHK", 245_000.0),
        listing("3", "C-12", "Studio", 89_500.0),
    ]
}
