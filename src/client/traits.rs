use crate::error::Result;
use crate::models::{ListingDraft, ListingId, ListingPatch, ListingRecord};
use async_trait::async_trait;

/// Remote source of truth for listings.
/// The store only talks to the backend through this, so tests can swap in a fake.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch the full collection in backend order
    async fn list(&self) -> Result<Vec<ListingRecord>>;

    /// Persist a new listing and return it with its assigned identity
    async fn create(&self, draft: &ListingDraft) -> Result<ListingRecord>;

    /// Apply a partial update and return the updated listing
    async fn update(&self, id: &ListingId, patch: &ListingPatch) -> Result<ListingRecord>;

    /// Delete a listing; a missing one yields `ListingError::NotFound`
    async fn remove(&self, id: &ListingId) -> Result<()>;

    /// Human-readable description of where listings come from
    fn endpoint(&self) -> &str;
}
