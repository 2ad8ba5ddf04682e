//! Admin-side data layer for flat listings: a REST client for the `/flats`
//! backend and a store that owns the visible collection.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use client::{ListingSource, RemoteClient};
pub use config::Config;
pub use error::{ListingError, NetworkFailure, Result};
pub use models::{ListingDraft, ListingId, ListingPatch, ListingRecord, ListingStats, ListingStatus};
pub use store::{ListingStore, RefreshOutcome, StoreMode, StoreSnapshot, StoreStatus};
