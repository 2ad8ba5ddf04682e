use crate::error::{ListingError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

mod wire;

pub use wire::{WireDraft, WireListing};

/// Prefix marking identities synthesized locally while in degraded mode
pub const LOCAL_ID_PREFIX: &str = "local-";

/// Backend-assigned identity of a listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(String);

impl ListingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for identities that were never persisted by the backend
    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_ID_PREFIX)
    }
}

impl From<&str> for ListingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ListingId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sale status of a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingStatus {
    #[default]
    Available,
    Sold,
}

impl ListingStatus {
    /// The other state; the domain has exactly two
    pub fn toggled(self) -> Self {
        match self {
            ListingStatus::Available => ListingStatus::Sold,
            ListingStatus::Sold => ListingStatus::Available,
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingStatus::Available => f.write_str("Available"),
            ListingStatus::Sold => f.write_str("Sold"),
        }
    }
}

/// A persisted flat listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: ListingId,
    pub unit_label: String,
    pub unit_type: String,
    pub price: f64,
    pub status: ListingStatus,
    pub image_url: Option<String>,
}

impl ListingRecord {
    /// Attach an identity to a validated draft
    pub fn from_draft(id: ListingId, draft: ListingDraft) -> Self {
        Self {
            id,
            unit_label: draft.unit_label,
            unit_type: draft.unit_type,
            price: draft.price,
            status: draft.status,
            image_url: draft.image_url,
        }
    }

    /// Overwrite the fields present in `patch`
    pub fn apply(&mut self, patch: &ListingPatch) {
        if let Some(unit_label) = &patch.unit_label {
            self.unit_label = unit_label.clone();
        }
        if let Some(unit_type) = &patch.unit_type {
            self.unit_type = unit_type.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(image_url) = &patch.image_url {
            self.image_url = Some(image_url.clone()).filter(|url| !url.is_empty());
        }
    }

    /// Image to show on a card, falling back to a seeded placeholder
    pub fn image_or_placeholder(&self) -> String {
        match &self.image_url {
            Some(url) => url.clone(),
            None => format!("https://picsum.photos/seed/{}/400/300", self.unit_label),
        }
    }

    /// The non-identity fields, for comparing against the draft that created it
    pub fn to_draft(&self) -> ListingDraft {
        ListingDraft {
            unit_label: self.unit_label.clone(),
            unit_type: self.unit_type.clone(),
            price: self.price,
            status: self.status,
            image_url: self.image_url.clone(),
        }
    }
}

/// Client-supplied fields for a listing that has no identity yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDraft {
    pub unit_label: String,
    pub unit_type: String,
    pub price: f64,
    pub status: ListingStatus,
    pub image_url: Option<String>,
}

impl ListingDraft {
    pub fn new(unit_label: impl Into<String>, unit_type: impl Into<String>, price: f64) -> Self {
        Self {
            unit_label: unit_label.into(),
            unit_type: unit_type.into(),
            price,
            status: ListingStatus::Available,
            image_url: None,
        }
    }

    pub fn with_status(mut self, status: ListingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        let image_url = image_url.into();
        self.image_url = Some(image_url).filter(|url| !url.trim().is_empty());
        self
    }

    /// Build a draft from raw form text, coercing the price to a number.
    pub fn from_form(
        flat_no: &str,
        kind: &str,
        price: &str,
        status: ListingStatus,
        image: &str,
    ) -> Result<Self> {
        let price_text = price.trim();
        if price_text.is_empty() {
            return Err(ListingError::Validation("price is required".to_string()));
        }
        let price: f64 = price_text.parse().map_err(|_| {
            ListingError::Validation(format!("price '{}' is not a number", price_text))
        })?;

        let draft = Self::new(flat_no.trim(), kind.trim(), price)
            .with_status(status)
            .with_image(image.trim());
        draft.validate()?;
        Ok(draft)
    }

    /// Required-field and range checks, run before any transport call
    pub fn validate(&self) -> Result<()> {
        if self.unit_label.trim().is_empty() {
            return Err(ListingError::Validation("flat number is required".to_string()));
        }
        if self.unit_type.trim().is_empty() {
            return Err(ListingError::Validation("property type is required".to_string()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ListingError::Validation(format!(
                "price must be a non-negative number, got {}",
                self.price
            )));
        }
        Ok(())
    }
}

/// Partial update sent to the backend; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingPatch {
    #[serde(rename = "flatNo", skip_serializing_if = "Option::is_none")]
    pub unit_label: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ListingStatus>,
    #[serde(rename = "image", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ListingPatch {
    pub fn status(status: ListingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Dashboard counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListingStats {
    pub total: usize,
    pub available: usize,
    pub sold: usize,
}

impl ListingStats {
    pub fn from_listings(listings: &[ListingRecord]) -> Self {
        let available = listings
            .iter()
            .filter(|listing| listing.status == ListingStatus::Available)
            .count();
        Self {
            total: listings.len(),
            available,
            sold: listings.len() - available,
        }
    }
}
