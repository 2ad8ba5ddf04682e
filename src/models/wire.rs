//! JSON shapes exchanged with the flats backend.
//!
//! The backend speaks `flatNo`/`type`/`image` and may identify a listing by
//! either `_id` or `id`. Both collapse into [`ListingRecord::id`] here and
//! nowhere else.

use super::{ListingDraft, ListingId, ListingRecord, ListingStatus};
use crate::error::{ListingError, Result};
use serde::{Deserialize, Serialize};

/// A string or number as it appears on the wire
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Number(number) => number.to_string(),
            Scalar::Text(text) => text,
        }
    }
}

/// Listing object as returned by the backend
#[derive(Debug, Clone, Deserialize)]
pub struct WireListing {
    #[serde(rename = "_id", default)]
    object_id: Option<Scalar>,
    #[serde(default)]
    id: Option<Scalar>,
    #[serde(rename = "flatNo")]
    flat_no: String,
    #[serde(rename = "type")]
    kind: String,
    price: Scalar,
    status: ListingStatus,
    #[serde(default)]
    image: Option<String>,
}

impl WireListing {
    /// Normalize into the canonical record; `_id` wins over `id`.
    pub fn into_record(self) -> Result<ListingRecord> {
        let id = self
            .object_id
            .or(self.id)
            .map(Scalar::into_text)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ListingError::Protocol(format!("listing '{}' has no identity", self.flat_no))
            })?;

        let price = match self.price {
            Scalar::Number(number) => number.as_f64(),
            Scalar::Text(text) => text.trim().parse::<f64>().ok(),
        }
        .filter(|price| price.is_finite() && *price >= 0.0)
        .ok_or_else(|| {
            ListingError::Protocol(format!("listing {} has an invalid price", id))
        })?;

        Ok(ListingRecord {
            id: ListingId::from(id),
            unit_label: self.flat_no,
            unit_type: self.kind,
            price,
            status: self.status,
            image_url: self.image.filter(|url| !url.trim().is_empty()),
        })
    }
}

/// Request body for creating a listing
#[derive(Debug, Clone, Serialize)]
pub struct WireDraft<'a> {
    #[serde(rename = "flatNo")]
    flat_no: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    price: f64,
    status: ListingStatus,
    image: &'a str,
}

impl<'a> From<&'a ListingDraft> for WireDraft<'a> {
    fn from(draft: &'a ListingDraft) -> Self {
        Self {
            flat_no: &draft.unit_label,
            kind: &draft.unit_type,
            price: draft.price,
            status: draft.status,
            image: draft.image_url.as_deref().unwrap_or(""),
        }
    }
}
