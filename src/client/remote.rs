use crate::client::traits::ListingSource;
use crate::config::Config;
use crate::error::{ListingError, Result};
use crate::models::{ListingDraft, ListingId, ListingPatch, ListingRecord, WireDraft, WireListing};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, info, warn};

/// REST client for the `{BASE}/flats` collection
pub struct RemoteClient {
    client: Client,
    collection_url: String,
}

impl RemoteClient {
    /// Create a client for the configured backend
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("flat-ledger/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            collection_url: config.collection_url(),
        })
    }

    fn item_url(&self, id: &ListingId) -> String {
        format!("{}/{}", self.collection_url, id)
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, request: RequestBuilder, target: Option<&ListingId>) -> Result<String> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!("Backend returned status: {}", status);
            let body = response.text().await.unwrap_or_default();
            return Err(ListingError::from_status(status, target, &body));
        }

        Ok(response.text().await?)
    }

    fn parse_listing(body: &str) -> Result<ListingRecord> {
        serde_json::from_str::<WireListing>(body)?.into_record()
    }

    /// Parse a list response; anything but an array reads as an empty collection
    fn parse_listings(body: &str) -> Result<Vec<ListingRecord>> {
        let value: Value = serde_json::from_str(body)?;
        let Value::Array(items) = value else {
            warn!("List response is not an array, treating it as empty");
            return Ok(Vec::new());
        };

        items
            .into_iter()
            .map(|item| serde_json::from_value::<WireListing>(item)?.into_record())
            .collect()
    }
}

#[async_trait]
impl ListingSource for RemoteClient {
    async fn list(&self) -> Result<Vec<ListingRecord>> {
        debug!("Fetching URL: {}", self.collection_url);

        let body = self
            .execute(self.client.get(&self.collection_url), None)
            .await?;
        let listings = Self::parse_listings(&body)?;

        debug!("Fetched {} listings", listings.len());
        Ok(listings)
    }

    async fn create(&self, draft: &ListingDraft) -> Result<ListingRecord> {
        debug!("POST {}", self.collection_url);

        let request = self
            .client
            .post(&self.collection_url)
            .json(&WireDraft::from(draft));
        let body = self.execute(request, None).await?;
        let created = Self::parse_listing(&body)?;

        info!("Created listing {} ({})", created.id, created.unit_label);
        Ok(created)
    }

    async fn update(&self, id: &ListingId, patch: &ListingPatch) -> Result<ListingRecord> {
        let url = self.item_url(id);
        debug!("PUT {}", url);

        let body = self.execute(self.client.put(&url).json(patch), Some(id)).await?;
        let updated = Self::parse_listing(&body)?;

        info!("Updated listing {}", updated.id);
        Ok(updated)
    }

    async fn remove(&self, id: &ListingId) -> Result<()> {
        let url = self.item_url(id);
        debug!("DELETE {}", url);

        self.execute(self.client.delete(&url), Some(id)).await?;

        info!("Removed listing {}", id);
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.collection_url
    }
}
