use crate::models::{ListingDraft, ListingId, ListingRecord, ListingStatus};
use tracing::info;

/// Seed collection for degraded mode
pub fn demo_listings() -> Vec<ListingRecord> {
    info!("📋 Loading demo listings");

    vec![
        ListingRecord::from_draft(
            ListingId::from("demo-1"),
            ListingDraft::new("A-101", "2BHK", 150_000.0)
                .with_image("https://images.unsplash.com/photo-1502672260266-1c1ef2d93688"),
        ),
        ListingRecord::from_draft(
            ListingId::from("demo-2"),
            ListingDraft::new("B-204", "3BHK", 245_000.0).with_status(ListingStatus::Sold),
        ),
        ListingRecord::from_draft(
            ListingId::from("demo-3"),
            ListingDraft::new("C-12", "Studio", 89_500.0),
        ),
    ]
}
