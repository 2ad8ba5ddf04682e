use crate::models::ListingRecord;

/// Listings whose unit label or unit type contains `term`, ignoring case.
///
/// An empty term keeps everything. Order is preserved and the input is untouched.
pub fn filter_listings(listings: &[ListingRecord], term: &str) -> Vec<ListingRecord> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return listings.to_vec();
    }

    listings
        .iter()
        .filter(|listing| {
            listing.unit_label.to_lowercase().contains(&needle)
                || listing.unit_type.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
