use anyhow::Context;
use flat_ledger::store::demo_listings;
use flat_ledger::{Config, ListingStore, RemoteClient, StoreMode, StoreStatus};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut demo = false;
    let mut terms = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--demo" => demo = true,
            _ => terms.push(arg),
        }
    }
    let search = terms.join(" ");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("🏠 Flat Ledger - {}", config.collection_url());

    let client = RemoteClient::new(&config)?;
    let store = ListingStore::new(Arc::new(client));

    if demo {
        store.enter_degraded(demo_listings());
    } else if let Err(err) = store.refresh().await {
        warn!("Backend connection error: {}", err);
        eprintln!("Failed to connect to backend at {}.", config.collection_url());
        eprintln!("Run with --demo to browse sample listings offline.");
    }

    let snapshot = store.snapshot();
    if let StoreStatus::Error(err) = &snapshot.status {
        anyhow::bail!("Could not load listings: {}", err);
    }

    let stats = store.stats();
    println!(
        "Total: {}  Available: {}  Sold: {}{}",
        stats.total,
        stats.available,
        stats.sold,
        if snapshot.mode == StoreMode::Degraded { "  (demo mode)" } else { "" }
    );
    println!();

    let visible = store.visible(&search);
    if visible.is_empty() {
        println!("No properties found.");
    }

    for (i, listing) in visible.iter().enumerate() {
        println!("{}. Unit {} - {}", i + 1, listing.unit_label, listing.unit_type);
        println!("   ${:.0} · {}", listing.price, listing.status);
        println!("   Image: {}", listing.image_or_placeholder());
        println!("   ID: {}", listing.id);
        println!();
    }

    Ok(())
}
