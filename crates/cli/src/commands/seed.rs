//! Seed the database with demo inventory.
//!
//! Items go through the same service the API uses, so the lifecycle rules
//! (sold timestamps, status transitions) apply to demo data as well.

use chrono::{Duration, Utc};
use tracing::info;

use bintrack_core::{ItemPatch, ItemStatus, NewItem, PlatformList, join_platforms};

use super::{CommandError, inventory};

/// Demo catalogue.
const DEMO_ITEMS: &[&str] = &[
    "Vintage Levi's 501 Jeans",
    "Nike Air Max 90",
    "Pyrex Mixing Bowl Set",
    "Patagonia Fleece Pullover",
    "Nintendo GameCube Controller",
    "Le Creuset Dutch Oven",
    "Carhartt Detroit Jacket",
    "Polaroid SX-70 Camera",
];

/// Racks cycled through when placing demo items.
const RACKS: &[&str] = &["A", "B", "C"];

/// Insert `count` demo items.
///
/// Some items are sold with ship-by dates spread around today and a few are
/// completed, so the shipping worklist has something to show.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn demo_items(count: usize) -> Result<(), CommandError> {
    let service = inventory().await?;
    let now = Utc::now();

    let platforms = PlatformList::default();
    let names = platforms.enabled_names();

    info!(count, "Seeding demo items");

    for (n, &name) in DEMO_ITEMS.iter().cycle().take(count).enumerate() {
        let rack = RACKS.get(n % RACKS.len()).copied().unwrap_or_default();
        let item = service
            .create(NewItem {
                name: name.to_string(),
                description: Some(format!("Demo item #{}", n + 1)),
                image_url: format!("https://picsum.photos/seed/bintrack{n}/400"),
                bin_number: Some(format!("{}", n / 4 + 1)),
                rack_number: Some(rack.to_string()),
                platform: Some(demo_platforms(&names, n)),
                status: None,
            })
            .await?;

        if n % 5 == 4 || n % 3 == 2 {
            let days = i64::try_from(n % 7).unwrap_or_default() - 1;
            let sold = ItemPatch {
                status: Some(ItemStatus::Sold),
                ship_by_date: Some(Some((now + Duration::days(days)).to_rfc3339())),
                ..ItemPatch::default()
            };
            service.apply_update(item.id, sold).await?;
        }
        if n % 5 == 4 {
            let completed = ItemPatch {
                status: Some(ItemStatus::Completed),
                ..ItemPatch::default()
            };
            service.apply_update(item.id, completed).await?;
        }
    }

    info!("Seeding complete!");
    Ok(())
}

/// One or two platform names for the `n`th demo item, as an item platform string.
fn demo_platforms(names: &[&str], n: usize) -> String {
    if names.is_empty() {
        return String::new();
    }
    let picked: Vec<&str> = names
        .iter()
        .cycle()
        .skip(n % names.len())
        .take(1 + n % 2)
        .copied()
        .collect();
    join_platforms(&picked)
}
