//! Print the shipping worklist.

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use bintrack_core::split_platforms;

use super::{CommandError, inventory};

/// Log every sold item awaiting shipment, most pressing first.
///
/// # Arguments
///
/// * `today` - `YYYY-MM-DD` to measure deadlines from; defaults to the local date
///
/// # Errors
///
/// Returns an error if `today` is malformed or the database is unreachable.
pub async fn run(today: Option<&str>) -> Result<(), CommandError> {
    let today = match today {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
            CommandError::InvalidArgument(format!("today '{raw}': {e}"))
        })?,
        None => Local::now().date_naive(),
    };

    let worklist = inventory().await?.ready_to_ship(today).await?;

    info!("Ready to ship ({today})");
    info!("========================");
    for entry in &worklist.items {
        let item = &entry.item;
        let line = format!(
            "{:<10} bin {:<4} rack {:<4} {} [{}]",
            entry.urgency.label(),
            item.bin_number,
            item.rack_number,
            item.name,
            split_platforms(&item.platform).join(" | ")
        );
        if entry.urgency.is_urgent() {
            warn!("{line}");
        } else {
            info!("{line}");
        }
    }
    info!(
        total = worklist.items.len(),
        urgent = worklist.urgent_count,
        "Worklist complete"
    );

    Ok(())
}
