//! Search filters and inventory statistics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::item::InventoryItem;
use super::status::ItemStatus;

/// Free-text and status filter for inventory search.
///
/// Both parts are optional and combine with AND. The text part is a
/// case-sensitive substring match against any of the searchable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFilter {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub status: Option<ItemStatus>,
}

impl ItemFilter {
    /// Drop an empty query so it is treated the same as an absent one.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            query: self.query.filter(|q| !q.is_empty()),
            status: self.status,
        }
    }

    /// The effective text query, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.is_empty())
    }

    /// Whether `item` passes this filter.
    #[must_use]
    pub fn matches(&self, item: &InventoryItem) -> bool {
        if let Some(status) = self.status
            && item.status != status
        {
            return false;
        }

        let Some(text) = self.text() else {
            return true;
        };

        item.name.contains(text)
            || item.description.as_deref().is_some_and(|d| d.contains(text))
            || item.bin_number.contains(text)
            || item.rack_number.contains(text)
            || item.platform.contains(text)
    }
}

/// Per-status item counts and realised revenue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStats {
    pub total: u64,
    pub pending: u64,
    pub completed: u64,
    pub sold: u64,
    /// Sum of `soldPrice` over completed items. Items without a price count as zero.
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
}

impl InventoryStats {
    /// Count items by status and total the revenue of completed ones.
    pub fn tally<'a>(items: impl IntoIterator<Item = &'a InventoryItem>) -> Self {
        items.into_iter().fold(Self::default(), |mut stats, item| {
            stats.total += 1;
            match item.status {
                ItemStatus::Pending => stats.pending += 1,
                ItemStatus::Sold => stats.sold += 1,
                ItemStatus::Completed => {
                    stats.completed += 1;
                    stats.revenue += item.sold_price.unwrap_or_default();
                }
            }
            stats
        })
    }
}

/// Order items newest first by `created_at`, keeping the relative order of ties.
pub fn sort_newest_first(items: &mut [InventoryItem]) {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ItemId;
    use chrono::{Duration, TimeZone, Utc};

    fn item(name: &str, status: ItemStatus, minutes: i64) -> InventoryItem {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes);
        InventoryItem {
            id: ItemId::generate(),
            name: name.to_string(),
            description: None,
            image_url: "u".to_string(),
            bin_number: String::new(),
            rack_number: String::new(),
            platform: String::new(),
            status,
            sold_at: None,
            sold_price: None,
            ship_by_date: None,
            shipper_qr_code: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn filter(query: Option<&str>, status: Option<ItemStatus>) -> ItemFilter {
        ItemFilter {
            query: query.map(str::to_string),
            status,
        }
    }

    #[test]
    fn test_search_is_conjunctive() {
        let mug = item("Red Mug", ItemStatus::Pending, 0);
        let hat = item("Red Hat", ItemStatus::Sold, 1);

        let f = filter(Some("Red"), Some(ItemStatus::Sold));
        assert!(!f.matches(&mug));
        assert!(f.matches(&hat));
    }

    #[test]
    fn test_search_matches_any_text_field() {
        let mut it = item("Lamp", ItemStatus::Pending, 0);
        it.description = Some("brass base".to_string());
        it.bin_number = "B12".to_string();
        it.rack_number = "R3".to_string();
        it.platform = "eBay, Etsy".to_string();

        for query in ["Lam", "brass", "B12", "R3", "Etsy"] {
            assert!(filter(Some(query), None).matches(&it), "query {query}");
        }
        assert!(!filter(Some("Mercari"), None).matches(&it));
    }

    #[test]
    fn test_search_is_case_sensitive() {
        let it = item("Red Mug", ItemStatus::Pending, 0);
        assert!(!filter(Some("red"), None).matches(&it));
    }

    #[test]
    fn test_empty_query_means_no_filter() {
        let it = item("Mug", ItemStatus::Completed, 0);
        assert!(filter(Some(""), None).matches(&it));
        assert!(filter(None, None).matches(&it));
        assert_eq!(filter(Some(""), None).normalized().query, None);
    }

    #[test]
    fn test_stats_partition_total() {
        let items = vec![
            item("a", ItemStatus::Pending, 0),
            item("b", ItemStatus::Pending, 1),
            item("c", ItemStatus::Sold, 2),
            item("d", ItemStatus::Completed, 3),
        ];
        let stats = InventoryStats::tally(&items);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.sold, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending + stats.sold + stats.completed, stats.total);
        assert_eq!(stats.revenue, Decimal::ZERO);
    }

    #[test]
    fn test_revenue_counts_completed_items_only() {
        let priced = |name: &str, status: ItemStatus, cents: Option<i64>| {
            let mut it = item(name, status, 0);
            it.sold_price = cents.map(|c| Decimal::new(c, 2));
            it
        };
        let items = vec![
            priced("shipped", ItemStatus::Completed, Some(2550)),
            priced("shipped-too", ItemStatus::Completed, Some(1000)),
            priced("unpriced", ItemStatus::Completed, None),
            priced("awaiting", ItemStatus::Sold, Some(9999)),
            priced("listed", ItemStatus::Pending, Some(500)),
        ];

        let stats = InventoryStats::tally(&items);
        assert_eq!(stats.revenue, Decimal::new(3550, 2));
        assert_eq!(stats.completed, 3);
    }

    #[test]
    fn test_revenue_serializes_as_number() {
        let mut it = item("shipped", ItemStatus::Completed, 0);
        it.sold_price = Some(Decimal::new(1250, 2));
        let json = serde_json::to_value(InventoryStats::tally([&it])).unwrap();
        assert_eq!(json["revenue"], 12.5);
    }

    #[test]
    fn test_sort_newest_first_is_stable() {
        let mut items = vec![
            item("old", ItemStatus::Pending, 0),
            item("tie-1", ItemStatus::Pending, 5),
            item("tie-2", ItemStatus::Pending, 5),
            item("new", ItemStatus::Pending, 10),
        ];
        sort_newest_first(&mut items);
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["new", "tie-1", "tie-2", "old"]);
    }
}
