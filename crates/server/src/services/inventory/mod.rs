//! Inventory lifecycle and query service.
//!
//! Wraps an [`ItemStore`] with the item lifecycle rules from
//! `bintrack_core` and the read-side views the client screens need: the
//! full listing with stats, filtered search, photo search and the shipping
//! worklist.

mod error;
mod photo;

pub use error::InventoryError;
pub use photo::{PassThroughMatcher, PhotoMatcher, decode_image};

use std::sync::Arc;

use chrono::{Local, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use bintrack_core::{
    InventoryItem, InventoryStats, ItemFilter, ItemId, ItemPatch, ItemStatus, NewItem, Urgency,
    sort_for_shipping, sort_newest_first,
};

use crate::db::ItemStore;

/// Every item plus per-status counts.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryListing {
    pub items: Vec<InventoryItem>,
    pub stats: InventoryStats,
}

/// A sold item with its shipment urgency.
#[derive(Debug, Clone, Serialize)]
pub struct ShippingEntry {
    pub item: InventoryItem,
    pub urgency: Urgency,
}

/// Sold items awaiting shipment, most pressing first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingWorklist {
    pub items: Vec<ShippingEntry>,
    pub urgent_count: usize,
}

/// Parse an item ID from a request. Anything that is not a UUID cannot name
/// an item, so it is reported as not found.
///
/// # Errors
///
/// Returns `InventoryError::NotFound` if `raw` is not a valid UUID.
pub fn parse_item_id(raw: &str) -> Result<ItemId, InventoryError> {
    raw.parse()
        .map_err(|_| InventoryError::NotFound(raw.to_string()))
}

/// Inventory service.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn ItemStore>,
    matcher: Arc<dyn PhotoMatcher>,
}

impl InventoryService {
    /// Create a service with the pass-through photo matcher.
    #[must_use]
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self::with_matcher(store, Arc::new(PassThroughMatcher))
    }

    #[must_use]
    pub fn with_matcher(store: Arc<dyn ItemStore>, matcher: Arc<dyn PhotoMatcher>) -> Self {
        Self { store, matcher }
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ItemStore> {
        &self.store
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create an item.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the request fails validation, `Storage` if
    /// the insert fails.
    #[instrument(skip(self, request), fields(name = %request.name), err(level = "warn"))]
    pub async fn create(&self, request: NewItem) -> Result<InventoryItem, InventoryError> {
        let draft = request.into_draft(Utc::now())?;
        let item = self.store.insert(draft).await?;
        info!(item_id = %item.id, status = %item.status, "Item created");
        Ok(item)
    }

    /// Fetch one item.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item does not exist.
    #[instrument(skip(self), fields(item_id = %id), err(level = "warn"))]
    pub async fn get(&self, id: ItemId) -> Result<InventoryItem, InventoryError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| InventoryError::NotFound(id.to_string()))
    }

    /// Apply a sparse update, enforcing the status graph and its side effects.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item does not exist, `InvalidArgument` if the
    /// patch fails validation or asks for a disallowed status change.
    #[instrument(skip(self, patch), fields(item_id = %id), err(level = "warn"))]
    pub async fn apply_update(
        &self,
        id: ItemId,
        patch: ItemPatch,
    ) -> Result<InventoryItem, InventoryError> {
        let current = self.get(id).await?;
        let changes = patch.resolve(current.status, Utc::now())?;

        if changes.is_empty() {
            info!("Empty patch, touching updated_at only");
        }

        let item = self
            .store
            .update(id, &changes)
            .await?
            .ok_or_else(|| InventoryError::NotFound(id.to_string()))?;

        if item.status != current.status {
            info!(from = %current.status, to = %item.status, "Item status changed");
        }
        Ok(item)
    }

    /// Permanently delete an item.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item does not exist.
    #[instrument(skip(self), fields(item_id = %id), err(level = "warn"))]
    pub async fn delete(&self, id: ItemId) -> Result<(), InventoryError> {
        if self.store.delete(id).await? {
            info!("Item deleted");
            Ok(())
        } else {
            Err(InventoryError::NotFound(id.to_string()))
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Every item, newest first, with counts taken from that same listing.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store fails.
    #[instrument(skip(self), err(level = "warn"))]
    pub async fn list_all(&self) -> Result<InventoryListing, InventoryError> {
        let items = self.store.list(&ItemFilter::default()).await?;
        let stats = InventoryStats::tally(&items);
        Ok(InventoryListing { items, stats })
    }

    /// Items matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store fails.
    #[instrument(skip(self), err(level = "warn"))]
    pub async fn search(&self, filter: ItemFilter) -> Result<Vec<InventoryItem>, InventoryError> {
        let filter = filter.normalized();
        Ok(self.store.list(&filter).await?)
    }

    /// IDs of the items among `item_ids` that the photo matches, newest first.
    ///
    /// Unknown or malformed IDs are skipped. An undecodable image is logged
    /// and matched as empty bytes.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store fails.
    #[instrument(
        skip(self, image, item_ids),
        fields(candidates = item_ids.len()),
        err(level = "warn")
    )]
    pub async fn search_by_photo(
        &self,
        image: &str,
        item_ids: &[String],
    ) -> Result<Vec<ItemId>, InventoryError> {
        let bytes = decode_image(image).unwrap_or_else(|| {
            warn!("Photo search image is not valid base64");
            Vec::new()
        });

        let ids: Vec<ItemId> = item_ids.iter().filter_map(|raw| raw.parse().ok()).collect();
        let candidates = self.store.get_many(&ids).await?;

        let mut matched = self.matcher.matches(&bytes, candidates).await;
        sort_newest_first(&mut matched);
        Ok(matched.into_iter().map(|item| item.id).collect())
    }

    /// The shipping worklist as seen from `today` in the server's local zone.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store fails.
    pub async fn ready_to_ship(&self, today: NaiveDate) -> Result<ShippingWorklist, InventoryError> {
        self.ready_to_ship_in(today, &Local).await
    }

    /// The shipping worklist with deadlines read in `tz`.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store fails.
    #[instrument(skip(self, tz), err(level = "warn"))]
    pub async fn ready_to_ship_in<Tz>(
        &self,
        today: NaiveDate,
        tz: &Tz,
    ) -> Result<ShippingWorklist, InventoryError>
    where
        Tz: TimeZone + Sync,
        Tz::Offset: Send + Sync,
    {
        let filter = ItemFilter {
            query: None,
            status: Some(ItemStatus::Sold),
        };
        let mut items = self.store.list(&filter).await?;
        sort_for_shipping(&mut items);

        let items: Vec<ShippingEntry> = items
            .into_iter()
            .map(|item| {
                let urgency = Urgency::classify(item.ship_by_date, today, tz);
                ShippingEntry { item, urgency }
            })
            .collect();
        let urgent_count = items.iter().filter(|e| e.urgency.is_urgent()).count();

        Ok(ShippingWorklist {
            items,
            urgent_count,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{MemoryItemStore, RepositoryError};
    use bintrack_core::{ItemChanges, ItemDraft};
    use chrono::{Duration, FixedOffset, TimeZone};

    fn service() -> (InventoryService, Arc<MemoryItemStore>) {
        let store = Arc::new(MemoryItemStore::new());
        (InventoryService::new(store.clone()), store)
    }

    fn new_item(name: &str) -> NewItem {
        NewItem {
            name: name.to_string(),
            image_url: format!("/uploads/{name}.jpg"),
            ..NewItem::default()
        }
    }

    fn patch(json: &str) -> ItemPatch {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let (svc, _) = service();
        let item = svc.create(new_item("Mug")).await.unwrap();
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.bin_number, "");
        assert_eq!(item.rack_number, "");
        assert_eq!(item.platform, "");
        assert_eq!(item.description, None);
        assert_eq!(item.sold_at, None);
        assert_eq!(svc.get(item.id).await.unwrap(), item);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let (svc, _) = service();
        let err = svc.create(new_item("")).await.unwrap_err();
        assert!(matches!(err, InventoryError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_sold_transition_stamps_once() {
        let (svc, _) = service();
        let item = svc.create(new_item("Lamp")).await.unwrap();

        let before = Utc::now();
        let sold = svc.apply_update(item.id, patch(r#"{"status":"sold"}"#)).await.unwrap();
        let sold_at = sold.sold_at.unwrap();
        assert!(sold_at >= before);

        let again = svc.apply_update(item.id, patch(r#"{"status":"sold"}"#)).await.unwrap();
        assert_eq!(again.sold_at, Some(sold_at));
    }

    #[tokio::test]
    async fn test_back_to_pending_keeps_shipping_fields_unless_cleared() {
        let (svc, _) = service();
        let item = svc.create(new_item("Vase")).await.unwrap();
        svc.apply_update(
            item.id,
            patch(r#"{"status":"sold","shipByDate":"2024-02-01","shipperQrCode":"/uploads/qr.png"}"#),
        )
        .await
        .unwrap();

        let pending = svc.apply_update(item.id, patch(r#"{"status":"pending"}"#)).await.unwrap();
        assert_eq!(pending.sold_at, None);
        assert!(pending.ship_by_date.is_some());
        assert_eq!(pending.shipper_qr_code.as_deref(), Some("/uploads/qr.png"));

        let cleared = svc
            .apply_update(item.id, patch(r#"{"shipByDate":null,"shipperQrCode":null}"#))
            .await
            .unwrap();
        assert_eq!(cleared.ship_by_date, None);
        assert_eq!(cleared.shipper_qr_code, None);
    }

    #[tokio::test]
    async fn test_disallowed_transition_leaves_item_untouched() {
        let (svc, _) = service();
        let item = svc.create(new_item("Clock")).await.unwrap();
        let err = svc
            .apply_update(item.id, patch(r#"{"status":"completed","name":"Renamed"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidArgument(_)));
        assert_eq!(svc.get(item.id).await.unwrap().name, "Clock");
    }

    #[tokio::test]
    async fn test_update_missing_item() {
        let (svc, _) = service();
        let err = svc
            .apply_update(ItemId::generate(), ItemPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_is_terminal() {
        let (svc, _) = service();
        let item = svc.create(new_item("Bowl")).await.unwrap();
        svc.delete(item.id).await.unwrap();
        assert!(matches!(svc.get(item.id).await, Err(InventoryError::NotFound(_))));
        assert!(matches!(svc.delete(item.id).await, Err(InventoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_all_stats_add_up() {
        let (svc, _) = service();
        let a = svc.create(new_item("a")).await.unwrap();
        let b = svc.create(new_item("b")).await.unwrap();
        svc.create(new_item("c")).await.unwrap();
        svc.apply_update(a.id, patch(r#"{"status":"sold"}"#)).await.unwrap();
        svc.apply_update(b.id, patch(r#"{"status":"sold"}"#)).await.unwrap();
        svc.apply_update(b.id, patch(r#"{"status":"completed"}"#)).await.unwrap();

        let listing = svc.list_all().await.unwrap();
        let stats = listing.stats;
        assert_eq!(listing.items.len(), 3);
        assert_eq!(stats.total, 3);
        assert_eq!((stats.pending, stats.sold, stats.completed), (1, 1, 1));
        assert_eq!(stats.pending + stats.sold + stats.completed, stats.total);
    }

    /// Store whose `list` lets another writer insert right after the read.
    struct WriteAfterListStore {
        inner: MemoryItemStore,
    }

    #[async_trait::async_trait]
    impl ItemStore for WriteAfterListStore {
        async fn list(&self, filter: &ItemFilter) -> Result<Vec<InventoryItem>, RepositoryError> {
            let items = self.inner.list(filter).await?;
            self.inner.insert(new_item("late").into_draft(Utc::now()).unwrap()).await?;
            Ok(items)
        }
        async fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, RepositoryError> {
            self.inner.get(id).await
        }
        async fn get_many(&self, ids: &[ItemId]) -> Result<Vec<InventoryItem>, RepositoryError> {
            self.inner.get_many(ids).await
        }
        async fn insert(&self, draft: ItemDraft) -> Result<InventoryItem, RepositoryError> {
            self.inner.insert(draft).await
        }
        async fn update(
            &self,
            id: ItemId,
            changes: &ItemChanges,
        ) -> Result<Option<InventoryItem>, RepositoryError> {
            self.inner.update(id, changes).await
        }
        async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError> {
            self.inner.delete(id).await
        }
        async fn ping(&self) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_list_all_stats_match_listed_items_under_concurrent_write() {
        let svc = InventoryService::new(Arc::new(WriteAfterListStore {
            inner: MemoryItemStore::new(),
        }));

        let listing = svc.list_all().await.unwrap();
        assert_eq!(listing.items.len(), 0);
        assert_eq!(listing.stats.total, 0);

        let listing = svc.list_all().await.unwrap();
        assert_eq!(u64::try_from(listing.items.len()).unwrap(), listing.stats.total);
        assert_eq!(listing.stats.pending, 1);
    }

    #[tokio::test]
    async fn test_list_all_reports_revenue() {
        let (svc, _) = service();
        let a = svc.create(new_item("a")).await.unwrap();
        svc.apply_update(a.id, patch(r#"{"status":"sold","soldPrice":19.99}"#)).await.unwrap();
        let sold_only = svc.list_all().await.unwrap().stats.revenue;
        assert_eq!(sold_only, rust_decimal::Decimal::ZERO);

        svc.apply_update(a.id, patch(r#"{"status":"completed"}"#)).await.unwrap();
        let stats = svc.list_all().await.unwrap().stats;
        assert_eq!(stats.revenue, rust_decimal::Decimal::new(1999, 2));
    }

    #[tokio::test]
    async fn test_search_is_conjunctive() {
        let (svc, _) = service();
        svc.create(new_item("Red Mug")).await.unwrap();
        let hat = svc.create(new_item("Red Hat")).await.unwrap();
        svc.apply_update(hat.id, patch(r#"{"status":"sold"}"#)).await.unwrap();

        let found = svc
            .search(ItemFilter {
                query: Some("Red".to_string()),
                status: Some(ItemStatus::Sold),
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Red Hat");

        let all = svc
            .search(ItemFilter {
                query: Some(String::new()),
                status: None,
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_photo_search_is_pass_through_newest_first() {
        let (svc, _) = service();
        let a = svc.create(new_item("a")).await.unwrap();
        let b = svc.create(new_item("b")).await.unwrap();

        let ids = vec![
            a.id.to_string(),
            "not-an-id".to_string(),
            ItemId::generate().to_string(),
            b.id.to_string(),
        ];
        let matched = svc.search_by_photo("%%%", &ids).await.unwrap();
        assert_eq!(matched, [b.id, a.id]);
    }

    #[tokio::test]
    async fn test_ready_to_ship_orders_and_counts() {
        let (svc, store) = service();
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let noon = |day: u32| Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap();

        let make = |name: &str, status: ItemStatus, ship_by: Option<u32>, age: i64| InventoryItem {
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
            ship_by_date: ship_by.map(noon),
            shipper_qr_code: None,
            created_at: noon(1) + Duration::minutes(age),
            updated_at: noon(1),
        };

        store.insert_raw(make("later", ItemStatus::Sold, Some(20), 0)).await;
        store.insert_raw(make("undated", ItemStatus::Sold, None, 1)).await;
        store.insert_raw(make("overdue", ItemStatus::Sold, Some(9), 2)).await;
        store.insert_raw(make("pending", ItemStatus::Pending, Some(10), 3)).await;
        store.insert_raw(make("soon", ItemStatus::Sold, Some(12), 4)).await;

        let worklist = svc.ready_to_ship_in(today, &Utc).await.unwrap();
        let names: Vec<_> = worklist.items.iter().map(|e| e.item.name.as_str()).collect();
        assert_eq!(names, ["overdue", "soon", "later", "undated"]);
        assert_eq!(worklist.urgent_count, 2);
    }

    /// Log sink for asserting on emitted events.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failures_are_logged_at_default_level() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (svc, _) = service();
        let missing = ItemId::generate();
        assert!(svc.delete(missing).await.is_err());
        assert!(svc.create(new_item("")).await.is_err());

        let output = logs.contents();
        assert!(output.contains("WARN delete{"), "{output}");
        assert!(output.contains(&missing.to_string()), "{output}");
        assert!(output.contains("item not found"), "{output}");
        assert!(output.contains("WARN create{"), "{output}");
        assert!(output.contains("invalid name"), "{output}");
    }

    #[tokio::test]
    async fn test_ready_to_ship_reads_deadlines_in_client_offset() {
        let (svc, _) = service();
        let item = svc.create(new_item("Lamp")).await.unwrap();
        // 8pm on Jan 12 for a client at UTC-8.
        svc.apply_update(
            item.id,
            patch(r#"{"status":"sold","shipByDate":"2024-01-13T04:00:00.000Z"}"#),
        )
        .await
        .unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();

        let pacific = FixedOffset::west_opt(8 * 3600).unwrap();
        let worklist = svc.ready_to_ship_in(today, &pacific).await.unwrap();
        let urgency = worklist.items[0].urgency;
        assert_eq!(urgency.days_until(), Some(2));
        assert_eq!(urgency.label(), "2 days");

        let utc = svc.ready_to_ship_in(today, &Utc).await.unwrap();
        assert_eq!(utc.items[0].urgency.days_until(), Some(3));
    }

    #[test]
    fn test_parse_item_id() {
        assert!(parse_item_id(&ItemId::generate().to_string()).is_ok());
        assert!(matches!(parse_item_id("123"), Err(InventoryError::NotFound(_))));
    }
}
