//! Process-local item store.
//!
//! Used when no database is configured and by the test suites. Items live in
//! insertion order; reads sort newest first with ties keeping insertion
//! order reversed, which matches what a `created_at DESC` scan of freshly
//! inserted rows returns.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use bintrack_core::{
    InventoryItem, ItemChanges, ItemDraft, ItemFilter, ItemId, sort_newest_first,
};

use super::{ItemStore, RepositoryError};

/// In-memory [`ItemStore`].
#[derive(Default)]
pub struct MemoryItemStore {
    items: RwLock<Vec<InventoryItem>>,
}

impl MemoryItemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed item, bypassing ID and timestamp assignment.
    pub async fn insert_raw(&self, item: InventoryItem) {
        self.items.write().await.push(item);
    }
}

fn newest_first<'a>(items: impl DoubleEndedIterator<Item = &'a InventoryItem>) -> Vec<InventoryItem> {
    let mut out: Vec<InventoryItem> = items.rev().cloned().collect();
    sort_newest_first(&mut out);
    out
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn list(&self, filter: &ItemFilter) -> Result<Vec<InventoryItem>, RepositoryError> {
        let items = self.items.read().await;
        Ok(newest_first(items.iter().filter(|item| filter.matches(item))))
    }

    async fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, RepositoryError> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    async fn get_many(&self, ids: &[ItemId]) -> Result<Vec<InventoryItem>, RepositoryError> {
        let items = self.items.read().await;
        Ok(newest_first(items.iter().filter(|item| ids.contains(&item.id))))
    }

    async fn insert(&self, draft: ItemDraft) -> Result<InventoryItem, RepositoryError> {
        let now = Utc::now();
        let item = InventoryItem {
            id: ItemId::generate(),
            name: draft.name,
            description: draft.description,
            image_url: draft.image_url,
            bin_number: draft.bin_number,
            rack_number: draft.rack_number,
            platform: draft.platform,
            status: draft.status,
            sold_at: draft.sold_at,
            sold_price: None,
            ship_by_date: None,
            shipper_qr_code: None,
            created_at: now,
            updated_at: now,
        };
        self.items.write().await.push(item.clone());
        Ok(item)
    }

    async fn update(
        &self,
        id: ItemId,
        changes: &ItemChanges,
    ) -> Result<Option<InventoryItem>, RepositoryError> {
        let mut items = self.items.write().await;
        let Some(item) = items.iter_mut().find(|item| item.id == id) else {
            return Ok(None);
        };
        changes.apply_to(item);
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| item.id != id);
        Ok(items.len() != before)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
