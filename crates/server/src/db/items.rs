//! `PostgreSQL` item store.
//!
//! Queries are built at runtime with `sqlx::QueryBuilder` because both the
//! search filter and partial updates change shape per request.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use bintrack_core::{
    InventoryItem, ItemChanges, ItemDraft, ItemFilter, ItemId, ItemStatus,
};

use super::{ItemStore, RepositoryError};

const ITEM_COLUMNS: &str = "id, name, description, image_url, bin_number, rack_number, platform, \
     status, sold_at, sold_price, ship_by_date, shipper_qr_code, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `inventory_items` queries.
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    image_url: String,
    bin_number: String,
    rack_number: String,
    platform: String,
    status: ItemStatus,
    sold_at: Option<DateTime<Utc>>,
    sold_price: Option<Decimal>,
    ship_by_date: Option<DateTime<Utc>>,
    shipper_qr_code: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ItemRow> for InventoryItem {
    fn from(row: ItemRow) -> Self {
        Self {
            id: ItemId::new(row.id),
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            bin_number: row.bin_number,
            rack_number: row.rack_number,
            platform: row.platform,
            status: row.status,
            sold_at: row.sold_at,
            sold_price: row.sold_price,
            ship_by_date: row.ship_by_date,
            shipper_qr_code: row.shipper_qr_code,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Item store backed by the `inventory_items` table.
#[derive(Clone)]
pub struct PgItemStore {
    pool: PgPool,
}

impl PgItemStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append the WHERE clause for `filter`. Text matching is a case-sensitive
/// substring test against each searchable column.
fn push_filter<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &'a ItemFilter) {
    qb.push(" WHERE TRUE");

    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }

    if let Some(text) = filter.text() {
        qb.push(" AND (strpos(name, ")
            .push_bind(text)
            .push(") > 0 OR strpos(COALESCE(description, ''), ")
            .push_bind(text)
            .push(") > 0 OR strpos(bin_number, ")
            .push_bind(text)
            .push(") > 0 OR strpos(rack_number, ")
            .push_bind(text)
            .push(") > 0 OR strpos(platform, ")
            .push_bind(text)
            .push(") > 0)");
    }
}

/// Append `, column = value` for a present change.
fn push_set<'a, T>(qb: &mut QueryBuilder<'a, Postgres>, column: &str, value: Option<T>)
where
    T: 'a + sqlx::Encode<'a, Postgres> + sqlx::Type<Postgres> + Send,
{
    if let Some(value) = value {
        qb.push(", ").push(column).push(" = ").push_bind(value);
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn list(&self, filter: &ItemFilter) -> Result<Vec<InventoryItem>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {ITEM_COLUMNS} FROM inventory_items"));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC");

        let rows = qb.build_query_as::<ItemRow>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn get_many(&self, ids: &[ItemId]) -> Result<Vec<InventoryItem>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(ItemId::as_uuid).collect();

        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = ANY($1) ORDER BY created_at DESC"
        ))
        .bind(uuids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, draft: ItemDraft) -> Result<InventoryItem, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            r"
            INSERT INTO inventory_items
                (id, name, description, image_url, bin_number, rack_number, platform, status, sold_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ITEM_COLUMNS}
            "
        ))
        .bind(ItemId::generate())
        .bind(draft.name)
        .bind(draft.description)
        .bind(draft.image_url)
        .bind(draft.bin_number)
        .bind(draft.rack_number)
        .bind(draft.platform)
        .bind(draft.status)
        .bind(draft.sold_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(
        &self,
        id: ItemId,
        changes: &ItemChanges,
    ) -> Result<Option<InventoryItem>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE inventory_items SET updated_at = NOW()");
        push_set(&mut qb, "name", changes.name.as_deref());
        push_set(&mut qb, "description", changes.description.as_ref().map(Option::as_deref));
        push_set(&mut qb, "image_url", changes.image_url.as_deref());
        push_set(&mut qb, "bin_number", changes.bin_number.as_deref());
        push_set(&mut qb, "rack_number", changes.rack_number.as_deref());
        push_set(&mut qb, "platform", changes.platform.as_deref());
        push_set(&mut qb, "status", changes.status);
        push_set(&mut qb, "sold_at", changes.sold_at);
        push_set(&mut qb, "sold_price", changes.sold_price);
        push_set(&mut qb, "ship_by_date", changes.ship_by_date);
        push_set(
            &mut qb,
            "shipper_qr_code",
            changes.shipper_qr_code.as_ref().map(Option::as_deref),
        );
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {ITEM_COLUMNS}"));

        let row = qb
            .build_query_as::<ItemRow>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(filter: &ItemFilter) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM inventory_items");
        push_filter(&mut qb, filter);
        qb.sql().to_string()
    }

    #[test]
    fn test_empty_filter_has_no_conditions() {
        assert_eq!(
            sql_for(&ItemFilter::default()),
            "SELECT id FROM inventory_items WHERE TRUE"
        );
        let blank = ItemFilter {
            query: Some(String::new()),
            status: None,
        };
        assert_eq!(sql_for(&blank), "SELECT id FROM inventory_items WHERE TRUE");
    }

    #[test]
    fn test_filter_ands_status_with_text() {
        let filter = ItemFilter {
            query: Some("Red".to_string()),
            status: Some(ItemStatus::Sold),
        };
        let sql = sql_for(&filter);
        assert!(sql.contains("AND status = $1"));
        assert!(sql.contains("AND (strpos(name, $2) > 0 OR"));
        assert!(sql.contains("strpos(platform, $6) > 0)"));
    }

    #[test]
    fn test_update_sets_only_present_columns() {
        let changes = ItemChanges {
            name: Some("Lamp".to_string()),
            sold_at: Some(None),
            ..ItemChanges::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE inventory_items SET updated_at = NOW()");
        push_set(&mut qb, "name", changes.name.as_deref());
        push_set(&mut qb, "bin_number", changes.bin_number.as_deref());
        push_set(&mut qb, "sold_at", changes.sold_at);
        assert_eq!(
            qb.sql(),
            "UPDATE inventory_items SET updated_at = NOW(), name = $1, sold_at = $2"
        );
    }

    #[test]
    fn test_text_columns_default_to_empty_in_schema() {
        let schema = include_str!("../../migrations/20260301000001_create_inventory_items.sql");
        for column in ["bin_number", "rack_number", "platform"] {
            assert!(
                schema.contains(&format!("{column} TEXT NOT NULL DEFAULT ''")),
                "{column} has no empty default"
            );
        }
    }
}
