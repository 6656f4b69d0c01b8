//! Inventory item model and the lifecycle rules applied when it changes.
//!
//! Requests arrive as a [`NewItem`] or an [`ItemPatch`]. Both are resolved
//! against the clock (and, for patches, the item's current status) into a form
//! the store can persist verbatim: an [`ItemDraft`] or an [`ItemChanges`]. All
//! status side effects are decided here so every store behaves the same way.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::id::ItemId;
use super::status::ItemStatus;
use super::validation::{ValidationError, require_non_empty};

/// A physical good tracked from intake to shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Unique item ID.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Photo of the item.
    pub image_url: String,
    /// Bin label, empty when unassigned.
    pub bin_number: String,
    /// Rack label, empty when unassigned.
    pub rack_number: String,
    /// Comma-joined marketplace names.
    pub platform: String,
    /// Lifecycle status.
    pub status: ItemStatus,
    /// When the item was last marked sold.
    pub sold_at: Option<DateTime<Utc>>,
    /// Sale price entered by the user.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub sold_price: Option<Decimal>,
    /// Shipment deadline.
    pub ship_by_date: Option<DateTime<Utc>>,
    /// Image of the shipping label barcode.
    pub shipper_qr_code: Option<String>,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Creation
// =============================================================================

/// Request to create an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub bin_number: Option<String>,
    #[serde(default)]
    pub rack_number: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub status: Option<ItemStatus>,
}

/// A validated [`NewItem`] with defaults applied, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub description: Option<String>,
    pub image_url: String,
    pub bin_number: String,
    pub rack_number: String,
    pub platform: String,
    pub status: ItemStatus,
    pub sold_at: Option<DateTime<Utc>>,
}

impl NewItem {
    /// Validate the request and fill in defaults.
    ///
    /// Location labels and platform default to empty strings, status to
    /// `pending`. An item created directly as `sold` gets `sold_at = now`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `name` or `imageUrl` is empty.
    pub fn into_draft(self, now: DateTime<Utc>) -> Result<ItemDraft, ValidationError> {
        require_non_empty("name", &self.name)?;
        require_non_empty("imageUrl", &self.image_url)?;

        let status = self.status.unwrap_or_default();
        Ok(ItemDraft {
            name: self.name,
            description: self.description,
            image_url: self.image_url,
            bin_number: self.bin_number.unwrap_or_default(),
            rack_number: self.rack_number.unwrap_or_default(),
            platform: self.platform.unwrap_or_default(),
            status,
            sold_at: (status == ItemStatus::Sold).then_some(now),
        })
    }
}

// =============================================================================
// Partial updates
// =============================================================================

/// Sparse update request.
///
/// Absent fields are left untouched. For nullable fields the outer `Option`
/// tracks presence and the inner one the value, so `null` means "clear".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rack_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(
        default,
        deserialize_with = "nullable_decimal",
        serialize_with = "serialize_nullable_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub sold_price: Option<Option<Decimal>>,
    /// ISO-8601 date or date-time; parsed during [`ItemPatch::resolve`].
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub ship_by_date: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub shipper_qr_code: Option<Option<String>>,
}

/// The exact set of column changes a store must apply for a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub image_url: Option<String>,
    pub bin_number: Option<String>,
    pub rack_number: Option<String>,
    pub platform: Option<String>,
    pub status: Option<ItemStatus>,
    pub sold_at: Option<Option<DateTime<Utc>>>,
    pub sold_price: Option<Option<Decimal>>,
    pub ship_by_date: Option<Option<DateTime<Utc>>>,
    pub shipper_qr_code: Option<Option<String>>,
}

impl ItemPatch {
    /// Validate the patch against the item's current status and derive the
    /// status side effects.
    ///
    /// - Moving into `sold` from any other status stamps `sold_at = now`.
    /// - Moving back to `pending` clears `sold_at`. Ship-by date and shipper
    ///   QR code are left alone unless the patch clears them explicitly.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for empty required strings, an
    /// unparseable `shipByDate`, or a status change outside the lifecycle graph.
    pub fn resolve(
        self,
        current: ItemStatus,
        now: DateTime<Utc>,
    ) -> Result<ItemChanges, ValidationError> {
        for (field, value) in [
            ("name", &self.name),
            ("imageUrl", &self.image_url),
            ("binNumber", &self.bin_number),
            ("rackNumber", &self.rack_number),
            ("platform", &self.platform),
        ] {
            if let Some(value) = value {
                require_non_empty(field, value)?;
            }
        }

        let mut sold_at = None;
        if let Some(next) = self.status {
            if !current.can_transition_to(next) {
                return Err(ValidationError::new(
                    "status",
                    format!("cannot move an item from {current} to {next}"),
                ));
            }
            if next != current {
                match next {
                    ItemStatus::Sold => sold_at = Some(Some(now)),
                    ItemStatus::Pending => sold_at = Some(None),
                    ItemStatus::Completed => {}
                }
            }
        }

        let ship_by_date = match self.ship_by_date {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) if raw.is_empty() => Some(None),
            Some(Some(raw)) => Some(Some(parse_ship_by_date(&raw)?)),
        };

        Ok(ItemChanges {
            name: self.name,
            description: self.description,
            image_url: self.image_url,
            bin_number: self.bin_number,
            rack_number: self.rack_number,
            platform: self.platform,
            status: self.status,
            sold_at,
            sold_price: self.sold_price,
            ship_by_date,
            shipper_qr_code: self.shipper_qr_code,
        })
    }
}

impl ItemChanges {
    /// True if applying these changes would touch no column.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
            && self.bin_number.is_none()
            && self.rack_number.is_none()
            && self.platform.is_none()
            && self.status.is_none()
            && self.sold_at.is_none()
            && self.sold_price.is_none()
            && self.ship_by_date.is_none()
            && self.shipper_qr_code.is_none()
    }

    /// Apply the changes to an in-memory item. `updated_at` is left to the caller.
    pub fn apply_to(&self, item: &mut InventoryItem) {
        fn set<T: Clone>(target: &mut T, change: Option<&T>) {
            if let Some(value) = change {
                target.clone_from(value);
            }
        }

        set(&mut item.name, self.name.as_ref());
        set(&mut item.description, self.description.as_ref());
        set(&mut item.image_url, self.image_url.as_ref());
        set(&mut item.bin_number, self.bin_number.as_ref());
        set(&mut item.rack_number, self.rack_number.as_ref());
        set(&mut item.platform, self.platform.as_ref());
        set(&mut item.status, self.status.as_ref());
        set(&mut item.sold_at, self.sold_at.as_ref());
        set(&mut item.sold_price, self.sold_price.as_ref());
        set(&mut item.ship_by_date, self.ship_by_date.as_ref());
        set(&mut item.shipper_qr_code, self.shipper_qr_code.as_ref());
    }
}

/// Parse a ship-by date.
///
/// Accepts an RFC 3339 date-time (what `Date.prototype.toISOString` emits) or a
/// bare `YYYY-MM-DD`, which is taken as midnight UTC.
///
/// # Errors
///
/// Returns a [`ValidationError`] on `shipByDate` if neither form parses.
pub fn parse_ship_by_date(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(ValidationError::new(
        "shipByDate",
        format!("'{raw}' is not an ISO-8601 date"),
    ))
}

// Present-but-null must be distinguishable from absent, so a present value is
// always wrapped in `Some` and `#[serde(default)]` supplies the absent case.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn nullable_decimal<'de, D>(deserializer: D) -> Result<Option<Option<Decimal>>, D::Error>
where
    D: Deserializer<'de>,
{
    rust_decimal::serde::float_option::deserialize(deserializer).map(Some)
}

#[allow(clippy::ref_option)] // serde's `serialize_with` hands us `&Option<_>`
fn serialize_nullable_decimal<S>(
    value: &Option<Option<Decimal>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    rust_decimal::serde::float_option::serialize(&value.flatten(), serializer)
}
