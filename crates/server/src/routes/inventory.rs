//! Inventory API handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{FixedOffset, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use bintrack_core::{InventoryItem, ItemFilter, ItemId, ItemPatch, NewItem};

use crate::error::{ApiJson, AppError, Result};
use crate::services::{InventoryListing, ShippingWorklist, parse_item_id};
use crate::state::AppState;

/// Response for a successful delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Photo search request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoSearchRequest {
    /// Base64 image, optionally as a data URL.
    pub image: String,
    /// Items to search within.
    pub item_ids: Vec<String>,
}

/// Photo search response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoSearchResponse {
    pub matching_item_ids: Vec<ItemId>,
}

/// Query string for the shipping worklist.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyToShipParams {
    /// `YYYY-MM-DD`; defaults to the current date where deadlines are read.
    pub today: Option<String>,
    /// Client UTC offset in minutes east of UTC (UTC-8 is `-480`). Ship-by
    /// dates are read as calendar days in this offset; without it the
    /// server's local zone is used.
    pub tz_offset_minutes: Option<String>,
}

/// List all items with per-status counts.
pub async fn list(State(state): State<AppState>) -> Result<Json<InventoryListing>> {
    Ok(Json(state.inventory().list_all().await?))
}

/// Fetch a single item.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InventoryItem>> {
    let id = parse_item_id(&id)?;
    Ok(Json(state.inventory().get(id).await?))
}

/// Create an item.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewItem>,
) -> Result<(StatusCode, Json<InventoryItem>)> {
    let item = state.inventory().create(body).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Apply a partial update.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ItemPatch>,
) -> Result<Json<InventoryItem>> {
    let id = parse_item_id(&id)?;
    Ok(Json(state.inventory().apply_update(id, patch).await?))
}

/// Delete an item.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let id = parse_item_id(&id)?;
    state.inventory().delete(id).await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "Item deleted successfully".to_string(),
    }))
}

/// Free-text and status search.
pub async fn search(
    State(state): State<AppState>,
    ApiJson(filter): ApiJson<ItemFilter>,
) -> Result<Json<Vec<InventoryItem>>> {
    Ok(Json(state.inventory().search(filter).await?))
}

/// Find which of the given items a photo shows.
pub async fn search_by_photo(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PhotoSearchRequest>,
) -> Result<Json<PhotoSearchResponse>> {
    let matching_item_ids = state
        .inventory()
        .search_by_photo(&body.image, &body.item_ids)
        .await?;
    Ok(Json(PhotoSearchResponse { matching_item_ids }))
}

/// Sold items awaiting shipment, most pressing first.
pub async fn ready_to_ship(
    State(state): State<AppState>,
    Query(params): Query<ReadyToShipParams>,
) -> Result<Json<ShippingWorklist>> {
    let today = params
        .today
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                AppError::BadRequest(format!("invalid today '{raw}', expected YYYY-MM-DD"))
            })
        })
        .transpose()?;

    let offset = params
        .tz_offset_minutes
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(parse_utc_offset)
        .transpose()?;

    let worklist = match offset {
        Some(offset) => {
            let today = today.unwrap_or_else(|| Utc::now().with_timezone(&offset).date_naive());
            state.inventory().ready_to_ship_in(today, &offset).await?
        }
        None => {
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            state.inventory().ready_to_ship(today).await?
        }
    };
    Ok(Json(worklist))
}

/// Parse a UTC offset given in minutes east of UTC.
fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    raw.parse::<i32>()
        .ok()
        .and_then(|minutes| minutes.checked_mul(60))
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "invalid tzOffsetMinutes '{raw}', expected minutes east of UTC"
            ))
        })
}
