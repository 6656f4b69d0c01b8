//! Platform list API handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use bintrack_core::{Platform, PlatformChanges, PlatformDraft};

use crate::error::{ApiJson, Result};
use crate::state::AppState;

/// Reorder request: every platform id, in the new order.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<String>,
}

/// Response for a successful removal.
#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub success: bool,
    pub message: String,
}

/// The platform list in display order.
pub async fn list(State(state): State<AppState>) -> Json<Vec<Platform>> {
    Json(state.platforms().list().await)
}

/// Add a platform.
pub async fn add(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<PlatformDraft>,
) -> Result<(StatusCode, Json<Platform>)> {
    let platform = state.platforms().add(draft).await?;
    Ok((StatusCode::CREATED, Json(platform)))
}

/// Edit a platform.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(changes): ApiJson<PlatformChanges>,
) -> Result<Json<Platform>> {
    Ok(Json(state.platforms().update(&id, changes).await?))
}

/// Remove a platform.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RemoveResponse>> {
    let removed = state.platforms().remove(&id).await?;
    Ok(Json(RemoveResponse {
        success: true,
        message: format!("Platform {} removed", removed.name),
    }))
}

/// Reorder the list.
pub async fn reorder(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ReorderRequest>,
) -> Result<Json<Vec<Platform>>> {
    Ok(Json(state.platforms().reorder(&body.ids).await?))
}
