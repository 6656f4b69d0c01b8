//! Image upload handler.

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image";

/// Upload response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    /// Server-relative URL of the stored image.
    pub url: String,
    pub filename: String,
}

/// Store an uploaded image.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        let stored = state.uploads().save(&content_type, &bytes).await?;

        return Ok(Json(UploadResponse {
            success: true,
            message: "Image uploaded successfully".to_string(),
            url: stored.url,
            filename: stored.filename,
        }));
    }

    Err(AppError::BadRequest("No image file provided".to_string()))
}
