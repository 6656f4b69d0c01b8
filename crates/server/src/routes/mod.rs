//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness
//! GET    /health/ready                    - Readiness (pings the item store)
//!
//! # Inventory
//! GET    /api/inventory                   - All items + stats
//! POST   /api/inventory                   - Create item
//! GET    /api/inventory/{id}              - Item detail
//! PATCH  /api/inventory/{id}              - Partial update
//! DELETE /api/inventory/{id}              - Delete item
//! POST   /api/inventory/search            - Text/status search
//! POST   /api/inventory/search-by-photo   - Photo search
//! GET    /api/inventory/ready-to-ship     - Shipping worklist
//!
//! # Uploads
//! POST   /api/upload/image                - Store an image (multipart)
//! GET    /uploads/{file}                  - Serve a stored image
//!
//! # Platforms
//! GET    /api/platforms                   - Platform list
//! POST   /api/platforms                   - Add platform
//! PUT    /api/platforms/order             - Reorder
//! PATCH  /api/platforms/{id}              - Edit platform
//! DELETE /api/platforms/{id}              - Remove platform
//! ```

pub mod inventory;
pub mod platforms;
pub mod upload;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::services::uploads::UPLOADS_URL_PREFIX;
use crate::state::AppState;

/// Headroom over the image size limit for multipart framing.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the inventory routes router.
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(inventory::list).post(inventory::create))
        .route("/search", post(inventory::search))
        .route("/search-by-photo", post(inventory::search_by_photo))
        .route("/ready-to-ship", get(inventory::ready_to_ship))
        .route(
            "/{id}",
            get(inventory::show)
                .patch(inventory::update)
                .delete(inventory::delete),
        )
}

/// Create the platform routes router.
pub fn platform_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(platforms::list).post(platforms::add))
        .route("/order", put(platforms::reorder))
        .route(
            "/{id}",
            axum::routing::patch(platforms::update).delete(platforms::remove),
        )
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/inventory", inventory_routes())
        .nest("/api/platforms", platform_routes())
        .route("/api/upload/image", post(upload::upload_image))
}

/// Request body limit for a given image size limit.
const fn body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES)
}

/// Build the full application: API routes, health checks, stored images,
/// request IDs and HTTP tracing.
pub fn app(state: AppState) -> Router {
    let body_limit = body_limit(state.config().max_upload_bytes);
    let uploads = ServeDir::new(state.uploads().dir());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service(UPLOADS_URL_PREFIX, uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the item store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.inventory().store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
