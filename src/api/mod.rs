use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod handlers;

/// Build the gateway API router.
/// All routes are relative — the caller mounts this under `/api`.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/upload", post(handlers::upload_image))
        .route("/wechat/upload-media", post(handlers::upload_media))
        .route("/wechat/publish", post(handlers::publish))
        .route(
            "/wechat/publish-status/:publish_id",
            get(handlers::publish_status),
        )
        .route("/wechat/drafts", get(handlers::list_drafts))
        .layer(TraceLayer::new_for_http())
        .fallback(fallback_404)
}

async fn fallback_404() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "no such endpoint" })),
    )
}
