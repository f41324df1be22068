use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::wechat::{Article, PublishMode};
use crate::AppState;

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub filename: String,
    pub originalname: String,
    pub size: u64,
}

#[derive(Serialize)]
pub struct MediaRelayResponse {
    pub success: bool,
    pub media_id: String,
    pub url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    /// A missing title or content validates the same as an empty one.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub author: Option<String>,
    pub digest: Option<String>,
    pub cover_image: Option<String>,
    pub publish_type: Option<PublishMode>,
    pub schedule_time: Option<String>,
}

#[derive(Serialize)]
pub struct PublishResponse {
    pub success: bool,
    pub message: &'static str,
    pub media_id: Option<String>,
    pub publish_id: Option<String>,
}

#[derive(Deserialize)]
pub struct DraftListParams {
    pub offset: Option<u32>,
    pub count: Option<u32>,
}

// ── Handlers ─────────────────────────────────────────────────

/// GET /api/health — liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "service is running",
    })
}

/// POST /api/upload — store an image locally, return its public URL.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let (original_name, content_type, data) = take_file_field(&mut multipart, "image").await?;
    let stored = state
        .uploads
        .save("image", &original_name, &content_type, data)
        .await?;

    let url = format!(
        "{}/uploads/{}",
        request_base(&state, &headers),
        stored.filename
    );
    Ok(Json(UploadResponse {
        success: true,
        url,
        filename: stored.filename,
        originalname: stored.original_name,
        size: stored.size,
    }))
}

/// POST /api/wechat/upload-media — relay an image to the vendor media
/// endpoint. The local copy only exists for the duration of the relay.
pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<MediaRelayResponse>, AppError> {
    let (original_name, content_type, data) = take_file_field(&mut multipart, "media").await?;
    let stored = state
        .uploads
        .save("media", &original_name, &content_type, data)
        .await?;

    let media = state
        .wechat
        .upload_media_file(&stored.path, &stored.original_name, &stored.content_type)
        .await?;

    Ok(Json(MediaRelayResponse {
        success: true,
        media_id: media.media_id,
        url: media.url,
    }))
}

/// POST /api/wechat/publish — create a draft or publish immediately.
pub async fn publish(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PublishRequest>,
) -> Result<Json<PublishResponse>, AppError> {
    let mode = req.publish_type.unwrap_or_default();
    if req.schedule_time.is_some() {
        // No deferred-publish call exists on the vendor draft API; the
        // article is parked as a draft instead.
        tracing::debug!("scheduleTime accepted but not applied");
    }

    let mut article = Article::new(req.title, req.content);
    if let Some(author) = req.author {
        article = article.with_author(author);
    }
    if let Some(digest) = req.digest {
        article = article.with_digest(digest);
    }
    if let Some(cover) = req.cover_image.filter(|c| !c.is_empty()) {
        article = article.with_cover(cover);
    }

    let receipt = state.wechat.submit_article(&article, mode).await?;

    Ok(Json(PublishResponse {
        success: true,
        message: match mode {
            PublishMode::Publish => "article published",
            PublishMode::Draft | PublishMode::Schedule => "draft saved",
        },
        media_id: receipt.media_id,
        publish_id: receipt.publish_id,
    }))
}

/// GET /api/wechat/publish-status/:publish_id — vendor passthrough.
pub async fn publish_status(
    State(state): State<Arc<AppState>>,
    Path(publish_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let status = state.wechat.publish_status(&publish_id).await?;
    Ok(Json(status))
}

/// GET /api/wechat/drafts?offset&count — vendor passthrough.
pub async fn list_drafts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DraftListParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let drafts = state.wechat.list_drafts(params.offset, params.count).await?;
    Ok(Json(drafts))
}

// ── Helpers ──────────────────────────────────────────────────

/// Pulls the named file field out of a multipart body.
async fn take_file_field(
    multipart: &mut Multipart,
    field_name: &str,
) -> Result<(String, String, Bytes), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() != Some(field_name) {
            continue;
        }
        let original_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(bad_multipart)?;
        return Ok((original_name, content_type, data));
    }
    Err(AppError::MissingFile)
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("malformed multipart body: {}", e))
}

/// Base for returned upload URLs: the configured public URL when set,
/// otherwise reconstructed from the request's Host header.
fn request_base(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base) = &state.config.public_base_url {
        return base.trim_end_matches('/').to_string();
    }
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{}://{}", scheme, host)
}
