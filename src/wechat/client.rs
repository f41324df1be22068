use std::path::Path;
use std::time::Duration;

use serde_json::json;

use crate::config::Config;
use crate::errors::AppError;
use crate::wechat::auth::TokenCache;
use crate::wechat::types::{
    Article, ArticlePayload, MediaUpload, MediaUploadAck, PublishAck, PublishMode, PublishReceipt,
};

pub const DEFAULT_DRAFT_OFFSET: u32 = 0;
pub const DEFAULT_DRAFT_COUNT: u32 = 20;

/// Client for the vendor content API.
///
/// Owns the HTTP connection pool and the access-token cache; every operation
/// obtains a token through the cache before calling out.
pub struct WechatClient {
    http: reqwest::Client,
    api_base: String,
    tokens: TokenCache,
}

impl WechatClient {
    pub fn new(cfg: &Config) -> Self {
        Self::with_api_base(&cfg.api_base, &cfg.app_id, &cfg.app_secret)
    }

    /// Builds a client against an explicit vendor origin. Tests use this to
    /// point every operation at a stub server.
    pub fn with_api_base(api_base: &str, app_id: &str, app_secret: &str) -> Self {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build HTTP client");

        let api_base = api_base.trim_end_matches('/').to_string();
        let tokens = TokenCache::new(http.clone(), api_base.clone(), app_id, app_secret);

        Self {
            http,
            api_base,
            tokens,
        }
    }

    /// Uploads image bytes to the vendor media endpoint.
    ///
    /// Fails with `UpstreamMedia` when the response carries no media
    /// identifier, passing the vendor message through.
    pub async fn upload_media(
        &self,
        data: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<MediaUpload, AppError> {
        let token = self.tokens.access_token().await?;
        let url = format!(
            "{}/cgi-bin/media/upload?access_token={}&type=image",
            self.api_base, token
        );

        let part = reqwest::multipart::Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|_| AppError::InvalidFileType(content_type.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("media", part)
            .text("type", "image");

        let ack: MediaUploadAck = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;

        match ack.media_id {
            Some(media_id) => {
                tracing::info!(%media_id, "media accepted by vendor");
                Ok(MediaUpload {
                    media_id,
                    url: ack.url,
                })
            }
            None => Err(AppError::UpstreamMedia(ack.errmsg.unwrap_or_else(|| {
                "media id missing from vendor response".to_string()
            }))),
        }
    }

    /// Relays a stored file to the vendor media endpoint and removes it.
    ///
    /// The local copy is deleted once the vendor call returns, on the
    /// success and the failure path alike.
    pub async fn upload_media_file(
        &self,
        path: &Path,
        filename: &str,
        content_type: &str,
    ) -> Result<MediaUpload, AppError> {
        let outcome = async {
            let data = tokio::fs::read(path)
                .await
                .map_err(|e| AppError::Internal(e.into()))?;
            self.upload_media(data, filename, content_type).await
        }
        .await;

        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove relayed upload");
        }

        outcome
    }

    /// Submits an article as a draft or for immediate publication.
    ///
    /// Validation runs before any vendor call, token refresh included.
    pub async fn submit_article(
        &self,
        article: &Article,
        mode: PublishMode,
    ) -> Result<PublishReceipt, AppError> {
        if article.title.is_empty() {
            return Err(AppError::Validation("title must not be empty".into()));
        }
        if article.content.is_empty() {
            return Err(AppError::Validation("content must not be empty".into()));
        }

        let token = self.tokens.access_token().await?;
        let url = format!("{}{}?access_token={}", self.api_base, mode.endpoint(), token);
        let payload = ArticlePayload {
            articles: [article],
        };

        let ack: PublishAck = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        if ack.errcode != 0 {
            let msg = ack
                .errmsg
                .unwrap_or_else(|| format!("vendor rejected article (errcode {})", ack.errcode));
            return Err(AppError::UpstreamPublish(msg));
        }

        tracing::info!(?mode, title = %article.title, "article accepted by vendor");
        Ok(PublishReceipt {
            status: "success".to_string(),
            media_id: ack.media_id,
            publish_id: ack.publish_id.map(String::from),
        })
    }

    /// Relays a publish-status query, returning the vendor JSON untouched.
    pub async fn publish_status(&self, publish_id: &str) -> Result<serde_json::Value, AppError> {
        let token = self.tokens.access_token().await?;
        let url = format!(
            "{}/cgi-bin/freepublish/get?access_token={}",
            self.api_base, token
        );

        let status = self
            .http
            .post(&url)
            .json(&json!({ "publish_id": publish_id }))
            .send()
            .await?
            .json()
            .await?;

        Ok(status)
    }

    /// Relays a draft-list query, returning the vendor JSON untouched.
    pub async fn list_drafts(
        &self,
        offset: Option<u32>,
        count: Option<u32>,
    ) -> Result<serde_json::Value, AppError> {
        let token = self.tokens.access_token().await?;
        let url = format!(
            "{}/cgi-bin/draft/batchget?access_token={}",
            self.api_base, token
        );

        let drafts = self
            .http
            .post(&url)
            .json(&json!({
                "offset": offset.unwrap_or(DEFAULT_DRAFT_OFFSET),
                "count": count.unwrap_or(DEFAULT_DRAFT_COUNT),
            }))
            .send()
            .await?
            .json()
            .await?;

        Ok(drafts)
    }
}
