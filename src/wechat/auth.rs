use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::wechat::types::TokenGrant;

/// Tokens are refreshed this long before the vendor-reported expiry, so a
/// consumer never holds a token within five minutes of it going stale.
const EXPIRY_MARGIN_SECS: u64 = 300;

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Process-wide access-token cache for the vendor content API.
///
/// The credential lives behind an accessor instead of a global: construction
/// takes the vendor base URL, so tests can point the cache at a stub server.
/// Refresh is not serialized — two callers racing an expired token may both
/// hit the vendor; the extra grant is harmless and the last write wins.
pub struct TokenCache {
    http: reqwest::Client,
    api_base: String,
    app_id: String,
    app_secret: String,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(
        http: reqwest::Client,
        api_base: impl Into<String>,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            cached: RwLock::new(None),
        }
    }

    /// Returns the cached token while it is still inside its validity
    /// window, refreshing from the vendor otherwise.
    pub async fn access_token(&self) -> Result<String, AppError> {
        if let Some(token) = self.cached.read().await.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }
        self.refresh().await
    }

    async fn refresh(&self) -> Result<String, AppError> {
        let url = format!(
            "{}/cgi-bin/token?grant_type=client_credential&appid={}&secret={}",
            self.api_base, self.app_id, self.app_secret
        );

        let grant: TokenGrant = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::UpstreamAuth(e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::UpstreamAuth(e.to_string()))?;

        let (Some(value), Some(expires_in)) = (grant.access_token, grant.expires_in) else {
            let msg = grant
                .errmsg
                .unwrap_or_else(|| "access token missing from vendor response".to_string());
            tracing::warn!(errcode = grant.errcode, "token grant rejected: {}", msg);
            return Err(AppError::UpstreamAuth(msg));
        };

        let ttl = Duration::from_secs(expires_in.saturating_sub(EXPIRY_MARGIN_SECS));
        *self.cached.write().await = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + ttl,
        });

        tracing::debug!(ttl_secs = ttl.as_secs(), "vendor access token refreshed");
        Ok(value)
    }
}
