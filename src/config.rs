use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_API_BASE: &str = "https://api.weixin.qq.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Official Account application identifier.
    pub app_id: String,
    /// Official Account application secret.
    pub app_secret: String,
    /// Vendor API origin. Overridable so tests can point at a local stub.
    pub api_base: String,
    /// Directory that receives uploads and is served at /uploads.
    pub upload_dir: PathBuf,
    /// Overrides the host-derived base of returned upload URLs
    /// (needed behind a reverse proxy that rewrites Host).
    pub public_base_url: Option<String>,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let app_id = std::env::var("WECHAT_APP_ID").unwrap_or_default();
    let app_secret = std::env::var("WECHAT_APP_SECRET").unwrap_or_default();

    if app_id.is_empty() || app_secret.is_empty() {
        let env_mode = std::env::var("MDPRESS_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!(
                "WECHAT_APP_ID / WECHAT_APP_SECRET are not set. \
                 Configure the Official Account credentials before running in production."
            );
        }
        eprintln!("⚠️  WECHAT_APP_ID / WECHAT_APP_SECRET are not set — vendor calls will fail until configured.");
    }

    Ok(Config {
        port: std::env::var("MDPRESS_PORT")
            .or_else(|_| std::env::var("PORT"))
            .unwrap_or_else(|_| "3001".into())
            .parse()
            .unwrap_or(3001),
        app_id,
        app_secret,
        api_base: std::env::var("WECHAT_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into()),
        upload_dir: std::env::var("MDPRESS_UPLOAD_DIR")
            .unwrap_or_else(|_| "uploads".into())
            .into(),
        public_base_url: std::env::var("MDPRESS_PUBLIC_URL").ok(),
    })
}
