use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod config;
mod errors;
mod upload;
mod wechat;

use upload::UploadStore;
use wechat::WechatClient;

/// Shared application state passed to handlers.
pub struct AppState {
    pub config: config::Config,
    pub wechat: WechatClient,
    pub uploads: UploadStore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "gateway=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => {
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, port).await
        }
        Some(cli::Commands::Drafts { offset, count }) => {
            let wechat = WechatClient::new(&cfg);
            let drafts = wechat.list_drafts(Some(offset), Some(count)).await?;
            println!("{}", serde_json::to_string_pretty(&drafts)?);
            Ok(())
        }
        Some(cli::Commands::Status { publish_id }) => {
            let wechat = WechatClient::new(&cfg);
            let status = wechat.publish_status(&publish_id).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    std::fs::create_dir_all(&cfg.upload_dir).with_context(|| {
        format!(
            "failed to create upload directory {}",
            cfg.upload_dir.display()
        )
    })?;

    let wechat = WechatClient::new(&cfg);
    let uploads = UploadStore::new(&cfg.upload_dir);
    let upload_dir = cfg.upload_dir.clone();

    let state = Arc::new(AppState {
        config: cfg,
        wechat,
        uploads,
    });

    let app = axum::Router::new()
        .nest("/api", api::api_router())
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .with_state(state)
        // Matches the authoring UI's request ceiling; per-file limits are
        // enforced separately by the upload store.
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        // The editor runs on a separate dev origin.
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(request_id_middleware));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("mdpress gateway listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Middleware: injects a unique X-Request-Id into every response.
/// This allows clients to correlate errors with gateway logs.
async fn request_id_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = axum::http::HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}
