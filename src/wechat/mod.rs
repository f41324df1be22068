//! Vendor platform integration: token management and content API calls.

pub mod auth;
pub mod client;
pub mod types;

pub use auth::TokenCache;
pub use client::WechatClient;
pub use types::{Article, MediaUpload, PublishMode, PublishReceipt};
