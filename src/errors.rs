use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("no file attached to the request")]
    MissingFile,

    #[error("only image uploads are accepted (got '{0}')")]
    InvalidFileType(String),

    #[error("file of {size} bytes exceeds the {limit} byte upload ceiling")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("vendor auth failed: {0}")]
    UpstreamAuth(String),

    #[error("vendor media upload failed: {0}")]
    UpstreamMedia(String),

    #[error("vendor publish failed: {0}")]
    UpstreamPublish(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            AppError::Validation(reason) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "validation_failed",
                reason.clone(),
            ),
            AppError::MissingFile => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "missing_file",
                self.to_string(),
            ),
            AppError::InvalidFileType(_) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "invalid_file_type",
                self.to_string(),
            ),
            AppError::FileTooLarge { .. } => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "file_too_large",
                self.to_string(),
            ),
            AppError::UpstreamAuth(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "upstream_error",
                "vendor_auth_failed",
                e.clone(),
            ),
            AppError::UpstreamMedia(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "upstream_error",
                "vendor_media_failed",
                e.clone(),
            ),
            AppError::UpstreamPublish(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "upstream_error",
                "vendor_publish_failed",
                e.clone(),
            ),
            AppError::Upstream(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "upstream_error",
                "upstream_failed",
                e.clone(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_mistakes_map_to_400() {
        for err in [
            AppError::Validation("title must not be empty".into()),
            AppError::MissingFile,
            AppError::InvalidFileType("text/plain".into()),
            AppError::FileTooLarge {
                size: 6_000_000,
                limit: 5_242_880,
            },
        ] {
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn vendor_failures_map_to_500() {
        for err in [
            AppError::UpstreamAuth("invalid appid".into()),
            AppError::UpstreamMedia("invalid media type".into()),
            AppError::UpstreamPublish("api freq out of limit".into()),
            AppError::Upstream("connection reset".into()),
        ] {
            assert_eq!(
                err.into_response().status(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    #[test]
    fn vendor_message_survives_into_display() {
        let err = AppError::UpstreamPublish("api freq out of limit".into());
        assert!(err.to_string().contains("api freq out of limit"));
    }
}
