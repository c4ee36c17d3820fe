//! Application error types.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::views;

/// Request-scoped failures mapped to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Authentication required: {0}")]
    Auth(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text safe to show the user; storage details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::NotFound(msg) | Self::Validation(msg) | Self::Auth(msg) | Self::Conflict(msg) => {
                msg.clone()
            }
            Self::Storage(_) => "Something went wrong on our side".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Storage(e) = &self {
            tracing::error!("storage failure: {:#}", e);
        }

        let page = views::error_page(status, &self.public_message(), matches!(self, Self::Auth(_)));
        (status, Html(page)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Auth("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Storage(anyhow::anyhow!("disk full")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_storage_details_are_hidden() {
        let err = AppError::Storage(anyhow::anyhow!("/var/data/items.json: permission denied"));
        assert!(!err.public_message().contains("permission denied"));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
