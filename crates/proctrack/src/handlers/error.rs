//! Error responses for the HTTP API.
//!
//! Every failure renders the same generic 500 body. The cause is logged,
//! never returned to the caller.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::api::ErrorResponse;
use crate::process::RegistryError;
use crate::store::StorageError;

/// A failed request, with the operation that failed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: StorageError,
    },

    #[error("{context}: {source}")]
    Registry {
        context: &'static str,
        #[source]
        source: RegistryError,
    },

    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    pub fn storage(context: &'static str, source: StorageError) -> Self {
        Self::Storage { context, source }
    }

    pub fn registry(context: &'static str, source: RegistryError) -> Self {
        Self::Registry { context, source }
    }

    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::InvalidBody(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal()),
        )
            .into_response()
    }
}
