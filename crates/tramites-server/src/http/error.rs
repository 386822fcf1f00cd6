//! HTTP error taxonomy.
//!
//! Every handler failure becomes a structured `{ "error": ... }` JSON body.
//! Unauthenticated and forbidden are distinguishable only by status code;
//! internal failures are logged with their cause and reported generically.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::blobstore::BlobError;
use crate::pdf::PdfError;
use crate::storage::DatabaseError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No autenticado")]
    Unauthenticated,

    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("No autorizado")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Error interno del servidor")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(cause) = &self {
            error!(%cause, "internal error");
        }

        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(what) => Self::NotFound(what),
            DatabaseError::Duplicate(what) => Self::Conflict(what),
            other => Self::Internal(other.into()),
        }
    }
}

impl From<tramites_core::Error> for ApiError {
    fn from(err: tramites_core::Error) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<BlobError> for ApiError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::InvalidFilename(_) => Self::Validation(err.to_string()),
            BlobError::Io(_) => Self::Internal(err.into()),
        }
    }
}

impl From<PdfError> for ApiError {
    fn from(err: PdfError) -> Self {
        Self::Internal(err.into())
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Internal(err.into())
    }
}
