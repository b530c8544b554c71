use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::asset_store::AssetStoreError;
use crate::services::catalog::CatalogError;
use crate::services::pipeline::DerivationError;
use crate::utils::validation::ValidationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad Request: {0}")]
    Validation(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to process image: {}", .0.join("; "))]
    Derivation(Vec<String>),

    #[error("Storage error: {0}")]
    StorageWrite(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Persistence(#[from] sea_orm::DbErr),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err.code {
            "FILE_TOO_LARGE" => AppError::PayloadTooLarge(err.message),
            _ => AppError::Validation(err.message),
        }
    }
}

impl From<DerivationError> for AppError {
    fn from(err: DerivationError) -> Self {
        match err {
            DerivationError::UnsupportedFormat(msg) => AppError::UnsupportedFormat(msg),
            DerivationError::Failed { failures } => {
                AppError::Derivation(failures.iter().map(|f| f.to_string()).collect())
            }
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => AppError::NotFound(format!("Picture {} not found", id)),
            CatalogError::Persistence(e) => AppError::Persistence(e),
        }
    }
}

impl From<AssetStoreError> for AppError {
    fn from(err: AssetStoreError) -> Self {
        AppError::StorageWrite(err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::Validation(format!("Malformed multipart body: {}", err.body_text()))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::UnsupportedFormat(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!("Unsupported image format: {}", msg),
                None,
            ),
            AppError::Derivation(details) => {
                tracing::error!("Image derivation failed: {:?}", details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process image".to_string(),
                    Some(details),
                )
            }
            AppError::StorageWrite(msg) => {
                tracing::error!("Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to store image".to_string(),
                    None,
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Persistence(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to save picture".to_string(),
                    None,
                )
            }
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg, None),
        };

        let body = match details {
            Some(details) => json!({ "error": message, "details": details }),
            None => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}
