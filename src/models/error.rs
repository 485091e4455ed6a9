use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::models::card::FieldError;
use crate::models::registration::ErrorMap;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Failure reported by the identity provider. The message is shown verbatim.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    #[error("{0}")]
    Rejected(String),
    #[error("Identity provider unreachable: {0}")]
    Transport(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Invalid key path: {0}")]
    InvalidKeyPath(String),
    #[error("{0}")]
    Backend(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {} field(s) invalid", .0.len())]
    Validation(ErrorMap),
    #[error("{0}")]
    CardRejected(FieldError),
    #[error("{0}")]
    AuthFailed(String),
    #[error("Error saving data: {0}")]
    StoreError(#[from] StoreError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Rejected(msg) => ApiError::AuthFailed(msg),
            AuthError::Transport(_) => ApiError::AuthFailed(e.to_string()),
        }
    }
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::CardRejected(_) => "CARD_REJECTED",
            ApiError::AuthFailed(_) => "AUTH_FAILED",
            ApiError::StoreError(_) => "STORE_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::CardRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::AuthFailed(_) => StatusCode::UNAUTHORIZED,
            ApiError::StoreError(_) => StatusCode::BAD_GATEWAY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let details = match self {
            ApiError::Validation(errors) => serde_json::to_value(errors).ok(),
            ApiError::CardRejected(rejection) => serde_json::to_value(rejection).ok(),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
            details,
        })
    }
}
