// src/error.rs
use crate::models::auth::ErrorResponse;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    EmptyInput(String),
    #[error("Chat provider error: {0}")]
    ProviderFailure(String),
    #[error("Unexpected server error: {0}")]
    UnexpectedServerError(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Conflict(_) | AppError::EmptyInput(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ProviderFailure(_)
            | AppError::UnexpectedServerError(_)
            | AppError::Database(_)
            | AppError::Hashing(_)
            | AppError::Token(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the caller. Server-side details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::EmptyInput(msg) => msg.clone(),
            AppError::ProviderFailure(_) => {
                "An error occurred while processing your message".to_string()
            }
            _ => "Internal server error".to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = %status.as_u16(), "request rejected");
        }

        let body = ErrorResponse {
            status: if status.is_server_error() { "error" } else { "fail" }.to_string(),
            message: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}
