use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

pub const MISSING_PARAMETERS: &str = "Bad request. Missing parametres.";
pub const INVALID_LANGUAGE: &str = "Invalid language";
pub const NOT_FOUND: &str = "Message not found.";
pub const INTERNAL_ERROR: &str = "Internal server error.";
pub const RELAY_FAILED: &str = "Something went wrong";

pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced by the message routes.
///
/// Client-facing bodies are plain text. Downstream failures keep their cause
/// for logging but never expose it in the response.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Message not found")]
    NotFound,

    #[error("Storage error: {0:#}")]
    Storage(anyhow::Error),

    #[error("Relay error: {0:#}")]
    Relay(anyhow::Error),
}

impl AppError {
    pub fn missing_parameters() -> Self {
        AppError::Validation(MISSING_PARAMETERS.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::UnsupportedLanguage(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Relay(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Body sent to the client.
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Validation(msg) => msg.as_str(),
            AppError::UnsupportedLanguage(_) => INVALID_LANGUAGE,
            AppError::NotFound => NOT_FOUND,
            AppError::Storage(_) => INTERNAL_ERROR,
            AppError::Relay(_) => RELAY_FAILED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Storage(_) | AppError::Relay(_) = &self {
            error!("{}", self);
        }

        (self.status_code(), self.user_message().to_string()).into_response()
    }
}
