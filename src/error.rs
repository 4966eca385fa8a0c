use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("GigaChat token request failed: {0}")]
    Token(String),

    #[error("GigaChat chat request failed: {0}")]
    Chat(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Callers only ever see a fixed plain-text message; the detailed
        // cause (upstream status + body) goes to the log.
        let body = match &self {
            AppError::Token(_) => "Failed to obtain a GigaChat access token",
            AppError::Chat(_) => "Error while calling the GigaChat API",
        };

        tracing::error!(error = %self);

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
