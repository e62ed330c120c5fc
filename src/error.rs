use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::ApiError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Posts API error: {0}")]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("CSRF validation failed")]
    Forbidden,

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::Api(ApiError::NotFound) => (StatusCode::NOT_FOUND, "Not found"),
            Error::Api(e) => {
                tracing::error!("Posts API error: {}", e);
                (StatusCode::BAD_GATEWAY, "Posts API unavailable")
            }
            Error::Io(e) => {
                tracing::error!("IO error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error")
            }
            Error::Template(e) => {
                tracing::error!("Template error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error")
            }
            Error::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            Error::Forbidden => {
                tracing::warn!("CSRF validation failed");
                (StatusCode::FORBIDDEN, "CSRF validation failed")
            }
            Error::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, message).into_response()
    }
}
