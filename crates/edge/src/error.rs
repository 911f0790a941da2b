// crates/edge/src/error.rs

use axum::http::StatusCode;
use domain::error::FetchError;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("invalid content: {0}")]
    Validation(String),

    #[error("password error: {0}")]
    Password(#[from] domain::security::password::PasswordError),
}

impl Error {
    /// Status for surfaces that hand this error back to an HTTP client.
    /// Transport failures map to gateway statuses so a CMS outage is
    /// distinguishable from a bug in this process.
    pub fn to_status(&self) -> StatusCode {
        match self {
            Error::Fetch(FetchError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            Error::Fetch(FetchError::Http { status }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Error::Fetch(_) => StatusCode::BAD_GATEWAY,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
