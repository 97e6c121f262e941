use thiserror::Error;

/// Errors surfaced by course service adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("course service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("course service unavailable: {0}")]
    Unavailable(String),

    #[error("course not found")]
    NotFound,
}
