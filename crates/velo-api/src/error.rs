use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to the client, split by whether the request was bad or
/// we were. Anything that happens after response bytes have flowed is not
/// represented here; those failures are logged and the stream just ends.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::Internal(_) => 500,
        }
    }

    /// The structured `{ "error": ... }` body clients receive.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
