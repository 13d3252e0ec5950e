use thiserror::Error;

/// A message rejected at the transport boundary
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("direction {0} is not one of -1, 0, 1")]
    InvalidDirection(i8),

    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("postcard decode failed: {0}")]
    Postcard(#[from] postcard::Error),

    #[error("json decode failed: {0}")]
    Json(#[from] serde_json::Error),
}
