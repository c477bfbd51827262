use thiserror::Error;

/// Errors produced while encoding or decoding entities.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("json error: {0}")]
    Json(String),

    #[error("unexpected value shape: {reason}")]
    Shape { reason: String },

    #[error("invalid timestamp: {0}")]
    Timestamp(String),
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
