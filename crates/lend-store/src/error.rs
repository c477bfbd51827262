/// Errors from world-state operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Delete of a key that holds no value.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Keys must be non-empty.
    #[error("empty key")]
    EmptyKey,

    /// A lock guarding backend state was poisoned by a panicking writer.
    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),

    /// Failure reported by the underlying backend (I/O, connectivity).
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for world-state operations.
pub type StoreResult<T> = Result<T, StoreError>;
