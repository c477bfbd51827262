use lend_store::StoreError;
use lend_types::{CodecError, EntityKind};

/// Coarse classification of a [`LedgerError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    Decode,
    Encode,
    Storage,
    Invocation,
    Config,
}

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("the {kind} {key} does not exist")]
    NotFound { kind: EntityKind, key: String },

    #[error("the {kind} {key} already exists")]
    AlreadyExists { kind: EntityKind, key: String },

    #[error("failed to decode value at {key}: {reason}")]
    Decode { key: String, reason: String },

    #[error("failed to encode {what}: {reason}")]
    Encode { what: String, reason: String },

    #[error("failed to access world state: {0}")]
    Storage(#[from] StoreError),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("invalid argument for {function}: {reason}")]
    InvalidArgument { function: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LedgerError {
    pub(crate) fn not_found(kind: EntityKind, key: &str) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub(crate) fn already_exists(kind: EntityKind, key: &str) -> Self {
        Self::AlreadyExists {
            kind,
            key: key.to_string(),
        }
    }

    pub(crate) fn decode(key: &str, err: CodecError) -> Self {
        Self::Decode {
            key: key.to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn encode(what: impl Into<String>, err: CodecError) -> Self {
        Self::Encode {
            what: what.into(),
            reason: err.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Encode { .. } => ErrorKind::Encode,
            Self::Storage(_) => ErrorKind::Storage,
            Self::UnknownFunction(_) | Self::InvalidArgument { .. } => ErrorKind::Invocation,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// The world-state key the error is about, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::NotFound { key, .. }
            | Self::AlreadyExists { key, .. }
            | Self::Decode { key, .. } => Some(key.as_str()),
            Self::Storage(StoreError::KeyNotFound(key)) => Some(key.as_str()),
            _ => None,
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_kind_and_key() {
        let err = LedgerError::not_found(EntityKind::Book, "book9");
        assert_eq!(err.to_string(), "the book book9 does not exist");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.key(), Some("book9"));

        let err = LedgerError::already_exists(EntityKind::Record, "r1");
        assert_eq!(err.to_string(), "the record r1 already exists");
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn store_errors_convert() {
        let err: LedgerError = StoreError::Backend("disk unplugged".into()).into();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(err.key(), None);
        assert!(err.to_string().contains("disk unplugged"));
    }

    #[test]
    fn decode_wraps_codec_reason() {
        let err = LedgerError::decode("k", CodecError::Json("eof".into()));
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.to_string(), "failed to decode value at k: json error: eof");
    }

    #[test]
    fn encode_names_its_subject_not_a_key() {
        let err = LedgerError::encode("GetAllBooks response", CodecError::Json("boom".into()));
        assert_eq!(err.kind(), ErrorKind::Encode);
        assert_eq!(err.key(), None);
        assert_eq!(
            err.to_string(),
            "failed to encode GetAllBooks response: json error: boom"
        );
    }

    #[test]
    fn invocation_errors_share_a_kind() {
        assert_eq!(
            LedgerError::UnknownFunction("Fly".into()).kind(),
            ErrorKind::Invocation
        );
        assert_eq!(
            LedgerError::InvalidArgument {
                function: "AddBook".into(),
                reason: "price".into()
            }
            .kind(),
            ErrorKind::Invocation
        );
    }
}
