//! Canonical encoding of entities into world-state values.
//!
//! Values are compact JSON objects. Field order follows the struct
//! declaration, so the same entity always encodes to the same bytes no matter
//! which process produced it. Books and records share one keyspace; use
//! [`classify`] when a value of unknown kind has to be interpreted.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::book::Book;
use crate::error::CodecError;
use crate::record::Record;

/// The two kinds of value kept in world state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Book,
    Record,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Book => write!(f, "book"),
            Self::Record => write!(f, "record"),
        }
    }
}

/// A value that can live in world state under its own identifier.
pub trait Entity: Serialize + DeserializeOwned {
    const KIND: EntityKind;

    /// The world-state key of this entity.
    fn key(&self) -> &str;
}

impl Entity for Book {
    const KIND: EntityKind = EntityKind::Book;

    fn key(&self) -> &str {
        &self.book_id
    }
}

impl Entity for Record {
    const KIND: EntityKind = EntityKind::Record;

    fn key(&self) -> &str {
        &self.record_id
    }
}

/// A decoded value of either kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoredEntity {
    Book(Book),
    Record(Record),
}

impl StoredEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Book(_) => EntityKind::Book,
            Self::Record(_) => EntityKind::Record,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Book(book) => book.key(),
            Self::Record(record) => record.key(),
        }
    }

    pub fn into_book(self) -> Option<Book> {
        match self {
            Self::Book(book) => Some(book),
            Self::Record(_) => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Record(record) => Some(record),
            Self::Book(_) => None,
        }
    }
}

/// Encode an entity into its canonical bytes.
pub fn encode<E: Entity>(entity: &E) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(entity)?)
}

/// Decode bytes as an entity of a known kind.
pub fn decode<E: Entity>(bytes: &[u8]) -> Result<E, CodecError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decode bytes of unknown kind.
///
/// A JSON object carrying a `RecordID` field is a record; one carrying a
/// `BookID` field and no `RecordID` is a book. Anything else is a shape error.
pub fn classify(bytes: &[u8]) -> Result<StoredEntity, CodecError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    let Some(fields) = value.as_object() else {
        return Err(CodecError::Shape {
            reason: "expected a JSON object".into(),
        });
    };

    if fields.contains_key("RecordID") {
        Ok(StoredEntity::Record(serde_json::from_value(value)?))
    } else if fields.contains_key("BookID") {
        Ok(StoredEntity::Book(serde_json::from_value(value)?))
    } else {
        Err(CodecError::Shape {
            reason: "object has neither a RecordID nor a BookID field".into(),
        })
    }
}
