//! Entity types for the library lending ledger.
//!
//! This crate defines the two entities kept in world state and the codec
//! that turns them into the canonical bytes the host store persists. Every
//! other crate in the workspace depends on `lend-types`.
//!
//! # Key Types
//!
//! - [`Book`] — A catalog entry, either on the shelf or lent to a borrower
//! - [`Record`] — One loan: who borrowed which book, and when it came back
//! - [`Timestamp`] — Totally ordered UTC instant with a canonical text form
//! - [`StoredEntity`] — A decoded world-state value of either kind
//!
//! # Wire Format
//!
//! Entities are JSON objects whose fields appear in declared order, so that
//! independent executions of the same operation persist identical bytes.
//! See [`codec`] for details.

pub mod book;
pub mod codec;
pub mod error;
pub mod record;
pub mod timestamp;

pub use book::{Book, LoanState, LIBRARY_OWNER};
pub use codec::{classify, decode, encode, Entity, EntityKind, StoredEntity};
pub use error::CodecError;
pub use record::Record;
pub use timestamp::{Timestamp, UNSET_TIMESTAMP};
