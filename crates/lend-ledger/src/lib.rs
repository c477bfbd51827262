//! Lending state machine for the library ledger.
//!
//! This crate holds all domain logic. It provides:
//! - `BookStore` / `RecordStore` CRUD primitives over world state
//! - `LendingWorkflow` borrow and return transitions
//! - `QueryEngine` full-keyspace scans (title counts, borrow lists, loans)
//! - `InvariantValidator` cross-entity consistency audit
//! - The `LibraryLedger` trait and its `LibraryContract` implementation
//! - Name-based dispatch (`Invocation`) for hosts that pass string arguments

pub mod books;
pub mod config;
pub mod contract;
pub mod dispatch;
mod entities;
pub mod error;
pub mod lending;
pub mod query;
pub mod records;
pub mod validation;

pub use books::BookStore;
pub use config::{CatalogEntry, LedgerConfig, ScanConfig};
pub use contract::{LibraryContract, LibraryLedger};
pub use dispatch::Invocation;
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use lending::LendingWorkflow;
pub use query::{QueryEngine, TitleCounts};
pub use records::RecordStore;
pub use validation::{InvariantValidator, ValidationReport, Violation, ViolationKind};
