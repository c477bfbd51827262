//! World-state storage for the library lending ledger.
//!
//! The ledger logic never talks to a storage engine directly. It reads and
//! writes through the [`WorldState`] contract, which the host ledger runtime
//! supplies once per invocation. This crate defines that contract and a small
//! host double used by tests and embedders.
//!
//! # Contract
//!
//! - [`WorldState`] — get / put / delete / ordered range scan over string keys
//! - [`StateCursor`] — scoped range-scan handle, released on close or drop
//!
//! # Host Double
//!
//! - [`InMemoryWorldState`] — `BTreeMap`-backed committed state
//! - [`Transaction`] — buffers one invocation's writes over a base state
//! - [`invoke`] / [`simulate`] — run an operation, then commit or discard
//! - [`WriteBatch`] — ordered write set with a deterministic digest
//!
//! # Design Rules
//!
//! 1. Keys are plain identifiers; there are no composite keys.
//! 2. Range scans yield entries in ascending key order.
//! 3. A failed invocation leaves committed state untouched.
//! 4. Every cursor is released exactly once, on close or on drop.
//! 5. All backend errors are propagated, never silently ignored.

pub mod batch;
pub mod cursor;
pub mod error;
pub mod host;
pub mod memory;
pub mod traits;
pub mod transaction;

pub use batch::{PendingWrite, WriteBatch};
pub use cursor::{CursorGuard, KeyValue, SnapshotCursor};
pub use error::{StoreError, StoreResult};
pub use host::{invoke, simulate, InvocationOutcome};
pub use memory::InMemoryWorldState;
pub use traits::{StateCursor, WorldState};
pub use transaction::{CommitReceipt, Transaction};
