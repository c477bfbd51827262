use tracing::debug;

use lend_store::WorldState;
use lend_types::{EntityKind, Record, Timestamp};

use crate::entities::{load, store};
use crate::error::{LedgerError, LedgerResult};

/// CRUD primitives over loan [`Record`]s keyed by record identifier.
#[derive(Clone, Copy)]
pub struct RecordStore<'s> {
    state: &'s dyn WorldState,
}

impl<'s> RecordStore<'s> {
    pub fn new(state: &'s dyn WorldState) -> Self {
        Self { state }
    }

    /// Create an open record.
    ///
    /// `book_id` is not checked against the catalog; callers that need the
    /// book to exist must check it themselves.
    pub fn add(
        &self,
        record_id: &str,
        book_id: &str,
        start_time: Timestamp,
        borrower: &str,
    ) -> LedgerResult<Record> {
        if self.exists(record_id)? {
            return Err(LedgerError::already_exists(EntityKind::Record, record_id));
        }
        let record = Record::open(record_id, book_id, start_time, borrower);
        store(self.state, &record)?;
        debug!(record_id, book_id, borrower, "record added");
        Ok(record)
    }

    pub fn get(&self, record_id: &str) -> LedgerResult<Record> {
        load(self.state, record_id)
    }

    pub fn exists(&self, record_id: &str) -> LedgerResult<bool> {
        Ok(self.state.contains_key(record_id)?)
    }

    /// Persist `record` under its id, replacing any previous value.
    pub fn put(&self, record: &Record) -> LedgerResult<()> {
        store(self.state, record)
    }
}
