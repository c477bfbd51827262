//! Full-keyspace catalog queries.
//!
//! Every query opens one range-scan cursor over the whole keyspace and
//! classifies each value. Records are skipped by book queries and books by
//! record queries. The cursor is closed after a complete scan and released by
//! drop on every early return.

use std::collections::BTreeMap;

use tracing::{trace, warn};

use lend_store::WorldState;
use lend_types::{codec, Book, Record, StoredEntity};

use crate::config::ScanConfig;
use crate::error::{LedgerError, LedgerResult};

/// Title → number of books carrying that title, sorted by title.
pub type TitleCounts = BTreeMap<String, u64>;

/// Read-only scans over the catalog and loan history.
#[derive(Clone, Copy)]
pub struct QueryEngine<'s> {
    state: &'s dyn WorldState,
    scan: &'s ScanConfig,
}

static STRICT_SCAN: ScanConfig = ScanConfig {
    skip_undecodable: false,
};

impl<'s> QueryEngine<'s> {
    /// An engine that fails on any value it cannot classify.
    pub fn new(state: &'s dyn WorldState) -> Self {
        Self::with_config(state, &STRICT_SCAN)
    }

    pub fn with_config(state: &'s dyn WorldState, scan: &'s ScanConfig) -> Self {
        Self { state, scan }
    }

    /// Count books per title.
    pub fn aggregate_by_title(&self) -> LedgerResult<TitleCounts> {
        let mut counts = TitleCounts::new();
        self.for_each_entity(|entity| {
            if let Some(book) = entity.into_book() {
                *counts.entry(book.name).or_insert(0) += 1;
            }
        })?;
        Ok(counts)
    }

    /// Books titled `name`, in key order.
    pub fn borrow_list_by_title(&self, name: &str) -> LedgerResult<Vec<Book>> {
        let mut books = Vec::new();
        self.for_each_entity(|entity| {
            if let Some(book) = entity.into_book().filter(|b| b.name == name) {
                books.push(book);
            }
        })?;
        Ok(books)
    }

    /// Every record referencing `book_id`, open or closed, oldest first.
    pub fn loan_history(&self, book_id: &str) -> LedgerResult<Vec<Record>> {
        let mut records = Vec::new();
        self.for_each_entity(|entity| {
            if let Some(record) = entity.into_record().filter(|r| r.book_id == book_id) {
                records.push(record);
            }
        })?;
        records.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.record_id.cmp(&b.record_id))
        });
        Ok(records)
    }

    /// All open records, in key order.
    pub fn open_loans(&self) -> LedgerResult<Vec<Record>> {
        let mut records = Vec::new();
        self.for_each_entity(|entity| {
            if let Some(record) = entity.into_record().filter(Record::is_open) {
                records.push(record);
            }
        })?;
        Ok(records)
    }

    /// Visit every classified value in key order.
    pub(crate) fn for_each_entity(
        &self,
        mut visit: impl FnMut(StoredEntity),
    ) -> LedgerResult<()> {
        let mut cursor = self.state.range_scan("", "")?;
        for entry in &mut cursor {
            let entry = entry?;
            match codec::classify(&entry.value) {
                Ok(entity) => {
                    trace!(key = %entry.key, kind = %entity.kind(), "scanned");
                    visit(entity);
                }
                Err(err) if self.scan.skip_undecodable => {
                    warn!(key = %entry.key, error = %err, "skipping undecodable value");
                }
                Err(err) => return Err(LedgerError::decode(&entry.key, err)),
            }
        }
        cursor.close()?;
        Ok(())
    }
}
