//! Borrow and return transitions.
//!
//! A book moves `AVAILABLE -> ON_LOAN` on borrow and back on return. Each
//! transition writes the book and then the record. The two writes are not
//! compensated here: if the second fails, the host discards the whole
//! invocation's write set.

use tracing::debug;

use lend_store::WorldState;
use lend_types::{Record, Timestamp, LIBRARY_OWNER};

use crate::books::BookStore;
use crate::error::LedgerResult;
use crate::records::RecordStore;

/// Multi-entity lending transitions over one world state.
#[derive(Clone, Copy)]
pub struct LendingWorkflow<'s> {
    books: BookStore<'s>,
    records: RecordStore<'s>,
    library_owner: &'s str,
}

impl<'s> LendingWorkflow<'s> {
    pub fn new(state: &'s dyn WorldState) -> Self {
        Self::with_owner(state, LIBRARY_OWNER)
    }

    pub fn with_owner(state: &'s dyn WorldState, library_owner: &'s str) -> Self {
        Self {
            books: BookStore::with_owner(state, library_owner),
            records: RecordStore::new(state),
            library_owner,
        }
    }

    /// Lend `book_id` to `borrower` and open `record_id`.
    ///
    /// The book's current state is not checked: borrowing a book that is
    /// already on loan reassigns it.
    pub fn borrow_book(
        &self,
        record_id: &str,
        book_id: &str,
        borrower: &str,
        start_time: Timestamp,
    ) -> LedgerResult<Record> {
        let mut book = self.books.get(book_id)?;
        book.lend_to(borrower);
        self.books.put(&book)?;

        let record = self.records.add(record_id, book_id, start_time, borrower)?;
        debug!(record_id, book_id, borrower, %start_time, "book borrowed");
        Ok(record)
    }

    /// Shelve `book_id` and close `record_id` at `end_time`.
    ///
    /// The record is not checked to be open or to reference `book_id`.
    pub fn return_book(
        &self,
        record_id: &str,
        book_id: &str,
        end_time: Timestamp,
    ) -> LedgerResult<Record> {
        let mut book = self.books.get(book_id)?;
        book.shelve(self.library_owner);
        self.books.put(&book)?;

        let mut record = self.records.get(record_id)?;
        record.close(end_time);
        self.records.put(&record)?;
        debug!(record_id, book_id, %end_time, "book returned");
        Ok(record)
    }
}
