use tracing::info;

use lend_store::WorldState;
use lend_types::{Book, Record, Timestamp};

use crate::books::BookStore;
use crate::config::LedgerConfig;
use crate::error::LedgerResult;
use crate::lending::LendingWorkflow;
use crate::query::{QueryEngine, TitleCounts};
use crate::records::RecordStore;
use crate::validation::{InvariantValidator, ValidationReport};

/// Invocable operations of the library ledger.
///
/// Every call receives the world state of one host transaction as `ctx`.
/// An operation that returns `Err` may have written part of its changes to
/// `ctx`; the host discards them with the rest of the invocation.
pub trait LibraryLedger: Send + Sync {
    /// Write the seed catalog, overwriting any books with the same ids.
    fn init_ledger(&self, ctx: &dyn WorldState) -> LedgerResult<()>;

    fn add_book(
        &self,
        ctx: &dyn WorldState,
        book_id: &str,
        name: &str,
        author: &str,
        price: u64,
    ) -> LedgerResult<Book>;

    fn add_record(
        &self,
        ctx: &dyn WorldState,
        record_id: &str,
        book_id: &str,
        start_time: Timestamp,
        borrower: &str,
    ) -> LedgerResult<Record>;

    fn query_book(&self, ctx: &dyn WorldState, book_id: &str) -> LedgerResult<Book>;

    fn query_record(&self, ctx: &dyn WorldState, record_id: &str) -> LedgerResult<Record>;

    fn borrow_book(
        &self,
        ctx: &dyn WorldState,
        record_id: &str,
        book_id: &str,
        new_owner: &str,
        start_time: Timestamp,
    ) -> LedgerResult<Record>;

    fn return_book(
        &self,
        ctx: &dyn WorldState,
        record_id: &str,
        book_id: &str,
        end_time: Timestamp,
    ) -> LedgerResult<Record>;

    fn delete_book(&self, ctx: &dyn WorldState, book_id: &str) -> LedgerResult<()>;

    fn book_exists(&self, ctx: &dyn WorldState, book_id: &str) -> LedgerResult<bool>;

    fn record_exists(&self, ctx: &dyn WorldState, record_id: &str) -> LedgerResult<bool>;

    /// Number of books per title.
    fn get_all_books(&self, ctx: &dyn WorldState) -> LedgerResult<TitleCounts>;

    /// Every book titled `name`, lent or not.
    fn get_borrow_list(&self, ctx: &dyn WorldState, name: &str) -> LedgerResult<Vec<Book>>;

    fn get_loan_history(&self, ctx: &dyn WorldState, book_id: &str) -> LedgerResult<Vec<Record>>;

    fn get_open_loans(&self, ctx: &dyn WorldState) -> LedgerResult<Vec<Record>>;

    /// Check books and records against each other.
    fn audit(&self, ctx: &dyn WorldState) -> LedgerResult<ValidationReport>;
}

/// The library ledger contract, parameterized by [`LedgerConfig`].
#[derive(Clone, Debug, Default)]
pub struct LibraryContract {
    config: LedgerConfig,
}

impl LibraryContract {
    /// Build a contract from a validated configuration.
    pub fn new(config: LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn books<'s>(&'s self, ctx: &'s dyn WorldState) -> BookStore<'s> {
        BookStore::with_owner(ctx, &self.config.library_owner)
    }

    fn records<'s>(&self, ctx: &'s dyn WorldState) -> RecordStore<'s> {
        RecordStore::new(ctx)
    }

    fn workflow<'s>(&'s self, ctx: &'s dyn WorldState) -> LendingWorkflow<'s> {
        LendingWorkflow::with_owner(ctx, &self.config.library_owner)
    }

    fn queries<'s>(&'s self, ctx: &'s dyn WorldState) -> QueryEngine<'s> {
        QueryEngine::with_config(ctx, &self.config.scan)
    }
}

impl LibraryLedger for LibraryContract {
    fn init_ledger(&self, ctx: &dyn WorldState) -> LedgerResult<()> {
        let books = self.books(ctx);
        for entry in &self.config.seed_catalog {
            let book = Book::shelved_by(
                &entry.book_id,
                &entry.name,
                &entry.author,
                entry.price,
                &self.config.library_owner,
            );
            books.put(&book)?;
        }
        info!(books = self.config.seed_catalog.len(), "ledger initialized");
        Ok(())
    }

    fn add_book(
        &self,
        ctx: &dyn WorldState,
        book_id: &str,
        name: &str,
        author: &str,
        price: u64,
    ) -> LedgerResult<Book> {
        self.books(ctx).add(book_id, name, author, price)
    }

    fn add_record(
        &self,
        ctx: &dyn WorldState,
        record_id: &str,
        book_id: &str,
        start_time: Timestamp,
        borrower: &str,
    ) -> LedgerResult<Record> {
        self.records(ctx).add(record_id, book_id, start_time, borrower)
    }

    fn query_book(&self, ctx: &dyn WorldState, book_id: &str) -> LedgerResult<Book> {
        self.books(ctx).get(book_id)
    }

    fn query_record(&self, ctx: &dyn WorldState, record_id: &str) -> LedgerResult<Record> {
        self.records(ctx).get(record_id)
    }

    fn borrow_book(
        &self,
        ctx: &dyn WorldState,
        record_id: &str,
        book_id: &str,
        new_owner: &str,
        start_time: Timestamp,
    ) -> LedgerResult<Record> {
        self.workflow(ctx)
            .borrow_book(record_id, book_id, new_owner, start_time)
    }

    fn return_book(
        &self,
        ctx: &dyn WorldState,
        record_id: &str,
        book_id: &str,
        end_time: Timestamp,
    ) -> LedgerResult<Record> {
        self.workflow(ctx).return_book(record_id, book_id, end_time)
    }

    fn delete_book(&self, ctx: &dyn WorldState, book_id: &str) -> LedgerResult<()> {
        self.books(ctx).delete(book_id)
    }

    fn book_exists(&self, ctx: &dyn WorldState, book_id: &str) -> LedgerResult<bool> {
        self.books(ctx).exists(book_id)
    }

    fn record_exists(&self, ctx: &dyn WorldState, record_id: &str) -> LedgerResult<bool> {
        self.records(ctx).exists(record_id)
    }

    fn get_all_books(&self, ctx: &dyn WorldState) -> LedgerResult<TitleCounts> {
        self.queries(ctx).aggregate_by_title()
    }

    fn get_borrow_list(&self, ctx: &dyn WorldState, name: &str) -> LedgerResult<Vec<Book>> {
        self.queries(ctx).borrow_list_by_title(name)
    }

    fn get_loan_history(&self, ctx: &dyn WorldState, book_id: &str) -> LedgerResult<Vec<Record>> {
        self.queries(ctx).loan_history(book_id)
    }

    fn get_open_loans(&self, ctx: &dyn WorldState) -> LedgerResult<Vec<Record>> {
        self.queries(ctx).open_loans()
    }

    fn audit(&self, ctx: &dyn WorldState) -> LedgerResult<ValidationReport> {
        InvariantValidator::validate(&self.queries(ctx), &self.config.library_owner)
    }
}
