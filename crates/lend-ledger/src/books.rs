use tracing::debug;

use lend_store::WorldState;
use lend_types::{Book, EntityKind, LIBRARY_OWNER};

use crate::entities::{load, store};
use crate::error::{LedgerError, LedgerResult};

/// CRUD primitives over [`Book`] entities keyed by book identifier.
///
/// Books share the keyspace with records, so "exists" means the key holds
/// any value.
#[derive(Clone, Copy)]
pub struct BookStore<'s> {
    state: &'s dyn WorldState,
    library_owner: &'s str,
}

impl<'s> BookStore<'s> {
    pub fn new(state: &'s dyn WorldState) -> Self {
        Self::with_owner(state, LIBRARY_OWNER)
    }

    /// A store whose new books are shelved under `library_owner`.
    pub fn with_owner(state: &'s dyn WorldState, library_owner: &'s str) -> Self {
        Self {
            state,
            library_owner,
        }
    }

    /// Create an available book. Fails if `book_id` is taken.
    pub fn add(&self, book_id: &str, name: &str, author: &str, price: u64) -> LedgerResult<Book> {
        if self.exists(book_id)? {
            return Err(LedgerError::already_exists(EntityKind::Book, book_id));
        }
        let book = Book::shelved_by(book_id, name, author, price, self.library_owner);
        store(self.state, &book)?;
        debug!(book_id, name, "book added");
        Ok(book)
    }

    pub fn get(&self, book_id: &str) -> LedgerResult<Book> {
        load(self.state, book_id)
    }

    pub fn exists(&self, book_id: &str) -> LedgerResult<bool> {
        Ok(self.state.contains_key(book_id)?)
    }

    /// Remove a book. Loans referencing it are left as they are.
    pub fn delete(&self, book_id: &str) -> LedgerResult<()> {
        if !self.exists(book_id)? {
            return Err(LedgerError::not_found(EntityKind::Book, book_id));
        }
        self.state.del_state(book_id)?;
        debug!(book_id, "book deleted");
        Ok(())
    }

    /// Persist `book` under its id, replacing any previous value.
    pub fn put(&self, book: &Book) -> LedgerResult<()> {
        store(self.state, book)
    }
}
