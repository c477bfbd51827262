use serde::{Deserialize, Serialize};

/// Owner recorded on every book that is on the shelf.
pub const LIBRARY_OWNER: &str = "library";

/// A catalog entry.
///
/// `valid` is `true` exactly when the book is on the shelf, in which case
/// `owner` is the library identity. While lent, `valid` is `false` and
/// `owner` names the borrower.
///
/// Field order is the wire order; do not reorder.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Book {
    #[serde(rename = "BookID")]
    pub book_id: String,
    pub name: String,
    pub author: String,
    pub valid: bool,
    pub price: u64,
    pub owner: String,
}

/// Lending state derived from a [`Book`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LoanState {
    Available,
    OnLoan { borrower: String },
}

impl Book {
    /// A new book on the shelf, owned by [`LIBRARY_OWNER`].
    pub fn new(
        book_id: impl Into<String>,
        name: impl Into<String>,
        author: impl Into<String>,
        price: u64,
    ) -> Self {
        Self::shelved_by(book_id, name, author, price, LIBRARY_OWNER)
    }

    /// A new book on the shelf of a library with the given identity.
    pub fn shelved_by(
        book_id: impl Into<String>,
        name: impl Into<String>,
        author: impl Into<String>,
        price: u64,
        library_owner: impl Into<String>,
    ) -> Self {
        Self {
            book_id: book_id.into(),
            name: name.into(),
            author: author.into(),
            valid: true,
            price,
            owner: library_owner.into(),
        }
    }

    /// Mark the book as lent to `borrower`.
    pub fn lend_to(&mut self, borrower: impl Into<String>) {
        self.valid = false;
        self.owner = borrower.into();
    }

    /// Put the book back on the shelf of `library_owner`.
    pub fn shelve(&mut self, library_owner: impl Into<String>) {
        self.valid = true;
        self.owner = library_owner.into();
    }

    pub fn is_available(&self) -> bool {
        self.valid
    }

    pub fn loan_state(&self) -> LoanState {
        if self.is_available() {
            LoanState::Available
        } else {
            LoanState::OnLoan {
                borrower: self.owner.clone(),
            }
        }
    }

    /// `valid` must agree with whether `owner` is the library.
    pub fn satisfies_invariant(&self, library_owner: &str) -> bool {
        self.is_available() == (self.owner == library_owner)
    }
}
