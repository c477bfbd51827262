use std::collections::BTreeMap;

use lend_types::{Book, LoanState, Record, StoredEntity};

use crate::error::LedgerResult;
use crate::query::QueryEngine;

/// Result of a catalog audit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub book_count: u64,
    pub record_count: u64,
    pub open_loans: u64,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific consistency violation detected during an audit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub key: String,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// `Valid` disagrees with whether the owner is the library.
    BookFlagMismatch,
    LoanedWithoutOpenRecord,
    MultipleOpenRecords,
    OpenRecordForAvailableBook,
    /// The open record's borrower is not the book's owner.
    BorrowerMismatch,
    /// An open record references a book that does not exist.
    DanglingRecord,
}

/// Cross-entity consistency checker.
///
/// The operations themselves never enforce these rules (a return does not
/// check the record it closes, a delete does not check open loans), so an
/// audit is the only place they are observed.
pub struct InvariantValidator;

impl InvariantValidator {
    /// Scan the whole keyspace and check every book against its loans.
    pub fn validate(
        engine: &QueryEngine<'_>,
        library_owner: &str,
    ) -> LedgerResult<ValidationReport> {
        let mut books: BTreeMap<String, Book> = BTreeMap::new();
        let mut open: BTreeMap<String, Vec<Record>> = BTreeMap::new();
        let mut record_count = 0u64;

        engine.for_each_entity(|entity| match entity {
            StoredEntity::Book(book) => {
                books.insert(book.book_id.clone(), book);
            }
            StoredEntity::Record(record) => {
                record_count += 1;
                if record.is_open() {
                    open.entry(record.book_id.clone()).or_default().push(record);
                }
            }
        })?;

        let mut violations = Vec::new();
        for (book_id, book) in &books {
            if !book.satisfies_invariant(library_owner) {
                violations.push(Violation {
                    key: book_id.clone(),
                    kind: ViolationKind::BookFlagMismatch,
                    description: format!("valid={} but owner is {:?}", book.valid, book.owner),
                });
            }

            let loans = open.get(book_id).map(Vec::as_slice).unwrap_or_default();
            if loans.len() > 1 {
                violations.push(Violation {
                    key: book_id.clone(),
                    kind: ViolationKind::MultipleOpenRecords,
                    description: format!("{} open records", loans.len()),
                });
            }

            match book.loan_state() {
                LoanState::OnLoan { borrower } => match loans {
                    [] => violations.push(Violation {
                        key: book_id.clone(),
                        kind: ViolationKind::LoanedWithoutOpenRecord,
                        description: format!("lent to {borrower} with no open record"),
                    }),
                    [loan] if loan.borrower != borrower => violations.push(Violation {
                        key: loan.record_id.clone(),
                        kind: ViolationKind::BorrowerMismatch,
                        description: format!(
                            "record borrower {} but book {book_id} is held by {borrower}",
                            loan.borrower
                        ),
                    }),
                    _ => {}
                },
                LoanState::Available => {
                    for loan in loans {
                        violations.push(Violation {
                            key: loan.record_id.clone(),
                            kind: ViolationKind::OpenRecordForAvailableBook,
                            description: format!("book {book_id} is on the shelf"),
                        });
                    }
                }
            }
        }

        for (book_id, loans) in &open {
            if books.contains_key(book_id) {
                continue;
            }
            for loan in loans {
                violations.push(Violation {
                    key: loan.record_id.clone(),
                    kind: ViolationKind::DanglingRecord,
                    description: format!("book {book_id} does not exist"),
                });
            }
        }

        Ok(ValidationReport {
            book_count: books.len() as u64,
            record_count,
            open_loans: open.values().map(|v| v.len() as u64).sum(),
            violations,
        })
    }
}
