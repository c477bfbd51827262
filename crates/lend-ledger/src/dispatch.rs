//! Name-based invocation of contract operations.
//!
//! Hosts deliver an operation as a function name plus string arguments and
//! expect opaque response bytes. [`Invocation::parse`] turns the name and
//! arguments into a typed call; [`LibraryContract::invoke`] runs it and
//! encodes the result as JSON.

use serde::Serialize;
use tracing::debug;

use lend_store::WorldState;
use lend_types::{codec, CodecError, Timestamp};

use crate::contract::{LibraryContract, LibraryLedger};
use crate::error::{LedgerError, LedgerResult};

/// A parsed contract call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invocation {
    InitLedger,
    AddBook {
        book_id: String,
        name: String,
        author: String,
        price: u64,
    },
    AddRecord {
        record_id: String,
        book_id: String,
        start_time: Timestamp,
        borrower: String,
    },
    QueryBook { book_id: String },
    QueryRecord { record_id: String },
    BorrowBook {
        record_id: String,
        book_id: String,
        new_owner: String,
        start_time: Timestamp,
    },
    ReturnBook {
        record_id: String,
        book_id: String,
        end_time: Timestamp,
    },
    DeleteBook { book_id: String },
    BookExists { book_id: String },
    RecordExists { record_id: String },
    GetAllBooks,
    GetBorrowList { name: String },
    GetLoanHistory { book_id: String },
    GetOpenLoans,
}

impl Invocation {
    /// Parse a function name and its positional arguments.
    pub fn parse(function: &str, args: &[String]) -> LedgerResult<Self> {
        let call = Args { function, args };
        let invocation = match function {
            "InitLedger" => {
                call.arity(0)?;
                Self::InitLedger
            }
            "AddBook" => {
                call.arity(4)?;
                Self::AddBook {
                    book_id: call.text(0),
                    name: call.text(1),
                    author: call.text(2),
                    price: call.price(3)?,
                }
            }
            "AddRecord" => {
                call.arity(4)?;
                Self::AddRecord {
                    record_id: call.text(0),
                    book_id: call.text(1),
                    start_time: call.timestamp(2)?,
                    borrower: call.text(3),
                }
            }
            "QueryBook" => {
                call.arity(1)?;
                Self::QueryBook {
                    book_id: call.text(0),
                }
            }
            "QueryRecord" => {
                call.arity(1)?;
                Self::QueryRecord {
                    record_id: call.text(0),
                }
            }
            "BorrowBook" => {
                call.arity(4)?;
                Self::BorrowBook {
                    record_id: call.text(0),
                    book_id: call.text(1),
                    new_owner: call.text(2),
                    start_time: call.timestamp(3)?,
                }
            }
            "ReturnBook" => {
                call.arity(3)?;
                Self::ReturnBook {
                    record_id: call.text(0),
                    book_id: call.text(1),
                    end_time: call.timestamp(2)?,
                }
            }
            "DeleteBook" => {
                call.arity(1)?;
                Self::DeleteBook {
                    book_id: call.text(0),
                }
            }
            "BookExists" => {
                call.arity(1)?;
                Self::BookExists {
                    book_id: call.text(0),
                }
            }
            "RecordExists" => {
                call.arity(1)?;
                Self::RecordExists {
                    record_id: call.text(0),
                }
            }
            "GetAllBooks" => {
                call.arity(0)?;
                Self::GetAllBooks
            }
            "GetBorrowList" => {
                call.arity(1)?;
                Self::GetBorrowList {
                    name: call.text(0),
                }
            }
            "GetLoanHistory" => {
                call.arity(1)?;
                Self::GetLoanHistory {
                    book_id: call.text(0),
                }
            }
            "GetOpenLoans" => {
                call.arity(0)?;
                Self::GetOpenLoans
            }
            other => return Err(LedgerError::UnknownFunction(other.to_string())),
        };
        Ok(invocation)
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            Self::InitLedger => "InitLedger",
            Self::AddBook { .. } => "AddBook",
            Self::AddRecord { .. } => "AddRecord",
            Self::QueryBook { .. } => "QueryBook",
            Self::QueryRecord { .. } => "QueryRecord",
            Self::BorrowBook { .. } => "BorrowBook",
            Self::ReturnBook { .. } => "ReturnBook",
            Self::DeleteBook { .. } => "DeleteBook",
            Self::BookExists { .. } => "BookExists",
            Self::RecordExists { .. } => "RecordExists",
            Self::GetAllBooks => "GetAllBooks",
            Self::GetBorrowList { .. } => "GetBorrowList",
            Self::GetLoanHistory { .. } => "GetLoanHistory",
            Self::GetOpenLoans => "GetOpenLoans",
        }
    }

    /// Whether the call may write to world state.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::InitLedger
                | Self::AddBook { .. }
                | Self::AddRecord { .. }
                | Self::BorrowBook { .. }
                | Self::ReturnBook { .. }
                | Self::DeleteBook { .. }
        )
    }
}

struct Args<'a> {
    function: &'a str,
    args: &'a [String],
}

impl Args<'_> {
    fn arity(&self, expected: usize) -> LedgerResult<()> {
        if self.args.len() != expected {
            return Err(self.invalid(format!(
                "expected {expected} arguments, got {}",
                self.args.len()
            )));
        }
        Ok(())
    }

    fn text(&self, index: usize) -> String {
        self.args[index].clone()
    }

    fn price(&self, index: usize) -> LedgerResult<u64> {
        let raw = &self.args[index];
        raw.parse()
            .map_err(|_| self.invalid(format!("expected a non-negative integer, got {raw:?}")))
    }

    fn timestamp(&self, index: usize) -> LedgerResult<Timestamp> {
        Timestamp::parse(&self.args[index]).map_err(|e| self.invalid(e.to_string()))
    }

    fn invalid(&self, reason: String) -> LedgerError {
        LedgerError::InvalidArgument {
            function: self.function.to_string(),
            reason,
        }
    }
}

impl LibraryContract {
    /// Parse and run one call, returning its JSON-encoded result.
    ///
    /// Unit results encode as empty bytes.
    pub fn invoke(
        &self,
        ctx: &dyn WorldState,
        function: &str,
        args: &[String],
    ) -> LedgerResult<Vec<u8>> {
        let invocation = Invocation::parse(function, args)?;
        self.execute(ctx, &invocation)
    }

    /// Run an already parsed call.
    pub fn execute(&self, ctx: &dyn WorldState, invocation: &Invocation) -> LedgerResult<Vec<u8>> {
        let function = invocation.function_name();
        debug!(function, mutating = invocation.is_mutating(), "dispatching");
        match invocation {
            Invocation::InitLedger => {
                self.init_ledger(ctx)?;
                Ok(Vec::new())
            }
            Invocation::AddBook {
                book_id,
                name,
                author,
                price,
            } => {
                let book = self.add_book(ctx, book_id, name, author, *price)?;
                entity_json(&book)
            }
            Invocation::AddRecord {
                record_id,
                book_id,
                start_time,
                borrower,
            } => {
                let record = self.add_record(ctx, record_id, book_id, *start_time, borrower)?;
                entity_json(&record)
            }
            Invocation::QueryBook { book_id } => entity_json(&self.query_book(ctx, book_id)?),
            Invocation::QueryRecord { record_id } => {
                entity_json(&self.query_record(ctx, record_id)?)
            }
            Invocation::BorrowBook {
                record_id,
                book_id,
                new_owner,
                start_time,
            } => {
                let record = self.borrow_book(ctx, record_id, book_id, new_owner, *start_time)?;
                entity_json(&record)
            }
            Invocation::ReturnBook {
                record_id,
                book_id,
                end_time,
            } => {
                let record = self.return_book(ctx, record_id, book_id, *end_time)?;
                entity_json(&record)
            }
            Invocation::DeleteBook { book_id } => {
                self.delete_book(ctx, book_id)?;
                Ok(Vec::new())
            }
            Invocation::BookExists { book_id } => {
                json(function, &self.book_exists(ctx, book_id)?)
            }
            Invocation::RecordExists { record_id } => {
                json(function, &self.record_exists(ctx, record_id)?)
            }
            Invocation::GetAllBooks => json(function, &self.get_all_books(ctx)?),
            Invocation::GetBorrowList { name } => {
                json(function, &self.get_borrow_list(ctx, name)?)
            }
            Invocation::GetLoanHistory { book_id } => {
                json(function, &self.get_loan_history(ctx, book_id)?)
            }
            Invocation::GetOpenLoans => json(function, &self.get_open_loans(ctx)?),
        }
    }
}

fn entity_json<E: codec::Entity>(entity: &E) -> LedgerResult<Vec<u8>> {
    codec::encode(entity)
        .map_err(|e| LedgerError::encode(format!("{} {}", E::KIND, entity.key()), e))
}

fn json<T: Serialize>(function: &str, value: &T) -> LedgerResult<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| LedgerError::encode(format!("{function} response"), CodecError::from(e)))
}
