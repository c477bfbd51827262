use serde::{Deserialize, Serialize};

use crate::timestamp::Timestamp;

/// One loan of one book.
///
/// A record is open while `end_time` is `None`. It is created open by a
/// borrow and closed once by the matching return; records are never deleted.
///
/// Field order is the wire order; do not reorder.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    #[serde(rename = "RecordID")]
    pub record_id: String,
    #[serde(rename = "BookID")]
    pub book_id: String,
    pub start_time: Timestamp,
    #[serde(with = "crate::timestamp::optional")]
    pub end_time: Option<Timestamp>,
    pub borrower: String,
}

impl Record {
    /// A new open loan.
    pub fn open(
        record_id: impl Into<String>,
        book_id: impl Into<String>,
        start_time: Timestamp,
        borrower: impl Into<String>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            book_id: book_id.into(),
            start_time,
            end_time: None,
            borrower: borrower.into(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Set the end time. Overwrites any previous end time.
    pub fn close(&mut self, end_time: Timestamp) {
        self.end_time = Some(end_time);
    }
}
