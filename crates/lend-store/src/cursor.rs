use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::StoreResult;
use crate::traits::StateCursor;

/// One entry yielded by a range scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Counts a cursor as open for as long as the guard lives.
#[derive(Debug)]
pub struct CursorGuard {
    open: Arc<AtomicUsize>,
}

impl CursorGuard {
    pub fn acquire(open: &Arc<AtomicUsize>) -> Self {
        open.fetch_add(1, Ordering::SeqCst);
        Self {
            open: Arc::clone(open),
        }
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Cursor over entries captured when the scan was opened.
///
/// Later writes to the backing state are not visible through it.
#[derive(Debug)]
pub struct SnapshotCursor {
    entries: std::vec::IntoIter<KeyValue>,
    _guard: CursorGuard,
}

impl SnapshotCursor {
    pub fn new(entries: Vec<KeyValue>, guard: CursorGuard) -> Self {
        Self {
            entries: entries.into_iter(),
            _guard: guard,
        }
    }
}

impl Iterator for SnapshotCursor {
    type Item = StoreResult<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(Ok)
    }
}

impl StateCursor for SnapshotCursor {
    fn close(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
