use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::batch::{PendingWrite, WriteBatch};
use crate::cursor::{CursorGuard, KeyValue, SnapshotCursor};
use crate::error::{StoreError, StoreResult};
use crate::traits::{StateCursor, WorldState};

/// In-memory, `BTreeMap`-based world state.
///
/// Intended for tests and embedding. Entries are held behind a `RwLock`;
/// values are cloned on read and write. Range scans take a snapshot of the
/// requested range and count as open until their cursor is released.
pub struct InMemoryWorldState {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
    open_cursors: Arc<AtomicUsize>,
}

impl InMemoryWorldState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            open_cursors: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read_entries()?.len())
    }

    /// Returns `true` if no keys are stored.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read_entries()?.is_empty())
    }

    /// All keys in ascending order.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.read_entries()?.keys().cloned().collect())
    }

    /// Number of range-scan cursors not yet released.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    fn read_entries(
        &self,
    ) -> StoreResult<std::sync::RwLockReadGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.entries
            .read()
            .map_err(|_| StoreError::LockPoisoned("world state"))
    }

    fn write_entries(
        &self,
    ) -> StoreResult<std::sync::RwLockWriteGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.entries
            .write()
            .map_err(|_| StoreError::LockPoisoned("world state"))
    }
}

impl Default for InMemoryWorldState {
    fn default() -> Self {
        Self::new()
    }
}

/// Range bounds for `[start_key, end_key)` with empty meaning open-ended.
///
/// Returns `None` when the range is empty by construction.
pub(crate) fn scan_bounds<'k>(
    start_key: &'k str,
    end_key: &'k str,
) -> Option<(Bound<&'k str>, Bound<&'k str>)> {
    if !start_key.is_empty() && !end_key.is_empty() && start_key >= end_key {
        return None;
    }
    let start = if start_key.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Included(start_key)
    };
    let end = if end_key.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(end_key)
    };
    Some((start, end))
}

impl WorldState for InMemoryWorldState {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn put_state(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        self.write_entries()?.insert(key.to_string(), value);
        Ok(())
    }

    fn del_state(&self, key: &str) -> StoreResult<()> {
        match self.write_entries()?.remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::KeyNotFound(key.to_string())),
        }
    }

    fn range_scan<'a>(
        &'a self,
        start_key: &str,
        end_key: &str,
    ) -> StoreResult<Box<dyn StateCursor + 'a>> {
        let entries = self.read_entries()?;
        let snapshot = match scan_bounds(start_key, end_key) {
            Some(bounds) => entries
                .range::<str, _>(bounds)
                .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
                .collect(),
            None => Vec::new(),
        };
        Ok(Box::new(SnapshotCursor::new(
            snapshot,
            CursorGuard::acquire(&self.open_cursors),
        )))
    }

    fn contains_key(&self, key: &str) -> StoreResult<bool> {
        Ok(self.read_entries()?.contains_key(key))
    }

    fn apply(&self, batch: &WriteBatch) -> StoreResult<()> {
        if batch.iter().any(|(key, _)| key.is_empty()) {
            return Err(StoreError::EmptyKey);
        }
        let mut entries = self.write_entries()?;
        for (key, write) in batch.iter() {
            match write {
                PendingWrite::Put(value) => {
                    entries.insert(key.to_string(), value.clone());
                }
                PendingWrite::Delete => {
                    entries.remove(key);
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryWorldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.read_entries().map(|e| e.len()).unwrap_or(0);
        f.debug_struct("InMemoryWorldState")
            .field("key_count", &count)
            .field("open_cursors", &self.open_cursors())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> InMemoryWorldState {
        let state = InMemoryWorldState::new();
        for key in ["book1", "book2", "book3", "r1"] {
            state.put_state(key, key.as_bytes().to_vec()).unwrap();
        }
        state
    }

    fn scan_keys(state: &InMemoryWorldState, start: &str, end: &str) -> Vec<String> {
        state
            .range_scan(start, end)
            .unwrap()
            .map(|entry| entry.unwrap().key)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Point operations
    // -----------------------------------------------------------------------

    #[test]
    fn put_and_get() {
        let state = InMemoryWorldState::new();
        state.put_state("book1", b"v1".to_vec()).unwrap();
        assert_eq!(state.get_state("book1").unwrap(), Some(b"v1".to_vec()));
        assert!(state.contains_key("book1").unwrap());
    }

    #[test]
    fn get_missing_returns_none() {
        let state = InMemoryWorldState::new();
        assert_eq!(state.get_state("nope").unwrap(), None);
        assert!(!state.contains_key("nope").unwrap());
    }

    #[test]
    fn put_overwrites() {
        let state = InMemoryWorldState::new();
        state.put_state("k", b"a".to_vec()).unwrap();
        state.put_state("k", b"b".to_vec()).unwrap();
        assert_eq!(state.get_state("k").unwrap(), Some(b"b".to_vec()));
        assert_eq!(state.len().unwrap(), 1);
    }

    #[test]
    fn empty_key_is_rejected() {
        let state = InMemoryWorldState::new();
        assert_eq!(state.put_state("", vec![]), Err(StoreError::EmptyKey));
    }

    #[test]
    fn delete_present_and_missing() {
        let state = seeded();
        state.del_state("book1").unwrap();
        assert!(!state.contains_key("book1").unwrap());
        assert_eq!(
            state.del_state("book1"),
            Err(StoreError::KeyNotFound("book1".into()))
        );
    }

    // -----------------------------------------------------------------------
    // Range scans
    // -----------------------------------------------------------------------

    #[test]
    fn open_ended_scan_returns_everything_in_order() {
        let state = seeded();
        assert_eq!(
            scan_keys(&state, "", ""),
            vec!["book1", "book2", "book3", "r1"]
        );
    }

    #[test]
    fn scan_end_is_exclusive() {
        let state = seeded();
        assert_eq!(scan_keys(&state, "book2", "r1"), vec!["book2", "book3"]);
        assert_eq!(scan_keys(&state, "", "book2"), vec!["book1"]);
        assert_eq!(scan_keys(&state, "book3", ""), vec!["book3", "r1"]);
    }

    #[test]
    fn inverted_or_empty_range_yields_nothing() {
        let state = seeded();
        assert!(scan_keys(&state, "r1", "book1").is_empty());
        assert!(scan_keys(&state, "book2", "book2").is_empty());
    }

    #[test]
    fn scan_is_a_snapshot() {
        let state = seeded();
        let cursor = state.range_scan("", "").unwrap();
        state.put_state("zzz", vec![]).unwrap();
        assert_eq!(cursor.count(), 4);
    }

    #[test]
    fn cursors_are_released_on_close_and_drop() {
        let state = seeded();
        let first = state.range_scan("", "").unwrap();
        let second = state.range_scan("", "").unwrap();
        assert_eq!(state.open_cursors(), 2);

        first.close().unwrap();
        assert_eq!(state.open_cursors(), 1);

        drop(second);
        assert_eq!(state.open_cursors(), 0);
    }

    // -----------------------------------------------------------------------
    // Batches
    // -----------------------------------------------------------------------

    #[test]
    fn apply_batch_puts_and_deletes() {
        let state = seeded();
        let mut batch = WriteBatch::new();
        batch.put("book4", b"new".to_vec());
        batch.delete("book1");
        batch.delete("never-existed");
        state.apply(&batch).unwrap();

        assert_eq!(
            state.keys().unwrap(),
            vec!["book2", "book3", "book4", "r1"]
        );
    }

    #[test]
    fn apply_rejects_empty_key_without_partial_writes() {
        let state = InMemoryWorldState::new();
        let mut batch = WriteBatch::new();
        batch.put("", vec![]);
        batch.put("ok", vec![]);
        assert_eq!(state.apply(&batch), Err(StoreError::EmptyKey));
        assert!(state.is_empty().unwrap());
    }

    // -----------------------------------------------------------------------
    // Misc
    // -----------------------------------------------------------------------

    #[test]
    fn default_creates_empty_state() {
        let state = InMemoryWorldState::default();
        assert!(state.is_empty().unwrap());
        assert_eq!(state.open_cursors(), 0);
    }

    #[test]
    fn debug_format() {
        let state = seeded();
        let debug = format!("{state:?}");
        assert!(debug.contains("InMemoryWorldState"));
        assert!(debug.contains("key_count: 4"));
    }
}
