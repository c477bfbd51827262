use std::collections::BTreeMap;
use std::ops::RangeBounds;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::batch::{PendingWrite, WriteBatch};
use crate::cursor::{CursorGuard, KeyValue, SnapshotCursor};
use crate::error::{StoreError, StoreResult};
use crate::memory::scan_bounds;
use crate::traits::{StateCursor, WorldState};

/// Summary of a committed write set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    /// Number of keys written or deleted.
    pub writes: usize,
    /// Hex BLAKE3 digest of the write set.
    pub digest: String,
}

/// One invocation's view of world state.
///
/// Reads see the base state overlaid with this transaction's own writes.
/// Writes are buffered in a [`WriteBatch`] and reach the base state only on
/// [`commit`](Self::commit); dropping the transaction discards them.
pub struct Transaction<'a> {
    base: &'a dyn WorldState,
    writes: RwLock<WriteBatch>,
    open_cursors: Arc<AtomicUsize>,
}

impl<'a> Transaction<'a> {
    pub fn begin(base: &'a dyn WorldState) -> Self {
        Self {
            base,
            writes: RwLock::new(WriteBatch::new()),
            open_cursors: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of range-scan cursors opened through this transaction and not
    /// yet released.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// A copy of the writes buffered so far.
    pub fn write_set(&self) -> StoreResult<WriteBatch> {
        Ok(self.read_writes()?.clone())
    }

    /// Consume the transaction, returning its write set uncommitted.
    pub fn into_write_set(self) -> StoreResult<WriteBatch> {
        self.writes
            .into_inner()
            .map_err(|_| StoreError::LockPoisoned("transaction"))
    }

    /// Apply the buffered writes to the base state as one batch.
    pub fn commit(self) -> StoreResult<CommitReceipt> {
        let base = self.base;
        let batch = self.into_write_set()?;
        let receipt = CommitReceipt {
            writes: batch.len(),
            digest: batch.digest_hex(),
        };
        base.apply(&batch)?;
        debug!(writes = receipt.writes, digest = %receipt.digest, "transaction committed");
        Ok(receipt)
    }

    fn read_writes(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, WriteBatch>> {
        self.writes
            .read()
            .map_err(|_| StoreError::LockPoisoned("transaction"))
    }

    fn write_writes(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, WriteBatch>> {
        self.writes
            .write()
            .map_err(|_| StoreError::LockPoisoned("transaction"))
    }
}

impl WorldState for Transaction<'_> {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        match self.read_writes()?.get(key) {
            Some(PendingWrite::Put(value)) => return Ok(Some(value.clone())),
            Some(PendingWrite::Delete) => return Ok(None),
            None => {}
        }
        self.base.get_state(key)
    }

    fn put_state(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        self.write_writes()?.put(key, value);
        Ok(())
    }

    fn del_state(&self, key: &str) -> StoreResult<()> {
        if !self.contains_key(key)? {
            return Err(StoreError::KeyNotFound(key.to_string()));
        }
        self.write_writes()?.delete(key);
        Ok(())
    }

    fn range_scan<'s>(
        &'s self,
        start_key: &str,
        end_key: &str,
    ) -> StoreResult<Box<dyn StateCursor + 's>> {
        let mut merged: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        {
            let base_cursor = self.base.range_scan(start_key, end_key)?;
            for entry in base_cursor {
                let entry = entry?;
                merged.insert(entry.key, entry.value);
            }
        }

        if let Some(bounds) = scan_bounds(start_key, end_key) {
            let writes = self.read_writes()?;
            for (key, write) in writes.iter() {
                if !RangeBounds::<str>::contains(&bounds, key) {
                    continue;
                }
                match write {
                    PendingWrite::Put(value) => {
                        merged.insert(key.to_string(), value.clone());
                    }
                    PendingWrite::Delete => {
                        merged.remove(key);
                    }
                }
            }
        }

        let entries = merged
            .into_iter()
            .map(|(key, value)| KeyValue { key, value })
            .collect();
        Ok(Box::new(SnapshotCursor::new(
            entries,
            CursorGuard::acquire(&self.open_cursors),
        )))
    }
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pending = self.read_writes().map(|w| w.len()).unwrap_or(0);
        f.debug_struct("Transaction")
            .field("pending_writes", &pending)
            .field("open_cursors", &self.open_cursors())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryWorldState;

    fn base() -> InMemoryWorldState {
        let state = InMemoryWorldState::new();
        state.put_state("book1", b"b1".to_vec()).unwrap();
        state.put_state("book2", b"b2".to_vec()).unwrap();
        state
    }

    #[test]
    fn reads_see_own_writes() {
        let state = base();
        let tx = Transaction::begin(&state);
        tx.put_state("book1", b"changed".to_vec()).unwrap();
        tx.put_state("r1", b"rec".to_vec()).unwrap();

        assert_eq!(tx.get_state("book1").unwrap(), Some(b"changed".to_vec()));
        assert_eq!(tx.get_state("r1").unwrap(), Some(b"rec".to_vec()));
        // base untouched until commit
        assert_eq!(state.get_state("book1").unwrap(), Some(b"b1".to_vec()));
        assert_eq!(state.get_state("r1").unwrap(), None);
    }

    #[test]
    fn delete_hides_key_and_requires_presence() {
        let state = base();
        let tx = Transaction::begin(&state);
        tx.del_state("book1").unwrap();
        assert_eq!(tx.get_state("book1").unwrap(), None);
        assert_eq!(
            tx.del_state("book1"),
            Err(StoreError::KeyNotFound("book1".into()))
        );
        assert_eq!(
            tx.del_state("ghost"),
            Err(StoreError::KeyNotFound("ghost".into()))
        );
    }

    #[test]
    fn delete_of_own_put_is_allowed() {
        let state = InMemoryWorldState::new();
        let tx = Transaction::begin(&state);
        tx.put_state("fresh", vec![1]).unwrap();
        tx.del_state("fresh").unwrap();
        assert!(!tx.contains_key("fresh").unwrap());
    }

    #[test]
    fn range_scan_merges_overlay() {
        let state = base();
        let tx = Transaction::begin(&state);
        tx.put_state("book3", b"b3".to_vec()).unwrap();
        tx.del_state("book1").unwrap();
        tx.put_state("book2", b"b2'".to_vec()).unwrap();

        let entries: Vec<KeyValue> = tx
            .range_scan("", "")
            .unwrap()
            .map(|e| e.unwrap())
            .collect();
        assert_eq!(
            entries,
            vec![
                KeyValue::new("book2", b"b2'".to_vec()),
                KeyValue::new("book3", b"b3".to_vec()),
            ]
        );
        assert_eq!(tx.open_cursors(), 0);
        assert_eq!(state.open_cursors(), 0);
    }

    #[test]
    fn range_scan_overlay_respects_bounds() {
        let state = base();
        let tx = Transaction::begin(&state);
        tx.put_state("zzz", vec![]).unwrap();
        let keys: Vec<String> = tx
            .range_scan("book1", "book9")
            .unwrap()
            .map(|e| e.unwrap().key)
            .collect();
        assert_eq!(keys, vec!["book1", "book2"]);
    }

    #[test]
    fn commit_applies_write_set() {
        let state = base();
        let tx = Transaction::begin(&state);
        tx.put_state("r1", b"rec".to_vec()).unwrap();
        tx.del_state("book2").unwrap();
        let receipt = tx.commit().unwrap();

        assert_eq!(receipt.writes, 2);
        assert_eq!(receipt.digest.len(), 64);
        assert_eq!(state.keys().unwrap(), vec!["book1", "r1"]);
    }

    #[test]
    fn dropping_discards_writes() {
        let state = base();
        {
            let tx = Transaction::begin(&state);
            tx.put_state("r1", b"rec".to_vec()).unwrap();
        }
        assert_eq!(state.keys().unwrap(), vec!["book1", "book2"]);
    }

    #[test]
    fn receipt_serializes() {
        let receipt = CommitReceipt {
            writes: 1,
            digest: "ab".into(),
        };
        let json = serde_json::to_string(&receipt).unwrap();
        assert_eq!(json, r#"{"writes":1,"digest":"ab"}"#);
    }
}
