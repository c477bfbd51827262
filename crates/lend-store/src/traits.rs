use crate::batch::{PendingWrite, WriteBatch};
use crate::cursor::KeyValue;
use crate::error::StoreResult;

/// Scoped handle over an ordered range scan.
///
/// Yields `(key, value)` pairs in ascending key order. The handle holds
/// backend resources until it is closed or dropped; implementations must
/// release them on drop so that early returns and `?` never leak a cursor.
pub trait StateCursor: Iterator<Item = StoreResult<KeyValue>> {
    /// Release the cursor explicitly.
    fn close(self: Box<Self>) -> StoreResult<()>;
}

/// Key-value world state supplied by the host for one invocation.
///
/// All implementations must satisfy these invariants:
/// - Keys are non-empty strings; values are opaque bytes.
/// - `range_scan` yields entries with `start_key <= key < end_key` in key
///   order. An empty `start_key` or `end_key` leaves that side open.
/// - `del_state` fails with `StoreError::KeyNotFound` when the key is absent.
/// - The store never interprets values.
pub trait WorldState: Send + Sync {
    /// Read the value at `key`. Returns `Ok(None)` if absent.
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Create or overwrite the value at `key`.
    fn put_state(&self, key: &str, value: Vec<u8>) -> StoreResult<()>;

    /// Remove the value at `key`.
    fn del_state(&self, key: &str) -> StoreResult<()>;

    /// Open an ordered scan over `[start_key, end_key)`.
    fn range_scan<'a>(
        &'a self,
        start_key: &str,
        end_key: &str,
    ) -> StoreResult<Box<dyn StateCursor + 'a>>;

    /// Check whether `key` holds a value.
    fn contains_key(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get_state(key)?.is_some())
    }

    /// Apply a write set.
    ///
    /// The default applies writes one by one and is only atomic if nothing
    /// fails midway. Backends override this to apply the batch as a unit.
    fn apply(&self, batch: &WriteBatch) -> StoreResult<()> {
        for (key, write) in batch.iter() {
            match write {
                PendingWrite::Put(value) => self.put_state(key, value.clone())?,
                PendingWrite::Delete => {
                    if self.contains_key(key)? {
                        self.del_state(key)?;
                    }
                }
            }
        }
        Ok(())
    }
}
