use std::collections::BTreeMap;

/// A buffered write against one key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingWrite {
    /// Create or overwrite the value.
    Put(Vec<u8>),
    /// Remove the value.
    Delete,
}

/// The ordered write set of one invocation.
///
/// Later writes to the same key replace earlier ones, so a batch holds at
/// most one write per key. Iteration is in key order, which makes the
/// [`digest`](Self::digest) independent of the order the writes were made in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    writes: BTreeMap<String, PendingWrite>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a put, replacing any earlier write to `key`.
    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>) {
        self.writes.insert(key.into(), PendingWrite::Put(value));
    }

    /// Record a delete, replacing any earlier write to `key`.
    pub fn delete(&mut self, key: impl Into<String>) {
        self.writes.insert(key.into(), PendingWrite::Delete);
    }

    pub fn get(&self, key: &str) -> Option<&PendingWrite> {
        self.writes.get(key)
    }

    /// Writes in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PendingWrite)> {
        self.writes.iter().map(|(k, w)| (k.as_str(), w))
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// BLAKE3 digest over the canonical form of the write set.
    ///
    /// Two executions that would leave the world state in the same condition
    /// produce the same digest.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"lend-writeset-v1:");
        for (key, write) in &self.writes {
            hasher.update(&(key.len() as u64).to_le_bytes());
            hasher.update(key.as_bytes());
            match write {
                PendingWrite::Put(value) => {
                    hasher.update(&[1]);
                    hasher.update(&(value.len() as u64).to_le_bytes());
                    hasher.update(value);
                }
                PendingWrite::Delete => {
                    hasher.update(&[0]);
                }
            }
        }
        *hasher.finalize().as_bytes()
    }

    /// Hex-encoded [`digest`](Self::digest).
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}
