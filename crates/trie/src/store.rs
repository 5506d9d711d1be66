use alloy_primitives::map::{FbBuildHasher, HashMap};
use alloy_primitives::{Bytes, B256};

/// A [`HashMap`] keyed by [`B256`], using a fast fixed-bytes hasher.
pub type B256Map<V> = HashMap<B256, V, FbBuildHasher<32>>;

/// Content-addressed storage backing a trie.
///
/// Keys are always the keccak hash of the stored bytes, so entries are
/// immutable once written and `put` with an existing key is a no-op in
/// effect.
pub trait KeyValueStore {
    /// Returns the bytes stored under `hash`, if any.
    fn get(&self, hash: &B256) -> Option<Bytes>;

    /// Stores `bytes` under `hash`.
    fn put(&mut self, hash: B256, bytes: Bytes);
}

/// An in-memory [`KeyValueStore`] over a hash map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: B256Map<Bytes>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes the entry stored under `hash`, simulating incomplete data.
    pub fn remove(&mut self, hash: &B256) -> Option<Bytes> {
        self.entries.remove(hash)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the hashes of all stored entries.
    pub fn hashes(&self) -> impl Iterator<Item = &B256> {
        self.entries.keys()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, hash: &B256) -> Option<Bytes> {
        self.entries.get(hash).cloned()
    }

    fn put(&mut self, hash: B256, bytes: Bytes) {
        self.entries.insert(hash, bytes);
    }
}
