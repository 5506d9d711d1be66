//! The trie facade over the node tree.
use super::nodes::TrieNode;
use crate::error::TrieError;
use crate::store::KeyValueStore;
use alloy_primitives::{keccak256, Bytes, B256};
use alloy_trie::{Nibbles, EMPTY_ROOT_HASH};

/// A Merkle Patricia trie keyed by pre-hashed 32-byte keys.
///
/// The in-memory tree may be partial: subtrees that have not been
/// touched stay as digest placeholders and are resolved from the store
/// the first time an operation reaches them.
#[derive(Debug, Clone, Default)]
pub struct Trie {
    pub(crate) root: Option<TrieNode>,
}

impl Trie {
    /// Creates an empty trie.
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Opens a trie at `root_hash`. Nothing is loaded until an operation
    /// needs it.
    pub fn from_root(root_hash: B256) -> Self {
        if root_hash == EMPTY_ROOT_HASH {
            Self::new()
        } else {
            Self { root: Some(TrieNode::digest(root_hash)) }
        }
    }

    /// Whether the trie is known to hold nothing.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Gets the value associated with a pre-hashed 32-byte `key`.
    pub fn get(
        &mut self,
        key: B256,
        store: &dyn KeyValueStore,
    ) -> Result<Option<Bytes>, TrieError> {
        self.get_path(Nibbles::unpack(key), store)
    }

    pub(crate) fn get_path(
        &mut self,
        path: Nibbles,
        store: &dyn KeyValueStore,
    ) -> Result<Option<Bytes>, TrieError> {
        match self.root.as_mut() {
            Some(root) => root.get(path, store),
            None => Ok(None),
        }
    }

    /// Inserts a value under a pre-hashed 32-byte `key`, overriding any
    /// previous value.
    pub fn insert(
        &mut self,
        key: B256,
        value: Bytes,
        store: &dyn KeyValueStore,
    ) -> Result<(), TrieError> {
        self.insert_path(Nibbles::unpack(key), value, store)
    }

    pub(crate) fn insert_path(
        &mut self,
        path: Nibbles,
        value: Bytes,
        store: &dyn KeyValueStore,
    ) -> Result<(), TrieError> {
        match self.root.as_mut() {
            Some(root) => root.insert(path, value, store),
            None => {
                self.root = Some(TrieNode::leaf(path, value));
                Ok(())
            }
        }
    }

    /// Removes the element under a pre-hashed 32-byte `key`, if present.
    pub fn remove(&mut self, key: B256, store: &dyn KeyValueStore) -> Result<(), TrieError> {
        self.remove_path(Nibbles::unpack(key), store)
    }

    pub(crate) fn remove_path(
        &mut self,
        path: Nibbles,
        store: &dyn KeyValueStore,
    ) -> Result<(), TrieError> {
        if let Some(root) = self.root.as_mut() {
            if root.remove(path, store)? {
                self.root = None;
            }
        }
        Ok(())
    }

    /// Returns the root hash of the trie.
    pub fn hash(&mut self) -> B256 {
        match self.root.as_mut() {
            Some(root) => root.hash(),
            None => EMPTY_ROOT_HASH,
        }
    }

    /// Persists every materialized node to the store and returns the root
    /// hash. The trie can later be reopened with [`Trie::from_root`].
    pub fn commit(&mut self, store: &mut dyn KeyValueStore) -> B256 {
        match self.root.as_mut() {
            None => EMPTY_ROOT_HASH,
            Some(root) => {
                root.commit(store);
                // The root is stored unconditionally, even when its
                // encoding would be inlined anywhere else.
                let encoded = root.encode();
                let hash = keccak256(&encoded);
                store.put(hash, encoded.into());
                root.set_cache(hash);
                hash
            }
        }
    }
}
