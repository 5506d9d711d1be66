//! Path lookup with on-demand node resolution.
use crate::error::TrieError;
use crate::store::KeyValueStore;
use crate::trie::TrieNode;
use crate::trie::TrieNode::{Branch, Digest, Extension, Leaf};
use alloy_primitives::Bytes;
use alloy_trie::Nibbles;

impl TrieNode {
    pub(crate) fn get(
        &mut self,
        path: Nibbles,
        store: &dyn KeyValueStore,
    ) -> Result<Option<Bytes>, TrieError> {
        self.resolve(store, true)?;
        match self {
            Leaf(leaf) => Ok((leaf.path == path).then(|| leaf.value.clone())),
            Extension(extension) => {
                let common_prefix_len = extension.path.common_prefix_length(&path);
                if common_prefix_len == extension.path.len() {
                    extension.child.get(path.slice(common_prefix_len..), store)
                } else {
                    Ok(None)
                }
            }
            Branch(branch) => {
                if path.is_empty() {
                    // Branch nodes carry no value of their own.
                    return Ok(None);
                }
                match branch.children.get_mut(path.at(0)) {
                    Some(child) => child.get(path.slice(1..), store),
                    None => Ok(None),
                }
            }
            Digest(digest) => Err(TrieError::Traversal {
                hash: digest.value,
                operation: "get",
            }),
        }
    }
}
