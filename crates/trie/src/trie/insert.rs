//! Inserting an element into the trie, splitting leaves and extensions
//! at the point of divergence.
use super::children::BranchNodeChildrenArray;
use super::nodes::{take_child, BranchNode, TrieNode};
use crate::error::TrieError;
use crate::store::KeyValueStore;
use crate::trie::TrieNode::{Branch, Digest, Extension, Leaf};
use alloy_primitives::Bytes;
use alloy_trie::Nibbles;

impl TrieNode {
    pub(crate) fn insert(
        &mut self,
        path: Nibbles,
        value: Bytes,
        store: &dyn KeyValueStore,
    ) -> Result<(), TrieError> {
        self.resolve(store, true)?;
        self.clear_cache();
        match self {
            Leaf(leaf) => {
                if leaf.path == path {
                    leaf.value = value;
                    return Ok(());
                }
                // Keys diverge, split the leaf into a branch holding both.
                let common_prefix_len = leaf.path.common_prefix_length(&path);
                let existing_idx = leaf.path.at(common_prefix_len);
                let existing = Self::leaf(
                    leaf.path.slice(common_prefix_len + 1..),
                    core::mem::take(&mut leaf.value),
                );
                let added_idx = path.at(common_prefix_len);
                let added = Self::leaf(path.slice(common_prefix_len + 1..), value);
                *self = branched(
                    path.slice(..common_prefix_len),
                    existing_idx,
                    existing,
                    added_idx,
                    added,
                );
                Ok(())
            }
            Extension(extension) => {
                let common_prefix_len = extension.path.common_prefix_length(&path);
                if common_prefix_len == extension.path.len() {
                    return extension
                        .child
                        .insert(path.slice(common_prefix_len..), value, store);
                }
                // The new key leaves the extension's segment, split it.
                let child_idx = extension.path.at(common_prefix_len);
                let tail = extension.path.slice(common_prefix_len + 1..);
                let detached = take_child(&mut extension.child);
                let existing = if tail.is_empty() {
                    *detached
                } else {
                    Self::extension(tail, detached)
                };
                let added_idx = path.at(common_prefix_len);
                let added = Self::leaf(path.slice(common_prefix_len + 1..), value);
                *self = branched(
                    path.slice(..common_prefix_len),
                    child_idx,
                    existing,
                    added_idx,
                    added,
                );
                Ok(())
            }
            Branch(branch) => {
                let idx = path.at(0);
                match branch.children.get_mut(idx) {
                    Some(child) => child.insert(path.slice(1..), value, store),
                    None => {
                        branch
                            .children
                            .insert(idx, Box::new(Self::leaf(path.slice(1..), value)));
                        Ok(())
                    }
                }
            }
            Digest(digest) => Err(TrieError::Traversal {
                hash: digest.value,
                operation: "insert",
            }),
        }
    }
}

// Builds a two-child branch, wrapped in an extension when the shared
// `prefix` is non-empty.
fn branched(
    prefix: Nibbles,
    idx_a: usize,
    node_a: TrieNode,
    idx_b: usize,
    node_b: TrieNode,
) -> TrieNode {
    let mut children = BranchNodeChildrenArray::new();
    children.insert(idx_a, Box::new(node_a));
    children.insert(idx_b, Box::new(node_b));
    let branch = Branch(BranchNode { children, hash: None });
    if prefix.is_empty() {
        branch
    } else {
        TrieNode::extension(prefix, Box::new(branch))
    }
}
