//! Removing an element from the trie, collapsing the structure back to
//! its canonical shape.
use super::nodes::{take_child, TrieNode};
use crate::error::TrieError;
use crate::store::KeyValueStore;
use crate::trie::TrieNode::{Branch, Digest, Extension, Leaf};
use alloy_trie::Nibbles;

impl TrieNode {
    // Returns true when the subtree rooted here became empty and the
    // parent must drop it.
    pub(crate) fn remove(
        &mut self,
        path: Nibbles,
        store: &dyn KeyValueStore,
    ) -> Result<bool, TrieError> {
        self.resolve(store, true)?;
        self.clear_cache();
        match self {
            Leaf(leaf) => Ok(leaf.path == path),
            Extension(extension) => {
                let common_prefix_len = extension.path.common_prefix_length(&path);
                if common_prefix_len < extension.path.len() {
                    // No such key.
                    return Ok(false);
                }
                if extension
                    .child
                    .remove(path.slice(common_prefix_len..), store)?
                {
                    return Ok(true);
                }
                // A branch collapse below may have left a leaf or another
                // extension under this one, merge the path segments.
                let child = *take_child(&mut extension.child);
                let prefix = core::mem::take(&mut extension.path);
                *self = match child {
                    Leaf(mut leaf) => {
                        leaf.hash = None;
                        leaf.path = prefix.join(&leaf.path);
                        Leaf(leaf)
                    }
                    Extension(mut inner) => {
                        inner.hash = None;
                        inner.path = prefix.join(&inner.path);
                        Extension(inner)
                    }
                    child => Self::extension(prefix, Box::new(child)),
                };
                Ok(false)
            }
            Branch(branch) => {
                if path.is_empty() {
                    return Ok(false);
                }
                let idx = path.at(0);
                if let Some(child) = branch.children.get_mut(idx) {
                    if child.remove(path.slice(1..), store)? {
                        branch.children.remove(idx);
                    }
                }
                if branch.children.is_empty() {
                    return Ok(true);
                }
                // One child left: the branch disappears and the surviving
                // child absorbs the branch index into its path.
                if let Some((child_idx, child)) = branch.children.take_sole_child() {
                    let mut prefix = Nibbles::default();
                    prefix.push_unchecked(child_idx as u8);
                    let mut child = *child;
                    // Merging paths requires the child's kind.
                    child.resolve(store, true)?;
                    *self = match child {
                        Leaf(mut leaf) => {
                            leaf.hash = None;
                            leaf.path = prefix.join(&leaf.path);
                            Leaf(leaf)
                        }
                        Extension(mut inner) => {
                            inner.hash = None;
                            inner.path = prefix.join(&inner.path);
                            Extension(inner)
                        }
                        child @ Branch(_) => Self::extension(prefix, Box::new(child)),
                        Digest(digest) => {
                            return Err(TrieError::Traversal {
                                hash: digest.value,
                                operation: "remove",
                            });
                        }
                    };
                }
                Ok(false)
            }
            Digest(digest) => Err(TrieError::Traversal {
                hash: digest.value,
                operation: "remove",
            }),
        }
    }
}
