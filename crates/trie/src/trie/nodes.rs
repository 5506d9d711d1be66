//! The four node kinds a trie is built from.

use super::children::BranchNodeChildrenArray;
use alloy_primitives::{Bytes, B256};
use alloy_trie::Nibbles;

/// A node of the trie.
///
/// `Digest` stands in for any node that has not been loaded from the
/// store yet; resolution replaces it in place with the decoded node.
#[derive(Debug, Clone)]
pub enum TrieNode {
    /// A node with up to 16 children, indexed by the next path nibble.
    Branch(BranchNode),
    /// A shared path segment ahead of a single child.
    Extension(ExtensionNode),
    /// The remaining path and the stored value.
    Leaf(LeafNode),
    /// A node known only by its hash.
    Digest(DigestNode),
}

/// See [`TrieNode::Branch`].
#[derive(Debug, Clone, Default)]
pub struct BranchNode {
    pub(crate) children: BranchNodeChildrenArray,
    pub(crate) hash: Option<B256>,
}

/// See [`TrieNode::Extension`].
#[derive(Debug, Clone)]
pub struct ExtensionNode {
    pub(crate) path: Nibbles,
    pub(crate) child: Box<TrieNode>,
    pub(crate) hash: Option<B256>,
}

/// See [`TrieNode::Leaf`].
#[derive(Debug, Clone)]
pub struct LeafNode {
    pub(crate) path: Nibbles,
    pub(crate) value: Bytes,
    pub(crate) hash: Option<B256>,
}

/// See [`TrieNode::Digest`].
#[derive(Debug, Clone)]
pub struct DigestNode {
    pub(crate) value: B256,
}

impl BranchNode {
    /// Returns the child at slot `idx` without forcing its resolution.
    pub fn child(&self, idx: usize) -> Option<&TrieNode> {
        self.children.get(idx)
    }

    /// Number of occupied child slots.
    pub fn child_count(&self) -> usize {
        self.children.count()
    }
}

impl ExtensionNode {
    /// The shared path segment, in nibbles.
    pub fn path(&self) -> &Nibbles {
        &self.path
    }

    /// The node the extension points at.
    pub fn child(&self) -> &TrieNode {
        &self.child
    }
}

impl LeafNode {
    /// The remaining path, in nibbles.
    pub fn path(&self) -> &Nibbles {
        &self.path
    }

    /// The stored value.
    pub fn value(&self) -> &Bytes {
        &self.value
    }
}

impl DigestNode {
    /// Hash of the node this digest stands in for.
    pub fn digest(&self) -> B256 {
        self.value
    }
}

impl TrieNode {
    pub(crate) fn leaf(path: Nibbles, value: Bytes) -> Self {
        Self::Leaf(LeafNode { path, value, hash: None })
    }

    pub(crate) fn extension(path: Nibbles, child: Box<Self>) -> Self {
        Self::Extension(ExtensionNode { path, child, hash: None })
    }

    pub(crate) fn digest(value: B256) -> Self {
        Self::Digest(DigestNode { value })
    }
}

/// Detaches a boxed child, leaving a placeholder that the caller is about
/// to overwrite or drop.
pub(crate) fn take_child(slot: &mut Box<TrieNode>) -> Box<TrieNode> {
    core::mem::replace(slot, Box::new(TrieNode::digest(B256::ZERO)))
}
