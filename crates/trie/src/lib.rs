//! A content-addressed Merkle Patricia trie with lazy node resolution.
//!
//! Nodes referenced only by hash are materialized as [`TrieNode::Digest`]
//! placeholders and loaded from a [`KeyValueStore`] the first time an
//! operation needs them. [`Trie::commit`] persists every dirty node back
//! to the store, keyed by its keccak hash, so a trie can be reopened later
//! from nothing but its root hash via [`Trie::from_root`].
//!
//! [`Trie::accept`] runs a depth-first walk over the whole structure,
//! driving a [`TreeVisitor`] with depth and storage-context bookkeeping.

mod error;
mod store;
mod trie;
mod visitor;

pub use alloy_primitives::B256;
pub use alloy_trie::Nibbles;
pub use error::TrieError;
pub use store::{B256Map, KeyValueStore, MemoryStore};
pub use trie::{BranchNode, DigestNode, ExtensionNode, LeafNode, Trie, TrieNode};
pub use visitor::{TreeVisitor, VisitContext};
