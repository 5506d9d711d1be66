//! Per-kind node encoding and hashing, with hash caching and persistence.
use super::nodes::{BranchNode, ExtensionNode, LeafNode, TrieNode};
use crate::store::KeyValueStore;
use crate::trie::rlp::encode_list_header;
use crate::trie::TrieNode::{Branch, Digest, Extension, Leaf};
use alloy_primitives::{keccak256, B256};
use alloy_rlp::{Encodable, EMPTY_STRING_CODE};
use alloy_trie::nodes::encode_path_leaf;

impl TrieNode {
    /// Returns the keccak hash of the node encoding. Cached per node and
    /// invalidated by mutation.
    pub(crate) fn hash(&mut self) -> B256 {
        match self {
            Leaf(leaf) => leaf.hash(),
            Extension(extension) => extension.hash(),
            Branch(branch) => branch.hash(),
            Digest(digest) => digest.value,
        }
    }

    // Returns RLP encoding of the node.
    // https://ethereum.org/pl/developers/docs/data-structures-and-encoding/patricia-merkle-trie/#optimization
    pub(crate) fn encode(&mut self) -> Vec<u8> {
        match self {
            Leaf(leaf) => leaf.encode(),
            Extension(extension) => extension.encode(),
            Branch(branch) => branch.encode(),
            Digest(digest) => {
                let mut out = Vec::with_capacity(33);
                digest.value.encode(&mut out);
                out
            }
        }
    }

    // Seeds the hash cache with an externally known hash.
    pub(crate) fn set_cache(&mut self, hash: B256) {
        match self {
            Leaf(leaf) => leaf.hash = Some(hash),
            Extension(extension) => extension.hash = Some(hash),
            Branch(branch) => branch.hash = Some(hash),
            Digest(_) => {}
        }
    }

    // Drops the cached hash of this node. Callers invalidate along the
    // mutated path only, untouched subtrees keep their caches.
    pub(crate) fn clear_cache(&mut self) {
        match self {
            Leaf(leaf) => leaf.hash = None,
            Extension(extension) => extension.hash = None,
            Branch(branch) => branch.hash = None,
            Digest(_) => {}
        }
    }

    /// Persists the subtree bottom-up: every node whose encoding is at
    /// least 32 bytes is stored under its keccak hash. Shorter nodes are
    /// inlined into their parent and have no standalone entry.
    pub(crate) fn commit(&mut self, store: &mut dyn KeyValueStore) {
        match self {
            Digest(_) => return,
            Leaf(_) => {}
            Extension(extension) => extension.child.commit(store),
            Branch(branch) => {
                for child in branch.children.iter_mut().flatten() {
                    child.commit(store);
                }
            }
        }
        let encoded = self.encode();
        if encoded.len() >= 32 {
            let hash = keccak256(&encoded);
            store.put(hash, encoded.into());
            self.set_cache(hash);
        }
    }
}

impl LeafNode {
    // Returns RLP encoding of the leaf node.
    fn encode(&self) -> Vec<u8> {
        // Encode the path of the leaf. It is not RLP encoding.
        // It is encoding of the path according to
        // https://ethereum.org/pl/developers/docs/data-structures-and-encoding/patricia-merkle-trie/#specification
        let path = encode_path_leaf(&self.path, true);
        // The list contains two elements, the encoded `path` and `value`.
        // Warning: `.length()` computes the *RLP* representation length of the value it is called on.
        let mut out = encode_list_header(path.length() + self.value.length());

        path.encode(&mut out);
        self.value[..].encode(&mut out);
        out
    }

    // Returns hash of the leaf node.
    // Caches computed hash to avoid unnecessary recomputations.
    pub(crate) fn hash(&mut self) -> B256 {
        match self.hash {
            Some(hash) => hash,
            None => {
                let hash = keccak256(self.encode());
                self.hash = Some(hash);
                hash
            }
        }
    }
}

impl ExtensionNode {
    // Returns RLP encoding of the extension node: the encoded path and
    // a reference to the child.
    fn encode(&mut self) -> Vec<u8> {
        let path = encode_path_leaf(&self.path, false);
        let mut child_ref = Vec::new();
        encode_child(&mut self.child, &mut child_ref);

        // `child_ref` is already encoded so its absolute length (`.len()`) counts.
        let mut out = encode_list_header(path.length() + child_ref.len());
        path.encode(&mut out);
        out.extend_from_slice(&child_ref);
        out
    }

    pub(crate) fn hash(&mut self) -> B256 {
        match self.hash {
            Some(hash) => hash,
            None => {
                let hash = keccak256(self.encode());
                self.hash = Some(hash);
                hash
            }
        }
    }
}

impl BranchNode {
    // Returns RLP encoding of the branch node: 16 child references and
    // an empty value slot.
    fn encode(&mut self) -> Vec<u8> {
        let mut encoded: Vec<u8> = Vec::default();

        for child in self.children.iter_mut() {
            match child {
                Some(child) => encode_child(child, &mut encoded),
                None => encoded.push(EMPTY_STRING_CODE),
            }
        }

        // Push an empty branch value.
        encoded.push(EMPTY_STRING_CODE);

        let mut encoded_branch = encode_list_header(encoded.len());
        encoded_branch.append(&mut encoded);
        encoded_branch
    }

    pub(crate) fn hash(&mut self) -> B256 {
        match self.hash {
            Some(hash) => hash,
            None => {
                let hash = keccak256(self.encode());
                self.hash = Some(hash);
                hash
            }
        }
    }
}

// Encodes a node as a child reference: inlined when its encoding is
// shorter than 32 bytes, rlp(keccak) of the encoding otherwise.
#[inline]
fn encode_child(child: &mut TrieNode, out: &mut Vec<u8>) {
    if let Digest(digest) = child {
        digest.value.encode(out);
        return;
    }
    let encoded = child.encode();
    if encoded.len() < 32 {
        out.extend_from_slice(&encoded);
    } else {
        keccak256(&encoded).encode(out);
    }
}
