use alloy_primitives::B256;
use thiserror::Error;

/// Failures surfaced by trie operations and traversals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrieError {
    /// A node referenced by hash has no entry in the backing store.
    #[error("node {0} is missing from the store")]
    MissingNode(B256),

    /// Bytes fetched from the store do not decode to a valid node or value.
    #[error("failed to decode node {hash}: {reason}")]
    Decode {
        /// Hash the malformed bytes were stored under.
        hash: B256,
        /// Decoder message.
        reason: String,
    },

    /// An unresolved node was reached after resolution reported success.
    #[error("reached unresolved node {hash} during {operation}")]
    Traversal {
        /// Digest of the offending node.
        hash: B256,
        /// Operation that tripped over it.
        operation: &'static str,
    },
}

impl TrieError {
    pub(crate) fn decode(hash: B256, err: alloy_rlp::Error) -> Self {
        Self::Decode { hash, reason: err.to_string() }
    }
}
