//! Lazy resolution of digest nodes through the backing store.
use super::nodes::TrieNode;
use crate::error::TrieError;
use crate::store::KeyValueStore;
use crate::trie::TrieNode::Digest;
use log::trace;

impl TrieNode {
    /// Replaces a digest node in place with the node decoded from the
    /// store. Already-resolved nodes are left untouched.
    ///
    /// Returns `Ok(true)` when the node is resolved afterwards and
    /// `Ok(false)` when the store has no entry and `throw_on_missing` is
    /// unset. Undecodable store bytes always fail.
    pub(crate) fn resolve(
        &mut self,
        store: &dyn KeyValueStore,
        throw_on_missing: bool,
    ) -> Result<bool, TrieError> {
        let digest = match self {
            Digest(digest) => digest.value,
            _ => return Ok(true),
        };

        match store.get(&digest) {
            Some(rlp) => {
                let mut node = Self::decode(&mut &rlp[..])
                    .map_err(|err| TrieError::decode(digest, err))?
                    .ok_or_else(|| {
                        TrieError::decode(digest, alloy_rlp::Error::Custom("empty node"))
                    })?;
                trace!("resolved node {digest}");
                // The store key is the node hash, seed the cache with it.
                node.set_cache(digest);
                *self = node;
                Ok(true)
            }
            None if throw_on_missing => Err(TrieError::MissingNode(digest)),
            None => Ok(false),
        }
    }
}
