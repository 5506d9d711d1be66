use alloy_primitives::{Address, B256};
use ledger_trie::TrieError;
use thiserror::Error;

/// Failures surfaced by state reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// An underlying trie operation failed.
    #[error(transparent)]
    Trie(#[from] TrieError),

    /// Stored account or storage bytes do not decode.
    #[error("malformed state entry under {hashed}: {reason}")]
    Malformed {
        /// Hashed trie key of the entry.
        hashed: B256,
        /// Decoder message.
        reason: String,
    },

    /// A balance deduction exceeded the account balance.
    #[error("balance underflow for {0}")]
    BalanceUnderflow(Address),
}
