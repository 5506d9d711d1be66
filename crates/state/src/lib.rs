//! Account-level state over a pair of tries.
//!
//! [`StateView`] wraps an account trie and the per-account storage tries,
//! exposing balances, nonces, code hashes and storage slots instead of
//! raw trie keys. Storage tries are opened lazily from the storage root
//! recorded in the owning account and folded back into it when the state
//! root is computed.

mod dumper;
mod error;
mod view;

pub use alloy_trie::TrieAccount;
pub use dumper::TreeDumper;
pub use error::StateError;
pub use view::StateView;
