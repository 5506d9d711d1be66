mod children;
mod display;
mod get;
mod hash;
mod insert;
mod nodes;
mod remove;
mod resolve;
mod rlp;
mod trie;

pub use nodes::{BranchNode, DigestNode, ExtensionNode, LeafNode, TrieNode};
pub use trie::Trie;
