//! Depth-first trie traversal driven by a pluggable visitor.
//!
//! The walk resolves nodes through the store as it descends. A node whose
//! bytes are absent from the store is reported via
//! [`TreeVisitor::visit_missing_node`] and skipped, the rest of the walk
//! continues. Undecodable bytes abort the walk with an error.
//!
//! When `expect_accounts` is set, leaf payloads of the account trie are
//! decoded as accounts and the walk recurses into their bytecode and
//! storage: the code hash is reported through [`TreeVisitor::visit_code`]
//! and the storage root is walked as a nested trie with
//! [`VisitContext::is_storage`] set.

use crate::error::TrieError;
use crate::store::KeyValueStore;
use crate::trie::TrieNode::{Branch, Digest, Extension, Leaf};
use crate::trie::{BranchNode, ExtensionNode, LeafNode, Trie, TrieNode};
use alloy_primitives::{B256, KECCAK256_EMPTY};
use alloy_trie::{TrieAccount, EMPTY_ROOT_HASH};

/// Traversal state, mutated in place as the walk descends and restored
/// on the way back up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitContext {
    /// Distance from the account-trie root. Keeps growing across the
    /// account/storage boundary.
    pub level: usize,
    /// Whether the walk is currently inside a storage trie.
    pub is_storage: bool,
    /// Child slot of the parent branch the walk descended through, or
    /// `None` when the parent is not a branch.
    pub branch_child_index: Option<u8>,
    /// Whether leaf payloads of the outer trie hold encoded accounts.
    pub expect_accounts: bool,
}

impl VisitContext {
    /// A root-level context.
    pub fn new(expect_accounts: bool) -> Self {
        Self {
            level: 0,
            is_storage: false,
            branch_child_index: None,
            expect_accounts,
        }
    }
}

/// Callbacks invoked during a trie walk. Every hook defaults to a no-op
/// and [`TreeVisitor::should_visit`] to visiting everything.
pub trait TreeVisitor {
    /// Pruning predicate, consulted with a node hash before descending
    /// into the corresponding subtree.
    fn should_visit(&self, _hash: B256) -> bool {
        true
    }

    /// A branch node was reached.
    fn visit_branch(&mut self, _node: &BranchNode, _ctx: &VisitContext) {}

    /// An extension node was reached.
    fn visit_extension(&mut self, _node: &ExtensionNode, _ctx: &VisitContext) {}

    /// A leaf was reached; `value` is its payload.
    fn visit_leaf(&mut self, _node: &LeafNode, _ctx: &VisitContext, _value: &[u8]) {}

    /// An account leaf referenced bytecode by `code_hash`.
    fn visit_code(&mut self, _code_hash: B256, _ctx: &VisitContext) {}

    /// A referenced node could not be loaded from the store. The subtree
    /// below it is skipped.
    fn visit_missing_node(&mut self, _hash: B256, _ctx: &VisitContext) {}
}

impl Trie {
    /// Walks the trie depth-first, driving `visitor` with `ctx`. An empty
    /// trie produces no callbacks.
    pub fn accept(
        &mut self,
        visitor: &mut dyn TreeVisitor,
        store: &dyn KeyValueStore,
        ctx: &mut VisitContext,
    ) -> Result<(), TrieError> {
        match self.root.as_mut() {
            Some(root) => root.accept(visitor, store, ctx),
            None => Ok(()),
        }
    }
}

impl TrieNode {
    pub(crate) fn accept(
        &mut self,
        visitor: &mut dyn TreeVisitor,
        store: &dyn KeyValueStore,
        ctx: &mut VisitContext,
    ) -> Result<(), TrieError> {
        if !self.resolve(store, false)? {
            visitor.visit_missing_node(self.hash(), ctx);
            return Ok(());
        }

        match self {
            Branch(branch) => {
                visitor.visit_branch(branch, ctx);
                ctx.level += 1;
                for idx in 0..16 {
                    let Some(child) = branch.children.get_mut(idx) else {
                        continue;
                    };
                    if visitor.should_visit(child.hash()) {
                        ctx.branch_child_index = Some(idx as u8);
                        child.accept(visitor, store, ctx)?;
                    }
                }
                ctx.level -= 1;
                ctx.branch_child_index = None;
            }
            Extension(extension) => {
                visitor.visit_extension(extension, ctx);
                if visitor.should_visit(extension.child.hash()) {
                    ctx.level += 1;
                    ctx.branch_child_index = None;
                    extension.child.accept(visitor, store, ctx)?;
                    ctx.level -= 1;
                }
            }
            Leaf(leaf) => {
                let leaf_hash = leaf.hash();
                visitor.visit_leaf(leaf, ctx, &leaf.value);
                if !ctx.is_storage && ctx.expect_accounts {
                    let account = alloy_rlp::decode_exact::<TrieAccount>(&leaf.value)
                        .map_err(|err| TrieError::decode(leaf_hash, err))?;
                    if account.code_hash != KECCAK256_EMPTY
                        && visitor.should_visit(account.code_hash)
                    {
                        ctx.level += 1;
                        ctx.branch_child_index = None;
                        visitor.visit_code(account.code_hash, ctx);
                        ctx.level -= 1;
                    }
                    if account.storage_root != EMPTY_ROOT_HASH
                        && visitor.should_visit(account.storage_root)
                    {
                        ctx.is_storage = true;
                        ctx.level += 1;
                        ctx.branch_child_index = None;
                        let mut storage_root = Self::digest(account.storage_root);
                        storage_root.accept(visitor, store, ctx)?;
                        ctx.level -= 1;
                        ctx.is_storage = false;
                    }
                }
            }
            Digest(digest) => {
                return Err(TrieError::Traversal {
                    hash: digest.value,
                    operation: "accept",
                });
            }
        }
        Ok(())
    }
}
