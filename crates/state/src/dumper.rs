//! A visitor that renders the whole state as an indented text tree.
use alloy_primitives::B256;
use ledger_trie::{BranchNode, ExtensionNode, LeafNode, TreeVisitor, VisitContext};
use std::fmt;

/// Collects one line per visited node, indented by traversal depth.
/// Intended for debugging and for exercising the traversal protocol.
#[derive(Debug, Default)]
pub struct TreeDumper {
    lines: Vec<String>,
}

impl TreeDumper {
    /// Creates an empty dumper.
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected lines, in visit order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn push(&mut self, ctx: &VisitContext, text: String) {
        let slot = match ctx.branch_child_index {
            Some(idx) => format!("[{idx:x}] "),
            None => String::new(),
        };
        self.lines
            .push(format!("{}{slot}{text}", "  ".repeat(ctx.level)));
    }
}

impl TreeVisitor for TreeDumper {
    fn visit_branch(&mut self, node: &BranchNode, ctx: &VisitContext) {
        self.push(ctx, format!("BRANCH ({} children)", node.child_count()));
    }

    fn visit_extension(&mut self, node: &ExtensionNode, ctx: &VisitContext) {
        self.push(ctx, format!("EXTENSION {:?}", node.path().to_vec()));
    }

    fn visit_leaf(&mut self, _node: &LeafNode, ctx: &VisitContext, value: &[u8]) {
        let kind = if ctx.is_storage {
            "STORAGE VALUE"
        } else if ctx.expect_accounts {
            "ACCOUNT"
        } else {
            "LEAF"
        };
        self.push(ctx, format!("{kind} ({} bytes)", value.len()));
    }

    fn visit_code(&mut self, code_hash: B256, ctx: &VisitContext) {
        self.push(ctx, format!("CODE {code_hash}"));
    }

    fn visit_missing_node(&mut self, hash: B256, ctx: &VisitContext) {
        self.push(ctx, format!("MISSING {hash}"));
    }
}

impl fmt::Display for TreeDumper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StateView;
    use alloy_primitives::{Address, U256};
    use ledger_trie::MemoryStore;

    #[test]
    fn dumps_accounts_and_storage() {
        let mut state = StateView::empty(MemoryStore::new());
        let alice = Address::repeat_byte(0xa1);
        let contract = Address::repeat_byte(0xc0);
        state.create_account(alice, U256::from(1)).unwrap();
        state.create_account(contract, U256::from(2)).unwrap();
        state
            .set_storage(contract, U256::from(0), U256::from(3))
            .unwrap();
        state.commit().unwrap();

        let mut dumper = TreeDumper::new();
        state.accept(&mut dumper).unwrap();

        let rendered = dumper.to_string();
        assert_eq!(
            rendered.matches("ACCOUNT").count(),
            2,
            "unexpected dump:\n{rendered}"
        );
        assert_eq!(
            rendered.matches("STORAGE VALUE").count(),
            1,
            "unexpected dump:\n{rendered}"
        );
        assert_eq!(rendered.matches("BRANCH").count(), 1);
        assert!(!rendered.contains("MISSING"));
    }

    #[test]
    fn empty_state_dumps_nothing() {
        let mut state = StateView::empty(MemoryStore::new());
        let mut dumper = TreeDumper::new();
        state.accept(&mut dumper).unwrap();
        assert!(dumper.lines().is_empty());
    }
}
