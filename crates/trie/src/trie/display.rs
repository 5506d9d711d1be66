//! Simple printing implementation of the trie.
use crate::trie::TrieNode::{Branch, Digest, Extension, Leaf};
use crate::trie::{Trie, TrieNode};
use std::fmt::Display;

impl Display for Trie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn fmt_node(
            f: &mut std::fmt::Formatter<'_>,
            node: &TrieNode,
            indent: usize,
        ) -> std::fmt::Result {
            write!(f, "{}", " ".repeat(indent))?;
            match node {
                Branch(branch) => {
                    write!(f, "Branch")?;
                    for child in branch.children.iter() {
                        match child {
                            None => write!(f, "\n{}None", " ".repeat(indent + 4))?,
                            Some(child) => {
                                writeln!(f)?;
                                fmt_node(f, child, indent + 4)?;
                            }
                        }
                    }
                    Ok(())
                }
                Extension(extension) => {
                    writeln!(f, "Extension {{ path: {:?} }}", extension.path.to_vec())?;
                    fmt_node(f, &extension.child, indent + 4)
                }
                Leaf(leaf) => write!(
                    f,
                    "Leaf {{ path: {:?}, value: {:?} }}",
                    leaf.path.to_vec(),
                    leaf.value
                ),
                Digest(digest) => write!(f, "Digest {{ {:?} }}", digest.value),
            }
        }

        match self.root.as_ref() {
            None => write!(f, "Trie {{ EMPTY }}"),
            Some(root) => fmt_node(f, root, 0),
        }
    }
}
