//! 16-slot children array of a branch node.
//! A bit flag per slot tracks occupancy so counting and sole-child lookup
//! stay cheap.
use super::nodes::TrieNode;
use std::slice::{Iter, IterMut};

#[derive(Debug, Clone, Default)]
pub(crate) struct BranchNodeChildrenArray {
    children: [Option<Box<TrieNode>>; 16],
    flags: u16,
}

impl BranchNodeChildrenArray {
    #[inline]
    pub(crate) fn new() -> Self {
        Self { children: [const { None }; 16], flags: 0 }
    }

    #[inline]
    pub(crate) fn get(&self, idx: usize) -> Option<&TrieNode> {
        self.children[idx].as_deref()
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut TrieNode> {
        self.children[idx].as_deref_mut()
    }

    #[inline]
    pub(crate) fn insert(&mut self, idx: usize, node: Box<TrieNode>) {
        self.children[idx] = Some(node);
        self.flags |= 1 << idx;
    }

    #[inline]
    pub(crate) fn remove(&mut self, idx: usize) {
        self.children[idx] = None;
        self.flags &= !(1 << idx);
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.flags == 0
    }

    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.flags.count_ones() as usize
    }

    /// When exactly one slot is occupied, detaches and returns it.
    #[inline]
    pub(crate) fn take_sole_child(&mut self) -> Option<(usize, Box<TrieNode>)> {
        if self.flags == 0 || self.flags & (self.flags - 1) != 0 {
            return None;
        }
        let idx = self.flags.trailing_zeros() as usize;
        let child = self.children[idx].take()?;
        self.flags = 0;
        Some((idx, child))
    }

    #[inline]
    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, Option<Box<TrieNode>>> {
        self.children.iter_mut()
    }

    #[inline]
    pub(crate) fn iter(&self) -> Iter<'_, Option<Box<TrieNode>>> {
        self.children.iter()
    }
}
