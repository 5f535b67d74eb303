//! Per-word directory state

use std::fmt;

use super::NODES;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DirectoryState {
    #[default]
    Uncached,
    Shared,
    Dirty,
}

/// Set of node ids, one bit per node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PresenceSet(u8);

impl PresenceSet {
    pub fn only(node: usize) -> Self {
        let mut set = Self::default();
        set.insert(node);
        set
    }

    pub fn insert(&mut self, node: usize) {
        assert!(node < NODES);
        self.0 |= 1 << node;
    }

    pub fn remove(&mut self, node: usize) {
        assert!(node < NODES);
        self.0 &= !(1 << node);
    }

    pub fn contains(&self, node: usize) -> bool {
        node < NODES && self.0 & (1 << node) != 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// The single member, if there is exactly one
    pub fn owner(&self) -> Option<usize> {
        if self.len() == 1 {
            Some(self.0.trailing_zeros() as usize)
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> {
        let bits = self.0;
        (0..NODES).filter(move |&node| bits & (1 << node) != 0)
    }
}

impl fmt::Display for PresenceSet {
    /// One digit per node, node 0 first
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for node in 0..NODES {
            write!(f, "{}", self.contains(node) as u8)?;
        }
        Ok(())
    }
}

/// Coherence state of one memory word
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub state: DirectoryState,
    pub presence: PresenceSet,
}

impl DirectoryEntry {
    /// Record another clean copy
    pub fn share(&mut self, node: usize) {
        self.state = DirectoryState::Shared;
        self.presence.insert(node);
    }

    /// Hand exclusive ownership to one node
    pub fn make_dirty(&mut self, node: usize) {
        self.state = DirectoryState::Dirty;
        self.presence = PresenceSet::only(node);
    }

    /// Forget a node's copy. An entry nobody holds is uncached
    pub fn release(&mut self, node: usize) {
        self.presence.remove(node);
        if self.presence.is_empty() {
            self.state = DirectoryState::Uncached;
        }
    }
}
