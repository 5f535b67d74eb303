//! A node's slice of global memory, one directory entry per word

use super::directory::DirectoryEntry;
use super::WORDS_PER_NODE;

/// Added to every word's global address to seed its initial value
pub const SEED_OFFSET: u32 = 5;

/// One word of memory with its directory entry
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MemLine {
    pub data: u32,
    pub entry: DirectoryEntry,
}

pub struct MemoryBank {
    lines: Vec<MemLine>,
}

impl MemoryBank {
    /// Make the bank of the given node,
    /// every word seeded and uncached
    pub fn make(node_id: usize) -> Self {
        let lines = (0..WORDS_PER_NODE)
            .map(|slot| MemLine {
                data: (node_id * WORDS_PER_NODE + slot) as u32 + SEED_OFFSET,
                entry: DirectoryEntry::default(),
            })
            .collect();
        Self { lines }
    }

    pub fn word(&self, slot: usize) -> u32 {
        self.lines[slot].data
    }

    pub fn set_word(&mut self, slot: usize, value: u32) {
        self.lines[slot].data = value;
    }

    pub fn entry(&self, slot: usize) -> &DirectoryEntry {
        &self.lines[slot].entry
    }

    pub fn entry_mut(&mut self, slot: usize) -> &mut DirectoryEntry {
        &mut self.lines[slot].entry
    }

    pub fn lines(&self) -> &[MemLine] {
        &self.lines
    }
}
