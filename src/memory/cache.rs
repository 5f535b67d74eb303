//! Direct-mapped private cache

use super::Address;
use super::CACHE_LINES;

/// A single cached word
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CacheLine {
    pub valid: bool,
    pub tag: u32,
    pub data: u32,
}

/// A valid line pushed out by a fill
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Victim {
    pub address: Address,
    pub data: u32,
}

/// Cache implementation
#[derive(Clone, Debug, Default)]
pub struct Cache {
    pub lines: [CacheLine; CACHE_LINES],
}

impl Cache {
    pub fn make() -> Self {
        Self::default()
    }

    /// The line the address maps to, whatever it holds
    pub fn line(&self, address: Address) -> &CacheLine {
        &self.lines[address.line()]
    }

    pub fn is_in_cache(&self, address: Address) -> bool {
        self.lookup(address).is_some()
    }

    /// Return the cached word if the line is valid and has the same tag
    pub fn lookup(&self, address: Address) -> Option<u32> {
        let line = self.line(address);
        if line.valid && line.tag == address.tag() {
            Some(line.data)
        } else {
            None
        }
    }

    /// Install a word for the address.
    /// Returns the valid line of another address it replaced, if any
    pub fn fill(&mut self, address: Address, data: u32) -> Option<Victim> {
        let index = address.line();
        let replaced = std::mem::replace(
            &mut self.lines[index],
            CacheLine { valid: true, tag: address.tag(), data },
        );
        if replaced.valid && replaced.tag != address.tag() {
            Some(Victim {
                address: Address::from_parts(replaced.tag, index),
                data: replaced.data,
            })
        } else {
            None
        }
    }

    /// Clear the valid bit, but only if the line holds this address.
    /// Returns true iff a copy was dropped
    pub fn invalidate(&mut self, address: Address) -> bool {
        let tag = address.tag();
        let line = &mut self.lines[address.line()];
        if line.valid && line.tag == tag {
            line.valid = false;
            true
        } else {
            false
        }
    }

    /// Every valid line with the address it holds
    pub fn valid_lines(&self) -> impl Iterator<Item = (Address, &CacheLine)> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.valid)
            .map(|(i, line)| (Address::from_parts(line.tag, i), line))
    }
}
