//! Memory structure: address decomposition shared by
//! the caches, the directories and the memory banks

pub mod bank;
pub mod cache;
pub mod directory;

use crate::error::RequestError;

/// Number of nodes in the machine
pub const NODES: usize = 4;
/// Processors (and private caches) per node
pub const CPUS_PER_NODE: usize = 2;
/// Words hosted by each node's memory bank
pub const WORDS_PER_NODE: usize = 16;
/// Lines in every direct-mapped processor cache
pub const CACHE_LINES: usize = 4;
/// Size of the global word-addressable space
pub const MEMORY_WORDS: usize = NODES * WORDS_PER_NODE;

// (tag, line) must reconstruct the address
const _: () = assert!(WORDS_PER_NODE % CACHE_LINES == 0);

/// Global word address
// Looks like this:
// | tag | line |   for the caches
// | home | slot |  for the memory banks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Address(u32);

impl Address {
    /// Checks that the address has a home node
    pub fn new(raw: u32) -> Result<Self, RequestError> {
        if (raw as usize) < MEMORY_WORDS {
            Ok(Self(raw))
        } else {
            Err(RequestError::AddressOutOfRange(raw))
        }
    }

    /// Rebuilds the address held by a cache line
    pub fn from_parts(tag: u32, line: usize) -> Self {
        Self(tag * CACHE_LINES as u32 + line as u32)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    /// The node whose memory bank backs this address
    pub fn home(&self) -> usize {
        self.0 as usize / WORDS_PER_NODE
    }

    /// Offset within the home memory bank
    pub fn slot(&self) -> usize {
        self.0 as usize % WORDS_PER_NODE
    }

    /// Direct-mapped cache line index
    pub fn line(&self) -> usize {
        self.0 as usize % CACHE_LINES
    }

    pub fn tag(&self) -> u32 {
        self.0 / CACHE_LINES as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    Read,
    Write,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decomposition() {
        let address = Address::new(37).unwrap();
        assert_eq!(address.home(), 2);
        assert_eq!(address.slot(), 5);
        assert_eq!(address.line(), 1);
        assert_eq!(address.tag(), 9);
    }

    #[test]
    fn test_parts_reconstruct_every_address() {
        for raw in 0..MEMORY_WORDS as u32 {
            let address = Address::new(raw).unwrap();
            assert_eq!(
                Address::from_parts(address.tag(), address.line()),
                address
            );
            assert_eq!(
                address.home() * WORDS_PER_NODE + address.slot(),
                raw as usize
            );
        }
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            Address::new(MEMORY_WORDS as u32),
            Err(RequestError::AddressOutOfRange(64))
        );
        assert!(Address::new(63).is_ok());
    }
}
