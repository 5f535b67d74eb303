//! The whole machine: every node, addressed by node id

use log::debug;

use crate::error::CoherenceError;
use crate::error::RequestError;
use crate::memory::directory::DirectoryEntry;
use crate::memory::directory::DirectoryState;
use crate::memory::directory::PresenceSet;
use crate::memory::Address;
use crate::memory::MEMORY_WORDS;
use crate::memory::NODES;
use crate::node::Node;

/// Sole owner of all nodes.
/// Protocol code takes `&mut System` and indexes by node id
pub struct System {
    nodes: Vec<Node>,
}

impl Default for System {
    fn default() -> Self {
        Self::make()
    }
}

impl System {
    /// Make a freshly initialized machine
    pub fn make() -> Self {
        Self { nodes: (0..NODES).map(Node::make).collect() }
    }

    /// Check a node selector
    pub fn node_id(id: usize) -> Result<usize, RequestError> {
        if id < NODES {
            Ok(id)
        } else {
            Err(RequestError::InvalidNodeSelector(id))
        }
    }

    /// The node whose memory bank backs the address
    pub fn home_node(address: Address) -> usize {
        address.home()
    }

    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: usize) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Directory entry at the address' home
    pub fn entry(&self, address: Address) -> &DirectoryEntry {
        self.nodes[address.home()].memory.entry(address.slot())
    }

    pub fn entry_mut(&mut self, address: Address) -> &mut DirectoryEntry {
        self.nodes[address.home()].memory.entry_mut(address.slot())
    }

    /// Memory word at the address' home
    pub fn word(&self, address: Address) -> u32 {
        self.nodes[address.home()].memory.word(address.slot())
    }

    pub fn set_word(&mut self, address: Address, value: u32) {
        self.nodes[address.home()].memory.set_word(address.slot(), value);
    }

    /// Invalidate every copy recorded in the address' presence set,
    /// then clear the set.
    /// Returns how many cache lines were dropped
    pub fn invalidate_sharers(&mut self, address: Address) -> usize {
        let presence = self.entry(address).presence;
        let mut dropped = 0;
        for id in presence.iter() {
            dropped += self.nodes[id].invalidate(address);
        }
        self.entry_mut(address).presence.clear();
        debug!(
            "invalidated {} copies of {} (presence {})",
            dropped,
            address.raw(),
            presence
        );
        dropped
    }

    /// Nodes with at least one valid copy of the address
    pub fn holders(&self, address: Address) -> PresenceSet {
        let mut holders = PresenceSet::default();
        for node in self.nodes.iter().filter(|node| node.holds(address)) {
            holders.insert(node.id());
        }
        holders
    }

    /// Check every directory entry against the caches:
    /// presence sets must name exactly the nodes holding a copy,
    /// a dirty word has one owner, and shared copies match memory
    pub fn verify_coherence(&self) -> Result<(), CoherenceError> {
        for raw in 0..MEMORY_WORDS as u32 {
            let address = Address::new(raw)
                .map_err(|e| inconsistency(raw, e.to_string()))?;
            let entry = self.entry(address);
            let holders = self.holders(address);

            if entry.state == DirectoryState::Uncached
                && !entry.presence.is_empty()
            {
                return Err(inconsistency(
                    raw,
                    format!("uncached word lists nodes {}", entry.presence),
                ));
            }
            if entry.state == DirectoryState::Dirty
                && entry.presence.owner().is_none()
            {
                return Err(inconsistency(
                    raw,
                    format!("dirty word has presence {}", entry.presence),
                ));
            }
            if holders != entry.presence {
                return Err(inconsistency(
                    raw,
                    format!(
                        "{:?} presence {} but copies held by {}",
                        entry.state, entry.presence, holders
                    ),
                ));
            }

            let mut copies = self.nodes.iter().flat_map(|node| {
                node.cpus.iter().filter_map(move |cpu| cpu.cache.lookup(address))
            });
            let expected = match entry.state {
                DirectoryState::Dirty => copies.next(),
                _ => Some(self.word(address)),
            };
            if let Some(expected) = expected {
                if let Some(stale) = copies.find(|&data| data != expected) {
                    return Err(inconsistency(
                        raw,
                        format!(
                            "copy holds {} but {} is current",
                            stale, expected
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn inconsistency(address: u32, detail: String) -> CoherenceError {
    CoherenceError::DirectoryInconsistency { address, detail }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::CpuId;

    fn addr(raw: u32) -> Address {
        Address::new(raw).unwrap()
    }

    #[test]
    fn test_routing() {
        let system = System::make();
        assert_eq!(System::home_node(addr(0)), 0);
        assert_eq!(System::home_node(addr(17)), 1);
        assert_eq!(System::home_node(addr(63)), 3);
        assert_eq!(system.word(addr(17)), 22);
        assert_eq!(system.node(3).id(), 3);
    }

    #[test]
    fn test_node_selector() {
        assert_eq!(System::node_id(3), Ok(3));
        assert_eq!(
            System::node_id(4),
            Err(RequestError::InvalidNodeSelector(4))
        );
    }

    #[test]
    fn test_fresh_system_is_coherent() {
        let system = System::make();
        assert!(system.verify_coherence().is_ok());
    }

    #[test]
    fn test_invalidate_sharers() {
        let mut system = System::make();
        let address = addr(9);
        for id in [0, 2] {
            system.node_mut(id).cpu_mut(CpuId::Cpu1).cache.fill(address, 14);
            system.entry_mut(address).share(id);
        }
        system.node_mut(2).cpu_mut(CpuId::Cpu0).cache.fill(address, 14);
        // Not recorded, must survive
        system.node_mut(3).cpu_mut(CpuId::Cpu0).cache.fill(addr(13), 18);

        assert_eq!(system.invalidate_sharers(address), 3);
        assert!(system.entry(address).presence.is_empty());
        assert!(system.holders(address).is_empty());
        assert!(system.node(3).holds(addr(13)));
    }

    #[test]
    fn test_detects_untracked_copy() {
        let mut system = System::make();
        system.node_mut(1).cpu_mut(CpuId::Cpu0).cache.fill(addr(40), 45);
        match system.verify_coherence() {
            Err(CoherenceError::DirectoryInconsistency { address, .. }) => {
                assert_eq!(address, 40)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_detects_stale_shared_copy() {
        let mut system = System::make();
        let address = addr(40);
        system.node_mut(1).cpu_mut(CpuId::Cpu0).cache.fill(address, 1);
        system.entry_mut(address).share(1);
        assert!(system.verify_coherence().is_err());

        system.node_mut(1).cpu_mut(CpuId::Cpu0).cache.fill(address, 45);
        assert!(system.verify_coherence().is_ok());
    }

    #[test]
    fn test_detects_ownerless_dirty_word() {
        let mut system = System::make();
        let address = addr(2);
        system.entry_mut(address).make_dirty(0);
        assert!(system.verify_coherence().is_err());

        system.node_mut(0).cpu_mut(CpuId::Cpu1).cache.fill(address, 100);
        assert!(system.verify_coherence().is_ok());
    }
}
