//! Write protocol: write-back on hit, no-write-allocate on miss

use log::debug;

use super::AccessOutcome;
use super::Request;
use crate::error::SimulatorResult;
use crate::memory::directory::DirectoryState;
use crate::system::System;

/// Store register `rt` of processor `cpu_id` on node `node_id` to `address`.
///
/// Every other cached copy is invalidated first. A hit leaves the
/// requester owning the only (dirty) copy; a miss updates home memory
/// and leaves the word cached nowhere.
pub fn write(
    system: &mut System,
    node_id: usize,
    cpu_id: usize,
    rt: u8,
    address: u32,
) -> SimulatorResult<AccessOutcome> {
    let Request { node, cpu, register, address } =
        Request::resolve(node_id, cpu_id, rt, address)?;
    let value = system.node(node).cpu(cpu).register(register).read();
    let hit = system.node(node).cpu(cpu).cache.is_in_cache(address);

    // On a hit this drops the requester's own line too
    if system.entry(address).state != DirectoryState::Uncached {
        system.invalidate_sharers(address);
    }

    let outcome = if hit {
        system.entry_mut(address).make_dirty(node);
        // Same tag, nothing to evict
        let victim =
            system.node_mut(node).cpu_mut(cpu).cache.fill(address, value);
        debug_assert!(victim.is_none());
        AccessOutcome::WriteHit
    } else {
        // Memory is now the only copy
        system.entry_mut(address).state = DirectoryState::Shared;
        system.set_word(address, value);
        AccessOutcome::WriteMiss
    };

    debug!(
        "node {} {:?} wrote {:?} ({}) to {}: {}",
        node,
        cpu,
        register,
        value,
        address.raw(),
        outcome
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coherence::read;
    use crate::cpu::CpuId;
    use crate::cpu::S1_CODE;
    use crate::cpu::S2_CODE;
    use crate::memory::directory::PresenceSet;
    use crate::memory::Address;

    fn addr(raw: u32) -> Address {
        Address::new(raw).unwrap()
    }

    #[test]
    fn test_write_miss() {
        let mut system = System::make();
        system.node_mut(2).cpu_mut(CpuId::Cpu1).s1.write(808);

        let outcome = write(&mut system, 2, 1, S1_CODE, 61).unwrap();
        assert_eq!(outcome, AccessOutcome::WriteMiss);
        assert_eq!(outcome.cost(), 100);

        assert_eq!(system.word(addr(61)), 808);
        assert!(!system.node(2).holds(addr(61)));
        let entry = system.entry(addr(61));
        assert_eq!(entry.state, DirectoryState::Shared);
        assert!(entry.presence.is_empty());
        assert!(system.verify_coherence().is_ok());
    }

    #[test]
    fn test_write_hit() {
        let mut system = System::make();
        read(&mut system, 1, 0, S2_CODE, 30).unwrap();
        system.node_mut(1).cpu_mut(CpuId::Cpu0).s1.write(9);

        let outcome = write(&mut system, 1, 0, S1_CODE, 30).unwrap();
        assert_eq!(outcome, AccessOutcome::WriteHit);
        assert_eq!(outcome.cost(), 1);

        assert_eq!(
            system.node(1).cpu(CpuId::Cpu0).cache.lookup(addr(30)),
            Some(9)
        );
        // Write-back: memory keeps the old value
        assert_eq!(system.word(addr(30)), 35);
        let entry = system.entry(addr(30));
        assert_eq!(entry.state, DirectoryState::Dirty);
        assert_eq!(entry.presence, PresenceSet::only(1));
        assert!(system.verify_coherence().is_ok());
    }

    #[test]
    fn test_write_hit_invalidates_sharers() {
        let mut system = System::make();
        for node in [0, 2, 3] {
            read(&mut system, node, 1, S1_CODE, 12).unwrap();
        }
        read(&mut system, 3, 0, S1_CODE, 12).unwrap();
        read(&mut system, 1, 0, S1_CODE, 12).unwrap();

        let outcome = write(&mut system, 1, 0, S2_CODE, 12).unwrap();
        assert_eq!(outcome, AccessOutcome::WriteHit);

        for node in [0, 2, 3] {
            assert!(!system.node(node).holds(addr(12)));
        }
        let entry = system.entry(addr(12));
        assert_eq!(entry.state, DirectoryState::Dirty);
        assert_eq!(entry.presence, PresenceSet::only(1));
        assert!(system.verify_coherence().is_ok());
    }

    #[test]
    fn test_write_hit_invalidates_sibling_copy() {
        let mut system = System::make();
        read(&mut system, 0, 0, S1_CODE, 44).unwrap();
        write(&mut system, 0, 0, S1_CODE, 44).unwrap();
        // Sibling picks up the dirty word
        read(&mut system, 0, 1, S1_CODE, 44).unwrap();

        system.node_mut(0).cpu_mut(CpuId::Cpu0).s2.write(3);
        write(&mut system, 0, 0, S2_CODE, 44).unwrap();

        assert!(!system.node(0).cpu(CpuId::Cpu1).cache.is_in_cache(addr(44)));
        assert!(system.verify_coherence().is_ok());
        let outcome = read(&mut system, 0, 1, S1_CODE, 44).unwrap();
        assert_eq!(outcome, AccessOutcome::SiblingHit);
        assert_eq!(system.node(0).cpu(CpuId::Cpu1).s1.read(), 3);
    }

    #[test]
    fn test_write_miss_discards_dirty_owner() {
        let mut system = System::make();
        read(&mut system, 3, 0, S1_CODE, 8).unwrap();
        write(&mut system, 3, 0, S1_CODE, 8).unwrap();
        system.node_mut(1).cpu_mut(CpuId::Cpu1).s2.write(500);

        let outcome = write(&mut system, 1, 1, S2_CODE, 8).unwrap();
        assert_eq!(outcome, AccessOutcome::WriteMiss);
        assert!(!system.node(3).holds(addr(8)));
        assert_eq!(system.word(addr(8)), 500);
        assert_eq!(system.entry(addr(8)).state, DirectoryState::Shared);
        assert!(system.verify_coherence().is_ok());
    }

    #[test]
    fn test_write_miss_does_not_allocate() {
        let mut system = System::make();
        write(&mut system, 0, 0, S1_CODE, 2).unwrap();
        let outcome = read(&mut system, 0, 0, S1_CODE, 2).unwrap();
        assert_eq!(outcome, AccessOutcome::CleanFetch);
    }

    #[test]
    fn test_rejected_write_changes_nothing() {
        let mut system = System::make();
        system.node_mut(0).cpu_mut(CpuId::Cpu0).s1.write(1);
        let err = write(&mut system, 0, 0, 0b11111, 2).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(system.word(addr(2)), 7);
        assert_eq!(system.entry(addr(2)).state, DirectoryState::Uncached);
    }
}
