//! Read protocol

use log::debug;

use super::fill;
use super::AccessOutcome;
use super::Request;
use crate::error::SimulatorResult;
use crate::memory::directory::DirectoryState;
use crate::memory::directory::PresenceSet;
use crate::system::inconsistency;
use crate::system::System;

/// Load `address` into register `rt` of processor `cpu_id` on node `node_id`.
///
/// Tried in order: the requester's own cache, the other processor of
/// the same node, then the home directory. A dirty word is fetched from
/// its owner's cache and written back to home memory.
pub fn read(
    system: &mut System,
    node_id: usize,
    cpu_id: usize,
    rt: u8,
    address: u32,
) -> SimulatorResult<AccessOutcome> {
    let Request { node, cpu, register, address } =
        Request::resolve(node_id, cpu_id, rt, address)?;

    let (data, outcome) = if let Some(data) =
        system.node(node).cpu(cpu).cache.lookup(address)
    {
        (data, AccessOutcome::LocalHit)
    } else if let Some(data) =
        system.node(node).cpu(cpu.sibling()).cache.lookup(address)
    {
        fill(system, node, cpu, address, data);
        (data, AccessOutcome::SiblingHit)
    } else {
        let entry = *system.entry(address);
        match entry.state {
            DirectoryState::Uncached | DirectoryState::Shared => {
                let data = system.word(address);
                system.entry_mut(address).share(node);
                fill(system, node, cpu, address, data);
                (data, AccessOutcome::CleanFetch)
            }
            DirectoryState::Dirty => {
                let owner = entry.presence.owner().ok_or_else(|| {
                    inconsistency(
                        address.raw(),
                        format!("dirty with presence {}", entry.presence),
                    )
                })?;
                let data =
                    system.node(owner).find_copy(address).ok_or_else(|| {
                        inconsistency(
                            address.raw(),
                            format!("owner node {} holds no valid copy", owner),
                        )
                    })?;

                system.set_word(address, data);
                let entry = system.entry_mut(address);
                entry.state = DirectoryState::Shared;
                entry.presence = PresenceSet::only(owner);
                entry.presence.insert(node);
                fill(system, node, cpu, address, data);
                debug!(
                    "dirty {} fetched from node {}, wrote back {}",
                    address.raw(),
                    owner,
                    data
                );
                (data, AccessOutcome::DirtyFetch)
            }
        }
    };

    system.node_mut(node).cpu_mut(cpu).register_mut(register).write(data);
    debug!(
        "node {} {:?} read {} -> {:?}: {} ({})",
        node,
        cpu,
        address.raw(),
        register,
        outcome,
        data
    );
    Ok(outcome)
}
