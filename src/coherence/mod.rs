//! Directory-based write-invalidate coherence protocol.
//!
//! Both entry points take the whole machine by `&mut System`, apply one
//! reference completely and return what kind of access it was.
//! The access cost is `AccessOutcome::cost`; callers fold the costs.

pub mod read;
pub mod write;

pub use read::read;
pub use write::write;

use std::fmt;

use log::debug;
use log::trace;

use crate::cpu::CpuId;
use crate::cpu::RegisterId;
use crate::error::RequestError;
use crate::memory::cache::Victim;
use crate::memory::directory::DirectoryState;
use crate::memory::Address;
use crate::system::System;

pub const LOCAL_HIT_COST: u32 = 1;
pub const SIBLING_HIT_COST: u32 = 30;
pub const CLEAN_FETCH_COST: u32 = 100;
pub const DIRTY_FETCH_COST: u32 = 135;
pub const WRITE_HIT_COST: u32 = 1;
pub const WRITE_MISS_COST: u32 = 100;

/// How a reference was satisfied
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessOutcome {
    /// Read from the requester's own cache
    LocalHit,
    /// Read from the other processor of the same node
    SiblingHit,
    /// Read from home memory
    CleanFetch,
    /// Read from the owner's cache, with write-back to home memory
    DirtyFetch,
    /// Write into the requester's own cache
    WriteHit,
    /// Write straight to home memory
    WriteMiss,
}

impl AccessOutcome {
    pub const ALL: [AccessOutcome; 6] = [
        AccessOutcome::LocalHit,
        AccessOutcome::SiblingHit,
        AccessOutcome::CleanFetch,
        AccessOutcome::DirtyFetch,
        AccessOutcome::WriteHit,
        AccessOutcome::WriteMiss,
    ];

    pub fn cost(self) -> u32 {
        match self {
            AccessOutcome::LocalHit => LOCAL_HIT_COST,
            AccessOutcome::SiblingHit => SIBLING_HIT_COST,
            AccessOutcome::CleanFetch => CLEAN_FETCH_COST,
            AccessOutcome::DirtyFetch => DIRTY_FETCH_COST,
            AccessOutcome::WriteHit => WRITE_HIT_COST,
            AccessOutcome::WriteMiss => WRITE_MISS_COST,
        }
    }
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            AccessOutcome::LocalHit => "local hit",
            AccessOutcome::SiblingHit => "sibling hit",
            AccessOutcome::CleanFetch => "clean fetch",
            AccessOutcome::DirtyFetch => "dirty fetch",
            AccessOutcome::WriteHit => "write hit",
            AccessOutcome::WriteMiss => "write miss",
        };
        f.write_str(name)
    }
}

/// A request whose selectors have all been checked
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Request {
    pub node: usize,
    pub cpu: CpuId,
    pub register: RegisterId,
    pub address: Address,
}

impl Request {
    pub fn resolve(
        node_id: usize,
        cpu_id: usize,
        rt: u8,
        address: u32,
    ) -> Result<Self, RequestError> {
        Ok(Self {
            node: System::node_id(node_id)?,
            cpu: CpuId::try_from(cpu_id)?,
            register: RegisterId::try_from(rt)?,
            address: Address::new(address)?,
        })
    }
}

/// Install a word in the requester's cache.
/// A valid line of another address pushed out by the fill
/// is reported to its home directory
pub(crate) fn fill(
    system: &mut System,
    node: usize,
    cpu: CpuId,
    address: Address,
    data: u32,
) {
    let victim = system.node_mut(node).cpu_mut(cpu).cache.fill(address, data);
    trace!(
        "node {} {:?} line {} <- {} ({})",
        node,
        cpu,
        address.line(),
        address.raw(),
        data
    );
    if let Some(victim) = victim {
        release(system, node, victim);
    }
}

/// Tell the victim's home that this node dropped its copy,
/// unless the other processor still holds one
fn release(system: &mut System, node: usize, victim: Victim) {
    let address = victim.address;
    if system.node(node).holds(address) {
        return;
    }
    let entry = *system.entry(address);
    if !entry.presence.contains(node) {
        return;
    }
    if entry.state == DirectoryState::Dirty {
        system.set_word(address, victim.data);
        debug!(
            "node {} evicted dirty {}, wrote back {}",
            node,
            address.raw(),
            victim.data
        );
    } else {
        trace!("node {} evicted shared {}", node, address.raw());
    }
    system.entry_mut(address).release(node);
}
