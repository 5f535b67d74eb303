//! A node: two processors and the memory bank it is home for

use crate::cpu::CpuId;
use crate::cpu::ProcessorUnit;
use crate::memory::bank::MemoryBank;
use crate::memory::Address;

pub struct Node {
    id: usize,
    pub cpus: [ProcessorUnit; 2],
    pub memory: MemoryBank,
}

impl Node {
    pub fn make(id: usize) -> Self {
        Self {
            id,
            cpus: [ProcessorUnit::make(), ProcessorUnit::make()],
            memory: MemoryBank::make(id),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn cpu(&self, cpu: CpuId) -> &ProcessorUnit {
        &self.cpus[cpu.index()]
    }

    pub fn cpu_mut(&mut self, cpu: CpuId) -> &mut ProcessorUnit {
        &mut self.cpus[cpu.index()]
    }

    /// The first valid copy of the address held by either processor
    pub fn find_copy(&self, address: Address) -> Option<u32> {
        self.cpus.iter().find_map(|cpu| cpu.cache.lookup(address))
    }

    pub fn holds(&self, address: Address) -> bool {
        self.find_copy(address).is_some()
    }

    /// Drop this node's copies of the address.
    /// Returns how many lines were invalidated
    pub fn invalidate(&mut self, address: Address) -> usize {
        self.cpus
            .iter_mut()
            .map(|cpu| cpu.cache.invalidate(address))
            .filter(|&dropped| dropped)
            .count()
    }
}
