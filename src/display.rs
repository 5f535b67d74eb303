//! State dumps in the style of a register/cache/memory listing.
//! Words are printed as 32-bit binary, tags as 4-bit binary.

use std::fmt;

use crate::cpu::CpuId;
use crate::memory::directory::DirectoryState;
use crate::memory::WORDS_PER_NODE;
use crate::node::Node;
use crate::system::System;

fn state_code(state: DirectoryState) -> char {
    match state {
        DirectoryState::Uncached => 'U',
        DirectoryState::Shared => 'S',
        DirectoryState::Dirty => 'D',
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Node{}", self.id())?;
        writeln!(f, "-------------------------------------------")?;
        for cpu in [CpuId::Cpu0, CpuId::Cpu1] {
            let unit = self.cpu(cpu);
            writeln!(f, "***CPU{}***", cpu.index())?;
            writeln!(f, "S1:       {:032b}", unit.s1.read())?;
            writeln!(f, "S2:       {:032b}", unit.s2.read())?;
            writeln!(f, "Cache-{}", cpu.index())?;
            for (i, line) in unit.cache.lines.iter().enumerate() {
                writeln!(
                    f,
                    "{}: {} {:04b} {:032b}",
                    i, line.valid as u8, line.tag, line.data
                )?;
            }
        }
        writeln!(f, "***Memory***")?;
        for (slot, line) in self.memory.lines().iter().enumerate() {
            writeln!(
                f,
                "{}: {:032b} {} {}",
                self.id() * WORDS_PER_NODE + slot,
                line.data,
                state_code(line.entry.state),
                line.entry.presence
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for node in self.nodes() {
            writeln!(f, "{}", node)?;
        }
        Ok(())
    }
}
