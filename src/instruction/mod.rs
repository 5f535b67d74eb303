//! Instruction representation

use crate::memory::AccessType;

pub mod decode_helper;

/// Opcode bits of a load word
pub const LOAD_OPCODE: u32 = 0b100011;

/// Decoded trace record
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instruction {
    pub node: usize,
    pub cpu: usize,
    pub opcode: Opcode,
    /// Base register bits, carried along but unused by the protocol
    pub rs: u8,
    /// Destination (load) or source (store) register code
    pub rt: u8,
    /// Word address
    pub offset: u32,
}

impl Instruction {
    /// Decode one fixed-width trace line
    pub fn decode(line: &str) -> Result<Self, String> {
        decode_helper::parse(line)
    }

    pub fn access_type(&self) -> AccessType {
        match self.opcode {
            Opcode::Load => AccessType::Read,
            Opcode::Store => AccessType::Write,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Opcode {
    Load,
    Store,
}

impl From<u32> for Opcode {
    /// Anything but a load is treated as a store
    fn from(bits: u32) -> Self {
        if bits == LOAD_OPCODE {
            Opcode::Load
        } else {
            Opcode::Store
        }
    }
}
