//! Processor units: two registers and a private cache

use crate::error::RequestError;
use crate::memory::cache::Cache;

/// rt code selecting register S1
pub const S1_CODE: u8 = 0b10001;
/// rt code selecting register S2
pub const S2_CODE: u8 = 0b10010;

/// Register file simulation
#[derive(Clone, Copy, Debug, Default)]
pub struct Register {
    /// Current data in the register
    data: u32,
}

impl Register {
    pub fn new(data: u32) -> Self {
        Self { data }
    }

    /// Reads the register
    pub fn read(&self) -> u32 {
        self.data
    }

    /// Writes to register
    pub fn write(&mut self, value: u32) {
        self.data = value;
    }
}

/// Architectural register selector
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterId {
    S1,
    S2,
}

impl TryFrom<u8> for RegisterId {
    type Error = RequestError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            S1_CODE => Ok(RegisterId::S1),
            S2_CODE => Ok(RegisterId::S2),
            _ => Err(RequestError::InvalidDestinationRegister(code)),
        }
    }
}

/// Which of a node's two processors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CpuId {
    Cpu0,
    Cpu1,
}

impl CpuId {
    /// The other processor in the same node
    pub fn sibling(self) -> Self {
        match self {
            CpuId::Cpu0 => CpuId::Cpu1,
            CpuId::Cpu1 => CpuId::Cpu0,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for CpuId {
    type Error = RequestError;

    fn try_from(id: usize) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(CpuId::Cpu0),
            1 => Ok(CpuId::Cpu1),
            _ => Err(RequestError::InvalidProcessorSelector(id)),
        }
    }
}

/// Processor state
#[derive(Clone, Debug, Default)]
pub struct ProcessorUnit {
    pub s1: Register,
    pub s2: Register,
    pub cache: Cache,
}

impl ProcessorUnit {
    pub fn make() -> Self {
        Self::default()
    }

    pub fn register(&self, id: RegisterId) -> &Register {
        match id {
            RegisterId::S1 => &self.s1,
            RegisterId::S2 => &self.s2,
        }
    }

    pub fn register_mut(&mut self, id: RegisterId) -> &mut Register {
        match id {
            RegisterId::S1 => &mut self.s1,
            RegisterId::S2 => &mut self.s2,
        }
    }
}
