use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Rejected request: {0}")]
    RequestError(#[from] RequestError),

    #[error("Coherence failure: {0}")]
    CoherenceError(#[from] CoherenceError),

    #[error("Failed to load trace: {0}")]
    TraceError(#[from] TraceError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to write report: {0}")]
    ReportError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl SimulatorError {
    /// Whether replay may continue with the next instruction
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SimulatorError::RequestError(_))
    }
}

/// Malformed requests handed to the coherence engine.
/// None of these change machine state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    #[error("Invalid destination register code: {0:05b}")]
    InvalidDestinationRegister(u8),

    #[error("Invalid processor selector: {0}")]
    InvalidProcessorSelector(usize),

    #[error("Invalid node selector: {0}")]
    InvalidNodeSelector(usize),

    #[error("Word address out of range: {0}")]
    AddressOutOfRange(u32),
}

/// Broken protocol invariants
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoherenceError {
    #[error("Directory inconsistency at address {address}: {detail}")]
    DirectoryInconsistency { address: u32, detail: String },
}

/// Errors related to reading and decoding trace files
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Failed to read trace file '{0}': {1}")]
    FileReadError(PathBuf, #[source] std::io::Error),

    #[error("Malformed line {1} in '{0}': {2}")]
    ParseError(PathBuf, usize, String),
}

/// Type alias for Result with SimulatorError
pub type SimulatorResult<T> = Result<T, SimulatorError>;
