pub mod coherence;
pub mod cpu;
pub mod display;
pub mod instruction;
pub mod loader;
pub mod memory;
pub mod node;
pub mod policy;
pub mod run_wrapper;
pub mod system;

pub mod error;
