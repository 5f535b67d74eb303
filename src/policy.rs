//! Run-time switches of the simulator

/// Simulation policy
#[derive(Clone, Copy, Debug, Default)]
pub struct SimPolicy {
    /// Dump every node after each instruction
    pub verbose: bool,
    /// Print cost totals and outcome counts after the run
    pub history: bool,
    /// Wait for Enter after each instruction
    pub step: bool,
    /// Verify the directories after every instruction,
    /// not only at the end of the run
    pub check: bool,
}
