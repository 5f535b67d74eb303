//! Utility functions for reading a trace before replay

use std::path::Path;

use log::info;

use crate::error::SimulatorResult;
use crate::error::TraceError;
use crate::instruction::Instruction;

/// An instruction with its 1-based line number in the trace
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceEntry {
    pub line: usize,
    pub instruction: Instruction,
}

/// Decode the text of a trace. Empty lines are skipped;
/// the first malformed line fails the whole trace
pub fn parse_trace(
    content: &str,
    trace_path: &Path,
) -> SimulatorResult<Vec<TraceEntry>> {
    let mut entries = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }

        let instruction = Instruction::decode(line).map_err(|reason| {
            TraceError::ParseError(trace_path.into(), line_num + 1, reason)
        })?;
        entries.push(TraceEntry { line: line_num + 1, instruction });
    }

    Ok(entries)
}

/// Read and decode a trace file
pub fn load_trace(trace_path: &Path) -> SimulatorResult<Vec<TraceEntry>> {
    let content = std::fs::read_to_string(trace_path)
        .map_err(|e| TraceError::FileReadError(trace_path.into(), e))?;
    let entries = parse_trace(&content, trace_path)?;
    info!(
        "loaded {} instructions from {}",
        entries.len(),
        trace_path.display()
    );
    Ok(entries)
}
