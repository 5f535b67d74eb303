//! A simulator wrapper: replays a trace and folds the access costs

use std::collections::HashMap;
use std::path::Path;

use log::error;
use log::warn;
use text_io::try_read;

use crate::coherence;
use crate::coherence::AccessOutcome;
use crate::error::SimulatorResult;
use crate::instruction::Instruction;
use crate::loader;
use crate::loader::TraceEntry;
use crate::memory::AccessType;
use crate::policy::SimPolicy;
use crate::system::System;

/// Outcome counts of a run
#[derive(Clone, Debug, Default)]
pub struct AccessHistory {
    counts: HashMap<AccessOutcome, u32>,
}

impl AccessHistory {
    pub fn record(&mut self, outcome: AccessOutcome) {
        *self.counts.entry(outcome).or_insert(0) += 1;
    }

    pub fn count(&self, outcome: AccessOutcome) -> u32 {
        self.counts.get(&outcome).copied().unwrap_or(0)
    }
}

/// What happened to one trace instruction
#[derive(Clone, Copy, Debug)]
pub struct StepRecord {
    pub entry: TraceEntry,
    /// None if the instruction was rejected and skipped
    pub outcome: Option<AccessOutcome>,
}

impl StepRecord {
    pub fn cost(&self) -> u32 {
        self.outcome.map_or(0, AccessOutcome::cost)
    }
}

#[derive(Clone, Debug, Default)]
pub struct RunStats {
    pub records: Vec<StepRecord>,
    pub history: AccessHistory,
    pub total_cost: u64,
    pub accesses: u32,
    pub skipped: u32,
}

impl RunStats {
    /// Average cost over the accesses that were applied
    pub fn average_cost(&self) -> f64 {
        if self.accesses == 0 {
            0.
        } else {
            self.total_cost as f64 / self.accesses as f64
        }
    }

    fn push(&mut self, record: StepRecord) {
        match record.outcome {
            Some(outcome) => {
                self.accesses += 1;
                self.total_cost += outcome.cost() as u64;
                self.history.record(outcome);
            }
            None => self.skipped += 1,
        }
        self.records.push(record);
    }
}

/// Hand one decoded instruction to the coherence engine
pub fn dispatch(
    system: &mut System,
    instruction: &Instruction,
) -> SimulatorResult<AccessOutcome> {
    let Instruction { node, cpu, rt, offset, .. } = *instruction;
    match instruction.access_type() {
        AccessType::Read => coherence::read(system, node, cpu, rt, offset),
        AccessType::Write => coherence::write(system, node, cpu, rt, offset),
    }
}

/// Replay decoded instructions on the given machine.
/// Rejected instructions are skipped; a broken directory ends the run
pub fn run_entries(
    system: &mut System,
    entries: &[TraceEntry],
    policy: SimPolicy,
) -> SimulatorResult<RunStats> {
    let mut stats = RunStats::default();
    let mut step = policy.step;

    for entry in entries {
        let outcome = match dispatch(system, &entry.instruction) {
            Ok(outcome) => Some(outcome),
            Err(e) if e.is_recoverable() => {
                warn!("line {}: skipped: {}", entry.line, e);
                None
            }
            Err(e) => {
                error!("line {}: {}", entry.line, e);
                return Err(e);
            }
        };
        stats.push(StepRecord { entry: *entry, outcome });

        if policy.check {
            system.verify_coherence().map_err(|e| {
                error!("line {}: {}", entry.line, e);
                e
            })?;
        }

        if policy.verbose {
            println!(
                "line {}: {:?} -> {}",
                entry.line,
                entry.instruction,
                outcome.map_or("skipped".to_string(), |o| {
                    format!("{} (cost {})", o, o.cost())
                })
            );
            print!("{}", system);
        }

        if step {
            let pause: Result<String, _> = try_read!("{}\n");
            // Nothing left to wait on
            if pause.is_err() {
                step = false;
            }
        }
    }

    system.verify_coherence()?;
    Ok(stats)
}

/// Run simulation on the given trace file
pub fn run(trace_path: &Path, policy: SimPolicy) -> SimulatorResult<RunStats> {
    let entries = loader::load_trace(trace_path)?;
    let mut system = System::make();
    let stats = run_entries(&mut system, &entries, policy)?;

    if policy.history {
        println!("[HISTORY] # instructions = {}", stats.records.len());
        println!("[HISTORY] # skipped = {}", stats.skipped);
        println!(
            "[HISTORY] Total access cost = {}, Average access cost = {:.2}",
            stats.total_cost,
            stats.average_cost()
        );
        for outcome in AccessOutcome::ALL {
            println!(
                "[HISTORY] {} = {}",
                outcome,
                stats.history.count(outcome)
            );
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Opcode;
    use crate::cpu::S1_CODE;
    use crate::cpu::S2_CODE;

    fn entry(
        line: usize,
        node: usize,
        cpu: usize,
        opcode: Opcode,
        rt: u8,
        offset: u32,
    ) -> TraceEntry {
        TraceEntry {
            line,
            instruction: Instruction { node, cpu, opcode, rs: 0, rt, offset },
        }
    }

    #[test]
    fn test_costs_are_folded() {
        let entries = vec![
            entry(1, 0, 0, Opcode::Load, S1_CODE, 5),
            entry(2, 0, 0, Opcode::Load, S2_CODE, 5),
            entry(3, 0, 1, Opcode::Load, S1_CODE, 5),
            entry(4, 0, 1, Opcode::Store, S1_CODE, 5),
            entry(5, 2, 0, Opcode::Load, S1_CODE, 5),
            entry(6, 3, 1, Opcode::Store, S2_CODE, 40),
        ];
        let mut system = System::make();
        let stats =
            run_entries(&mut system, &entries, SimPolicy::default()).unwrap();

        let costs: Vec<u32> = stats.records.iter().map(|r| r.cost()).collect();
        assert_eq!(costs, vec![100, 1, 30, 1, 135, 100]);
        assert_eq!(stats.total_cost, 367);
        assert_eq!(stats.accesses, 6);
        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.history.count(AccessOutcome::CleanFetch), 1);
        assert_eq!(stats.history.count(AccessOutcome::WriteMiss), 1);
    }

    #[test]
    fn test_rejected_instructions_are_skipped() {
        let entries = vec![
            entry(1, 1, 0, Opcode::Load, 0b00001, 5),
            entry(2, 1, 0, Opcode::Load, S1_CODE, 5),
            entry(3, 1, 0, Opcode::Store, S1_CODE, 4000),
        ];
        let mut system = System::make();
        let stats =
            run_entries(&mut system, &entries, SimPolicy::default()).unwrap();

        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.accesses, 1);
        assert_eq!(stats.total_cost, 100);
        assert_eq!(stats.average_cost(), 100.);
        assert!(stats.records[0].outcome.is_none());
        assert_eq!(stats.records[0].cost(), 0);
    }

    #[test]
    fn test_inconsistency_stops_the_run() {
        let mut system = System::make();
        system.entry_mut(crate::memory::Address::new(5).unwrap()).make_dirty(3);
        let entries = vec![
            entry(1, 1, 0, Opcode::Load, S1_CODE, 5),
            entry(2, 1, 0, Opcode::Load, S1_CODE, 6),
        ];
        let err = run_entries(&mut system, &entries, SimPolicy::default())
            .unwrap_err();
        assert!(!err.is_recoverable());
        assert!(!system.node(1).holds(crate::memory::Address::new(6).unwrap()));
    }

    #[test]
    fn test_empty_run() {
        let mut system = System::make();
        let stats =
            run_entries(&mut system, &[], SimPolicy::default()).unwrap();
        assert_eq!(stats.average_cost(), 0.);
        assert!(stats.records.is_empty());
    }
}
