//! Script runner core.

use thiserror::Error;
use tracing::{debug, instrument};

use fieldscript_bytecode::Instruction;

use crate::host::{Directive, Host, HostError};

/// A run stopped because the host rejected a directive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("instruction {index} ({instruction}): {source}")]
pub struct RunError {
    pub index: usize,
    pub instruction: Instruction,
    pub source: HostError,
}

/// What a completed run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub executed: usize,
    pub directives: usize,
}

/// Stateless; every `run` starts from an empty summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct Runner;

impl Runner {
    pub fn new() -> Self {
        Runner
    }

    /// Executes `instructions` in order against `host`.
    #[instrument(skip_all, fields(count = instructions.len()))]
    pub fn run(&self, instructions: &[Instruction], host: &mut dyn Host) -> Result<RunSummary, RunError> {
        let mut summary = RunSummary::default();
        for (index, instr) in instructions.iter().enumerate() {
            if let Some(directive) = directive_of(instr) {
                debug!(index, %directive, "signal");
                host.signal(directive).map_err(|source| RunError { index, instruction: instr.clone(), source })?;
                summary.directives += 1;
            }
            summary.executed += 1;
        }
        Ok(summary)
    }
}

fn directive_of(instr: &Instruction) -> Option<Directive> {
    match instr {
        Instruction::Nop => None,
        Instruction::Battle(b) => Some(Directive::Battle { encounter: b.encounter(), flags: b.flags() }),
    }
}
