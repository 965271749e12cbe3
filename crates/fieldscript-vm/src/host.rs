//! Host boundary: directives the runner signals to game systems.

use std::fmt;

use thiserror::Error;

use fieldscript_bytecode::BattleFlags;

/// Effect an instruction asks the host simulation to carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Begin battle `encounter`, honoring `flags`.
    Battle { encounter: u16, flags: BattleFlags },
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Battle { encounter, flags } => write!(f, "battle {} [{}]", encounter, flags),
        }
    }
}

/// A host system refused or failed a directive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(msg: impl Into<String>) -> Self {
        HostError(msg.into())
    }
}

/// Game-state collaborators reachable from a running script.
pub trait Host {
    fn signal(&mut self, directive: Directive) -> Result<(), HostError>;
}

/// Host that records every directive in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingHost {
    pub directives: Vec<Directive>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Host for RecordingHost {
    fn signal(&mut self, directive: Directive) -> Result<(), HostError> {
        self.directives.push(directive);
        Ok(())
    }
}
