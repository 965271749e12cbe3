//! Decoded field-script instructions.

use std::fmt;

use serde::Serialize;

use crate::battle::Battle;
use crate::opcode::Opcode;

/// An immutable instruction produced by the decoder.
///
/// Instructions own their operands; nothing points back into the stack they
/// were decoded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    Nop,
    Battle(Battle),
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Nop => Opcode::NOP,
            Instruction::Battle(_) => Battle::OPCODE,
        }
    }
}

impl From<Battle> for Instruction {
    fn from(b: Battle) -> Self {
        Instruction::Battle(b)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Nop => f.write_str("NOP"),
            Instruction::Battle(b) => write!(f, "{}", b),
        }
    }
}
