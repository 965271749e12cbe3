//! Opcode dispatch table.

use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::trace;

use crate::battle::Battle;
use crate::error::{DecodeError, Result};
use crate::instruction::Instruction;
use crate::opcode::Opcode;
use crate::stack::ExpressionStack;

/// Decoder signature shared by every opcode: auxiliary parameter plus stack.
pub type DecodeFn = fn(i32, &mut ExpressionStack) -> Result<Instruction>;

/// One row of the dispatch table.
#[derive(Clone, Copy)]
pub struct OpcodeEntry {
    pub opcode: Opcode,
    /// Operands the decoder pops.
    pub arity: usize,
    pub decode: DecodeFn,
}

impl std::fmt::Debug for OpcodeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpcodeEntry")
            .field("opcode", &self.opcode)
            .field("mnemonic", &self.opcode.name())
            .field("arity", &self.arity)
            .finish()
    }
}

fn decode_nop(_parameter: i32, _stack: &mut ExpressionStack) -> Result<Instruction> {
    Ok(Instruction::Nop)
}

fn decode_battle(parameter: i32, stack: &mut ExpressionStack) -> Result<Instruction> {
    Battle::decode(parameter, stack).map(Instruction::Battle)
}

const ENTRIES: &[OpcodeEntry] = &[
    OpcodeEntry { opcode: Opcode::NOP, arity: 0, decode: decode_nop },
    OpcodeEntry { opcode: Battle::OPCODE, arity: Battle::ARITY, decode: decode_battle },
];

static GLOBAL: LazyLock<OpcodeTable> = LazyLock::new(|| OpcodeTable::from_entries(ENTRIES));

/// Read-only map from opcode to decoder.
#[derive(Debug)]
pub struct OpcodeTable {
    entries: HashMap<Opcode, OpcodeEntry>,
}

impl OpcodeTable {
    /// The process-wide table, built on first use.
    pub fn global() -> &'static OpcodeTable {
        &GLOBAL
    }

    fn from_entries(entries: &[OpcodeEntry]) -> Self {
        Self { entries: entries.iter().map(|e| (e.opcode, *e)).collect() }
    }

    pub fn lookup(&self, opcode: Opcode) -> Option<&OpcodeEntry> {
        self.entries.get(&opcode)
    }

    pub fn contains(&self, opcode: Opcode) -> bool {
        self.entries.contains_key(&opcode)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decodes one instruction for `opcode`.
    ///
    /// Unknown opcodes and short stacks are rejected before anything is
    /// popped, so on those errors the stack is exactly as it was.
    pub fn decode(&self, opcode: Opcode, parameter: i32, stack: &mut ExpressionStack) -> Result<Instruction> {
        let entry = self.lookup(opcode).ok_or(DecodeError::UnknownOpcode { opcode })?;
        if stack.len() < entry.arity {
            return Err(DecodeError::StackUnderflow { opcode, needed: entry.arity, available: stack.len() });
        }
        trace!(%opcode, parameter, depth = stack.len(), "dispatch");
        (entry.decode)(parameter, stack)
    }
}
