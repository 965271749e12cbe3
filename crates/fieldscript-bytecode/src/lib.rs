//! Bytecode model for field scripts.
//!
//! This crate defines the operand expression stack, opcode identifiers, the
//! immutable instruction values decoded from the stack, and the static table
//! dispatching each opcode to its decoder.

pub mod battle;
pub mod error;
pub mod expression;
pub mod flags;
pub mod instruction;
pub mod opcode;
pub mod stack;
pub mod table;

pub use battle::Battle;
pub use error::{DecodeError, Result};
pub use expression::{CalcOp, Computed, Expression, VariableKind, VariableRef};
pub use flags::BattleFlags;
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use stack::ExpressionStack;
pub use table::{DecodeFn, OpcodeEntry, OpcodeTable};
