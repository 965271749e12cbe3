//! Tokens handed to the decoder by an upstream tokenizer.

use std::fmt;

use fieldscript_bytecode::{CalcOp, Opcode, VariableRef};

/// One step of a tokenized script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Push a constant operand.
    PushConst(i32),
    /// Push a memory variable operand.
    PushVar(VariableRef),
    /// Replace the top operand(s) with a computed expression.
    Calc(CalcOp),
    /// Decode one instruction.
    Op { opcode: Opcode, parameter: i32 },
}

impl Token {
    pub fn op(opcode: Opcode) -> Self {
        Token::Op { opcode, parameter: 0 }
    }
}

/// Renders the token the way it is written in a listing.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::PushConst(n) => write!(f, "PSHN_L {}", n),
            Token::PushVar(var) => write_opcode(f, var.kind.push_opcode(), format_args!("0x{:04x}", var.address)),
            Token::Calc(op) => write!(f, "CAL {}", op.mnemonic()),
            Token::Op { opcode, parameter } => write_opcode(f, *opcode, format_args!("{}", parameter)),
        }
    }
}

fn write_opcode(f: &mut fmt::Formatter<'_>, opcode: Opcode, arg: fmt::Arguments<'_>) -> fmt::Result {
    match opcode.name() {
        Some(name) => write!(f, "{} {}", name, arg),
        None => write!(f, "0x{:03x} {}", opcode.0, arg),
    }
}
