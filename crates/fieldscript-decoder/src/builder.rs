//! Encoder producing token sequences from typed instructions.

use fieldscript_bytecode::{Battle, BattleFlags, CalcOp, Instruction, Opcode, VariableRef};

use crate::token::Token;

/// Fluent builder for tokenized scripts.
///
/// Operands are emitted in declaration order, the way script bytecode lays
/// them out, so the output decodes back to the same instructions.
#[derive(Debug, Default, Clone)]
pub struct ScriptBuilder {
    tokens: Vec<Token>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    pub fn push_const(mut self, value: i32) -> Self {
        self.tokens.push(Token::PushConst(value));
        self
    }

    pub fn push_var(mut self, var: VariableRef) -> Self {
        self.tokens.push(Token::PushVar(var));
        self
    }

    pub fn calc(mut self, op: CalcOp) -> Self {
        self.tokens.push(Token::Calc(op));
        self
    }

    pub fn op(mut self, opcode: Opcode, parameter: i32) -> Self {
        self.tokens.push(Token::Op { opcode, parameter });
        self
    }

    pub fn nop(self) -> Self {
        self.op(Opcode::NOP, 0)
    }

    pub fn battle(self, encounter: u16, flags: BattleFlags) -> Self {
        self.instruction(&Instruction::Battle(Battle::new(encounter, flags)))
    }

    pub fn instruction(self, instr: &Instruction) -> Self {
        match instr {
            Instruction::Nop => self.nop(),
            Instruction::Battle(b) => self
                .push_const(i32::from(b.encounter()))
                .push_const(i32::from(b.flags().bits()))
                .op(Battle::OPCODE, 0),
        }
    }

    pub fn finish(self) -> Vec<Token> {
        self.tokens
    }
}
