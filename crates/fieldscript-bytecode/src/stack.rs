//! The expression stack operands are decoded from.

use crate::error::{DecodeError, Result};
use crate::expression::Expression;
use crate::opcode::Opcode;

/// LIFO stack of operand expressions.
///
/// Script bytecode pushes an instruction's operands in declaration order, so
/// decoders pop them in reverse. Each script owns its own stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionStack {
    items: Vec<Expression>,
}

impl ExpressionStack {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, expr: impl Into<Expression>) {
        self.items.push(expr.into());
    }

    /// Pops the top expression on behalf of `opcode`.
    pub fn pop(&mut self, opcode: Opcode) -> Result<Expression> {
        self.items.pop().ok_or(DecodeError::StackUnderflow { opcode, needed: 1, available: 0 })
    }

    /// Pops the top expression and requires it to be a constant.
    pub fn pop_const(&mut self, opcode: Opcode) -> Result<i32> {
        let expr = self.pop(opcode)?;
        expr.as_const().ok_or_else(|| DecodeError::InvalidOperand {
            opcode,
            found: expr.kind(),
            rendered: expr.to_string(),
        })
    }

    pub fn peek(&self) -> Option<&Expression> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
