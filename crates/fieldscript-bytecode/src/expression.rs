//! Operand expressions held on the expression stack.

use std::fmt;

use serde::Serialize;

use crate::opcode::Opcode;

/// Width and signedness of a script memory variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    Byte,
    Word,
    Long,
    SignedByte,
    SignedWord,
    SignedLong,
}

impl VariableKind {
    fn prefix(self) -> &'static str {
        match self {
            VariableKind::Byte => "var_b",
            VariableKind::Word => "var_w",
            VariableKind::Long => "var_l",
            VariableKind::SignedByte => "var_sb",
            VariableKind::SignedWord => "var_sw",
            VariableKind::SignedLong => "var_sl",
        }
    }

    /// The opcode that pushes a variable of this kind.
    pub fn push_opcode(self) -> Opcode {
        match self {
            VariableKind::Byte => Opcode::PSHM_B,
            VariableKind::Word => Opcode::PSHM_W,
            VariableKind::Long => Opcode::PSHM_L,
            VariableKind::SignedByte => Opcode::PSHSM_B,
            VariableKind::SignedWord => Opcode::PSHSM_W,
            VariableKind::SignedLong => Opcode::PSHSM_L,
        }
    }
}

/// Reference to a script memory variable, resolved only when the script runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VariableRef {
    pub kind: VariableKind,
    pub address: u16,
}

impl VariableRef {
    pub fn new(kind: VariableKind, address: u16) -> Self {
        Self { kind, address }
    }
}

impl fmt::Display for VariableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[0x{:04x}]", self.kind.prefix(), self.address)
    }
}

/// Operation selected by the calculation opcode's parameter.
///
/// Discriminants match the parameter values in script bytecode.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalcOp {
    Add = 0,
    Sub = 1,
    Mul = 2,
    Div = 3,
    Mod = 4,
    Neg = 5,
    Eq = 6,
    Gt = 7,
    Ge = 8,
    Lt = 9,
    Le = 10,
    Ne = 11,
    And = 12,
    Or = 13,
    Xor = 14,
    Not = 15,
}

impl CalcOp {
    const ALL: [CalcOp; 16] = [
        CalcOp::Add,
        CalcOp::Sub,
        CalcOp::Mul,
        CalcOp::Div,
        CalcOp::Mod,
        CalcOp::Neg,
        CalcOp::Eq,
        CalcOp::Gt,
        CalcOp::Ge,
        CalcOp::Lt,
        CalcOp::Le,
        CalcOp::Ne,
        CalcOp::And,
        CalcOp::Or,
        CalcOp::Xor,
        CalcOp::Not,
    ];

    pub fn from_parameter(parameter: i32) -> Option<CalcOp> {
        usize::try_from(parameter).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn from_mnemonic(name: &str) -> Option<CalcOp> {
        Self::ALL.iter().copied().find(|op| op.mnemonic().eq_ignore_ascii_case(name))
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            CalcOp::Add => "ADD",
            CalcOp::Sub => "SUB",
            CalcOp::Mul => "MUL",
            CalcOp::Div => "DIV",
            CalcOp::Mod => "MOD",
            CalcOp::Neg => "NEG",
            CalcOp::Eq => "EQ",
            CalcOp::Gt => "GT",
            CalcOp::Ge => "GE",
            CalcOp::Lt => "LT",
            CalcOp::Le => "LE",
            CalcOp::Ne => "NE",
            CalcOp::And => "AND",
            CalcOp::Or => "OR",
            CalcOp::Xor => "XOR",
            CalcOp::Not => "NOT",
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, CalcOp::Neg | CalcOp::Not)
    }

    fn symbol(self) -> &'static str {
        match self {
            CalcOp::Add => "+",
            CalcOp::Sub | CalcOp::Neg => "-",
            CalcOp::Mul => "*",
            CalcOp::Div => "/",
            CalcOp::Mod => "%",
            CalcOp::Eq => "==",
            CalcOp::Gt => ">",
            CalcOp::Ge => ">=",
            CalcOp::Lt => "<",
            CalcOp::Le => "<=",
            CalcOp::Ne => "!=",
            CalcOp::And => "&",
            CalcOp::Or => "|",
            CalcOp::Xor => "^",
            CalcOp::Not => "!",
        }
    }
}

/// Result of a calculation over other expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Computed {
    pub op: CalcOp,
    pub lhs: Expression,
    /// `None` for unary operations.
    pub rhs: Option<Expression>,
}

/// An operand on the expression stack.
///
/// Only [`Expression::Const`] resolves to a value at decode time. A computed
/// expression stays non-constant even when both children are constants: the
/// decoder never folds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Expression {
    Const(i32),
    Variable(VariableRef),
    Computed(Box<Computed>),
}

impl Expression {
    pub fn unary(op: CalcOp, operand: Expression) -> Self {
        Expression::Computed(Box::new(Computed { op, lhs: operand, rhs: None }))
    }

    pub fn binary(op: CalcOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::Computed(Box::new(Computed { op, lhs, rhs: Some(rhs) }))
    }

    /// The constant value, if this operand is resolvable at decode time.
    pub fn as_const(&self) -> Option<i32> {
        match self {
            Expression::Const(n) => Some(*n),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Expression::Const(_) => "constant",
            Expression::Variable(_) => "variable",
            Expression::Computed(_) => "computed",
        }
    }
}

impl From<i32> for Expression {
    fn from(n: i32) -> Self {
        Expression::Const(n)
    }
}

impl From<VariableRef> for Expression {
    fn from(var: VariableRef) -> Self {
        Expression::Variable(var)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Const(n) => write!(f, "{}", n),
            Expression::Variable(var) => write!(f, "{}", var),
            Expression::Computed(c) => match &c.rhs {
                Some(rhs) => write!(f, "({} {} {})", c.lhs, c.op.symbol(), rhs),
                None => write!(f, "{}{}", c.op.symbol(), c.lhs),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_const_resolves() {
        assert_eq!(Expression::Const(-4).as_const(), Some(-4));
        let var = Expression::from(VariableRef::new(VariableKind::Word, 0x12));
        assert_eq!(var.as_const(), None);
        let sum = Expression::binary(CalcOp::Add, Expression::Const(1), Expression::Const(2));
        assert_eq!(sum.as_const(), None);
        assert_eq!(sum.kind(), "computed");
    }

    #[test]
    fn test_display() {
        let var = Expression::from(VariableRef::new(VariableKind::Byte, 4));
        assert_eq!(var.to_string(), "var_b[0x0004]");
        let sum = Expression::binary(CalcOp::Add, var.clone(), Expression::Const(3));
        assert_eq!(sum.to_string(), "(var_b[0x0004] + 3)");
        assert_eq!(Expression::unary(CalcOp::Neg, Expression::Const(3)).to_string(), "-3");
    }

    #[test]
    fn test_calc_op_parameters() {
        assert_eq!(CalcOp::from_parameter(0), Some(CalcOp::Add));
        assert_eq!(CalcOp::from_parameter(15), Some(CalcOp::Not));
        assert_eq!(CalcOp::from_parameter(16), None);
        assert_eq!(CalcOp::from_parameter(-1), None);
        assert_eq!(CalcOp::from_mnemonic("xor"), Some(CalcOp::Xor));
        for (i, op) in CalcOp::ALL.iter().enumerate() {
            assert_eq!(*op as usize, i);
        }
    }
}
