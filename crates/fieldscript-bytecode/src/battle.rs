//! `BATTLE` (0x069): trigger a battle encounter.

use std::fmt;

use serde::Serialize;

use crate::error::{DecodeError, Result};
use crate::flags::BattleFlags;
use crate::opcode::Opcode;
use crate::stack::ExpressionStack;

/// Starts battle encounter `encounter`, honoring `flags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Battle {
    encounter: u16,
    flags: BattleFlags,
}

impl Battle {
    pub const OPCODE: Opcode = Opcode::BATTLE;
    pub const ARITY: usize = 2;

    pub fn new(encounter: u16, flags: BattleFlags) -> Self {
        Self { encounter, flags }
    }

    /// Decodes the instruction off `stack`.
    ///
    /// Operands are pushed encounter first, so flags come off the stack
    /// first. Both must be constants. The encounter keeps its low 16 bits and
    /// the flags their low 8; higher bits are dropped without error.
    /// `parameter` is unused.
    ///
    /// A stack shorter than [`Battle::ARITY`] is left as it was.
    pub fn decode(_parameter: i32, stack: &mut ExpressionStack) -> Result<Self> {
        if stack.len() < Self::ARITY {
            return Err(DecodeError::StackUnderflow {
                opcode: Self::OPCODE,
                needed: Self::ARITY,
                available: stack.len(),
            });
        }
        let flags = stack.pop_const(Self::OPCODE)? as u8;
        let encounter = stack.pop_const(Self::OPCODE)? as u16;
        Ok(Self::new(encounter, BattleFlags::from_bits(flags)))
    }

    pub fn encounter(&self) -> u16 {
        self.encounter
    }

    pub fn flags(&self) -> BattleFlags {
        self.flags
    }
}

impl fmt::Display for Battle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BATTLE(encounter: {}, flags: {})", self.encounter, self.flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{CalcOp, Expression, VariableKind, VariableRef};
    use test_case::test_case;

    fn stack_of(values: &[i32]) -> ExpressionStack {
        let mut stack = ExpressionStack::new();
        for v in values {
            stack.push(*v);
        }
        stack
    }

    #[test]
    fn test_decode_matches_direct_construction() {
        let mut stack = stack_of(&[42, 0x41]);
        let decoded = Battle::decode(0, &mut stack).unwrap();
        let direct = Battle::new(42, BattleFlags::NO_ESCAPE | BattleFlags::FORCE_BACK_ATTACK);
        assert_eq!(decoded, direct);
        assert_eq!(decoded.encounter(), 42);
        assert!(stack.is_empty());
    }

    #[test_case(&[] ; "empty stack")]
    #[test_case(&[0x41] ; "flags only")]
    fn test_short_stack_underflows_without_popping(values: &[i32]) {
        let mut stack = stack_of(values);
        let before = stack.clone();
        let err = Battle::decode(0, &mut stack).unwrap_err();
        assert_eq!(
            err,
            DecodeError::StackUnderflow { opcode: Opcode::BATTLE, needed: 2, available: values.len() }
        );
        assert_eq!(stack, before);
    }

    #[test]
    fn test_round_trip_all_flag_bytes() {
        for bits in 0..=u8::MAX {
            for encounter in [0u16, 1, 0x1234, u16::MAX] {
                let mut stack = stack_of(&[encounter as i32, bits as i32]);
                let b = Battle::decode(0, &mut stack).unwrap();
                assert_eq!(b.encounter(), encounter);
                assert_eq!(b.flags().bits(), bits);
            }
        }
    }

    #[test]
    fn test_reversed_push_order_swaps_fields() {
        // flags pushed first, encounter last
        let mut stack = stack_of(&[0x05, 300]);
        let b = Battle::decode(0, &mut stack).unwrap();
        assert_eq!(b.encounter(), 0x05);
        assert_eq!(b.flags().bits(), (300 & 0xff) as u8);
    }

    #[test_case(65537, 1 ; "just past u16")]
    #[test_case(65536, 0 ; "exact wrap")]
    #[test_case(-1, 0xffff ; "negative")]
    #[test_case(0x12_3456, 0x3456 ; "high bits dropped")]
    fn test_encounter_truncates(raw: i32, expected: u16) {
        let mut stack = stack_of(&[raw, 0]);
        assert_eq!(Battle::decode(0, &mut stack).unwrap().encounter(), expected);
    }

    #[test]
    fn test_flags_truncate_to_byte() {
        let mut stack = stack_of(&[7, 0x1c1]);
        assert_eq!(Battle::decode(0, &mut stack).unwrap().flags().bits(), 0xc1);
    }

    #[test]
    fn test_parameter_is_ignored() {
        let mut a = stack_of(&[9, 2]);
        let mut b = stack_of(&[9, 2]);
        assert_eq!(Battle::decode(0, &mut a).unwrap(), Battle::decode(-77, &mut b).unwrap());
    }

    #[test]
    fn test_variable_flags_is_invalid_operand() {
        let mut stack = stack_of(&[10]);
        stack.push(VariableRef::new(VariableKind::Byte, 3));
        let err = Battle::decode(0, &mut stack).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidOperand { found: "variable", .. }));
    }

    #[test]
    fn test_computed_encounter_is_invalid_operand() {
        let mut stack = ExpressionStack::new();
        stack.push(Expression::binary(CalcOp::Add, Expression::Const(1), Expression::Const(2)));
        stack.push(0);
        let err = Battle::decode(0, &mut stack).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidOperand { found: "computed", .. }));
    }

    #[test]
    fn test_display() {
        let b = Battle::new(12, BattleFlags::NO_ESCAPE | BattleFlags::FORCE_BACK_ATTACK);
        assert_eq!(b.to_string(), "BATTLE(encounter: 12, flags: No_escape | Force_back_attack)");
        let b = Battle::new(0, BattleFlags::REGULAR_BATTLE);
        assert_eq!(b.to_string(), "BATTLE(encounter: 0, flags: Regular_battle)");
    }
}
