//! Sequential script decoder.

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use fieldscript_bytecode::{
    DecodeError, Expression, ExpressionStack, Instruction, Opcode, OpcodeTable,
};

use crate::token::Token;

/// What to do when a single instruction fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the first failure.
    #[default]
    Abort,
    /// Record underflow and invalid-operand failures and keep going.
    ///
    /// Operands consumed by the failed instruction are lost, so later
    /// instructions may decode against the wrong operands. Unknown opcodes
    /// still abort.
    Skip,
}

/// A decode failure that ended the script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("token {index} ({token}): {source}")]
pub struct ScriptError {
    /// Position of the failing token in the input.
    pub index: usize,
    pub token: Token,
    pub source: DecodeError,
}

/// A failure that was skipped under [`ErrorPolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub index: usize,
    #[serde(serialize_with = "serialize_display")]
    pub error: DecodeError,
}

fn serialize_display<S: Serializer>(err: &DecodeError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}

/// Output of decoding one script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodedScript {
    pub instructions: Vec<Instruction>,
    pub diagnostics: Vec<Diagnostic>,
    /// Operands left on the stack after the last token.
    pub leftover: usize,
}

/// Decodes one script's tokens into instructions.
///
/// Each decoder owns its expression stack; decoders for different scripts
/// share nothing but the read-only opcode table.
#[derive(Debug)]
pub struct Decoder {
    stack: ExpressionStack,
    table: &'static OpcodeTable,
    policy: ErrorPolicy,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(ErrorPolicy::default())
    }
}

impl Decoder {
    pub fn new(policy: ErrorPolicy) -> Self {
        Self { stack: ExpressionStack::new(), table: OpcodeTable::global(), policy }
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn stack(&self) -> &ExpressionStack {
        &self.stack
    }

    /// Applies one token. Returns the instruction if the token decoded one.
    ///
    /// Errors are reported for this token only; the caller picks the policy.
    pub fn feed(&mut self, token: Token) -> Result<Option<Instruction>, DecodeError> {
        match token {
            Token::PushConst(n) => {
                self.stack.push(n);
                Ok(None)
            }
            Token::PushVar(var) => {
                self.stack.push(var);
                Ok(None)
            }
            Token::Calc(op) => {
                let needed = if op.is_unary() { 1 } else { 2 };
                if self.stack.len() < needed {
                    return Err(DecodeError::StackUnderflow {
                        opcode: Opcode::CAL,
                        needed,
                        available: self.stack.len(),
                    });
                }
                let expr = if op.is_unary() {
                    Expression::unary(op, self.stack.pop(Opcode::CAL)?)
                } else {
                    let rhs = self.stack.pop(Opcode::CAL)?;
                    let lhs = self.stack.pop(Opcode::CAL)?;
                    Expression::binary(op, lhs, rhs)
                };
                self.stack.push(expr);
                Ok(None)
            }
            Token::Op { opcode, parameter } => {
                let instr = self.table.decode(opcode, parameter, &mut self.stack)?;
                debug!(%opcode, %instr, "decoded");
                Ok(Some(instr))
            }
        }
    }

    /// Decodes a whole script from an empty stack, applying the policy.
    #[instrument(skip(self, tokens), fields(policy = ?self.policy, count = tokens.len()))]
    pub fn decode(&mut self, tokens: &[Token]) -> Result<DecodedScript, ScriptError> {
        self.stack.clear();
        let mut script = DecodedScript::default();

        for (index, token) in tokens.iter().copied().enumerate() {
            match self.feed(token) {
                Ok(Some(instr)) => script.instructions.push(instr),
                Ok(None) => {}
                Err(source) if source.aborts_script() || self.policy == ErrorPolicy::Abort => {
                    return Err(ScriptError { index, token, source });
                }
                Err(error) => {
                    warn!(index, %token, %error, "skipping instruction");
                    script.diagnostics.push(Diagnostic { index, error });
                }
            }
        }

        script.leftover = self.stack.len();
        if script.leftover > 0 {
            debug!(leftover = script.leftover, "operands left on stack");
        }
        Ok(script)
    }
}

/// Decodes a single script with a fresh decoder.
pub fn decode_script(tokens: &[Token], policy: ErrorPolicy) -> Result<DecodedScript, ScriptError> {
    Decoder::new(policy).decode(tokens)
}

/// Decodes independent scripts concurrently, one decoder per script.
///
/// Results come back in input order.
pub fn decode_scripts<S>(scripts: &[S], policy: ErrorPolicy) -> Vec<Result<DecodedScript, ScriptError>>
where
    S: AsRef<[Token]> + Sync,
{
    std::thread::scope(|scope| {
        let handles: Vec<_> = scripts
            .iter()
            .map(|tokens| scope.spawn(move || decode_script(tokens.as_ref(), policy)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ScriptBuilder;
    use fieldscript_bytecode::{Battle, BattleFlags, CalcOp, VariableKind, VariableRef};
    use test_case::test_case;

    fn battle(instr: &Instruction) -> Battle {
        match instr {
            Instruction::Battle(b) => *b,
            other => panic!("expected BATTLE, got {}", other),
        }
    }

    #[test]
    fn test_round_trip_encounter_and_flags() {
        for encounter in [0u16, 1, 83, 0x7fff, u16::MAX] {
            for bits in [0x00u8, 0x01, 0x41, 0x80, 0xff] {
                let tokens = ScriptBuilder::new().battle(encounter, BattleFlags::from_bits(bits)).finish();
                let script = decode_script(&tokens, ErrorPolicy::Abort).unwrap();
                assert_eq!(script.instructions.len(), 1);
                let b = battle(&script.instructions[0]);
                assert_eq!(b.encounter(), encounter);
                assert_eq!(b.flags().bits(), bits);
                assert_eq!(script.leftover, 0);
            }
        }
    }

    #[test]
    fn test_reversed_push_order_swaps_values() {
        let canonical = ScriptBuilder::new().push_const(20).push_const(0x10).op(Opcode::BATTLE, 0).finish();
        let reversed = ScriptBuilder::new().push_const(0x10).push_const(20).op(Opcode::BATTLE, 0).finish();

        let a = battle(&decode_script(&canonical, ErrorPolicy::Abort).unwrap().instructions[0]);
        let b = battle(&decode_script(&reversed, ErrorPolicy::Abort).unwrap().instructions[0]);

        assert_eq!((a.encounter(), a.flags().bits()), (20, 0x10));
        assert_eq!((b.encounter(), b.flags().bits()), (0x10, 20));
    }

    #[test]
    fn test_encounter_truncation_through_loader() {
        let tokens = ScriptBuilder::new().push_const(65537).push_const(0).op(Opcode::BATTLE, 0).finish();
        let script = decode_script(&tokens, ErrorPolicy::Abort).unwrap();
        assert_eq!(battle(&script.instructions[0]).encounter(), 1);
    }

    #[test]
    fn test_underflow_produces_no_instruction() {
        let tokens = ScriptBuilder::new().push_const(4).op(Opcode::BATTLE, 0).finish();
        let err = decode_script(&tokens, ErrorPolicy::Abort).unwrap_err();
        assert_eq!(err.index, 1);
        assert!(matches!(err.source, DecodeError::StackUnderflow { needed: 2, available: 1, .. }));
        assert!(err.to_string().starts_with("token 1 (BATTLE 0): stack underflow"));
    }

    #[test]
    fn test_default_decoder_aborts() {
        let decoder = Decoder::default();
        assert_eq!(decoder.policy(), ErrorPolicy::Abort);
        assert!(decoder.stack().is_empty());
    }

    #[test]
    fn test_variable_operand_is_invalid() {
        let tokens = ScriptBuilder::new()
            .push_const(4)
            .push_var(VariableRef::new(VariableKind::Word, 0x30))
            .op(Opcode::BATTLE, 0)
            .finish();
        let err = decode_script(&tokens, ErrorPolicy::Abort).unwrap_err();
        assert!(matches!(err.source, DecodeError::InvalidOperand { found: "variable", .. }));
    }

    #[test]
    fn test_unknown_opcode_leaves_stack() {
        let mut decoder = Decoder::new(ErrorPolicy::Skip);
        decoder.feed(Token::PushConst(1)).unwrap();
        decoder.feed(Token::PushConst(2)).unwrap();
        let err = decoder.feed(Token::op(Opcode(0x2ff))).unwrap_err();
        assert_eq!(err, DecodeError::UnknownOpcode { opcode: Opcode(0x2ff) });
        assert_eq!(decoder.stack().len(), 2);
    }

    #[test]
    fn test_unknown_opcode_aborts_even_when_skipping() {
        let tokens = ScriptBuilder::new().nop().op(Opcode(0x2ff), 0).nop().finish();
        let err = decode_script(&tokens, ErrorPolicy::Skip).unwrap_err();
        assert_eq!(err.index, 1);
        assert!(err.source.aborts_script());
    }

    #[test]
    fn test_skip_policy_records_and_continues() {
        let tokens = ScriptBuilder::new()
            .push_const(1)
            .push_var(VariableRef::new(VariableKind::Byte, 2))
            .op(Opcode::BATTLE, 0)
            .battle(7, BattleFlags::NO_ESCAPE)
            .finish();
        let script = decode_script(&tokens, ErrorPolicy::Skip).unwrap();

        assert_eq!(script.diagnostics.len(), 1);
        assert_eq!(script.diagnostics[0].index, 2);
        assert_eq!(script.instructions, vec![Instruction::Battle(Battle::new(7, BattleFlags::NO_ESCAPE))]);
        // the encounter operand of the failed BATTLE stays behind
        assert_eq!(script.leftover, 1);
    }

    #[test_case(CalcOp::Add, 2 ; "binary")]
    #[test_case(CalcOp::Neg, 1 ; "unary")]
    fn test_calc_builds_computed_expression(op: CalcOp, operands: usize) {
        let mut decoder = Decoder::default();
        for n in 0..operands {
            decoder.feed(Token::PushConst(n as i32 + 1)).unwrap();
        }
        assert_eq!(decoder.feed(Token::Calc(op)), Ok(None));
        assert_eq!(decoder.stack().len(), 1);
        assert_eq!(decoder.stack().peek().map(|e| e.kind()), Some("computed"));
    }

    #[test]
    fn test_computed_operand_rejected_by_battle() {
        let tokens = ScriptBuilder::new()
            .push_const(10)
            .push_const(5)
            .calc(CalcOp::Add)
            .push_const(0)
            .op(Opcode::BATTLE, 0)
            .finish();
        let err = decode_script(&tokens, ErrorPolicy::Abort).unwrap_err();
        assert!(matches!(err.source, DecodeError::InvalidOperand { found: "computed", .. }));
    }

    #[test]
    fn test_calc_underflow() {
        let err = decode_script(&[Token::PushConst(1), Token::Calc(CalcOp::Sub)], ErrorPolicy::Abort).unwrap_err();
        assert_eq!(
            err.source,
            DecodeError::StackUnderflow { opcode: Opcode::CAL, needed: 2, available: 1 }
        );
    }

    #[test]
    fn test_decoder_resets_between_scripts() {
        let mut decoder = Decoder::default();
        let first = decoder.decode(&[Token::PushConst(9)]).unwrap();
        assert_eq!(first.leftover, 1);
        let second = decoder.decode(&ScriptBuilder::new().push_const(3).op(Opcode::BATTLE, 0).finish());
        assert!(second.is_err());
    }

    #[test]
    fn test_decode_scripts_keeps_order() {
        let scripts: Vec<Vec<Token>> = (0..8u16)
            .map(|i| ScriptBuilder::new().battle(i, BattleFlags::from_bits(i as u8)).finish())
            .collect();
        let results = decode_scripts(&scripts, ErrorPolicy::Abort);
        assert_eq!(results.len(), 8);
        for (i, result) in results.into_iter().enumerate() {
            let script = result.unwrap();
            assert_eq!(battle(&script.instructions[0]).encounter(), i as u16);
        }
    }
}
