//! Decode errors for field-script bytecode.
//!
//! Every failure the decode core can produce is a value of [`DecodeError`].
//! None of them are fatal to the host process: the script loader receives the
//! error for the single instruction that failed and decides whether the rest
//! of the script is still usable.
//!
//! # Recoverability
//!
//! - [`DecodeError::StackUnderflow`] and [`DecodeError::InvalidOperand`] are
//!   local to one instruction. A loader may abort the script or skip the
//!   instruction and keep going (a degraded mode, since the operands the
//!   encoder pushed are now out of step with what was consumed).
//! - [`DecodeError::UnknownOpcode`] always ends the script. Without knowing
//!   the opcode's arity there is no way to keep operand consumption in step
//!   with the encoder.
//!
//! # Examples
//!
//! ```rust
//! use fieldscript_bytecode::{DecodeError, ExpressionStack, Opcode, OpcodeTable};
//!
//! let mut stack = ExpressionStack::new();
//! let err = OpcodeTable::global().decode(Opcode::BATTLE, 0, &mut stack).unwrap_err();
//! assert!(matches!(err, DecodeError::StackUnderflow { .. }));
//! assert!(!err.aborts_script());
//! ```

use thiserror::Error;

use crate::opcode::Opcode;

/// A failure while decoding a single instruction off the expression stack.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The opcode needed more operands than the stack held.
    #[error("stack underflow decoding {opcode}: needs {needed} operand(s), {available} available")]
    StackUnderflow {
        opcode: Opcode,
        needed: usize,
        available: usize,
    },

    /// An operand was present but was not a constant expression.
    #[error("invalid operand for {opcode}: expected a constant, found {found} `{rendered}`")]
    InvalidOperand {
        opcode: Opcode,
        /// Expression kind that was found (`variable`, `computed`).
        found: &'static str,
        /// Rendering of the offending expression.
        rendered: String,
    },

    /// The opcode has no entry in the dispatch table.
    #[error("unknown opcode {opcode}")]
    UnknownOpcode { opcode: Opcode },
}

impl DecodeError {
    /// Opcode that was being decoded when the failure happened.
    pub fn opcode(&self) -> Opcode {
        match self {
            DecodeError::StackUnderflow { opcode, .. }
            | DecodeError::InvalidOperand { opcode, .. }
            | DecodeError::UnknownOpcode { opcode } => *opcode,
        }
    }

    /// Whether the rest of the script must be abandoned after this error.
    ///
    /// Only unknown opcodes force this; the other kinds leave the policy to
    /// the caller.
    pub fn aborts_script(&self) -> bool {
        matches!(self, DecodeError::UnknownOpcode { .. })
    }
}

/// A specialized `Result` type for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unknown_opcode_aborts() {
        let underflow = DecodeError::StackUnderflow { opcode: Opcode::BATTLE, needed: 2, available: 1 };
        let invalid = DecodeError::InvalidOperand {
            opcode: Opcode::BATTLE,
            found: "variable",
            rendered: "var_w[0x0010]".to_string(),
        };
        let unknown = DecodeError::UnknownOpcode { opcode: Opcode(0x3ff) };

        assert!(!underflow.aborts_script());
        assert!(!invalid.aborts_script());
        assert!(unknown.aborts_script());
    }

    #[test]
    fn test_error_messages_name_the_opcode() {
        let err = DecodeError::StackUnderflow { opcode: Opcode::BATTLE, needed: 2, available: 0 };
        assert_eq!(
            err.to_string(),
            "stack underflow decoding BATTLE (0x069): needs 2 operand(s), 0 available"
        );
        assert_eq!(err.opcode(), Opcode::BATTLE);

        let err = DecodeError::UnknownOpcode { opcode: Opcode(0x200) };
        assert_eq!(err.to_string(), "unknown opcode 0x200");
    }
}
