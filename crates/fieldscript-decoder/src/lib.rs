//! Field-script loader.
//!
//! Turns a tokenized script into an ordered instruction list. Operand tokens
//! feed the expression stack, opcode tokens are dispatched through the
//! opcode table. Decoding is strictly sequential within a script: every
//! decoder must consume exactly what the encoder pushed, and nothing
//! resynchronizes the stream after a mismatch.

mod builder;
mod decoder;
mod token;

pub use builder::ScriptBuilder;
pub use decoder::{
    decode_script, decode_scripts, DecodedScript, Decoder, Diagnostic, ErrorPolicy, ScriptError,
};
pub use token::Token;
