//! Text listing reader: one token per line.
//!
//! ```text
//! # encounter 83, no escape
//! PSHN_L 83
//! PSHN_L 0x01
//! BATTLE
//! ```

use thiserror::Error;

use fieldscript_bytecode::{CalcOp, Opcode, VariableKind, VariableRef};
use fieldscript_decoder::Token;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{msg}")]
pub struct ListingError {
    pub msg: String,
    /// 1-based line in the listing.
    pub line: usize,
}

fn error_at<T>(line: usize, msg: impl Into<String>) -> Result<T, ListingError> {
    Err(ListingError { msg: msg.into(), line })
}

/// Tokens of a listing with the source line each came from.
#[derive(Debug, Default)]
pub struct Listing {
    pub tokens: Vec<Token>,
    pub lines: Vec<usize>,
}

impl Listing {
    pub fn line_of(&self, index: usize) -> Option<usize> {
        self.lines.get(index).copied()
    }
}

pub fn parse_listing(src: &str) -> Result<Listing, ListingError> {
    let mut listing = Listing::default();
    for (i, raw) in src.lines().enumerate() {
        let line = i + 1;
        let text = raw.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }
        let mut words = text.split_whitespace();
        let Some(mnemonic) = words.next() else { continue };
        let args: Vec<&str> = words.collect();
        let token = parse_line(line, mnemonic, &args)?;
        listing.tokens.push(token);
        listing.lines.push(line);
    }
    Ok(listing)
}

fn parse_line(line: usize, mnemonic: &str, args: &[&str]) -> Result<Token, ListingError> {
    let upper = mnemonic.to_ascii_uppercase();
    if let Some(kind) = variable_kind(&upper) {
        let address = single_arg(line, &upper, args)?;
        let address = u16::try_from(parse_int(line, address)?)
            .or_else(|_| error_at(line, format!("Address out of range: {}", address)))?;
        return Ok(Token::PushVar(VariableRef::new(kind, address)));
    }
    match upper.as_str() {
        "PSHN_L" => {
            let value = single_arg(line, &upper, args)?;
            let value = i32::try_from(parse_int(line, value)?)
                .or_else(|_| error_at(line, format!("Constant out of range: {}", value)))?;
            Ok(Token::PushConst(value))
        }
        "CAL" => {
            let op = single_arg(line, &upper, args)?;
            let calc = CalcOp::from_mnemonic(op)
                .or_else(|| parse_int(line, op).ok().and_then(|n| i32::try_from(n).ok()).and_then(CalcOp::from_parameter));
            match calc {
                Some(calc) => Ok(Token::Calc(calc)),
                None => error_at(line, format!("Unknown calculation '{}'", op)),
            }
        }
        _ => {
            let opcode = match Opcode::from_name(&upper) {
                Some(op) => op,
                None => {
                    let raw = parse_int(line, mnemonic)
                        .or_else(|_| error_at(line, format!("Unknown mnemonic '{}'", mnemonic)))?;
                    Opcode(u16::try_from(raw).or_else(|_| error_at(line, format!("Opcode out of range: {}", mnemonic)))?)
                }
            };
            let parameter = match args {
                [] => 0,
                [p] => i32::try_from(parse_int(line, p)?)
                    .or_else(|_| error_at(line, format!("Parameter out of range: {}", p)))?,
                _ => return error_at(line, format!("Expected at most 1 parameter for {}, got {}", upper, args.len())),
            };
            Ok(Token::Op { opcode, parameter })
        }
    }
}

fn variable_kind(mnemonic: &str) -> Option<VariableKind> {
    Some(match mnemonic {
        "PSHM_B" => VariableKind::Byte,
        "PSHM_W" => VariableKind::Word,
        "PSHM_L" => VariableKind::Long,
        "PSHSM_B" => VariableKind::SignedByte,
        "PSHSM_W" => VariableKind::SignedWord,
        "PSHSM_L" => VariableKind::SignedLong,
        _ => return None,
    })
}

fn single_arg<'a>(line: usize, mnemonic: &str, args: &[&'a str]) -> Result<&'a str, ListingError> {
    match args {
        [one] => Ok(*one),
        _ => error_at(line, format!("Expected 1 argument for {}, got {}", mnemonic, args.len())),
    }
}

// Decimal (optionally negative) or 0x-prefixed hex.
fn parse_int(line: usize, s: &str) -> Result<i64, ListingError> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (radix, digits) = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, digits),
    };
    // only the one leading '-' is a sign
    if digits.starts_with(['-', '+']) {
        return error_at(line, format!("Invalid number: {}", s));
    }
    match i64::from_str_radix(digits, radix) {
        Ok(n) if negative => Ok(-n),
        Ok(n) => Ok(n),
        Err(_) => error_at(line, format!("Invalid number: {}", s)),
    }
}
