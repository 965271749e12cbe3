//! Opcode identifiers.

use std::fmt;

use serde::Serialize;

/// Numeric identifier selecting a field-script instruction.
///
/// Opcodes render as three hex digits, prefixed with the mnemonic when one is
/// known: `BATTLE (0x069)`, `0x2a0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Opcode(pub u16);

impl Opcode {
    pub const NOP: Opcode = Opcode(0x000);
    pub const CAL: Opcode = Opcode(0x001);
    pub const PSHN_L: Opcode = Opcode(0x007);
    pub const PSHM_B: Opcode = Opcode(0x00a);
    pub const PSHM_W: Opcode = Opcode(0x00c);
    pub const PSHM_L: Opcode = Opcode(0x00e);
    pub const PSHSM_B: Opcode = Opcode(0x010);
    pub const PSHSM_W: Opcode = Opcode(0x011);
    pub const PSHSM_L: Opcode = Opcode(0x012);
    pub const BATTLE: Opcode = Opcode(0x069);

    const MNEMONICS: &'static [(Opcode, &'static str)] = &[
        (Opcode::NOP, "NOP"),
        (Opcode::CAL, "CAL"),
        (Opcode::PSHN_L, "PSHN_L"),
        (Opcode::PSHM_B, "PSHM_B"),
        (Opcode::PSHM_W, "PSHM_W"),
        (Opcode::PSHM_L, "PSHM_L"),
        (Opcode::PSHSM_B, "PSHSM_B"),
        (Opcode::PSHSM_W, "PSHSM_W"),
        (Opcode::PSHSM_L, "PSHSM_L"),
        (Opcode::BATTLE, "BATTLE"),
    ];

    /// Mnemonic for this opcode, if it is one the crate knows about.
    pub fn name(self) -> Option<&'static str> {
        Self::MNEMONICS.iter().find(|(op, _)| *op == self).map(|(_, name)| *name)
    }

    /// Looks an opcode up by mnemonic (case-insensitive).
    pub fn from_name(name: &str) -> Option<Opcode> {
        Self::MNEMONICS
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(op, _)| *op)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} (0x{:03x})", name, self.0),
            None => write!(f, "0x{:03x}", self.0),
        }
    }
}

impl From<u16> for Opcode {
    fn from(raw: u16) -> Self {
        Opcode(raw)
    }
}
