//! Battle flag bitmask.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::{Serialize, Serializer};

/// Flags modifying how a triggered battle plays out.
///
/// Every bit is independent and every byte value is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BattleFlags(u8);

impl BattleFlags {
    pub const REGULAR_BATTLE: BattleFlags = BattleFlags(0x00);
    pub const NO_ESCAPE: BattleFlags = BattleFlags(0x01);
    /// Battle music keeps playing after win or loss.
    pub const DISABLE_VICTORY_FANFARE: BattleFlags = BattleFlags(0x02);
    pub const INHERIT_COUNTDOWN_TIMER_FROM_FIELD: BattleFlags = BattleFlags(0x04);
    pub const NO_ITEM_XP_GAIN: BattleFlags = BattleFlags(0x08);
    pub const USE_CURRENT_MUSIC_AS_BATTLE_MUSIC: BattleFlags = BattleFlags(0x10);
    pub const FORCE_PREEMPTIVE_ATTACKED: BattleFlags = BattleFlags(0x20);
    pub const FORCE_BACK_ATTACK: BattleFlags = BattleFlags(0x40);
    pub const UNKNOWN: BattleFlags = BattleFlags(0x80);

    const NAMED: [(BattleFlags, &'static str); 8] = [
        (BattleFlags::NO_ESCAPE, "No_escape"),
        (BattleFlags::DISABLE_VICTORY_FANFARE, "Disable_victory_fanfare"),
        (BattleFlags::INHERIT_COUNTDOWN_TIMER_FROM_FIELD, "Inherit_countdown_timer_from_field"),
        (BattleFlags::NO_ITEM_XP_GAIN, "No_Item_XP_Gain"),
        (BattleFlags::USE_CURRENT_MUSIC_AS_BATTLE_MUSIC, "Use_current_music_as_battle_music"),
        (BattleFlags::FORCE_PREEMPTIVE_ATTACKED, "Force_preemptive_attacked"),
        (BattleFlags::FORCE_BACK_ATTACK, "Force_back_attack"),
        (BattleFlags::UNKNOWN, "Unknown"),
    ];

    pub const fn from_bits(bits: u8) -> Self {
        BattleFlags(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is set.
    pub const fn contains(self, other: BattleFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: BattleFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: BattleFlags) {
        self.0 &= !other.0;
    }

    /// Names of the set bits, lowest bit first.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

impl From<u8> for BattleFlags {
    fn from(bits: u8) -> Self {
        BattleFlags(bits)
    }
}

impl BitOr for BattleFlags {
    type Output = BattleFlags;

    fn bitor(self, rhs: BattleFlags) -> BattleFlags {
        BattleFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for BattleFlags {
    fn bitor_assign(&mut self, rhs: BattleFlags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for BattleFlags {
    type Output = BattleFlags;

    fn bitand(self, rhs: BattleFlags) -> BattleFlags {
        BattleFlags(self.0 & rhs.0)
    }
}

/// Renders set flags joined by ` | `, or `Regular_battle` when none are set.
impl fmt::Display for BattleFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Regular_battle");
        }
        for (i, name) in self.names().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

// Serialized as the list of set flag names alongside the raw byte.
impl Serialize for BattleFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("BattleFlags", 2)?;
        s.serialize_field("bits", &self.0)?;
        s.serialize_field("names", &self.names().collect::<Vec<_>>())?;
        s.end()
    }
}
