use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix byte that selects the two-byte bitwise/rotate opcode page.
pub const CB_PREFIX: u8 = 0xCB;

/// Canonical opcode identity, ignoring trailing immediate or
/// displacement bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectiveOpcode(u16);

impl EffectiveOpcode {
    #[inline]
    pub fn value(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn is_prefixed(self) -> bool {
        self.0 >> 8 == CB_PREFIX as u16
    }

    /// The byte fetched in the first machine cycle.
    #[inline]
    pub fn leading(self) -> u8 {
        if self.is_prefixed() {
            CB_PREFIX
        } else {
            self.0 as u8
        }
    }

    /// The byte after the prefix, for prefixed opcodes.
    #[inline]
    pub fn payload(self) -> Option<u8> {
        self.is_prefixed().then_some(self.0 as u8)
    }
}

impl fmt::Display for EffectiveOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_prefixed() {
            write!(f, "0x{:04X}", self.0)
        } else {
            write!(f, "0x{:02X}", self.0)
        }
    }
}

/// Extracts the effective opcode of a raw machine code.
///
/// The leading byte is the most significant non-zero byte of `raw`. If it is
/// the CB prefix and a byte follows it, the pair forms the opcode.
pub fn effective_opcode(raw: u32) -> EffectiveOpcode {
    let bytes = raw.to_be_bytes();
    let Some(lead) = bytes.iter().position(|&b| b != 0) else {
        return EffectiveOpcode(0);
    };
    match bytes.get(lead + 1) {
        Some(&next) if bytes[lead] == CB_PREFIX => {
            EffectiveOpcode(u16::from_be_bytes([CB_PREFIX, next]))
        }
        _ => EffectiveOpcode(bytes[lead] as u16),
    }
}
