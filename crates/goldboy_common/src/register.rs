use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// 8-bit registers of the LR35902.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Register8 {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
}

impl Register8 {
    pub const ALL: [Register8; 8] = [
        Register8::A,
        Register8::F,
        Register8::B,
        Register8::C,
        Register8::D,
        Register8::E,
        Register8::H,
        Register8::L,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Register8::A => "A",
            Register8::F => "F",
            Register8::B => "B",
            Register8::C => "C",
            Register8::D => "D",
            Register8::E => "E",
            Register8::H => "H",
            Register8::L => "L",
        }
    }
}

impl fmt::Display for Register8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Register8 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Register8::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown 8-bit register '{s}'"))
    }
}

/// 16-bit register pairs plus the stack pointer.
///
/// The program counter is not listed here: it is written through the
/// dedicated `ProgramCounter` latch target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Register16 {
    AF,
    BC,
    DE,
    HL,
    SP,
}

impl Register16 {
    pub const ALL: [Register16; 5] = [
        Register16::AF,
        Register16::BC,
        Register16::DE,
        Register16::HL,
        Register16::SP,
    ];

    /// The (high, low) 8-bit halves of a register pair. `SP` has none.
    pub fn halves(self) -> Option<(Register8, Register8)> {
        match self {
            Register16::AF => Some((Register8::A, Register8::F)),
            Register16::BC => Some((Register8::B, Register8::C)),
            Register16::DE => Some((Register8::D, Register8::E)),
            Register16::HL => Some((Register8::H, Register8::L)),
            Register16::SP => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Register16::AF => "AF",
            Register16::BC => "BC",
            Register16::DE => "DE",
            Register16::HL => "HL",
            Register16::SP => "SP",
        }
    }
}

impl fmt::Display for Register16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Register16 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Register16::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown 16-bit register '{s}'"))
    }
}

/// Flag bits in the F register.
///
/// Layout (bit index in the byte, from MSB to LSB):
/// - bit 7: Z (zero)
/// - bit 6: N (subtract)
/// - bit 5: H (half carry)
/// - bit 4: C (carry)
/// - bits 0–3 are always zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Flag {
    Z = 7,
    N = 6,
    H = 5,
    C = 4,
}

impl Flag {
    /// Emission order for flag writes.
    pub const ORDER: [Flag; 4] = [Flag::Z, Flag::N, Flag::H, Flag::C];

    #[inline]
    pub fn mask(self) -> Flags {
        Flags::from_bits_truncate(1 << (self as u8))
    }

    pub fn name(self) -> &'static str {
        match self {
            Flag::Z => "Z",
            Flag::N => "N",
            Flag::H => "H",
            Flag::C => "C",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Flag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Flag::ORDER
            .into_iter()
            .find(|flag| flag.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown flag '{s}'"))
    }
}

bitflags! {
    /// Contents of the F register.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Flags: u8 {
        const Z = 0x80;
        const N = 0x40;
        const H = 0x20;
        const C = 0x10;
    }
}

impl Flags {
    #[inline]
    pub fn get(self, flag: Flag) -> bool {
        self.contains(flag.mask())
    }
}
