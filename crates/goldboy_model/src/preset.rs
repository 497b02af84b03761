//! Named, immutable machine states that traces are generated against.

use std::fmt;
use std::str::FromStr;

use goldboy_common::{Flag, Flags, Register16, Register8};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// General purpose state with every flag set.
    Default,
    /// Stack pointer far from the registers' pointees, for stack traffic.
    Highstack,
    /// Z and C clear, so NZ/NC conditions hold.
    Nznc,
}

impl PresetName {
    pub const ALL: [PresetName; 3] = [PresetName::Default, PresetName::Highstack, PresetName::Nznc];

    pub fn as_str(self) -> &'static str {
        match self {
            PresetName::Default => "default",
            PresetName::Highstack => "highstack",
            PresetName::Nznc => "nznc",
        }
    }

    #[inline]
    pub fn preset(self) -> &'static Preset {
        &PRESETS[self as usize]
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown preset '{s}'"))
    }
}

/// Register file of a preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Registers {
    pub a: u8,
    #[serde(serialize_with = "serialize_flags")]
    pub f: Flags,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

fn serialize_flags<S: serde::Serializer>(flags: &Flags, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(flags.bits())
}

impl Registers {
    pub fn get8(&self, r: Register8) -> u8 {
        match r {
            Register8::A => self.a,
            Register8::F => self.f.bits(),
            Register8::B => self.b,
            Register8::C => self.c,
            Register8::D => self.d,
            Register8::E => self.e,
            Register8::H => self.h,
            Register8::L => self.l,
        }
    }

    pub fn get16(&self, r: Register16) -> u16 {
        match r.halves() {
            Some((hi, lo)) => u16::from_be_bytes([self.get8(hi), self.get8(lo)]),
            None => self.sp,
        }
    }

    #[inline]
    pub fn flag(&self, flag: Flag) -> bool {
        self.f.get(flag)
    }
}

/// How the 64 KiB memory image of a preset is filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryFill {
    /// Every byte holds the low byte of its own address.
    AddressLowByte,
}

impl MemoryFill {
    fn image(self) -> Vec<u8> {
        match self {
            MemoryFill::AddressLowByte => (0..0x10000u32).map(|addr| addr as u8).collect(),
        }
    }
}

/// A named initial machine state. Never mutated.
#[derive(Clone, Debug, Serialize)]
pub struct Preset {
    pub name: PresetName,
    pub regs: Registers,
    pub ime: bool,
    pub memory_fill: MemoryFill,
    #[serde(skip)]
    memory: Vec<u8>,
}

impl Preset {
    fn new(name: PresetName, f: u8, sp: u16) -> Self {
        let memory_fill = MemoryFill::AddressLowByte;
        Self {
            name,
            regs: Registers {
                a: 0x0A,
                f: Flags::from_bits_truncate(f),
                b: 0x0B,
                c: 0x0C,
                d: 0x0D,
                e: 0x0E,
                h: 0x01,
                l: 0x02,
                sp,
                pc: 0x0000,
            },
            ime: true,
            memory_fill,
            memory: memory_fill.image(),
        }
    }

    #[inline]
    pub fn read8(&self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    /// Little-endian word at `addr`, wrapping at the top of memory.
    pub fn read16(&self, addr: u16) -> u16 {
        u16::from_le_bytes([self.read8(addr), self.read8(addr.wrapping_add(1))])
    }

    #[inline]
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }
}

lazy_static! {
    static ref PRESETS: [Preset; 3] = [
        Preset::new(PresetName::Default, 0xF0, 0x00FF),
        Preset::new(PresetName::Highstack, 0xF0, 0xBBFF),
        Preset::new(PresetName::Nznc, 0x60, 0xBBFF),
    ];
}

/// All presets, in declaration order.
pub fn presets() -> &'static [Preset] {
    &PRESETS[..]
}
