//! Result and flag computation for every ALU operation the assemblers need.
//!
//! `value`/`flags` take an explicit modulus (256 or 65536) so the same
//! formulas serve 8-bit operations and the full-width pass of 16-bit adds.
//! The modulus bounds the result and the carry; half carry always comes out
//! of the low nibble.

use goldboy_common::{Flag, Flags, RotateOp, Write};

pub const BYTE: u32 = 0x100;
pub const WORD: u32 = 0x1_0000;

/// Two-operand ALU operations.
///
/// `Adc` and `Sbc` fold in a carry of one: traces that use them run under
/// presets with C set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Or,
    Xor,
    Cp,
}

/// New state of each flag; `None` leaves the flag untouched and is never
/// emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlagStates {
    pub z: Option<bool>,
    pub n: Option<bool>,
    pub h: Option<bool>,
    pub c: Option<bool>,
}

impl FlagStates {
    pub const UNAFFECTED: FlagStates = FlagStates {
        z: None,
        n: None,
        h: None,
        c: None,
    };

    pub fn all(z: bool, n: bool, h: bool, c: bool) -> Self {
        Self {
            z: Some(z),
            n: Some(n),
            h: Some(h),
            c: Some(c),
        }
    }

    pub fn get(&self, flag: Flag) -> Option<bool> {
        match flag {
            Flag::Z => self.z,
            Flag::N => self.n,
            Flag::H => self.h,
            Flag::C => self.c,
        }
    }

    /// INC/DEC and BIT keep the carry.
    #[inline]
    pub fn without_carry(self) -> Self {
        Self { c: None, ..self }
    }

    #[inline]
    pub fn without_zero(self) -> Self {
        Self { z: None, ..self }
    }

    #[inline]
    pub fn with_zero(self, z: bool) -> Self {
        Self { z: Some(z), ..self }
    }

    /// Flag writes in Z, N, H, C order, skipping unaffected flags.
    pub fn writes(self) -> impl Iterator<Item = Write> {
        Flag::ORDER
            .into_iter()
            .filter_map(move |flag| self.get(flag).map(|set| Write::flag(flag, set)))
    }
}

const NIBBLE: i64 = 0x0F;

#[inline]
fn carry_in(op: AluOp) -> i64 {
    match op {
        AluOp::Adc | AluOp::Sbc => 1,
        _ => 0,
    }
}

/// Result of `op` over `a` and `b` reduced by `modulus`. `Cp` returns `a`.
pub fn value(op: AluOp, a: u32, b: u32, modulus: u32) -> u32 {
    let (a, b, m) = (a as i64, b as i64, modulus as i64);
    let raw = match op {
        AluOp::Add | AluOp::Adc => a + b + carry_in(op),
        AluOp::Sub | AluOp::Sbc => a - b - carry_in(op),
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Cp => a,
    };
    raw.rem_euclid(m) as u32
}

/// Flags produced by `op` over `a` and `b` under `modulus`.
pub fn flags(op: AluOp, a: u32, b: u32, modulus: u32) -> FlagStates {
    let (a, b, m) = (a as i64, b as i64, modulus as i64);
    let cin = carry_in(op);
    match op {
        AluOp::Add | AluOp::Adc => {
            let sum = a + b + cin;
            FlagStates::all(
                sum.rem_euclid(m) == 0,
                false,
                (a & NIBBLE) + (b & NIBBLE) + cin > NIBBLE,
                sum > m - 1,
            )
        }
        AluOp::Sub | AluOp::Sbc | AluOp::Cp => {
            let cin = if op == AluOp::Cp { 0 } else { cin };
            let diff = a - b - cin;
            FlagStates::all(
                diff.rem_euclid(m) == 0,
                true,
                (a & NIBBLE) - (b & NIBBLE) - cin < 0,
                diff < 0,
            )
        }
        AluOp::And => FlagStates::all(a & b == 0, false, true, false),
        AluOp::Or => FlagStates::all(a | b == 0, false, false, false),
        AluOp::Xor => FlagStates::all(a ^ b == 0, false, false, false),
    }
}

/// Decimal adjust of `a` given the flags left by the previous operation.
/// N is left unchanged.
pub fn daa(a: u8, f: Flags) -> (u8, FlagStates) {
    let mut adjust: u8 = if f.get(Flag::C) { 0x60 } else { 0x00 };
    if f.get(Flag::H) {
        adjust |= 0x06;
    }

    let result = if !f.get(Flag::N) {
        if (a & 0x0F) > 0x09 {
            adjust |= 0x06;
        }
        if a > 0x99 {
            adjust |= 0x60;
        }
        a.wrapping_add(adjust)
    } else {
        a.wrapping_sub(adjust)
    };

    let states = FlagStates {
        z: Some(result == 0),
        n: None,
        h: Some(false),
        c: Some(adjust >= 0x60),
    };
    (result, states)
}

/// Rotate or shift `value` through the CB-page operation `op`.
pub fn rotate(op: RotateOp, value: u8, carry: bool) -> (u8, FlagStates) {
    let (result, carry_out) = match op {
        RotateOp::Rlc => (value.rotate_left(1), value & 0x80 != 0),
        RotateOp::Rrc => (value.rotate_right(1), value & 0x01 != 0),
        RotateOp::Rl => ((value << 1) | carry as u8, value & 0x80 != 0),
        RotateOp::Rr => ((value >> 1) | ((carry as u8) << 7), value & 0x01 != 0),
        RotateOp::Sla => (value << 1, value & 0x80 != 0),
        RotateOp::Sra => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
        RotateOp::Swap => (value.rotate_left(4), false),
        RotateOp::Srl => (value >> 1, value & 0x01 != 0),
    };
    (result, FlagStates::all(result == 0, false, false, carry_out))
}

/// State of bit `bit` of `value` as written by BIT: Z, N and H only.
pub fn bit_test(value: u8, bit: u8) -> FlagStates {
    FlagStates {
        z: Some(value & (1 << bit) == 0),
        n: Some(false),
        h: Some(true),
        c: None,
    }
}
