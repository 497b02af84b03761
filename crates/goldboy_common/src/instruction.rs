//! Structured instruction descriptors produced by the decoder description
//! generator and consumed read-only by the golden model.

use serde::{Deserialize, Serialize};

use crate::opcode::{effective_opcode, EffectiveOpcode};
use crate::register::{Flag, Flags, Register16, Register8};

/// Shape of a single instruction operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandKind {
    Register8(Register8),
    Register16(Register16),
    Imm8(u8),
    Imm16(u16),
    SignedImm8(i8),
}

/// An operand plus whether it is dereferenced through memory.
///
/// For 8-bit pointer operands (`(C)`, `(a8)`) the address is offset from
/// the high page at 0xFF00.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operand {
    pub kind: OperandKind,
    #[serde(default)]
    pub pointer: bool,
}

impl Operand {
    pub fn direct(kind: OperandKind) -> Self {
        Self {
            kind,
            pointer: false,
        }
    }

    pub fn deref(kind: OperandKind) -> Self {
        Self {
            kind,
            pointer: true,
        }
    }

    pub fn reg8(r: Register8) -> Self {
        Self::direct(OperandKind::Register8(r))
    }

    pub fn reg16(r: Register16) -> Self {
        Self::direct(OperandKind::Register16(r))
    }

    /// Immediate bytes this operand occupies in the instruction stream.
    pub fn immediate_len(&self) -> u8 {
        match self.kind {
            OperandKind::Imm8(_) | OperandKind::SignedImm8(_) => 1,
            OperandKind::Imm16(_) => 2,
            OperandKind::Register8(_) | OperandKind::Register16(_) => 0,
        }
    }
}

/// Adjustment applied to a pointer register (or HL) after a load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostLoad {
    #[default]
    None,
    Increment,
    Decrement,
    /// `LD HL, SP+s8`: the signed payload is added to the source.
    AddSigned(i8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Or,
    Xor,
    Cp,
    Inc,
    Dec,
    Daa,
    Cpl,
    Scf,
    Ccf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitwiseOp {
    Bit,
    Res,
    Set,
}

impl BitwiseOp {
    /// First payload byte of this operation's block in the CB opcode space.
    pub fn block_base(self) -> u8 {
        match self {
            BitwiseOp::Bit => 0x40,
            BitwiseOp::Res => 0x80,
            BitwiseOp::Set => 0xC0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotateOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpKind {
    Jp,
    Jr,
    Call,
    Ret,
    Reti,
    Rst,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "nz")]
    NotZero,
    #[serde(rename = "z")]
    Zero,
    #[serde(rename = "nc")]
    NotCarry,
    #[serde(rename = "c")]
    Carry,
}

impl Condition {
    pub fn flag(self) -> Flag {
        match self {
            Condition::NotZero | Condition::Zero => Flag::Z,
            Condition::NotCarry | Condition::Carry => Flag::C,
        }
    }

    /// Whether the branch is taken with the given flag register.
    pub fn holds(self, flags: Flags) -> bool {
        let set = flags.get(self.flag());
        match self {
            Condition::Zero | Condition::Carry => set,
            Condition::NotZero | Condition::NotCarry => !set,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlOp {
    Nop,
    Halt,
    Stop,
    Di,
    Ei,
}

/// Category tag plus the category-specific parameter tree.
///
/// Operand fields are optional so that a descriptor missing one still
/// deserializes and can be reported as malformed with its machine code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Params {
    Arithmetic8 {
        op: ArithOp,
        #[serde(default)]
        lhs: Option<Operand>,
        #[serde(default)]
        rhs: Option<Operand>,
    },
    Arithmetic16 {
        op: ArithOp,
        #[serde(default)]
        lhs: Option<Operand>,
        #[serde(default)]
        rhs: Option<Operand>,
    },
    Bitwise {
        op: BitwiseOp,
        #[serde(default)]
        bit: Option<u8>,
        #[serde(default)]
        operand: Option<Operand>,
    },
    Load {
        #[serde(default)]
        dst: Option<Operand>,
        #[serde(default)]
        src: Option<Operand>,
        #[serde(default)]
        post_load: PostLoad,
    },
    Jump {
        kind: JumpKind,
        #[serde(default)]
        condition: Option<Condition>,
        #[serde(default)]
        target: Option<Operand>,
    },
    Rotate {
        op: RotateOp,
        #[serde(default)]
        operand: Option<Operand>,
    },
    Control {
        op: ControlOp,
    },
}

impl Params {
    pub fn category(&self) -> &'static str {
        match self {
            Params::Arithmetic8 { .. } => "arithmetic8",
            Params::Arithmetic16 { .. } => "arithmetic16",
            Params::Bitwise { .. } => "bitwise",
            Params::Load { .. } => "load",
            Params::Jump { .. } => "jump",
            Params::Rotate { .. } => "rotate",
            Params::Control { .. } => "control",
        }
    }
}

/// One decoded instruction.
///
/// `machine_code` packs the raw bytes most significant first, so `JP 0xABCD`
/// is `0xC3CDAB` and `BIT 0,B` is `0xCB40`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub machine_code: u32,
    pub byte_length: u8,
    /// Machine cycles taken by the instruction (taken branch for conditionals).
    pub duration: u8,
    pub params: Params,
}

impl Descriptor {
    /// Raw instruction bytes in stream order, or `None` if `byte_length`
    /// is out of range or the machine code does not fit in it.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        let len = self.byte_length as u32;
        if !(1..=3).contains(&len) || self.machine_code >> (8 * len) != 0 {
            return None;
        }
        Some(
            (0..len)
                .rev()
                .map(|i| (self.machine_code >> (8 * i)) as u8)
                .collect(),
        )
    }

    #[inline]
    pub fn effective_opcode(&self) -> EffectiveOpcode {
        effective_opcode(self.machine_code)
    }
}

/// An entry of the descriptor source: the hex rendering of the raw
/// instruction alongside its descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionEntry {
    pub instruction: String,
    pub descriptor: Descriptor,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionSource {
    pub instructions: Vec<InstructionEntry>,
}
