use goldboy_common::{CommandQueue, Operand, OperandKind, PostLoad, Register16, Register8, Write};

use super::helpers::HIGH_PAGE;
use super::{Assembler, Trace};
use crate::alu::{self, AluOp, BYTE};
use crate::error::GenerateError;
use crate::preset::PresetName;

/// Every load the assembler knows how to emit, keyed by the
/// (destination, source) operand shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoadShape {
    /// `LD r, r'`
    RegToReg { dst: Register8, src: Register8 },
    /// `LD r, (rr)`, optionally `(HL+)`/`(HL-)`
    RegFromPointer { dst: Register8, ptr: Register16 },
    /// `LD (rr), r`, optionally `(HL+)`/`(HL-)`
    PointerFromReg { ptr: Register16, src: Register8 },
    /// `LD rr, d16`
    Reg16Immediate { dst: Register16, value: u16 },
    /// `LD r, d8`
    RegImmediate { dst: Register8, value: u8 },
    /// `LD (HL), d8`
    PointerImmediate { ptr: Register16, value: u8 },
    /// `LD (a16), SP`
    StoreStackPointer { addr: u16 },
    Pop { dst: Register16 },
    Push { src: Register16 },
    /// `LDH (a8), A`
    HighStore { offset: u8, src: Register8 },
    /// `LDH A, (a8)`
    HighLoad { dst: Register8, offset: u8 },
    /// `LD (a16), A`
    AbsoluteStore { addr: u16, src: Register8 },
    /// `LD A, (a16)`
    AbsoluteLoad { dst: Register8, addr: u16 },
    /// `LD A, (C)`
    PortLoad { dst: Register8, port: Register8 },
    /// `LD (C), A`
    PortStore { port: Register8, src: Register8 },
    /// `LD SP, HL`
    StackFromHl,
    /// `LD HL, SP+s8`
    HlFromStackOffset { disp: i8 },
}

impl LoadShape {
    fn classify(dst: Operand, src: Operand, post_load: PostLoad) -> Option<LoadShape> {
        use goldboy_common::Register16::{HL, SP};
        use OperandKind::{Imm16, Imm8, Register16 as R16, Register8 as R8};

        let shape = match (dst.pointer, dst.kind, src.pointer, src.kind) {
            (false, R8(dst), false, R8(src)) => LoadShape::RegToReg { dst, src },
            (false, R8(dst), true, R16(ptr)) if ptr != SP => {
                LoadShape::RegFromPointer { dst, ptr }
            }
            (true, R16(ptr), false, R8(src)) if ptr != SP => {
                LoadShape::PointerFromReg { ptr, src }
            }
            (false, R16(dst), false, Imm16(value)) => {
                LoadShape::Reg16Immediate { dst, value }
            }
            (false, R8(dst), false, Imm8(value)) => LoadShape::RegImmediate { dst, value },
            (true, R16(ptr), false, Imm8(value)) if ptr != SP => {
                LoadShape::PointerImmediate { ptr, value }
            }
            (true, Imm16(addr), false, R16(SP)) => LoadShape::StoreStackPointer { addr },
            (false, R16(dst), true, R16(SP)) if dst != SP => LoadShape::Pop { dst },
            (true, R16(SP), false, R16(src)) if src != SP => {
                LoadShape::Push { src }
            }
            (true, Imm8(offset), false, R8(src)) => LoadShape::HighStore { offset, src },
            (false, R8(dst), true, Imm8(offset)) => LoadShape::HighLoad { dst, offset },
            (true, Imm16(addr), false, R8(src)) => LoadShape::AbsoluteStore { addr, src },
            (false, R8(dst), true, Imm16(addr)) => LoadShape::AbsoluteLoad { dst, addr },
            (false, R8(dst), true, R8(port)) => LoadShape::PortLoad { dst, port },
            (true, R8(port), false, R8(src)) => LoadShape::PortStore { port, src },
            (false, R16(SP), false, R16(HL)) => LoadShape::StackFromHl,
            (false, R16(HL), false, R16(SP)) => match post_load {
                PostLoad::AddSigned(disp) => LoadShape::HlFromStackOffset { disp },
                _ => return None,
            },
            _ => return None,
        };

        // Pointer adjustments only accompany `(rr)` operands, and the signed
        // payload only `LD HL, SP+s8`.
        let adjustment_fits = match post_load {
            PostLoad::None => true,
            PostLoad::Increment | PostLoad::Decrement => matches!(
                shape,
                LoadShape::RegFromPointer { .. } | LoadShape::PointerFromReg { .. }
            ),
            PostLoad::AddSigned(_) => matches!(shape, LoadShape::HlFromStackOffset { .. }),
        };
        adjustment_fits.then_some(shape)
    }

    /// Stack traffic runs under the preset whose SP is clear of the
    /// register pointees.
    fn preset(self) -> PresetName {
        match self {
            LoadShape::StoreStackPointer { .. }
            | LoadShape::Pop { .. }
            | LoadShape::Push { .. }
            | LoadShape::StackFromHl
            | LoadShape::HlFromStackOffset { .. } => PresetName::Highstack,
            _ => PresetName::Default,
        }
    }
}

fn adjusted(ptr_value: u16, post_load: PostLoad) -> Option<u16> {
    match post_load {
        PostLoad::Increment => Some(ptr_value.wrapping_add(1)),
        PostLoad::Decrement => Some(ptr_value.wrapping_sub(1)),
        PostLoad::None | PostLoad::AddSigned(_) => None,
    }
}

impl Assembler<'_> {
    pub(super) fn load(
        &self,
        dst: Option<Operand>,
        src: Option<Operand>,
        post_load: PostLoad,
    ) -> Result<Trace, GenerateError> {
        let dst = self.require(dst, "destination")?;
        let src = self.require(src, "source")?;
        let shape = LoadShape::classify(dst, src, post_load).ok_or_else(|| {
            self.unsupported(format!("load {dst:?} <- {src:?} ({post_load:?})"))
        })?;

        let name = shape.preset();
        let preset = name.preset();
        let regs = &preset.regs;
        let mut q = CommandQueue::new();
        self.fetch(&mut q, preset);

        match shape {
            LoadShape::RegToReg { dst, src } => {
                q.push(Write::register8(dst, regs.get8(src)));
            }
            LoadShape::RegFromPointer { dst, ptr } => {
                let addr = regs.get16(ptr);
                if let Some(next) = adjusted(addr, post_load) {
                    q.push(Write::register16(ptr, next));
                }
                q.halt();
                q.push(Write::register8(dst, preset.read8(addr)));
            }
            LoadShape::PointerFromReg { ptr, src } => {
                let addr = regs.get16(ptr);
                q.push(Write::memory(addr, regs.get8(src)));
                if let Some(next) = adjusted(addr, post_load) {
                    q.push(Write::register16(ptr, next));
                }
                q.halt();
            }
            LoadShape::Reg16Immediate { dst, value } => {
                self.read_imm16(&mut q, preset, value)?;
                q.push(Write::register16(dst, value));
            }
            LoadShape::RegImmediate { dst, value } => {
                self.read_imm8(&mut q, preset, value)?;
                q.push(Write::register8(dst, value));
            }
            LoadShape::PointerImmediate { ptr, value } => {
                self.read_imm8(&mut q, preset, value)?;
                q.push(Write::memory(regs.get16(ptr), value));
                q.halt();
            }
            LoadShape::StoreStackPointer { addr } => {
                let [hi, lo] = regs.sp.to_be_bytes();
                self.read_imm16(&mut q, preset, addr)?;
                q.push(Write::memory(addr, lo));
                q.halt();
                q.push(Write::memory(addr.wrapping_add(1), hi));
                q.halt();
            }
            LoadShape::Pop { dst } => {
                let mut value = self.pop_word(&mut q, preset, false);
                if dst == Register16::AF {
                    // Lower 4 bits of F are always zero.
                    value &= 0xFFF0;
                }
                q.push(Write::register16(dst, value));
            }
            LoadShape::Push { src } => {
                self.push_word(&mut q, regs.sp, regs.get16(src));
            }
            LoadShape::HighStore { offset, src } => {
                self.read_imm8(&mut q, preset, offset)?;
                q.push(Write::memory(HIGH_PAGE | offset as u16, regs.get8(src)));
                q.halt();
            }
            LoadShape::HighLoad { dst, offset } => {
                self.read_imm8(&mut q, preset, offset)?;
                q.halt();
                q.push(Write::register8(dst, preset.read8(HIGH_PAGE | offset as u16)));
            }
            LoadShape::AbsoluteStore { addr, src } => {
                self.read_imm16(&mut q, preset, addr)?;
                q.push(Write::memory(addr, regs.get8(src)));
                q.halt();
            }
            LoadShape::AbsoluteLoad { dst, addr } => {
                self.read_imm16(&mut q, preset, addr)?;
                q.halt();
                q.push(Write::register8(dst, preset.read8(addr)));
            }
            LoadShape::PortLoad { dst, port } => {
                q.halt();
                let addr = HIGH_PAGE | regs.get8(port) as u16;
                q.push(Write::register8(dst, preset.read8(addr)));
            }
            LoadShape::PortStore { port, src } => {
                let addr = HIGH_PAGE | regs.get8(port) as u16;
                q.push(Write::memory(addr, regs.get8(src)));
                q.halt();
            }
            LoadShape::StackFromHl => {
                q.push(Write::register16(Register16::SP, regs.get16(Register16::HL)));
                q.halt();
            }
            LoadShape::HlFromStackOffset { disp } => {
                self.read_imm8(&mut q, preset, disp as u8)?;
                let [sp_hi, sp_lo] = regs.sp.to_be_bytes();
                let offset = disp as u8;

                // M3: low byte through the ALU, flags as an 8-bit ADD.
                let flags = alu::flags(AluOp::Add, sp_lo as u32, offset as u32, BYTE);
                let l = alu::value(AluOp::Add, sp_lo as u32, offset as u32, BYTE) as u8;
                q.push(Write::register8(Register8::L, l));
                q.extend(flags.writes());
                q.halt();

                // M4/M1: high byte, sign extension plus the low-byte carry.
                let extension: u8 = if disp < 0 { 0xFF } else { 0x00 };
                let carry = flags.c.unwrap_or(false) as u8;
                let h = sp_hi.wrapping_add(extension).wrapping_add(carry);
                q.push(Write::register8(Register8::H, h));
            }
        }
        Ok(Trace::single(name, q))
    }
}
