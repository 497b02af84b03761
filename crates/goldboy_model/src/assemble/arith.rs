use goldboy_common::{
    ArithOp, CommandQueue, Flag, Operand, OperandKind, Register16, Register8, Write,
};

use super::{Assembler, Trace};
use crate::alu::{self, AluOp, FlagStates, BYTE, WORD};
use crate::error::GenerateError;
use crate::preset::PresetName;

fn alu_op(op: ArithOp) -> Option<AluOp> {
    match op {
        ArithOp::Add => Some(AluOp::Add),
        ArithOp::Adc => Some(AluOp::Adc),
        ArithOp::Sub => Some(AluOp::Sub),
        ArithOp::Sbc => Some(AluOp::Sbc),
        ArithOp::And => Some(AluOp::And),
        ArithOp::Or => Some(AluOp::Or),
        ArithOp::Xor => Some(AluOp::Xor),
        ArithOp::Cp => Some(AluOp::Cp),
        _ => None,
    }
}

impl Assembler<'_> {
    pub(super) fn arithmetic8(
        &self,
        op: ArithOp,
        lhs: Option<Operand>,
        rhs: Option<Operand>,
    ) -> Result<Trace, GenerateError> {
        if let Some(alu) = alu_op(op) {
            return self.accumulator_alu(alu, lhs, rhs);
        }
        match op {
            ArithOp::Inc | ArithOp::Dec => self.inc_dec8(op, self.require(lhs, "operand")?),
            ArithOp::Daa | ArithOp::Cpl | ArithOp::Scf | ArithOp::Ccf => {
                Ok(self.accumulator_misc(op))
            }
            _ => Err(self.unsupported(format!("{op:?} is not an 8-bit operation"))),
        }
    }

    /// `ADD A,r` .. `CP d8`: the accumulator is the fixed first operand.
    fn accumulator_alu(
        &self,
        alu: AluOp,
        lhs: Option<Operand>,
        rhs: Option<Operand>,
    ) -> Result<Trace, GenerateError> {
        if let Some(lhs) = lhs {
            if Self::direct_reg8(lhs) != Some(Register8::A) {
                return Err(self.unsupported(format!("{alu:?} into {lhs:?}")));
            }
        }
        let rhs = self.require(rhs, "second operand")?;

        let preset = PresetName::Default.preset();
        debug_assert!(preset.regs.flag(Flag::C), "carry-in ops assume C set");
        let a = preset.regs.a;
        let mut q = CommandQueue::new();
        self.fetch(&mut q, preset);

        let mut from_memory = false;
        let b = match rhs {
            Operand {
                kind: OperandKind::Register8(r),
                pointer: false,
            } => preset.regs.get8(r),
            Operand {
                kind: OperandKind::Register16(r),
                pointer: true,
            } => {
                from_memory = true;
                self.bus_read(&mut q, preset, preset.regs.get16(r))
            }
            Operand {
                kind: OperandKind::Imm8(v),
                pointer: false,
            } => {
                self.read_imm8(&mut q, preset, v)?;
                v
            }
            other => return Err(self.unsupported(format!("{alu:?} with operand {other:?}"))),
        };

        if alu != AluOp::Cp {
            let result = alu::value(alu, a as u32, b as u32, BYTE) as u8;
            q.push(Write::register8(Register8::A, result));
        }
        q.extend(alu::flags(alu, a as u32, b as u32, BYTE).writes());
        if from_memory {
            self.restore_buses(&mut q, preset);
        }
        Ok(Trace::single(PresetName::Default, q))
    }

    /// `INC r` / `DEC r` / `INC (HL)` / `DEC (HL)`. Carry is never written.
    fn inc_dec8(&self, op: ArithOp, operand: Operand) -> Result<Trace, GenerateError> {
        let alu = if op == ArithOp::Inc {
            AluOp::Add
        } else {
            AluOp::Sub
        };
        let preset = PresetName::Default.preset();
        let mut q = CommandQueue::new();
        self.fetch(&mut q, preset);

        match operand {
            Operand {
                kind: OperandKind::Register8(r),
                pointer: false,
            } => {
                let v = preset.regs.get8(r) as u32;
                q.push(Write::register8(r, alu::value(alu, v, 1, BYTE) as u8));
                q.extend(alu::flags(alu, v, 1, BYTE).without_carry().writes());
            }
            Operand {
                kind: OperandKind::Register16(r),
                pointer: true,
            } => {
                let addr = preset.regs.get16(r);
                let v = self.bus_read(&mut q, preset, addr) as u32;
                let result = alu::value(alu, v, 1, BYTE) as u8;
                q.push(Write::data_bus(result));
                q.push(Write::memory(addr, result));
                q.extend(alu::flags(alu, v, 1, BYTE).without_carry().writes());
                q.halt();
                self.restore_buses(&mut q, preset);
            }
            other => return Err(self.unsupported(format!("{op:?} of {other:?}"))),
        }
        Ok(Trace::single(PresetName::Default, q))
    }

    /// `DAA`, `CPL`, `SCF`, `CCF`: single-cycle accumulator and carry fixes.
    fn accumulator_misc(&self, op: ArithOp) -> Trace {
        let preset = PresetName::Default.preset();
        let regs = &preset.regs;
        let mut q = CommandQueue::new();
        self.fetch(&mut q, preset);

        let keep = FlagStates::UNAFFECTED;
        match op {
            ArithOp::Daa => {
                let (result, flags) = alu::daa(regs.a, regs.f);
                q.push(Write::register8(Register8::A, result));
                q.extend(flags.writes());
            }
            ArithOp::Cpl => {
                q.push(Write::register8(Register8::A, !regs.a));
                q.extend(
                    FlagStates {
                        n: Some(true),
                        h: Some(true),
                        ..keep
                    }
                    .writes(),
                );
            }
            ArithOp::Scf | ArithOp::Ccf => {
                let carry = op == ArithOp::Scf || !regs.flag(Flag::C);
                q.extend(
                    FlagStates {
                        n: Some(false),
                        h: Some(false),
                        c: Some(carry),
                        ..keep
                    }
                    .writes(),
                );
            }
            _ => {}
        }
        Trace::single(PresetName::Default, q)
    }

    pub(super) fn arithmetic16(
        &self,
        op: ArithOp,
        lhs: Option<Operand>,
        rhs: Option<Operand>,
    ) -> Result<Trace, GenerateError> {
        let lhs = self.require(lhs, "operand")?;
        match (op, lhs.kind, lhs.pointer, rhs.map(|o| (o.kind, o.pointer))) {
            (ArithOp::Inc | ArithOp::Dec, OperandKind::Register16(r), false, None) => {
                Ok(self.inc_dec16(op, r))
            }
            (
                ArithOp::Add,
                OperandKind::Register16(Register16::HL),
                false,
                Some((OperandKind::Register16(r), false)),
            ) => Ok(self.add_hl(r)),
            (
                ArithOp::Add,
                OperandKind::Register16(Register16::SP),
                false,
                Some((OperandKind::SignedImm8(d), false)),
            ) => self.add_sp(d),
            _ => Err(self.unsupported(format!("16-bit {op:?} of {lhs:?}, {rhs:?}"))),
        }
    }

    /// `INC rr` / `DEC rr`: no flags, one internal cycle.
    fn inc_dec16(&self, op: ArithOp, r: Register16) -> Trace {
        let preset = PresetName::Default.preset();
        let v = preset.regs.get16(r);
        let result = if op == ArithOp::Inc {
            v.wrapping_add(1)
        } else {
            v.wrapping_sub(1)
        };
        let mut q = CommandQueue::new();
        self.fetch(&mut q, preset);
        q.push(Write::register16(r, result));
        q.halt();
        Trace::single(PresetName::Default, q)
    }

    /// `ADD HL,rr`: the 8-bit ALU adds the low bytes, then the high bytes
    /// with the carry. Flags are written after each pass, Z untouched.
    fn add_hl(&self, r: Register16) -> Trace {
        let preset = PresetName::Default.preset();
        let hl = preset.regs.get16(Register16::HL);
        let rhs = preset.regs.get16(r);
        let [hl_hi, hl_lo] = hl.to_be_bytes();
        let [rhs_hi, rhs_lo] = rhs.to_be_bytes();

        let mut q = CommandQueue::new();
        self.fetch(&mut q, preset);

        // M2: low bytes
        let low = alu::flags(AluOp::Add, hl_lo as u32, rhs_lo as u32, BYTE).without_zero();
        let l = alu::value(AluOp::Add, hl_lo as u32, rhs_lo as u32, BYTE) as u8;
        q.push(Write::register8(Register8::L, l));
        q.extend(low.writes());
        q.halt();

        // M3/M1: high bytes plus carry
        let carry = low.c.unwrap_or(false) as u8;
        let h = hl_hi.wrapping_add(rhs_hi).wrapping_add(carry);
        q.push(Write::register8(Register8::H, h));
        q.extend(
            alu::flags(AluOp::Add, hl as u32, rhs as u32, WORD)
                .without_zero()
                .writes(),
        );
        Trace::single(PresetName::Default, q)
    }

    /// `ADD SP,s8`: flags come from the low-byte add with Z and N cleared.
    fn add_sp(&self, d: i8) -> Result<Trace, GenerateError> {
        let preset = PresetName::Highstack.preset();
        let sp = preset.regs.sp;
        let mut q = CommandQueue::new();
        self.fetch(&mut q, preset);
        self.read_imm8(&mut q, preset, d as u8)?;

        q.extend(
            alu::flags(AluOp::Add, (sp & 0xFF) as u32, d as u8 as u32, BYTE)
                .with_zero(false)
                .writes(),
        );
        q.halt();
        q.halt();
        q.push(Write::register16(
            Register16::SP,
            sp.wrapping_add(d as i16 as u16),
        ));
        Ok(Trace::single(PresetName::Highstack, q))
    }
}
