use goldboy_common::{CommandQueue, Flag, Operand, OperandKind, Register8, RotateOp, Write};

use super::{Assembler, Trace};
use crate::alu;
use crate::error::GenerateError;
use crate::preset::PresetName;

impl Assembler<'_> {
    pub(super) fn rotate(
        &self,
        op: RotateOp,
        operand: Option<Operand>,
    ) -> Result<Trace, GenerateError> {
        if self.opcode.is_prefixed() {
            self.rotate_cb(op, self.require(operand, "operand")?)
        } else {
            self.rotate_accumulator(op, operand)
        }
    }

    /// `RLCA`, `RRCA`, `RLA`, `RRA`: Z is always cleared.
    fn rotate_accumulator(
        &self,
        op: RotateOp,
        operand: Option<Operand>,
    ) -> Result<Trace, GenerateError> {
        if !matches!(
            op,
            RotateOp::Rlc | RotateOp::Rrc | RotateOp::Rl | RotateOp::Rr
        ) {
            return Err(self.unsupported(format!("{op:?} has no accumulator form")));
        }
        if let Some(operand) = operand {
            if Self::direct_reg8(operand) != Some(Register8::A) {
                return Err(self.unsupported(format!("unprefixed {op:?} of {operand:?}")));
            }
        }

        let preset = PresetName::Default.preset();
        let (result, flags) = alu::rotate(op, preset.regs.a, preset.regs.flag(Flag::C));
        let mut q = CommandQueue::new();
        self.fetch(&mut q, preset);
        q.push(Write::register8(Register8::A, result));
        q.extend(flags.with_zero(false).writes());
        Ok(Trace::single(PresetName::Default, q))
    }

    fn rotate_cb(&self, op: RotateOp, operand: Operand) -> Result<Trace, GenerateError> {
        let preset = PresetName::Default.preset();
        let carry = preset.regs.flag(Flag::C);
        let mut q = CommandQueue::new();
        self.fetch(&mut q, preset);
        self.prefix_cycle(&mut q, preset)?;

        match operand {
            Operand {
                kind: OperandKind::Register8(r),
                pointer: false,
            } => {
                let (result, flags) = alu::rotate(op, preset.regs.get8(r), carry);
                q.push(Write::register8(r, result));
                q.extend(flags.writes());
            }
            Operand {
                kind: OperandKind::Register16(r),
                pointer: true,
            } => {
                let addr = preset.regs.get16(r);
                let (result, flags) = alu::rotate(op, preset.read8(addr), carry);
                // M3: operand read
                q.halt();
                q.push(Write::memory(addr, result));
                q.extend(flags.writes());
                q.halt();
            }
            other => return Err(self.unsupported(format!("{op:?} on {other:?}"))),
        }
        Ok(Trace::single(PresetName::Default, q))
    }
}
