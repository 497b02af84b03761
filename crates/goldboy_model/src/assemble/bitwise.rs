use goldboy_common::{BitwiseOp, CommandQueue, Operand, OperandKind, Write};

use super::{Assembler, Trace};
use crate::alu;
use crate::error::GenerateError;
use crate::preset::PresetName;

impl Assembler<'_> {
    /// `BIT`/`RES`/`SET b, r` and their `(HL)` forms.
    pub(super) fn bitwise(
        &self,
        op: BitwiseOp,
        bit: Option<u8>,
        operand: Option<Operand>,
    ) -> Result<Trace, GenerateError> {
        let declared = self.require(bit, "bit number")?;
        let operand = self.require(operand, "operand")?;

        let preset = PresetName::Default.preset();
        let mut q = CommandQueue::new();
        self.fetch(&mut q, preset);
        let payload = self.prefix_cycle(&mut q, preset)?;

        // Each block spans 64 payloads: 8 bits times 8 operands.
        let bit = payload
            .checked_sub(op.block_base())
            .map(|offset| offset / 8)
            .filter(|&bit| bit < 8)
            .ok_or_else(|| {
                self.malformed(format!("payload 0x{payload:02X} is outside the {op:?} block"))
            })?;
        if bit != declared {
            return Err(self.malformed(format!(
                "opcode selects bit {bit} but the descriptor names bit {declared}"
            )));
        }
        let mask = 1u8 << bit;

        match operand {
            Operand {
                kind: OperandKind::Register8(r),
                pointer: false,
            } => {
                let v = preset.regs.get8(r);
                match op {
                    BitwiseOp::Bit => q.extend(alu::bit_test(v, bit).writes()),
                    BitwiseOp::Res => q.push(Write::register8(r, v & !mask)),
                    BitwiseOp::Set => q.push(Write::register8(r, v | mask)),
                }
            }
            Operand {
                kind: OperandKind::Register16(r),
                pointer: true,
            } => {
                let addr = preset.regs.get16(r);
                let v = preset.read8(addr);
                // M3: operand read
                q.halt();
                match op {
                    BitwiseOp::Bit => q.extend(alu::bit_test(v, bit).writes()),
                    BitwiseOp::Res | BitwiseOp::Set => {
                        let result = if op == BitwiseOp::Res {
                            v & !mask
                        } else {
                            v | mask
                        };
                        q.push(Write::memory(addr, result));
                        q.halt();
                    }
                }
            }
            other => return Err(self.unsupported(format!("{op:?} on {other:?}"))),
        }
        Ok(Trace::single(PresetName::Default, q))
    }
}
