use goldboy_common::{CommandQueue, Condition, JumpKind, Operand, OperandKind, Register16};

use super::{Assembler, Outcome, Trace};
use crate::error::GenerateError;
use crate::preset::{Preset, PresetName};

/// Presets a conditional branch is traced under, with their flags.
const BRANCH_PRESETS: [PresetName; 2] = [PresetName::Highstack, PresetName::Nznc];

fn preset_where(condition: Condition, holds: bool) -> PresetName {
    BRANCH_PRESETS
        .into_iter()
        .find(|name| condition.holds(name.preset().regs.f) == holds)
        .unwrap_or(PresetName::Highstack)
}

impl Assembler<'_> {
    pub(super) fn jump(
        &self,
        kind: JumpKind,
        condition: Option<Condition>,
        target: Option<Operand>,
    ) -> Result<Vec<Trace>, GenerateError> {
        if condition.is_some() && matches!(kind, JumpKind::Reti | JumpKind::Rst) {
            return Err(self.unsupported(format!("conditional {kind:?}")));
        }

        match (kind, target.map(|t| (t.kind, t.pointer))) {
            (JumpKind::Jp, Some((OperandKind::Imm16(addr), false))) => self.branch(
                condition,
                |q, preset| {
                    self.read_imm16(q, preset, addr)?;
                    Ok(addr)
                },
                |q, preset, addr| {
                    self.jump_to(q, preset, addr);
                    q.halt();
                },
            ),
            (JumpKind::Jp, Some((OperandKind::Register16(Register16::HL), _))) => {
                if condition.is_some() {
                    return Err(self.unsupported("conditional JP (HL)"));
                }
                let preset = PresetName::Highstack.preset();
                let mut q = CommandQueue::new();
                self.fetch(&mut q, preset);
                self.jump_to(&mut q, preset, preset.regs.get16(Register16::HL));
                Ok(vec![Trace::single(PresetName::Highstack, q)])
            }
            (JumpKind::Jr, Some((OperandKind::SignedImm8(disp), false))) => self.branch(
                condition,
                |q, preset| {
                    self.read_imm8(q, preset, disp as u8)?;
                    Ok(self.next_pc(preset).wrapping_add(disp as i16 as u16))
                },
                |q, preset, addr| {
                    self.jump_to(q, preset, addr);
                    q.halt();
                },
            ),
            (JumpKind::Call, Some((OperandKind::Imm16(addr), false))) => self.branch(
                condition,
                |q, preset| {
                    self.read_imm16(q, preset, addr)?;
                    Ok(addr)
                },
                |q, preset, addr| {
                    self.push_word(q, preset.regs.sp, self.next_pc(preset));
                    self.jump_to(q, preset, addr);
                },
            ),
            (JumpKind::Ret, None) => self.ret(condition, false),
            (JumpKind::Reti, None) => self.ret(None, true),
            (JumpKind::Rst, _) => self.rst(target),
            (kind, target) => Err(self.unsupported(format!("{kind:?} to {target:?}"))),
        }
    }

    /// Emits the shared prefix once per outcome, then the target half for
    /// the taken side only.
    ///
    /// `prefix` runs after the fetch and returns the branch target; `taken`
    /// emits the transfer of control.
    fn branch<P, T>(
        &self,
        condition: Option<Condition>,
        prefix: P,
        taken: T,
    ) -> Result<Vec<Trace>, GenerateError>
    where
        P: Fn(&mut CommandQueue, &Preset) -> Result<u16, GenerateError>,
        T: Fn(&mut CommandQueue, &Preset, u16),
    {
        let trace = |name: PresetName, outcome: Option<Outcome>| -> Result<Trace, GenerateError> {
            let preset = name.preset();
            let mut q = CommandQueue::new();
            self.fetch(&mut q, preset);
            let target = prefix(&mut q, preset)?;
            if outcome != Some(Outcome::NotTaken) {
                taken(&mut q, preset, target);
            }
            Ok(Trace {
                preset: name,
                outcome,
                queue: q,
            })
        };

        match condition {
            None => Ok(vec![trace(PresetName::Highstack, None)?]),
            Some(condition) => Ok(vec![
                trace(preset_where(condition, true), Some(Outcome::Taken))?,
                trace(preset_where(condition, false), Some(Outcome::NotTaken))?,
            ]),
        }
    }

    /// `RET`, `RET cc`, `RETI`. The conditional form spends one cycle on
    /// the condition check before popping.
    fn ret(
        &self,
        condition: Option<Condition>,
        enable_interrupts: bool,
    ) -> Result<Vec<Trace>, GenerateError> {
        let conditional = condition.is_some();
        self.branch(
            condition,
            |q, _| {
                if conditional {
                    q.halt();
                }
                Ok(0)
            },
            |q, preset, _| {
                let addr = self.pop_word(q, preset, enable_interrupts);
                self.jump_to(q, preset, addr);
                q.halt();
            },
        )
    }

    /// `RST n`: a call to a vector encoded in the opcode.
    fn rst(&self, target: Option<Operand>) -> Result<Vec<Trace>, GenerateError> {
        let vector = (self.opcode_byte() & 0x38) as u16;
        match target.map(|t| t.kind) {
            None => {}
            Some(OperandKind::Imm8(v)) if v as u16 == vector => {}
            Some(OperandKind::Imm16(v)) if v == vector => {}
            Some(other) => {
                return Err(self.malformed(format!(
                    "RST target {other:?} disagrees with vector 0x{vector:02X}"
                )))
            }
        }

        let preset = PresetName::Highstack.preset();
        let mut q = CommandQueue::new();
        self.fetch(&mut q, preset);
        self.push_word(&mut q, preset.regs.sp, self.next_pc(preset));
        self.jump_to(&mut q, preset, vector);
        Ok(vec![Trace::single(PresetName::Highstack, q)])
    }
}
