//! Machine-cycle shapes shared by several instruction categories.

use goldboy_common::{CommandQueue, Operand, OperandKind, Register16, Register8, Write};

use super::Assembler;
use crate::error::GenerateError;
use crate::preset::Preset;

/// Base of the high page addressed by `LDH` and `(C)` operands.
pub(super) const HIGH_PAGE: u16 = 0xFF00;

impl Assembler<'_> {
    pub(super) fn unsupported(&self, reason: impl Into<String>) -> GenerateError {
        GenerateError::Unsupported {
            machine_code: self.descriptor.machine_code,
            reason: reason.into(),
        }
    }

    pub(super) fn malformed(&self, reason: impl Into<String>) -> GenerateError {
        GenerateError::Malformed {
            machine_code: self.descriptor.machine_code,
            reason: reason.into(),
        }
    }

    /// Unwraps a descriptor field that the category requires.
    pub(super) fn require<T>(&self, field: Option<T>, name: &str) -> Result<T, GenerateError> {
        field.ok_or_else(|| self.malformed(format!("missing {name}")))
    }

    #[inline]
    pub(super) fn opcode_byte(&self) -> u8 {
        self.bytes[0]
    }

    #[inline]
    pub(super) fn next_pc(&self, preset: &Preset) -> u16 {
        preset.regs.pc.wrapping_add(self.bytes.len() as u16)
    }

    /// M1: the opcode at PC is latched into IR.
    pub(super) fn fetch(&self, q: &mut CommandQueue, preset: &Preset) {
        q.push(Write::pc(preset.regs.pc.wrapping_add(1)));
        q.push(Write::ir(self.opcode_byte()));
        q.halt();
    }

    /// M2 of CB-page instructions: the payload byte replaces the prefix in IR.
    pub(super) fn prefix_cycle(
        &self,
        q: &mut CommandQueue,
        preset: &Preset,
    ) -> Result<u8, GenerateError> {
        let payload = self
            .opcode
            .payload()
            .ok_or_else(|| self.malformed("CB-page instruction without payload byte"))?;
        q.push(Write::pc(preset.regs.pc.wrapping_add(2)));
        q.push(Write::ir(payload));
        q.halt();
        Ok(payload)
    }

    /// One cycle per immediate byte, low byte first.
    ///
    /// The bytes must be the tail of the raw instruction.
    pub(super) fn read_immediates(
        &self,
        q: &mut CommandQueue,
        preset: &Preset,
        immediates: &[u8],
    ) -> Result<(), GenerateError> {
        if self.bytes[1..] != *immediates {
            return Err(self.malformed(format!(
                "immediate bytes {:02X?} do not match the instruction stream {:02X?}",
                immediates, self.bytes
            )));
        }
        for (i, &byte) in immediates.iter().enumerate() {
            q.push(Write::pc(preset.regs.pc.wrapping_add(2 + i as u16)));
            q.push(Write::ir(byte));
            q.halt();
        }
        Ok(())
    }

    #[inline]
    pub(super) fn read_imm8(
        &self,
        q: &mut CommandQueue,
        preset: &Preset,
        value: u8,
    ) -> Result<(), GenerateError> {
        self.read_immediates(q, preset, &[value])
    }

    #[inline]
    pub(super) fn read_imm16(
        &self,
        q: &mut CommandQueue,
        preset: &Preset,
        value: u16,
    ) -> Result<(), GenerateError> {
        self.read_immediates(q, preset, &value.to_le_bytes())
    }

    /// After an `(HL)`-style operand read, the buses return to the
    /// address and byte of the opcode fetch.
    pub(super) fn restore_buses(&self, q: &mut CommandQueue, preset: &Preset) {
        q.push(Write::address_bus(preset.regs.pc.wrapping_add(1)));
        q.push(Write::data_bus(self.opcode_byte()));
    }

    /// Places the memory operand on the buses and spends the cycle reading it.
    pub(super) fn bus_read(&self, q: &mut CommandQueue, preset: &Preset, addr: u16) -> u8 {
        let value = preset.read8(addr);
        q.push(Write::address_bus(addr));
        q.push(Write::data_bus(value));
        q.halt();
        value
    }

    /// Writes the high byte then the low byte of `value` below `sp`,
    /// decrementing SP before each write. Three cycles.
    pub(super) fn push_word(&self, q: &mut CommandQueue, sp: u16, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        let sp1 = sp.wrapping_sub(1);
        let sp2 = sp.wrapping_sub(2);
        q.push(Write::register16(Register16::SP, sp1));
        q.halt();
        q.push(Write::memory(sp1, hi));
        q.push(Write::register16(Register16::SP, sp2));
        q.halt();
        q.push(Write::memory(sp2, lo));
        q.halt();
    }

    /// Advances SP over two bytes, one per cycle, and returns the popped
    /// word (low byte at the old SP). `enable_interrupts` adds the RETI
    /// IME write.
    pub(super) fn pop_word(
        &self,
        q: &mut CommandQueue,
        preset: &Preset,
        enable_interrupts: bool,
    ) -> u16 {
        let sp = preset.regs.sp;
        q.push(Write::register16(Register16::SP, sp.wrapping_add(1)));
        q.halt();
        q.push(Write::register16(Register16::SP, sp.wrapping_add(2)));
        if enable_interrupts {
            q.push(Write::ime(true));
        }
        q.halt();
        preset.read16(sp)
    }

    /// PC moves to `target` and the byte there is latched as the next opcode.
    pub(super) fn jump_to(&self, q: &mut CommandQueue, preset: &Preset, target: u16) {
        q.push(Write::pc(target));
        q.push(Write::ir(preset.read8(target)));
    }

    /// Operand value as a direct 8-bit register, if that is its shape.
    pub(super) fn direct_reg8(operand: Operand) -> Option<Register8> {
        match operand {
            Operand {
                kind: OperandKind::Register8(r),
                pointer: false,
            } => Some(r),
            _ => None,
        }
    }

    /// Register holding a memory address, for `(rr)` operands.
    pub(super) fn pointer_reg16(operand: Operand) -> Option<Register16> {
        match operand {
            Operand {
                kind: OperandKind::Register16(r),
                pointer: true,
            } => Some(r),
            _ => None,
        }
    }
}
