use goldboy_common::{Command, CommandQueue, ControlOp, Suspend, Write};

use super::{Assembler, Trace};
use crate::error::GenerateError;
use crate::preset::PresetName;

impl Assembler<'_> {
    /// `NOP`, `HALT`, `STOP`, `DI`, `EI`: the fetch plus at most one effect.
    pub(super) fn control(&self, op: ControlOp) -> Result<Trace, GenerateError> {
        let preset = PresetName::Default.preset();
        let mut q = CommandQueue::new();
        self.fetch(&mut q, preset);
        match op {
            ControlOp::Nop => {}
            ControlOp::Halt => q.push(Command::Suspend(Suspend::Halt)),
            ControlOp::Stop => q.push(Command::Suspend(Suspend::Stop)),
            ControlOp::Di => q.push(Write::ime(false)),
            ControlOp::Ei => q.push(Write::ime(true)),
        }
        Ok(Trace::single(PresetName::Default, q))
    }
}
