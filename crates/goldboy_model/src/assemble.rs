//! Command queue assemblers.
//!
//! Each instruction category lives in its own file as an `impl Assembler`
//! block; [`assemble`] dispatches on the descriptor's parameter tree and
//! checks every produced trace against the declared duration.

mod arith;
mod bitwise;
mod control;
mod helpers;
mod jump;
mod load;
mod rotate;

#[cfg(test)]
mod tests;

use std::fmt;

use goldboy_common::{CommandQueue, Descriptor, EffectiveOpcode, JumpKind, Params};
use serde::{Deserialize, Serialize};

use crate::error::GenerateError;
use crate::preset::PresetName;

/// Which side of a conditional branch a trace follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Taken,
    NotTaken,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Taken => "taken",
            Outcome::NotTaken => "not_taken",
        }
    }

    /// Machine cycles a not-taken branch saves over the taken one.
    fn cycles_saved(self, kind: JumpKind) -> u8 {
        match (self, kind) {
            (Outcome::Taken, _) => 0,
            (Outcome::NotTaken, JumpKind::Jp | JumpKind::Jr) => 1,
            (Outcome::NotTaken, JumpKind::Call | JumpKind::Ret) => 3,
            (Outcome::NotTaken, JumpKind::Reti | JumpKind::Rst) => 0,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One expected execution of an instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trace {
    pub preset: PresetName,
    pub outcome: Option<Outcome>,
    pub queue: CommandQueue,
}

impl Trace {
    fn single(preset: PresetName, queue: CommandQueue) -> Self {
        Self {
            preset,
            outcome: None,
            queue,
        }
    }
}

pub(crate) struct Assembler<'a> {
    descriptor: &'a Descriptor,
    /// Raw instruction bytes in stream order.
    bytes: Vec<u8>,
    opcode: EffectiveOpcode,
}

impl<'a> Assembler<'a> {
    fn new(descriptor: &'a Descriptor) -> Result<Self, GenerateError> {
        let opcode = descriptor.effective_opcode();
        let bytes = descriptor.bytes().ok_or_else(|| GenerateError::Malformed {
            machine_code: descriptor.machine_code,
            reason: format!(
                "machine code does not fit its byte length {}",
                descriptor.byte_length
            ),
        })?;
        if bytes[0] != opcode.leading() {
            return Err(GenerateError::Malformed {
                machine_code: descriptor.machine_code,
                reason: format!("leading byte 0x{:02X} is not an opcode", bytes[0]),
            });
        }
        Ok(Self {
            descriptor,
            bytes,
            opcode,
        })
    }

    fn check_duration(&self, trace: &Trace) -> Result<(), GenerateError> {
        let saved = match (trace.outcome, self.descriptor.params) {
            (Some(outcome), Params::Jump { kind, .. }) => outcome.cycles_saved(kind),
            _ => 0,
        };
        let expected = self.descriptor.duration.checked_sub(saved).ok_or_else(|| {
            self.malformed(format!("duration {} is too short", self.descriptor.duration))
        })?;
        let halts = trace.queue.halt_count();
        if halts != expected as usize {
            return Err(self.malformed(format!(
                "declared {} machine cycles but the {} trace spans {}",
                expected,
                trace.outcome.map_or("single", Outcome::as_str),
                halts
            )));
        }
        Ok(())
    }
}

/// Builds every expected trace of `descriptor`.
///
/// Branches with a condition yield a taken and a not-taken trace; every
/// other instruction yields exactly one.
pub fn assemble(descriptor: &Descriptor) -> Result<Vec<Trace>, GenerateError> {
    let asm = Assembler::new(descriptor)?;
    let traces = match descriptor.params {
        Params::Arithmetic8 { op, lhs, rhs } => vec![asm.arithmetic8(op, lhs, rhs)?],
        Params::Arithmetic16 { op, lhs, rhs } => vec![asm.arithmetic16(op, lhs, rhs)?],
        Params::Bitwise { op, bit, operand } => vec![asm.bitwise(op, bit, operand)?],
        Params::Load {
            dst,
            src,
            post_load,
        } => vec![asm.load(dst, src, post_load)?],
        Params::Jump {
            kind,
            condition,
            target,
        } => asm.jump(kind, condition, target)?,
        Params::Rotate { op, operand } => vec![asm.rotate(op, operand)?],
        Params::Control { op } => vec![asm.control(op)?],
    };

    for trace in &traces {
        asm.check_duration(trace)?;
        log::debug!(
            "{} {}: {} commands under '{}'",
            asm.opcode,
            trace.outcome.map_or("", Outcome::as_str),
            trace.queue.len(),
            trace.preset
        );
    }
    Ok(traces)
}
