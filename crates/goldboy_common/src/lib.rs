//! Types shared by the golden model and the oracle runner.
//!
//! The golden model consumes [`Descriptor`]s and produces [`CommandQueue`]s;
//! the oracle parses the emulator's trace into the same vocabulary so both
//! sides can be compared cycle by cycle.

pub mod command;
pub mod instruction;
pub mod opcode;
pub mod register;

pub use command::{
    Command, CommandQueue, ParseCommandError, Suspend, Value, Width, Write, WriteTarget,
};
pub use instruction::{
    ArithOp, BitwiseOp, Condition, ControlOp, Descriptor, InstructionEntry, InstructionSource,
    JumpKind, Operand, OperandKind, Params, PostLoad, RotateOp,
};
pub use opcode::{effective_opcode, EffectiveOpcode, CB_PREFIX};
pub use register::{Flag, Flags, Register16, Register8};
