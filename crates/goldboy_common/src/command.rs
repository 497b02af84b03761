//! Write/Halt micro-op vocabulary.
//!
//! A command queue is the full per-cycle trace of one instruction: writes
//! grouped into machine cycles by [`Command::Halt`] markers. The textual
//! form (`WRITE REG8 A 0x15`, `HALT`) is shared by the oracle's trace
//! protocol and the console report.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::register::{Flag, Register16, Register8};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Width {
    Byte,
    Word,
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Width::Byte => f.write_str("byte"),
            Width::Word => f.write_str("word"),
        }
    }
}

/// Hardware-visible destination of a write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteTarget {
    Register8(Register8),
    Register16(Register16),
    Memory(u16),
    Flag(Flag),
    InterruptMasterEnable,
    AddressBus,
    DataBus,
    ProgramCounter,
    InstructionRegister,
}

impl WriteTarget {
    pub fn width(self) -> Width {
        match self {
            WriteTarget::Register16(_) | WriteTarget::AddressBus | WriteTarget::ProgramCounter => {
                Width::Word
            }
            WriteTarget::Register8(_)
            | WriteTarget::Memory(_)
            | WriteTarget::Flag(_)
            | WriteTarget::InterruptMasterEnable
            | WriteTarget::DataBus
            | WriteTarget::InstructionRegister => Width::Byte,
        }
    }
}

impl fmt::Display for WriteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteTarget::Register8(r) => write!(f, "REG8 {r}"),
            WriteTarget::Register16(r) => write!(f, "REG16 {r}"),
            WriteTarget::Memory(addr) => write!(f, "MEM 0x{addr:04X}"),
            WriteTarget::Flag(flag) => write!(f, "FLAG {flag}"),
            WriteTarget::InterruptMasterEnable => f.write_str("IME"),
            WriteTarget::AddressBus => f.write_str("ADDRESS_BUS"),
            WriteTarget::DataBus => f.write_str("DATA_BUS"),
            WriteTarget::ProgramCounter => f.write_str("PC"),
            WriteTarget::InstructionRegister => f.write_str("IR"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Byte(u8),
    Word(u16),
}

impl Value {
    pub fn width(self) -> Width {
        match self {
            Value::Byte(_) => Width::Byte,
            Value::Word(_) => Width::Word,
        }
    }

    pub fn as_u16(self) -> u16 {
        match self {
            Value::Byte(v) => v as u16,
            Value::Word(v) => v,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Byte(v) => write!(f, "0x{v:02X}"),
            Value::Word(v) => write!(f, "0x{v:04X}"),
        }
    }
}

/// A single observable effect. Target and value widths always agree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "UncheckedWrite")]
pub struct Write {
    target: WriteTarget,
    value: Value,
}

#[derive(Deserialize)]
struct UncheckedWrite {
    target: WriteTarget,
    value: Value,
}

impl TryFrom<UncheckedWrite> for Write {
    type Error = ParseCommandError;

    fn try_from(raw: UncheckedWrite) -> Result<Self, Self::Error> {
        Write::new(raw.target, raw.value)
    }
}

impl Write {
    pub fn new(target: WriteTarget, value: Value) -> Result<Self, ParseCommandError> {
        if target.width() != value.width() {
            return Err(ParseCommandError::WidthMismatch {
                target: target.to_string(),
                width: target.width(),
            });
        }
        Ok(Self { target, value })
    }

    pub fn register8(r: Register8, value: u8) -> Self {
        Self {
            target: WriteTarget::Register8(r),
            value: Value::Byte(value),
        }
    }

    pub fn register16(r: Register16, value: u16) -> Self {
        Self {
            target: WriteTarget::Register16(r),
            value: Value::Word(value),
        }
    }

    pub fn memory(addr: u16, value: u8) -> Self {
        Self {
            target: WriteTarget::Memory(addr),
            value: Value::Byte(value),
        }
    }

    pub fn flag(flag: Flag, set: bool) -> Self {
        Self {
            target: WriteTarget::Flag(flag),
            value: Value::Byte(set as u8),
        }
    }

    pub fn ime(enabled: bool) -> Self {
        Self {
            target: WriteTarget::InterruptMasterEnable,
            value: Value::Byte(enabled as u8),
        }
    }

    pub fn address_bus(addr: u16) -> Self {
        Self {
            target: WriteTarget::AddressBus,
            value: Value::Word(addr),
        }
    }

    pub fn data_bus(value: u8) -> Self {
        Self {
            target: WriteTarget::DataBus,
            value: Value::Byte(value),
        }
    }

    pub fn pc(addr: u16) -> Self {
        Self {
            target: WriteTarget::ProgramCounter,
            value: Value::Word(addr),
        }
    }

    pub fn ir(opcode: u8) -> Self {
        Self {
            target: WriteTarget::InstructionRegister,
            value: Value::Byte(opcode),
        }
    }

    #[inline]
    pub fn target(&self) -> WriteTarget {
        self.target
    }

    #[inline]
    pub fn value(&self) -> Value {
        self.value
    }
}

impl fmt::Display for Write {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WRITE {} {}", self.target, self.value)
    }
}

/// Low-power states entered by `HALT` and `STOP`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suspend {
    Halt,
    Stop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Write(Write),
    /// End of a machine cycle.
    Halt,
    /// CPU suspension request; does not end a cycle.
    Suspend(Suspend),
}

impl Command {
    #[inline]
    pub fn is_halt(&self) -> bool {
        matches!(self, Command::Halt)
    }
}

impl From<Write> for Command {
    fn from(write: Write) -> Self {
        Command::Write(write)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Write(w) => w.fmt(f),
            Command::Halt => f.write_str("HALT"),
            Command::Suspend(Suspend::Halt) => f.write_str("SUSPEND HALT"),
            Command::Suspend(Suspend::Stop) => f.write_str("SUSPEND STOP"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("empty command line")]
    Empty,

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("unknown write target '{0}'")]
    UnknownTarget(String),

    #[error("missing {0}")]
    Missing(&'static str),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("value does not fit {target}, which takes a {width}")]
    WidthMismatch { target: String, width: Width },

    #[error("unexpected trailing input '{0}'")]
    Trailing(String),
}

fn parse_number(token: &str) -> Result<u32, ParseCommandError> {
    let parsed = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => token.parse::<u32>(),
    };
    parsed.map_err(|_| ParseCommandError::InvalidNumber(token.to_string()))
}

fn parse_target<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
) -> Result<WriteTarget, ParseCommandError> {
    let kind = tokens.next().ok_or(ParseCommandError::Missing("write target"))?;
    let mut operand = || tokens.next().ok_or(ParseCommandError::Missing("target operand"));
    let target = match kind.to_ascii_uppercase().as_str() {
        "REG8" => WriteTarget::Register8(
            operand()?
                .parse()
                .map_err(ParseCommandError::UnknownTarget)?,
        ),
        "REG16" => WriteTarget::Register16(
            operand()?
                .parse()
                .map_err(ParseCommandError::UnknownTarget)?,
        ),
        "FLAG" => WriteTarget::Flag(
            operand()?
                .parse()
                .map_err(ParseCommandError::UnknownTarget)?,
        ),
        "MEM" => {
            let token = operand()?;
            let addr = u16::try_from(parse_number(token)?).map_err(|_| {
                ParseCommandError::InvalidNumber(token.to_string())
            })?;
            WriteTarget::Memory(addr)
        }
        "IME" => WriteTarget::InterruptMasterEnable,
        "ADDRESS_BUS" => WriteTarget::AddressBus,
        "DATA_BUS" => WriteTarget::DataBus,
        "PC" => WriteTarget::ProgramCounter,
        "IR" => WriteTarget::InstructionRegister,
        other => return Err(ParseCommandError::UnknownTarget(other.to_string())),
    };
    Ok(target)
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let head = tokens.next().ok_or(ParseCommandError::Empty)?;
        let command = match head.to_ascii_uppercase().as_str() {
            "HALT" => Command::Halt,
            "SUSPEND" => {
                let state = tokens.next().ok_or(ParseCommandError::Missing("suspend state"))?;
                match state.to_ascii_uppercase().as_str() {
                    "HALT" => Command::Suspend(Suspend::Halt),
                    "STOP" => Command::Suspend(Suspend::Stop),
                    other => return Err(ParseCommandError::UnknownCommand(format!("SUSPEND {other}"))),
                }
            }
            "WRITE" => {
                let target = parse_target(&mut tokens)?;
                let token = tokens.next().ok_or(ParseCommandError::Missing("value"))?;
                let raw = parse_number(token)?;
                let mismatch = || ParseCommandError::WidthMismatch {
                    target: target.to_string(),
                    width: target.width(),
                };
                let value = match target.width() {
                    Width::Byte => Value::Byte(u8::try_from(raw).map_err(|_| mismatch())?),
                    Width::Word => Value::Word(u16::try_from(raw).map_err(|_| mismatch())?),
                };
                Command::Write(Write::new(target, value)?)
            }
            other => return Err(ParseCommandError::UnknownCommand(other.to_string())),
        };
        match tokens.next() {
            Some(extra) => Err(ParseCommandError::Trailing(extra.to_string())),
            None => Ok(command),
        }
    }
}

/// Ordered, append-only trace of one instruction execution.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandQueue(Vec<Command>);

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, command: impl Into<Command>) {
        self.0.push(command.into());
    }

    /// Ends the current machine cycle.
    #[inline]
    pub fn halt(&mut self) {
        self.0.push(Command::Halt);
    }

    pub fn extend<I>(&mut self, commands: I)
    where
        I: IntoIterator,
        I::Item: Into<Command>,
    {
        self.0.extend(commands.into_iter().map(Into::into));
    }

    #[inline]
    pub fn commands(&self) -> &[Command] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn halt_count(&self) -> usize {
        self.0.iter().filter(|c| c.is_halt()).count()
    }

    /// Commands of each machine cycle, without the Halt markers.
    ///
    /// A queue with `n` halts yields `n + 1` groups; the last one is the
    /// cycle shared with the next instruction's fetch.
    pub fn cycles(&self) -> impl Iterator<Item = &[Command]> {
        self.0.split(Command::is_halt)
    }

    pub fn writes(&self) -> impl Iterator<Item = &Write> {
        self.0.iter().filter_map(|c| match c {
            Command::Write(w) => Some(w),
            _ => None,
        })
    }
}

impl FromIterator<Command> for CommandQueue {
    fn from_iter<T: IntoIterator<Item = Command>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CommandQueue {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
