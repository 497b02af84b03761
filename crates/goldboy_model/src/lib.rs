//! Golden model of the Game Boy CPU's per-cycle behaviour.
//!
//! [`assemble`] turns one instruction descriptor into the expected
//! Write/Halt traces under fixed [`Preset`]s; [`generate`] runs it over a
//! whole descriptor source and produces the ordered, named test cases that
//! make up a [`Fixture`].

pub mod aggregate;
pub mod alu;
pub mod assemble;
mod error;
pub mod fixture;
pub mod preset;

pub use aggregate::{
    case_name, generate, GenerateOptions, GenerationReport, TestCase, UnsupportedInstruction,
};
pub use assemble::{assemble, Outcome, Trace};
pub use error::{FixtureError, GenerateError};
pub use fixture::{load_instructions, Fixture};
pub use preset::{presets, Preset, PresetName, Registers};
