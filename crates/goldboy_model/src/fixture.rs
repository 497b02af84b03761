//! JSON files read and written by the generator.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use goldboy_common::InstructionSource;
use serde::{Deserialize, Serialize};

use crate::aggregate::{GenerationReport, TestCase, UnsupportedInstruction};
use crate::error::FixtureError;

/// The expected-trace fixture: every generated test case, in canonical order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub test_cases: Vec<TestCase>,
    /// Instructions the generator skipped, carried along for the compare report.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unsupported: Vec<UnsupportedInstruction>,
}

impl From<GenerationReport> for Fixture {
    fn from(report: GenerationReport) -> Self {
        Self {
            test_cases: report.test_cases,
            unsupported: report.unsupported,
        }
    }
}

impl Fixture {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save(&self, path: impl AsRef<Path>, pretty: bool) -> Result<(), FixtureError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer, pretty)?;
        writer.flush()?;
        Ok(())
    }

    /// Serializes with a trailing newline.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), FixtureError> {
        if pretty {
            serde_json::to_writer_pretty(&mut *writer, self)?;
        } else {
            serde_json::to_writer(&mut *writer, self)?;
        }
        writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&TestCase> {
        self.test_cases.iter().find(|case| case.name == name)
    }
}

/// Reads the instruction descriptor source.
pub fn load_instructions(path: impl AsRef<Path>) -> Result<InstructionSource, FixtureError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
