//! Batch generation: canonical ordering, de-duplication and naming of the
//! test cases produced by the assemblers.

use goldboy_common::{CommandQueue, Descriptor, EffectiveOpcode, InstructionEntry};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::assemble::{assemble, Outcome};
use crate::error::GenerateError;
use crate::preset::PresetName;

/// One expected execution, as stored in the fixture.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub instruction: Descriptor,
    pub preset: PresetName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    pub command_queue: CommandQueue,
}

impl TestCase {
    #[inline]
    pub fn effective_opcode(&self) -> EffectiveOpcode {
        self.instruction.effective_opcode()
    }
}

/// `0x80`, `0xCB40`, `0xC2_taken`.
pub fn case_name(opcode: EffectiveOpcode, outcome: Option<Outcome>) -> String {
    match outcome {
        Some(outcome) => format!("{opcode}_{outcome}"),
        None => opcode.to_string(),
    }
}

#[derive(Clone, Debug, TypedBuilder)]
pub struct GenerateOptions {
    /// Fail the batch if any instruction was skipped as unsupported.
    #[builder(default)]
    pub strict: bool,
    /// Effective opcodes left out of the batch.
    #[builder(default)]
    pub exclude: Vec<u16>,
    #[builder(default = true)]
    pub pretty: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// An instruction no assembler rule matched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsupportedInstruction {
    pub instruction: String,
    pub machine_code: u32,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub test_cases: Vec<TestCase>,
    pub unsupported: Vec<UnsupportedInstruction>,
}

/// Assembles every entry into test cases.
///
/// Entries are ordered by effective opcode (stable, so the first entry for
/// an opcode wins) and de-duplicated on it before assembly. Unsupported
/// encodings are logged and collected; a malformed descriptor aborts.
pub fn generate(
    entries: &[InstructionEntry],
    options: &GenerateOptions,
) -> Result<GenerationReport, GenerateError> {
    log::info!("generating test cases for {} instructions", entries.len());

    let mut ordered: Vec<&InstructionEntry> = entries.iter().collect();
    ordered.sort_by_key(|entry| entry.descriptor.effective_opcode());
    ordered.dedup_by_key(|entry| entry.descriptor.effective_opcode());

    let mut report = GenerationReport::default();
    for entry in ordered {
        let opcode = entry.descriptor.effective_opcode();
        if options.exclude.contains(&opcode.value()) {
            log::debug!("{opcode}: excluded");
            continue;
        }

        let traces = match assemble(&entry.descriptor) {
            Ok(traces) => traces,
            Err(GenerateError::Unsupported {
                machine_code,
                reason,
            }) => {
                log::warn!("skipping {}: {}", entry.instruction, reason);
                report.unsupported.push(UnsupportedInstruction {
                    instruction: entry.instruction.clone(),
                    machine_code,
                    reason,
                });
                continue;
            }
            Err(err) => return Err(err),
        };

        report
            .test_cases
            .extend(traces.into_iter().map(|trace| TestCase {
                name: case_name(opcode, trace.outcome),
                instruction: entry.descriptor,
                preset: trace.preset,
                outcome: trace.outcome,
                command_queue: trace.queue,
            }));
    }

    report
        .test_cases
        .sort_by_key(|case| (case.effective_opcode(), case.outcome));

    if options.strict {
        if let Some(first) = report.unsupported.first() {
            return Err(GenerateError::Unsupported {
                machine_code: first.machine_code,
                reason: format!(
                    "{} instructions unsupported in strict mode, first: {}",
                    report.unsupported.len(),
                    first.reason
                ),
            });
        }
    }

    log::info!(
        "generated {} test cases, {} instructions unsupported",
        report.test_cases.len(),
        report.unsupported.len()
    );
    Ok(report)
}
