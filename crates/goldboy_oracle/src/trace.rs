//! Capturing the device under test's trace.
//!
//! The debugger harness is an external program. It is started once per
//! test case with the case name as its last argument, prints
//! [`TRACE_BEGIN`] when the decoder breakpoint is hit, then one micro-op per
//! line in the textual command grammar. Every other line is ignored.

use std::path::PathBuf;
use std::process::{Command as Process, Stdio};

use goldboy_common::{Command, CommandQueue};
use goldboy_model::TestCase;
use typed_builder::TypedBuilder;

use crate::error::TraceError;

pub const TRACE_BEGIN: &str = "TRACE BEGIN";

pub trait TraceSource {
    /// Executes `case` on the device under test and returns what it did.
    fn capture(&mut self, case: &TestCase) -> Result<CommandQueue, TraceError>;
}

#[derive(Clone, Debug, TypedBuilder)]
pub struct RunnerConfig {
    /// Debugger or harness executable.
    #[builder(setter(into))]
    pub program: PathBuf,
    /// Fixed arguments placed before the case name.
    #[builder(default)]
    pub args: Vec<String>,
    #[builder(default, setter(strip_option, into))]
    pub working_dir: Option<PathBuf>,
}

pub struct ProcessTraceSource {
    config: RunnerConfig,
}

impl ProcessTraceSource {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    fn launch_error(&self, reason: impl Into<String>) -> TraceError {
        TraceError::Launch {
            program: self.config.program.display().to_string(),
            reason: reason.into(),
        }
    }
}

impl TraceSource for ProcessTraceSource {
    fn capture(&mut self, case: &TestCase) -> Result<CommandQueue, TraceError> {
        let mut cmd = Process::new(&self.config.program);
        cmd.args(&self.config.args)
            .arg(&case.name)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }

        log::debug!("{}: launching {:?}", case.name, cmd);
        let output = cmd.output().map_err(|e| self.launch_error(e.to_string()))?;
        if !output.status.success() {
            return Err(self.launch_error(format!("exited with {}", output.status)));
        }
        parse_trace(&String::from_utf8_lossy(&output.stdout))
    }
}

fn is_command(line: &str) -> bool {
    let head = line.split_whitespace().next().unwrap_or_default();
    matches!(head, "WRITE" | "HALT" | "SUSPEND")
}

/// Extracts the command queue printed after [`TRACE_BEGIN`].
pub fn parse_trace(text: &str) -> Result<CommandQueue, TraceError> {
    let mut lines = text.lines().enumerate();
    lines
        .by_ref()
        .find(|(_, line)| line.trim() == TRACE_BEGIN)
        .ok_or(TraceError::BreakpointNotReached)?;

    let mut queue = CommandQueue::new();
    for (index, line) in lines {
        let line = line.trim();
        if !is_command(line) {
            continue;
        }
        let command = line.parse::<Command>().map_err(|e| TraceError::Parse {
            line: index + 1,
            reason: e.to_string(),
        })?;
        queue.push(command);
    }
    Ok(queue)
}
