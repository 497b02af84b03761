use thiserror::Error;

/// Failure to obtain a trace for one test case. Never retried; the case is
/// reported as failed and the run moves on.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to launch {program}: {reason}")]
    Launch { program: String, reason: String },

    #[error("the decoder entry breakpoint was never reached")]
    BreakpointNotReached,

    #[error("trace line {line}: {reason}")]
    Parse { line: usize, reason: String },
}
