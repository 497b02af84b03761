use thiserror::Error;

/// Failures while turning a descriptor into command queues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// No assembler rule matches the descriptor's shape. The instruction is
    /// skipped and reported, the batch carries on.
    #[error("unsupported instruction 0x{machine_code:06X}: {reason}")]
    Unsupported { machine_code: u32, reason: String },

    /// The descriptor breaks its own contract (missing operand, bad length,
    /// duration that disagrees with the trace). Aborts the run.
    #[error("malformed descriptor 0x{machine_code:06X}: {reason}")]
    Malformed { machine_code: u32, reason: String },
}

impl GenerateError {
    pub fn machine_code(&self) -> u32 {
        match self {
            GenerateError::Unsupported { machine_code, .. }
            | GenerateError::Malformed { machine_code, .. } => *machine_code,
        }
    }
}

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
