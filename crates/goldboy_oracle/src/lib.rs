//! Runs an emulator under test over the golden fixture and diffs its
//! per-cycle trace against the expected command queues.

pub mod compare;
mod error;
pub mod report;
pub mod trace;

pub use compare::{compare, run, CaseResult, Mismatch};
pub use error::TraceError;
pub use report::{render, render_case};
pub use trace::{parse_trace, ProcessTraceSource, RunnerConfig, TraceSource, TRACE_BEGIN};
