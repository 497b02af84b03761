//! Per-cycle comparison of expected and captured command queues.
//!
//! Both queues are split at their Halt markers. The cycle counts must agree,
//! and inside a cycle the writes may come in any order unless one target is
//! written twice with different values.

use std::collections::BTreeMap;
use std::fmt;

use goldboy_common::{Command, CommandQueue};
use goldboy_model::{Fixture, TestCase};

use crate::error::TraceError;
use crate::trace::TraceSource;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mismatch {
    CycleCount { expected: usize, actual: usize },
    /// Zero-based machine cycle whose writes differ.
    Cycle { index: usize },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::CycleCount { expected, actual } => {
                write!(f, "spans {actual} cycles, expected {expected}")
            }
            Mismatch::Cycle { index } => write!(f, "cycle {index} differs"),
        }
    }
}

fn order_matters(cycle: &[Command]) -> bool {
    let mut seen = BTreeMap::new();
    cycle.iter().any(|command| match command {
        Command::Write(w) => {
            matches!(seen.insert(w.target(), w.value()), Some(prev) if prev != w.value())
        }
        _ => false,
    })
}

fn cycle_matches(expected: &[Command], actual: &[Command]) -> bool {
    if order_matters(expected) || order_matters(actual) {
        return expected == actual;
    }
    let mut expected = expected.to_vec();
    let mut actual = actual.to_vec();
    expected.sort_unstable();
    actual.sort_unstable();
    expected == actual
}

/// Every difference between `expected` and `actual`; empty when they agree.
pub fn compare(expected: &CommandQueue, actual: &CommandQueue) -> Vec<Mismatch> {
    let expected: Vec<&[Command]> = expected.cycles().collect();
    let actual: Vec<&[Command]> = actual.cycles().collect();

    let mut mismatches = Vec::new();
    if expected.len() != actual.len() {
        mismatches.push(Mismatch::CycleCount {
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    for (index, (e, a)) in expected.iter().zip(&actual).enumerate() {
        if !cycle_matches(e, a) {
            mismatches.push(Mismatch::Cycle { index });
        }
    }
    mismatches
}

#[derive(Debug)]
pub struct CaseResult<'a> {
    pub case: &'a TestCase,
    pub actual: Result<CommandQueue, TraceError>,
    pub mismatches: Vec<Mismatch>,
}

impl CaseResult<'_> {
    pub fn passed(&self) -> bool {
        self.actual.is_ok() && self.mismatches.is_empty()
    }
}

/// Captures and compares every case whose name starts with `filter`.
///
/// A trace failure only fails its own case.
pub fn run<'a>(
    fixture: &'a Fixture,
    source: &mut dyn TraceSource,
    filter: Option<&str>,
) -> Vec<CaseResult<'a>> {
    let selected = fixture
        .test_cases
        .iter()
        .filter(|case| filter.map_or(true, |prefix| case.name.starts_with(prefix)));

    let mut results = Vec::new();
    for case in selected {
        let actual = source.capture(case);
        let mismatches = match &actual {
            Ok(queue) => compare(&case.command_queue, queue),
            Err(err) => {
                log::error!("{}: {}", case.name, err);
                Vec::new()
            }
        };
        for mismatch in &mismatches {
            log::warn!("{}: {}", case.name, mismatch);
        }
        results.push(CaseResult {
            case,
            actual,
            mismatches,
        });
    }

    log::info!(
        "compared {} cases, {} passed",
        results.len(),
        results.iter().filter(|r| r.passed()).count()
    );
    results
}
