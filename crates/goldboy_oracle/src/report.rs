//! Console report: one line per passing case, a two-column expected/actual
//! listing for each failing one, then the unsupported instructions.

use std::fmt::Write;

use goldboy_common::Command;
use goldboy_model::UnsupportedInstruction;

use crate::compare::CaseResult;

const COLUMN: usize = 32;

fn row(out: &mut String, marker: char, left: &str, right: &str) {
    let _ = writeln!(out, "  {marker} {left:<COLUMN$} {right}");
}

fn text(command: Option<&Command>) -> String {
    command.map(Command::to_string).unwrap_or_default()
}

pub fn render_case(out: &mut String, result: &CaseResult<'_>) {
    let case = result.case;
    let label = format!("{} ({})", case.name, case.preset);
    let actual = match &result.actual {
        Ok(_) if result.mismatches.is_empty() => {
            let _ = writeln!(out, "PASS {label}");
            return;
        }
        Ok(actual) => actual,
        Err(err) => {
            let _ = writeln!(out, "ERROR {label}: {err}");
            return;
        }
    };

    let summary: Vec<String> = result.mismatches.iter().map(|m| m.to_string()).collect();
    let _ = writeln!(out, "FAIL {label}: {}", summary.join(", "));
    row(out, ' ', "expected", "actual");

    let expected = case.command_queue.commands();
    let actual = actual.commands();
    for i in 0..expected.len().max(actual.len()) {
        let (e, a) = (expected.get(i), actual.get(i));
        let marker = if e == a { ' ' } else { '*' };
        row(out, marker, &text(e), &text(a));
    }
}

/// Full report over `results`, ending with the summary counts and the
/// instructions the generator could not handle.
pub fn render(results: &[CaseResult<'_>], unsupported: &[UnsupportedInstruction]) -> String {
    let mut out = String::new();
    for result in results {
        render_case(&mut out, result);
    }

    let passed = results.iter().filter(|r| r.passed()).count();
    let errored = results.iter().filter(|r| r.actual.is_err()).count();
    let _ = writeln!(
        out,
        "\n{} cases: {} passed, {} failed, {} errored",
        results.len(),
        passed,
        results.len() - passed - errored,
        errored
    );

    if !unsupported.is_empty() {
        let _ = writeln!(out, "unsupported ({}):", unsupported.len());
        for entry in unsupported {
            let _ = writeln!(out, "    {:<10} {}", entry.instruction, entry.reason);
        }
    }
    out
}
