use std::path::Path;

use anyhow::{bail, Context, Result};
use goldboy_model::{generate, load_instructions, presets, Fixture, GenerateOptions};
use goldboy_oracle::{ProcessTraceSource, RunnerConfig};

/// Reads the descriptor source at `input` and writes the fixture to `output`.
pub fn run_generate(input: &Path, output: &Path, options: &GenerateOptions) -> Result<Fixture> {
    let source = load_instructions(input)
        .with_context(|| format!("failed to read descriptors from {}", input.display()))?;
    let report = generate(&source.instructions, options)?;

    let fixture = Fixture::from(report);
    fixture
        .save(output, options.pretty)
        .with_context(|| format!("failed to write fixture {}", output.display()))?;
    log::info!(
        "wrote {} test cases to {}",
        fixture.test_cases.len(),
        output.display()
    );
    Ok(fixture)
}

/// Runs every selected case of the fixture through the debugger harness and
/// prints the report. Fails if any case did not match.
pub fn run_compare(fixture: &Path, config: RunnerConfig, filter: Option<&str>) -> Result<()> {
    let fixture = Fixture::load(fixture)
        .with_context(|| format!("failed to read fixture {}", fixture.display()))?;
    let mut source = ProcessTraceSource::new(config);
    let results = goldboy_oracle::run(&fixture, &mut source, filter);
    print!("{}", goldboy_oracle::render(&results, &fixture.unsupported));

    let failed = results.iter().filter(|r| !r.passed()).count();
    if failed > 0 {
        bail!("{failed} of {} cases failed", results.len());
    }
    Ok(())
}

/// Writes the preset registry as JSON, to `output` or stdout.
pub fn run_presets(output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(presets())?;
    match output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
