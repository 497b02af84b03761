//! `goldboy` command line.
//!
//! - `goldboy generate <descriptors> <fixture>` builds the expected traces
//! - `goldboy compare <fixture> <harness> [args..]` diffs an emulator against them
//! - `goldboy presets` dumps the initial machine states

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use goldboy_model::GenerateOptions;
use goldboy_oracle::RunnerConfig;

#[derive(Parser)]
#[command(name = "goldboy")]
#[command(version)]
#[command(about = "Golden per-cycle traces for Game Boy CPU emulators")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the expected-trace fixture from instruction descriptors
    Generate {
        /// Instruction descriptor JSON
        input: PathBuf,
        /// Fixture file to write
        output: PathBuf,
        /// Fail if any instruction is unsupported
        #[arg(long)]
        strict: bool,
        /// Effective opcode to leave out, e.g. 0x76 or 0xCB40 (repeatable)
        #[arg(long, value_parser = parse_opcode)]
        exclude: Vec<u16>,
        /// Write single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Compare an emulator's traces against a fixture
    Compare {
        /// Fixture produced by `generate`
        fixture: PathBuf,
        /// Debugger harness to launch once per test case
        program: PathBuf,
        /// Arguments passed to the harness before the case name
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
        /// Only run cases whose name starts with this
        #[arg(short, long)]
        name: Option<String>,
        /// Working directory for the harness
        #[arg(long)]
        cwd: Option<PathBuf>,
    },
    /// Print the machine state presets as JSON
    Presets {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_opcode(s: &str) -> Result<u16, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid opcode '{s}': {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Generate {
            input,
            output,
            strict,
            exclude,
            compact,
        } => {
            let options = GenerateOptions::builder()
                .strict(strict)
                .exclude(exclude)
                .pretty(!compact)
                .build();
            goldboy::run_generate(&input, &output, &options)?;
        }
        Commands::Compare {
            fixture,
            program,
            args,
            name,
            cwd,
        } => {
            let config = RunnerConfig {
                program,
                args,
                working_dir: cwd,
            };
            goldboy::run_compare(&fixture, config, name.as_deref())?;
        }
        Commands::Presets { output } => goldboy::run_presets(output.as_deref())?,
    }
    Ok(())
}
