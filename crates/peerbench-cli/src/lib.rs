// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod commands;
mod output;

use clap::{error::ErrorKind, ArgAction, Parser, Subcommand};
use peerbench_core::{env_bool, ExitCode, MachineError, ENV_PEERBENCH_LOG_JSON, ENV_PEERBENCH_LOG_LEVEL};
use peerbench_engine::{BenchmarkError, BenchmarkErrorCode};
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const CRATE_NAME: &str = "peerbench-cli";

const PEERBENCH_HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
Usage: {usage}

Options:
{options}

Commands:
{subcommands}
{after-help}";

#[derive(Parser)]
#[command(name = "peerbench", version)]
#[command(about = "Peer benchmarking for NYC residential buildings")]
#[command(help_template = PEERBENCH_HELP_TEMPLATE)]
#[command(
    after_help = "Environment:\n  PEERBENCH_LOG_LEVEL     Log filter (default: warn)\n  PEERBENCH_LOG_JSON      Emit logs as JSON lines\n  PEERBENCH_POLICY_PATH   Policy document used when --policy is absent"
)]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank one building against its peer cohort.
    Benchmark {
        #[command(flatten)]
        input: PopulationArgs,
        #[arg(long)]
        building: String,
    },
    /// Show how the peer cohort for a building is formed.
    Cohort {
        #[command(flatten)]
        input: PopulationArgs,
        #[arg(long)]
        building: String,
    },
    /// Print the dataset version of a population file.
    Fingerprint {
        #[command(flatten)]
        input: PopulationArgs,
    },
    Policy {
        #[command(subcommand)]
        command: PolicyCommand,
    },
}

#[derive(clap::Args)]
struct PopulationArgs {
    /// JSON array of building records.
    #[arg(long)]
    population: PathBuf,
    #[arg(long)]
    policy: Option<PathBuf>,
    /// Drop records that fail validation instead of aborting.
    #[arg(long, default_value_t = false)]
    skip_invalid: bool,
}

#[derive(Subcommand)]
enum PolicyCommand {
    /// Validate a policy document.
    Validate { path: PathBuf },
    /// Print the built-in default policy.
    PrintDefault,
    /// Print the effective policy and where it was resolved from.
    Show {
        #[arg(long)]
        policy: Option<PathBuf>,
    },
}

#[derive(Clone, Copy)]
struct LogFlags {
    quiet: bool,
    verbose: u8,
}

#[derive(Clone, Copy)]
struct OutputMode {
    json: bool,
}

#[derive(Debug)]
struct CliError {
    exit_code: ExitCode,
    machine: MachineError,
}

impl CliError {
    fn usage(message: String) -> Self {
        Self {
            exit_code: ExitCode::Usage,
            machine: MachineError::new("usage_error", &message),
        }
    }

    fn validation(message: String) -> Self {
        Self {
            exit_code: ExitCode::Validation,
            machine: MachineError::new("validation_error", &message),
        }
    }

    fn dependency(message: String) -> Self {
        Self {
            exit_code: ExitCode::DependencyFailure,
            machine: MachineError::new("dependency_failure", &message),
        }
    }

    fn internal(message: String) -> Self {
        Self {
            exit_code: ExitCode::Internal,
            machine: MachineError::new("internal_error", &message),
        }
    }
}

impl From<BenchmarkError> for CliError {
    fn from(err: BenchmarkError) -> Self {
        let exit_code = match err.code() {
            BenchmarkErrorCode::InsufficientCohort
            | BenchmarkErrorCode::NotBenchmarkable
            | BenchmarkErrorCode::UnknownBuilding => ExitCode::Validation,
            BenchmarkErrorCode::StaleVersion | BenchmarkErrorCode::Population => {
                ExitCode::DependencyFailure
            }
            _ => ExitCode::Internal,
        };
        Self {
            exit_code,
            machine: err.to_machine_error(),
        }
    }
}

pub fn main_entry() -> ProcessExitCode {
    let wants_json = std::env::args().any(|arg| arg == "--json");
    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(err) => {
            emit_error(&err, wants_json);
            ProcessExitCode::from(err.exit_code as u8)
        }
    }
}

fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{err}");
                return Ok(());
            }
            _ => {
                return Err(CliError {
                    exit_code: ExitCode::Usage,
                    machine: MachineError::new("usage_error", "invalid command line arguments")
                        .with_detail("error", &err.to_string()),
                });
            }
        },
    };
    let output_mode = OutputMode { json: cli.json };
    let command = cli
        .command
        .ok_or_else(|| CliError::usage("missing command; see --help".to_string()))?;
    init_tracing(LogFlags {
        quiet: cli.quiet,
        verbose: cli.verbose,
    });

    match command {
        Commands::Benchmark { input, building } => {
            commands::run_benchmark(&input, &building, output_mode)
        }
        Commands::Cohort { input, building } => commands::run_cohort(&input, &building, output_mode),
        Commands::Fingerprint { input } => commands::run_fingerprint(&input, output_mode),
        Commands::Policy { command } => match command {
            PolicyCommand::Validate { path } => commands::run_policy_validate(&path, output_mode),
            PolicyCommand::PrintDefault => commands::run_policy_print_default(output_mode),
            PolicyCommand::Show { policy } => {
                commands::run_policy_show(policy.as_deref(), output_mode)
            }
        },
    }
}

fn log_filter(flags: LogFlags) -> EnvFilter {
    let directive = if flags.quiet {
        "error".to_string()
    } else {
        match flags.verbose {
            0 => std::env::var(ENV_PEERBENCH_LOG_LEVEL)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "warn".to_string()),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_tracing(flags: LogFlags) {
    let filter = log_filter(flags);
    let result = if env_bool(ENV_PEERBENCH_LOG_JSON, false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

fn emit_error(error: &CliError, machine_json: bool) {
    if machine_json {
        match serde_json::to_string(&error.machine) {
            Ok(payload) => eprintln!("{payload}"),
            Err(_) => eprintln!(
                "{{\"code\":\"internal_error\",\"message\":\"failed to encode structured error\",\"details\":{{}}}}"
            ),
        }
    } else {
        eprintln!("{}", error.machine.message);
    }
}
