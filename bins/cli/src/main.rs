//! CLI binary entrypoint.

mod commands;
mod error;
mod format;
mod logging;

use clap::{Parser, Subcommand};
use commands::{
    DeferCommandInput, run_config_check, run_config_show, run_defer, run_divide, run_printer,
    run_student,
};
use error::{CliError, ExitCode};
use fallible_config::load_config_std_env;
use format::{OutputArgs, OutputMode};
use logging::init_logging;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "fallible",
    version,
    about = "Typed outcomes, deferred cleanup, and recovery dispatch",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Divide two integers, recovering from division failures.
    Divide {
        /// Dividend.
        #[arg(long, allow_hyphen_values = true)]
        numerator: i64,
        /// Divisor.
        #[arg(long, allow_hyphen_values = true)]
        denominator: i64,
        /// Force-unwrap the quotient instead of dispatching failures.
        #[arg(long)]
        force: bool,
    },
    /// Build a student and introduce them by nickname.
    Student {
        /// Student name; omitting it fails with `Invalid`.
        #[arg(long)]
        name: Option<String>,
        /// Nickname; must be longer than five characters.
        #[arg(long)]
        nickname: String,
    },
    /// Send a job to a printer.
    Printer {
        /// Job number.
        #[arg(long, default_value_t = 1440)]
        job: u32,
        /// Printer name.
        #[arg(long)]
        printer: String,
    },
    /// Register labeled cleanup actions and run them on scope exit.
    Defer {
        /// Action label; repeat to register several actions in order.
        #[arg(long = "label", required = true)]
        labels: Vec<String>,
        /// Label of the action that should fail during cleanup.
        #[arg(long)]
        fail: Option<String>,
        /// Leave the scope with a failure after registering every action.
        #[arg(long)]
        exit_early: bool,
    },
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Print the effective config.
    Show {
        /// Config file path (JSON/TOML); overrides `--config`.
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Validate the effective config.
    Check {
        /// Config file path (JSON/TOML); overrides `--config`.
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

impl CliOutput {
    pub(crate) const fn ok(stdout: String) -> Self {
        Self {
            stdout,
            stderr: String::new(),
            exit_code: ExitCode::Ok,
        }
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);

    match run(&cli, mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(mode, &error),
        },
        Err(error) => exit_with_error(mode, &error),
    }
}

fn exit_with_error(mode: OutputMode, error: &CliError) -> std::process::ExitCode {
    if mode.is_json() || mode.is_ndjson() {
        let payload = serde_json::json!({
            "status": "error",
            "error": error.report(),
        });
        if let Ok(rendered) = mode.render(String::new(), "error", payload) {
            let _ = io::stdout().write_all(rendered.as_bytes());
        }
    }
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn config_path(cli: &Cli) -> Option<PathBuf> {
    match &cli.command {
        Commands::Config {
            command: ConfigCommands::Show { path: Some(path) } | ConfigCommands::Check { path: Some(path) },
        } => Some(path.clone()),
        _ => cli.output.config.clone(),
    }
}

fn run(cli: &Cli, mode: OutputMode) -> Result<CliOutput, CliError> {
    let path = config_path(cli);
    let config = load_config_std_env(path.as_deref())?;
    init_logging(&config.logging);
    tracing::debug!(
        lint = %config.recovery.lint,
        log_fallback = config.recovery.log_fallback,
        "effective config loaded"
    );

    match &cli.command {
        Commands::Divide {
            numerator,
            denominator,
            force,
        } => run_divide(mode, &config.recovery, *numerator, *denominator, *force),
        Commands::Student { name, nickname } => {
            run_student(mode, &config.recovery, name.clone(), nickname)
        },
        Commands::Printer { job, printer } => run_printer(mode, &config.recovery, *job, printer),
        Commands::Defer {
            labels,
            fail,
            exit_early,
        } => run_defer(
            mode,
            &DeferCommandInput {
                labels: labels.clone(),
                fail: fail.clone(),
                exit_early: *exit_early,
            },
        ),
        Commands::Config { command } => match command {
            ConfigCommands::Show { .. } => run_config_show(mode, &config),
            ConfigCommands::Check { .. } => run_config_check(mode, &config, path.as_deref()),
        },
    }
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}
