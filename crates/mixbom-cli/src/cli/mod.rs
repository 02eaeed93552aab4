mod commands;
mod helpers;

use clap::Parser;
use mixbom_core::domain::BomError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const PROGRAM_NAME: &str = "mixbom";

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let diagnostic = error.as_bom_error();
            tracing::debug!(
                stage = diagnostic.stage(),
                category = %diagnostic.category(),
                "command failed"
            );
            eprintln!("{}", diagnostic.diagnostic_line());
            eprintln!("{}", diagnostic.fatal_exit_line());
            diagnostic.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once(PROGRAM_NAME.to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();

    match Cli::try_parse_from(&full_args) {
        Ok(cli) => {
            init_logging(cli.verbose);
            dispatch_parsed(cli)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "mixbom",
    version,
    about = "Raw material requirements for multi-stage mix recipes"
)]
struct Cli {
    /// Emit debug events on stderr unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Configuration file (default: nearest mixbom.json above the working directory)
    #[arg(long, global = true, value_name = "path")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Explode a product recipe for a target amount and print the report
    Calculate(commands::CalculateArgs),
    /// Load and validate a product recipe
    Validate(commands::ValidateArgs),
    /// List available products
    List(commands::ListArgs),
    /// Validate a CSV recipe and install it as a product
    Import(commands::ImportArgs),
}

fn dispatch_parsed(cli: Cli) -> Result<i32, CliError> {
    let context = helpers::load_cli_context(cli.config.as_deref())?;
    match cli.command {
        CliCommand::Calculate(args) => commands::run_calculate_command(&context, args),
        CliCommand::Validate(args) => commands::run_validate_command(&context, args),
        CliCommand::List(args) => commands::run_list_command(&context, args),
        CliCommand::Import(args) => commands::run_import_command(&context, args),
    }
}

/// Logs go to stderr so stdout carries only the report or JSON.
fn init_logging(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(BomError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<BomError> for CliError {
    fn from(error: BomError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    fn as_bom_error(&self) -> BomError {
        match self {
            Self::Usage(message) => BomError::structural("INPUT.CLI_USAGE", message.trim_end()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => BomError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
