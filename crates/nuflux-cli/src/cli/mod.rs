mod commands;
mod helpers;

use clap::Parser;
use nuflux_core::domain::NufluxError;
use tracing_subscriber::EnvFilter;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let nuflux_error = error.as_nuflux_error();
            eprintln!("{}", nuflux_error.diagnostic_line());
            eprintln!("{}", nuflux_error.fatal_exit_line());
            nuflux_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("nuflux".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            install_tracing(cli.verbose);
            dispatch_parsed(cli.command)
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

/// Logs go to stderr so stdout stays machine-readable. `--verbose` wins over `RUST_LOG`.
fn install_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed when `run` is called more than once.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "nuflux",
    version,
    about = "Expected neutrino event rates in a cubic-kilometre ice detector"
)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Integrate the yearly event rate for one species
    Rate(commands::RateArgs),
    /// Print per-channel cross sections at the given energies
    #[command(name = "cross-section")]
    CrossSection(commands::CrossSectionArgs),
    /// Print the Earth column density along the given zenith angles
    Attenuation(commands::AttenuationArgs),
    /// Print the differential flux at an energy and zenith angle
    Flux(commands::FluxArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Rate(args) => commands::run_rate_command(args),
        CliCommand::CrossSection(args) => commands::run_cross_section_command(args),
        CliCommand::Attenuation(args) => commands::run_attenuation_command(args),
        CliCommand::Flux(args) => commands::run_flux_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(NufluxError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<NufluxError> for CliError {
    fn from(error: NufluxError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    fn as_nuflux_error(&self) -> NufluxError {
        match self {
            Self::Usage(message) => NufluxError::configuration("CONFIG.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => NufluxError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
