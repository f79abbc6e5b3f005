use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tarifa_tools::convert::convert_file;
use tarifa_tools::{Result, ToolError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    match cli.command {
        Command::Convert(args) => execute_convert(args),
    }
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn execute_convert(args: ConvertArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(ToolError::MissingInput(args.input));
    }

    let conversion = convert_file(&args.input, &args.output)?;
    if !conversion.success {
        return Err(ToolError::ConversionFailed(conversion.errors.len()));
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert hierarchical price list CSV exports into quoting JSON."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a CSV price list into the canonical JSON representation.
    Convert(ConvertArgs),
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Input CSV file path.
    #[arg(long)]
    input: PathBuf,

    /// Output JSON file path.
    #[arg(long)]
    output: PathBuf,
}
