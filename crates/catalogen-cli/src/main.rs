mod logging;
mod report;

use std::path::PathBuf;

use catalogen_config::{ConfigError, config_json_schema, load_config};
use catalogen_generate::{GenerationEngine, GenerationError};
use clap::{Args, Parser, Subcommand};
use logging::{LogFormat, LoggingError, init_logging};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "catalogen", version, about = "Synthetic catalog dataset generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the bulk-load script and image manifest.
    Run(RunArgs),
    /// Check a configuration file without generating anything.
    Validate(ValidateArgs),
    /// Print the JSON Schema of the configuration document.
    Schema,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Configuration file (JSON, or TOML with a `.toml` extension).
    #[arg(long, short)]
    config: PathBuf,
    /// Overrides the seed from the configuration.
    #[arg(long)]
    seed: Option<u64>,
    /// Console log format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
    /// Append ndjson logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Write the run report as JSON to this file.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    #[arg(long, short)]
    config: PathBuf,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run_generate(args),
        Command::Validate(args) => run_validate(args),
        Command::Schema => {
            let schema = config_json_schema()?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}

fn run_generate(args: RunArgs) -> Result<(), CliError> {
    init_logging(args.log_format, args.log_file.as_deref())?;

    let mut config = load_config(&args.config)?.config;
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    tracing::info!(event = "run_started", config = %args.config.display());
    let engine = GenerationEngine::new(config);
    let metadata = engine.load_metadata()?;
    let result = engine.run(&metadata)?;

    if let Some(path) = &args.report {
        report::write_report(path, &result)?;
        tracing::info!(event = "report_written", path = %path.display());
    }
    tracing::info!(
        event = "run_finished",
        status = "success",
        duration_ms = result.report.duration_ms
    );

    println!("[Finished]");
    println!("Database instruction file: {}", result.script_path.display());
    if let Some(manifest) = &result.manifest_path {
        println!("Image symlinks file: {}", manifest.display());
    }
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    match load_config(&args.config) {
        Ok(validated) => {
            for warning in &validated.warnings {
                println!("warning: {warning}");
            }
            println!("configuration is valid");
            Ok(())
        }
        Err(ConfigError::Invalid(report)) => {
            for issue in report.errors.iter().chain(report.warnings.iter()) {
                eprintln!("{issue}");
            }
            Err(ConfigError::Invalid(report).into())
        }
        Err(err) => Err(err.into()),
    }
}
