mod config;
mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use datamint_core::{Error as CoreError, document_json_schema};
use datamint_generate::output::atomic::write_bytes_atomic;
use datamint_generate::{
    GenerateOptions, GenerationEngine, GenerationError, GenerationReport, Interpreter, LocaleKey,
    OutputMode, ProviderRegistry,
};
use thiserror::Error;

use config::{ConfigError, FileConfig};
use logging::{LoggingError, init_logging};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("schema has {0} unresolvable faker path(s)")]
    InvalidProviders(usize),
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::Generation(GenerationError::Document(err))
    }
}

impl CliError {
    /// One-line message printed to stderr before exiting.
    fn user_message(&self) -> String {
        match self {
            CliError::Generation(GenerationError::Document(CoreError::NotFound(path))) => {
                format!("Error: Schema file not found: {}", path.display())
            }
            CliError::Generation(GenerationError::Document(err)) => {
                format!("Error parsing schema: {err}")
            }
            CliError::Generation(GenerationError::Record { record, source }) => {
                format!("Error generating record {record}: {source}")
            }
            CliError::Generation(GenerationError::Io(err)) => {
                format!("Error writing output: {err}")
            }
            other => format!("Error: {other}"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "datamint", version, about = "Synthetic JSON data generator")]
struct Cli {
    /// Append JSON logs to this file.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG is set.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate records from a schema file.
    Generate(GenerateArgs),
    /// Check a schema file without generating anything.
    Validate(ValidateArgs),
    /// List the available faker paths.
    Providers(ProvidersArgs),
    /// Print the JSON Schema of schema documents.
    JsonSchema(JsonSchemaArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Config file; defaults to ./datamint.toml when present.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Maximum template nesting depth.
    #[arg(long)]
    max_depth: Option<usize>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Schema document (JSON).
    schema: PathBuf,
    /// Output directory, created if missing.
    out_dir: PathBuf,
    /// Write one file per record instead of a single array.
    #[arg(long, default_value_t = false)]
    separate_files: bool,
    /// Run seed; the same seed reproduces the same output.
    #[arg(long)]
    seed: Option<u64>,
    /// Locale for person, address and company data (en_US, pt_BR).
    #[arg(long)]
    locale: Option<LocaleKey>,
    /// Reference date for relative date providers (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    base_date: Option<NaiveDate>,
    /// Write a generation report to this path.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Schema document (JSON).
    schema: PathBuf,
    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args, Debug)]
struct ProvidersArgs {
    /// Only list paths in this category.
    #[arg(long)]
    category: Option<String>,
}

#[derive(Args, Debug)]
struct JsonSchemaArgs {
    /// Write to this file instead of stdout.
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(cli.log_file.as_deref(), cli.verbose) {
        eprintln!("{}", CliError::from(err).user_message());
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Validate(args) => run_validate(args),
        Command::Providers(args) => run_providers(args),
        Command::JsonSchema(args) => run_json_schema(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(event = "command_failed", error = %err);
            eprintln!("{}", err.user_message());
            ExitCode::FAILURE
        }
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let file_config = load_config(&args.config)?;
    let separate_files = args.separate_files || file_config.separate_files.unwrap_or(false);
    let options = GenerateOptions {
        out_dir: args.out_dir,
        output_mode: if separate_files {
            OutputMode::SeparateFiles
        } else {
            OutputMode::SingleFile
        },
        seed: args.seed.or(file_config.seed),
        locale: args.locale.or(file_config.locale).unwrap_or_default(),
        max_depth: resolve_max_depth(&args.config, &file_config),
        base_date: args.base_date.or(file_config.base_date),
        report_path: args.report,
    };
    tracing::debug!(event = "options_resolved", options = ?options);

    let engine = GenerationEngine::new(options);
    let document = engine.load_document(&args.schema)?;
    let registry = ProviderRegistry::new();

    println!("Generating {} records...", document.count);
    let report = engine.run(&document, &registry)?;
    print_written(&report, &engine.options().out_dir);
    println!("Done!");
    Ok(())
}

fn print_written(report: &GenerationReport, out_dir: &Path) {
    match report.output_mode {
        OutputMode::SingleFile => {
            if let Some(path) = report.files.first() {
                println!(
                    "Written {} records to {}",
                    report.records_generated,
                    path.display()
                );
            }
        }
        OutputMode::SeparateFiles => {
            println!(
                "Written {} separate files to {}",
                report.records_generated,
                out_dir.display()
            );
        }
    }
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    let file_config = load_config(&args.config)?;
    let engine = GenerationEngine::new(GenerateOptions {
        max_depth: resolve_max_depth(&args.config, &file_config),
        ..GenerateOptions::default()
    });
    let document = engine.load_document(&args.schema)?;
    let registry = ProviderRegistry::new();

    let errors = Interpreter::new(&registry).check(&document.template);
    if !errors.is_empty() {
        for err in &errors {
            eprintln!("{err}");
        }
        return Err(CliError::InvalidProviders(errors.len()));
    }

    println!(
        "Schema is valid: {} records to {}",
        document.count, document.filename
    );
    Ok(())
}

fn run_providers(args: ProvidersArgs) -> Result<(), CliError> {
    let registry = ProviderRegistry::new();
    let prefix = args.category.map(|category| format!("{category}."));
    for path in registry.provider_paths() {
        if prefix.as_deref().is_none_or(|prefix| path.starts_with(prefix)) {
            println!("{path}");
        }
    }
    Ok(())
}

fn run_json_schema(args: JsonSchemaArgs) -> Result<(), CliError> {
    let schema = document_json_schema()?;
    let encoded = serde_json::to_string_pretty(&schema)?;
    match args.out {
        Some(path) => {
            write_bytes_atomic(&path, encoded.as_bytes())?;
            tracing::info!(event = "json_schema_written", path = %path.display());
        }
        None => println!("{encoded}"),
    }
    Ok(())
}

fn load_config(args: &ConfigArgs) -> Result<FileConfig, CliError> {
    let cwd = std::env::current_dir()?;
    Ok(FileConfig::discover(args.config.as_deref(), &cwd)?)
}

fn resolve_max_depth(args: &ConfigArgs, file_config: &FileConfig) -> usize {
    args.max_depth
        .or(file_config.max_depth)
        .unwrap_or(datamint_core::DEFAULT_MAX_DEPTH)
}
