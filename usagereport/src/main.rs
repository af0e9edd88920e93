use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use usagereport_core::{ReportConfig, ReportPipeline};

mod formatter;

#[derive(Parser)]
#[command(name = "usagereport")]
#[command(about = "Per-zone SMS and call-duration report from a monthly usage export", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Usage export to read (overrides input_path)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Report workbook to write (overrides output_path)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Summary format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Build the report and print it without writing the workbook
    #[arg(long)]
    dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output for scripting
    Json,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        ReportConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("usagereport.toml");
        if default_config_path.exists() {
            ReportConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            ReportConfig::default()
        }
    };

    if let Some(input) = cli.input {
        config.input_path = input;
    }
    if let Some(output) = cli.output {
        config.output_path = output;
    }

    config.validate().context("Invalid configuration")?;
    debug!(?config, "configuration loaded");

    let pipeline = ReportPipeline::new(config);
    let config = pipeline.config();

    let report = if cli.dry_run {
        pipeline.build_report()
    } else {
        pipeline.run()
    }
    .with_context(|| format!("Failed to build report from {}", config.input_path.display()))?;

    let written = (!cli.dry_run).then_some(config.output_path.as_path());
    match cli.format {
        OutputFormat::Human => formatter::print_human(&config.input_path, written, &report),
        OutputFormat::Json => formatter::print_json(&config.input_path, written, &report)?,
    }

    Ok(())
}
