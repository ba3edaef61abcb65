use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use colored::Colorize;
use log::debug;
use sheetlinks::{HyperlinkNormalizer, LinkError, NormalizerConfig, logging};
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "Usage: normalize-links <file-path>";

#[derive(Parser)]
#[command(name = "normalize-links")]
#[command(about = "Rewrite the hyperlinks of an XLSX file to bare filenames", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the XLSX file, rewritten in place
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Also rewrite web URLs (https://host/doc.xlsx becomes doc.xlsx)
    #[arg(long)]
    rewrite_urls: bool,

    /// Log every rewritten hyperlink to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(_) => {
            println!("{}", LinkError::Usage(USAGE.to_string()));
            return ExitCode::from(1);
        }
    };

    logging::init_logger(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    debug!("Configuration: {:?}", config);

    HyperlinkNormalizer::with_config(config)
        .normalize_file(&cli.file)
        .with_context(|| format!("Failed to update links in {}", cli.file.display()))?;

    println!("Updated links in {}", cli.file.display());
    Ok(())
}

fn load_config(cli: &Cli) -> Result<NormalizerConfig> {
    let mut config = match &cli.config {
        Some(config_path) => NormalizerConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?,
        None => NormalizerConfig::default(),
    };

    if cli.rewrite_urls {
        config.rewrite_urls = true;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
