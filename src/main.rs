use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use docs_multiversion::{MultiversionUpdater, ReportFormat, Settings};

/// Insert the multi-version dropdown into the navigation bar of every HTML
/// page under a directory and version the URLs of each search index.
#[derive(Parser)]
#[command(name = "docs-multiversion")]
#[command(about = "Versions dropdown updater for multi-version documentation sites")]
#[command(version)]
struct Cli {
    /// Path to the directory containing the HTML files
    directory: PathBuf,

    /// Regular expression matching version directory names
    #[arg(long)]
    pattern: Option<String>,

    /// References that appear first in the dropdown, in this order
    #[arg(long = "refs-order", alias = "refs_order", num_args = 1..)]
    refs_order: Option<Vec<String>>,

    /// Base URL used in the dropdown hrefs
    #[arg(long = "base-url", alias = "base_url")]
    base_url: Option<String>,

    /// Settings file (YAML, TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of parallel jobs
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Human)]
    format: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let overrides = Settings {
        directory: Some(cli.directory),
        pattern: cli.pattern,
        refs_order: cli.refs_order,
        base_url: cli.base_url,
        jobs: cli.jobs,
    };

    let config = Settings::load(cli.config.as_deref())?
        .merge(overrides)
        .validate()?;

    let updater = MultiversionUpdater::new(config);
    let report = updater.run()?;

    report.write(cli.format, &mut std::io::stdout().lock(), &mut std::io::stderr().lock())?;
    Ok(report.exit_code())
}
