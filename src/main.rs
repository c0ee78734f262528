//! webtangle CLI - extract source files from an `@`-directive web

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use webtangle::commands;
use webtangle::interface::Context;
use webtangle::Config;

#[derive(Parser)]
#[command(name = "webtangle")]
#[command(author, version, about = "Tangle @-directive literate programs", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Working directory
    #[arg(short = 'C', long)]
    directory: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dry run - show what would be done without doing it
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Expand tabs in output files to this width
    #[arg(short, long, value_name = "N")]
    tabs: Option<usize>,

    /// Leave output files untouched when their content is unchanged
    #[arg(long)]
    only_changed: bool,

    /// Do not run @post_create commands
    #[arg(long)]
    no_post_create: bool,

    /// Directory to write output files into
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Input documents, read in order as one web ("-" reads stdin)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(width) = self.tabs {
            config.tab_width = Some(width);
        }
        if self.only_changed {
            config.only_if_changed = true;
        }
        if self.no_post_create {
            config.run_post_create = false;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Determine working directory
    let base_dir = cli
        .directory
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    // Read configuration from file or use defaults
    let config = match &cli.config {
        Some(path) => webtangle::config::read_config_file(path),
        None => webtangle::config::read_config(&base_dir),
    };
    let mut config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply_overrides(&mut config);
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let ctx = Context::new(config, base_dir);

    let options = commands::TangleOptions {
        dry_run: cli.dry_run,
        files: cli.files,
    };

    match commands::tangle(&ctx, options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
