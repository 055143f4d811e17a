//! starq CLI
//!
//! Transforms JSON and YAML documents with jq rules, one job per config file.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use starq_core::GlobalConfig;
use starq_runtime::{JqEngine, Opts, Runner};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// starq - jq-driven JSON and YAML transformer
#[derive(Parser)]
#[command(name = "starq")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Transformer config files, run in order
    config_files: Vec<PathBuf>,

    /// Rule applied before each transformer's own rules (repeatable)
    #[arg(short = 'r', long = "rule", value_name = "RULE")]
    rules: Vec<String>,

    /// Rule applied after each transformer's own rules (repeatable)
    #[arg(short = 'a', long = "append-rule", value_name = "RULE")]
    append_rules: Vec<String>,

    /// jq executable
    #[arg(long, env = "STARQ_JQ", default_value = "jq", value_name = "PROGRAM")]
    jq: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn opts(&self) -> Opts {
        Opts {
            global: GlobalConfig {
                prepend_rules: self.rules.clone(),
                append_rules: self.append_rules.clone(),
            },
            config_files: self.config_files.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only documents
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let opts = cli.opts();
    if opts.is_empty() {
        Cli::command().print_long_help()?;
        return Ok(());
    }

    tracing::debug!(
        "Running {} config files with {} prepend and {} append rules",
        opts.config_files.len(),
        opts.global.prepend_rules.len(),
        opts.global.append_rules.len()
    );
    tracing::debug!("Engine: {}", cli.jq);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut runner = Runner::new(stdin.lock(), stdout.lock(), io::stderr())
        .with_engine(JqEngine::new(&cli.jq));
    runner.run_all_transformers(&opts)?;

    Ok(())
}
