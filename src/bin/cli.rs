// src/bin/cli.rs

//! Company aggregator CLI.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use company_aggregator::{
    error::Result,
    models::{Config, SourceKind},
    pipeline,
    services::RuleSet,
    storage::LocalStorage,
    utils::http::HttpFetcher,
};

/// Collects agencies from directories, tax open data and ratings.
#[derive(Parser, Debug)]
#[command(name = "aggregator", version, about = "Multi-source company aggregator")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "storage/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect, merge and export companies
    Collect {
        /// Sources to run, in order (default: all configured)
        #[arg(short, long, value_delimiter = ',')]
        sources: Vec<SourceKind>,

        /// Search phrase for directory sources (repeatable)
        #[arg(short, long = "query")]
        queries: Vec<String>,

        /// Maximum accepted records per source
        #[arg(short, long)]
        max: Option<usize>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open-data set for the bulk source
        #[arg(long)]
        dataset: Option<String>,

        /// Only write the merged table
        #[arg(long)]
        merged_only: bool,

        /// Skip the per-company text report
        #[arg(long)]
        no_report: bool,
    },

    /// List configured sources
    Sources,

    /// Validate configuration
    Validate,

    /// Show the segment labels of an ad-hoc company
    Classify {
        /// Company name
        name: String,

        /// Activity description
        #[arg(short, long)]
        description: Option<String>,

        /// Industry code, e.g. 73.11
        #[arg(short, long)]
        code: Option<String>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = if cli.config.exists() {
        Config::load_or_default(&cli.config)
    } else {
        log::info!("No config at {}, using defaults", cli.config.display());
        Config::default()
    };

    match cli.command {
        Command::Collect {
            sources,
            queries,
            max,
            output,
            dataset,
            merged_only,
            no_report,
        } => {
            if !sources.is_empty() {
                config.collect.sources = sources;
            }
            if !queries.is_empty() {
                config.collect.queries = queries;
            }
            if let Some(max) = max {
                config.collect.max_per_source = max;
            }
            if let Some(output) = output {
                config.export.output_dir = output;
            }
            if let Some(dataset) = dataset {
                config.bulk.default_dataset = dataset;
            }
            if merged_only {
                config.export.per_source = false;
            }
            if no_report {
                config.export.report = false;
            }

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
            let storage = LocalStorage::new(&config.export.output_dir);
            let report = pipeline::run_pipeline(&config, fetcher, &storage).await?;

            let elapsed = report.finished_at - report.started_at;
            log::info!(
                "Collected {} companies in {}s",
                report.merged.len(),
                elapsed.num_seconds()
            );
            for file in &report.files {
                log::info!("  {} ({} rows)", file.path.display(), file.rows);
            }
            if let Some(path) = &report.report {
                log::info!("  {} (report)", path.display());
            }
        }

        Command::Sources => {
            for kind in SourceKind::ALL {
                let selected = config.collect.sources.contains(&kind);
                log::info!("{} {}", if selected { "*" } else { " " }, kind);
            }
            for site in &config.directories {
                log::info!("[{}] {} (pages: {})", site.source, site.base_url, site.pages);
            }
            for dataset in &config.bulk.datasets {
                let marker = if dataset.name == config.bulk.default_dataset {
                    "*"
                } else {
                    " "
                };
                log::info!(
                    "[{}] {} {} - {}",
                    SourceKind::FnsOpenData,
                    marker,
                    dataset.name,
                    dataset.description
                );
            }
            for category in &config.ratings.categories {
                log::info!(
                    "[{}] {} - {} ({})",
                    SourceKind::Ruward,
                    category.slug,
                    category.name,
                    category.label
                );
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            RuleSet::from_config(&config)?;
            log::info!("✓ Config OK (rule table v{})", config.rules.version);
        }

        Command::Classify {
            name,
            description,
            code,
        } => {
            let rules = RuleSet::from_config(&config)?;
            let labels =
                rules
                    .classifier
                    .classify_parts(&name, description.as_deref(), code.as_deref());
            println!("{}", labels.to_pipe_string());
        }
    }

    Ok(())
}
