//! modguard
//!
//! Command-line front end for the content moderation pipeline: analyse text,
//! inspect the policy catalogue, run training sessions and replay the mock
//! feed through the moderation queue.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

mod commands;
mod config;

use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "modguard")]
#[command(about = "Content moderation decision pipeline", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "modguard.yaml")]
    config: String,

    /// Inference backend for the ML path
    #[arg(short, long, global = true, value_enum)]
    backend: Option<BackendArg>,

    /// Policy knowledge base file
    #[arg(short, long, global = true)]
    policies: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    None,
    Lexicon,
    Http,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyse one or more texts
    Analyze {
        #[arg(required = true)]
        texts: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Correlation id for log output
        #[arg(long)]
        id: Option<String>,
    },

    /// List the policy catalogue, or the policies relevant to a query
    Policies {
        #[arg(short, long)]
        query: Option<String>,

        #[arg(short, long, default_value_t = modguard_policy::DEFAULT_LIMIT)]
        limit: usize,
    },

    /// Import labeled examples and run a training session
    Train {
        /// CSV file of `content,label[,categories]` rows
        #[arg(long)]
        csv: Option<String>,

        /// Include the built-in sample examples
        #[arg(long)]
        samples: bool,

        /// Pause per progress step, in milliseconds
        #[arg(long)]
        step_ms: Option<u64>,
    },

    /// Replay the mock feed through the moderation queue
    Feed {
        /// Stop after this many items
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only replay items mentioning one of these
        #[arg(short, long, value_delimiter = ',')]
        keywords: Vec<String>,

        #[arg(short, long)]
        region: Option<String>,

        /// Pause between items, in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Add analysed items to the training store
        #[arg(long)]
        context_training: bool,

        /// Print Prometheus metrics when done
        #[arg(long)]
        metrics: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load(&cli.config, &cli)?;

    init_tracing(cli.verbose, config.logging.json);
    info!(config = %cli.config, backend = ?config.classifier.backend, "Configuration loaded");

    match &cli.command {
        Command::Analyze { texts, json, id } => {
            commands::analyze(&config, texts, *json, id.as_deref()).await
        }
        Command::Policies { query, limit } => commands::policies(&config, query.as_deref(), *limit),
        Command::Train { csv, samples, .. } => {
            commands::train(&config, csv.as_deref(), *samples).await
        }
        Command::Feed { metrics, .. } => {
            let metrics_handle = if *metrics { Some(init_metrics()?) } else { None };
            commands::feed(&config, metrics_handle).await
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("modguard=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("modguard=info"))
    };

    // Logs go to stderr so command output stays clean
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    modguard_engine::describe_metrics();

    info!("Metrics recorder installed");
    Ok(handle)
}
