//! Pipewright CLI - serve the pipeline API and exercise it.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pipewright_server::observability::{init_tracing, LogFormat, TracingConfig, TracingGuard};
use std::path::PathBuf;

/// Pipewright - declarative data pipelines over a REST API.
#[derive(Parser)]
#[command(name = "pipewright")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Pipewright API server
    Serve {
        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to (overrides the configuration)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to listen on (overrides the configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the load-test suites against a server
    Loadtest {
        /// Server base URL
        #[arg(long, default_value = "http://localhost:8080")]
        base_url: String,

        /// API key of an identity owning the namespace
        #[arg(long)]
        api_key: Option<String>,

        /// API key of an identity outside the namespace
        #[arg(long)]
        foreign_api_key: Option<String>,

        /// Namespace to create resources in
        #[arg(long, default_value = "users/admin")]
        namespace: String,

        /// Concurrent virtual users
        #[arg(long, default_value = "1")]
        vus: usize,

        /// Iterations per virtual user
        #[arg(long, default_value = "1")]
        iterations: usize,

        /// Per-request timeout in seconds
        #[arg(long, default_value = "300")]
        timeout: u64,

        /// Suites to run (repeatable; all when omitted)
        #[arg(short, long = "suite")]
        suites: Vec<String>,
    },

    /// Print the SHA-256 hash of an API key for the configuration file
    HashKey {
        /// Plaintext key
        key: String,
    },

    /// Show version information
    Version,
}

fn setup_logging(verbosity: u8) -> Result<TracingGuard> {
    let log_format = std::env::var("PIPEWRIGHT_LOG_FORMAT")
        .ok()
        .and_then(|s| s.parse::<LogFormat>().ok())
        .unwrap_or_else(|| {
            if std::io::IsTerminal::is_terminal(&std::io::stdout()) {
                LogFormat::Pretty
            } else {
                LogFormat::Compact
            }
        });

    // RUST_LOG wins over -v
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| TracingConfig::filter_for_verbosity(verbosity).to_string());

    let config = TracingConfig::builder()
        .log_format(log_format)
        .log_filter(log_filter)
        .build();

    init_tracing(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _tracing_guard = setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Serve { config, host, port } => {
            commands::serve::run(config.as_deref(), host, port).await
        }
        Commands::Loadtest {
            base_url,
            api_key,
            foreign_api_key,
            namespace,
            vus,
            iterations,
            timeout,
            suites,
        } => {
            let options = commands::loadtest::LoadTestOptions {
                base_url,
                api_key,
                foreign_api_key,
                namespace,
                vus,
                iterations,
                timeout_secs: timeout,
                suites,
            };
            commands::loadtest::run(options).await
        }
        Commands::HashKey { key } => commands::hash_key::run(&key),
        Commands::Version => commands::version::run(),
    }
}
