//! Serve command - run the Pipewright API server.

use anyhow::{Context, Result};
use pipewright_server::api::{ApiServer, AppState};
use pipewright_server::config::ServiceConfig;
use std::path::Path;

/// Run the serve command.
pub async fn run(config_path: Option<&Path>, host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = match config_path {
        Some(path) => ServiceConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ServiceConfig::default(),
    };
    let mut config = config
        .with_env_overrides()
        .context("Invalid environment override")?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let host = config.server.host.clone();
    let port = config.server.port;
    tracing::info!(
        host = %host,
        port = port,
        auth = config.auth.enabled,
        "Starting Pipewright API server"
    );

    let mut server = ApiServer::new(config.server_config(), AppState::new(&config));

    println!("Starting Pipewright API server...");
    println!();
    println!("Server: http://{}:{}", host, port);
    println!(
        "Auth:   {}",
        if config.auth.enabled { "API key required" } else { "disabled" }
    );
    println!();
    println!("Endpoints:");
    println!("  GET  /v1beta/health/pipeline                  - Health check");
    println!("  GET  /v1beta/{{ns}}/pipelines                   - List pipelines");
    println!("  POST /v1beta/{{ns}}/pipelines/{{id}}/trigger      - Trigger a pipeline");
    println!("  GET  /v1beta/namespaces/{{ns}}/connections      - List connections");
    println!("  GET  /v1beta/component-definitions            - Component catalog");
    println!();
    println!("Press Ctrl+C to stop.");
    println!();

    let server_task = tokio::spawn(async move { server.run().await });

    tokio::select! {
        result = server_task => {
            result.context("Server task failed")?.context("Server stopped")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Shutdown signal received");
            println!();
            println!("Shutting down...");
        }
    }

    Ok(())
}
