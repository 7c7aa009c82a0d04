//! Drives virtual users through the configured suites.

use crate::checks::Checks;
use crate::config::LoadTestConfig;
use crate::error::{LoadTestError, Result};
use crate::summary::Summary;
use crate::suites::Suite;
use crate::vu::VirtualUser;
use futures::future::join_all;
use pipewright_client::Client;
use std::sync::Arc;
use std::time::Instant;

/// Run the load test and collect every check.
///
/// Each virtual user runs on its own task and performs `iterations`
/// passes over the configured suites. A suite that aborts with an error
/// is recorded as a failed `<suite> completed` check rather than ending
/// the run.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a client cannot be
/// built, or a virtual user task panics.
pub async fn run(config: LoadTestConfig) -> Result<Summary> {
    config.validate()?;

    let anonymous = Client::new(&config.base_url)?.with_timeout(config.timeout)?;
    let client = match &config.api_key {
        Some(key) => anonymous.clone().with_api_key(key),
        None => anonymous.clone(),
    };
    let foreign = config
        .foreign_api_key
        .as_ref()
        .map(|key| anonymous.clone().with_api_key(key));

    tracing::info!(
        base_url = %config.base_url,
        vus = config.vus,
        iterations = config.iterations,
        suites = ?config.suites.iter().map(Suite::as_str).collect::<Vec<_>>(),
        "Starting load test"
    );

    let checks = Arc::new(Checks::new());
    let suites = Arc::new(config.suites.clone());
    let started = Instant::now();

    let handles = (0..config.vus).map(|number| {
        let vu = VirtualUser::new(
            number,
            client.clone(),
            anonymous.clone(),
            foreign.clone(),
            config.namespace.clone(),
            config.namespace_id(),
            Arc::clone(&checks),
        );
        let suites = Arc::clone(&suites);
        let iterations = config.iterations;
        tokio::spawn(async move { run_vu(vu, &suites, iterations).await })
    });

    for (number, joined) in join_all(handles).await.into_iter().enumerate() {
        joined.map_err(|e| LoadTestError::VirtualUser {
            vu: number,
            cause: e.to_string(),
        })?;
    }

    let summary = Summary {
        checks: checks.snapshot(),
        duration: started.elapsed(),
        vus: config.vus,
        iterations: config.iterations,
    };

    tracing::info!(
        passes = summary.passes(),
        fails = summary.fails(),
        duration_ms = summary.duration.as_millis() as u64,
        "Load test finished"
    );

    Ok(summary)
}

async fn run_vu(vu: VirtualUser, suites: &[Suite], iterations: usize) {
    for iteration in 0..iterations {
        for &suite in suites {
            let outcome = suite.run(&vu).await;
            if let Err(e) = &outcome {
                tracing::warn!(
                    vu = vu.number,
                    iteration,
                    suite = %suite,
                    error = %e,
                    "Suite aborted"
                );
            }
            vu.check(&format!("{} completed", suite), outcome.is_ok());
        }
    }
    tracing::debug!(vu = vu.number, "Virtual user finished");
}
