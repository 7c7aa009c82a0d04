//! Loadtest command - run the suites against a server.

use anyhow::{bail, Result};
use pipewright_loadtest::{LoadTestConfig, Suite};
use std::time::Duration;

/// Options collected from the command line.
pub struct LoadTestOptions {
    pub base_url: String,
    pub api_key: Option<String>,
    pub foreign_api_key: Option<String>,
    pub namespace: String,
    pub vus: usize,
    pub iterations: usize,
    pub timeout_secs: u64,
    pub suites: Vec<String>,
}

impl LoadTestOptions {
    fn into_config(self) -> Result<LoadTestConfig> {
        let mut config = LoadTestConfig::new(self.base_url)
            .with_namespace(self.namespace)
            .with_vus(self.vus)
            .with_iterations(self.iterations)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(key) = self.api_key {
            config = config.with_api_key(key);
        }
        if let Some(key) = self.foreign_api_key {
            config = config.with_foreign_api_key(key);
        }
        if !self.suites.is_empty() {
            let suites = self
                .suites
                .iter()
                .map(|s| s.parse::<Suite>())
                .collect::<pipewright_loadtest::Result<Vec<_>>>()?;
            config = config.with_suites(suites);
        }
        Ok(config)
    }
}

/// Run the loadtest command. Fails when any check failed.
pub async fn run(options: LoadTestOptions) -> Result<()> {
    let config = options.into_config()?;

    println!("Running load test against {}", config.base_url);
    println!(
        "  {} virtual user(s) x {} iteration(s), suites: {}",
        config.vus,
        config.iterations,
        config
            .suites
            .iter()
            .map(Suite::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();

    let summary = pipewright_loadtest::run(config).await?;
    println!("{}", summary);
    println!();

    if !summary.is_success() {
        bail!("{} check evaluation(s) failed", summary.fails());
    }
    println!("✓ All checks passed");
    Ok(())
}
