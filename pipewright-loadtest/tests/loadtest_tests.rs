//! Runs the suites against an in-process server.

use pipewright_core::auth::{ApiKeyBuilder, ApiKeyConfig, AuthConfig};
use pipewright_loadtest::{run, LoadTestConfig, LoadTestError, Suite};
use pipewright_server::api::{ApiServer, AppState, ServerConfig, ServerHandle};
use pipewright_server::config::ServiceConfig;
use std::time::Duration;

const ADMIN_KEY: &str = "admin-key";
const FOREIGN_KEY: &str = "bob-key";

async fn start(config: ServiceConfig) -> ServerHandle {
    ApiServer::new(ServerConfig::new("127.0.0.1", 0), AppState::new(&config))
        .spawn()
        .await
        .expect("server should start")
}

fn auth_config() -> ServiceConfig {
    let keys = ApiKeyConfig::new()
        .with_key(ApiKeyBuilder::new("admin").admin().build_with_key(ADMIN_KEY))
        .with_key(ApiKeyBuilder::new("bob").member().build_with_key(FOREIGN_KEY));
    let mut config = ServiceConfig::default();
    config.auth = AuthConfig::new().enabled().with_api_key(keys);
    config
}

#[tokio::test]
async fn every_suite_passes_against_authenticated_server() {
    let server = start(auth_config()).await;

    let config = LoadTestConfig::new(server.base_url())
        .with_api_key(ADMIN_KEY)
        .with_foreign_api_key(FOREIGN_KEY)
        .with_vus(2)
        .with_iterations(2)
        .with_timeout(Duration::from_secs(30));
    let summary = run(config).await.expect("run should finish");

    let failed: Vec<_> = summary.failed_checks().map(|(name, _)| name.clone()).collect();
    assert!(failed.is_empty(), "failed checks: {:?}\n{}", failed, summary);
    assert!(summary.passes() > 0);
    assert_eq!(summary.vus, 2);

    for suite in Suite::all() {
        let name = format!("{} completed", suite);
        let counts = summary
            .checks
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| *c)
            .expect("suite completion recorded");
        assert_eq!(counts.passes, 4, "{}", name);
    }

    let _ = server.shutdown().await;
}

#[tokio::test]
async fn selected_suites_only() {
    let server = start(ServiceConfig::default()).await;

    let config = LoadTestConfig::new(server.base_url())
        .with_suites(vec![Suite::Definitions, Suite::Pipelines]);
    let summary = run(config).await.expect("run should finish");

    assert!(summary.is_success(), "{}", summary);
    let names: Vec<&str> = summary.checks.iter().map(|(n, _)| n.as_str()).collect();
    assert!(names.contains(&"definitions completed"));
    assert!(names.contains(&"pipelines completed"));
    assert!(!names.contains(&"triggers completed"));

    let _ = server.shutdown().await;
}

#[tokio::test]
async fn unreachable_server_fails_suites() {
    let config = LoadTestConfig::new("http://127.0.0.1:9")
        .with_suites(vec![Suite::Definitions])
        .with_timeout(Duration::from_secs(5));
    let summary = run(config).await.expect("run should finish");

    assert!(!summary.is_success());
    assert!(summary
        .failed_checks()
        .any(|(name, _)| name == "definitions completed"));
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let result = run(LoadTestConfig::new("localhost:8080")).await;
    assert!(matches!(result, Err(LoadTestError::InvalidConfig(_))));

    let result = run(LoadTestConfig::new("http://localhost:8080").with_vus(0)).await;
    assert!(matches!(result, Err(LoadTestError::InvalidConfig(_))));
}
