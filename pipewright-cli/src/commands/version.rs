//! Version command - show version information.

use anyhow::Result;

/// Version information.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the version command.
pub fn run() -> Result<()> {
    println!("Pipewright - declarative data pipelines");
    println!();
    println!("Version:     {}", VERSION);
    println!(
        "Platform:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    println!();
    println!("Components:");
    println!("  pipewright-core      Resource model, recipes, filters, auth");
    println!("  pipewright-server    REST API, stores, executor");
    println!("  pipewright-client    Typed HTTP client");
    println!("  pipewright-loadtest  Contract and load-test suites");
    println!("  pipewright-cli       Command-line interface");

    Ok(())
}
