//! Hash-key command - hash an API key for the configuration file.

use anyhow::{bail, Result};
use pipewright_core::auth::ApiKeyHash;

/// Run the hash-key command.
pub fn run(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    let hash = ApiKeyHash::from_plaintext(key);
    println!("{}", hash.as_str());
    Ok(())
}
