//! Loading the remover section from a TOML configuration file.
//!
//! The file mirrors the deployment descriptor layout. Either form is accepted:
//!
//! ```toml
//! [custom.remover]
//! prompt = true
//! buckets = ["my-app-logs", "my-app-assets"]
//! ```
//!
//! ```toml
//! [remover]
//! buckets = ["my-app-logs"]
//! ```
//!
//! When both tables are present, `[custom.remover]` wins.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::config::RemoverConfig;
use crate::types::error::GBucketRemoveError;

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    custom: Option<CustomSection>,
    #[serde(default)]
    remover: Option<RemoverConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct CustomSection {
    #[serde(default)]
    remover: Option<RemoverConfig>,
}

/// Parse the remover section from TOML text.
///
/// A file without any remover table yields the defaults
/// (`prompt = false`, no buckets).
pub fn parse_remover_config(content: &str) -> Result<RemoverConfig, GBucketRemoveError> {
    let file: ConfigFile =
        toml::from_str(content).map_err(|e| GBucketRemoveError::ConfigFile(e.to_string()))?;

    let remover = file
        .custom
        .and_then(|custom| custom.remover)
        .or(file.remover)
        .unwrap_or_default();

    Ok(remover)
}

/// Read and parse the remover section from a TOML file.
pub fn load_remover_config(path: &Path) -> Result<RemoverConfig, GBucketRemoveError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        GBucketRemoveError::ConfigFile(format!("failed to read {}: {e}", path.display()))
    })?;

    let remover = parse_remover_config(&content)?;
    debug!(
        path = %path.display(),
        prompt = remover.prompt,
        buckets = remover.buckets.len(),
        "remover configuration loaded."
    );

    Ok(remover)
}
