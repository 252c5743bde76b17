//! Runtime configuration for the bridges.
//!
//! Configuration can be loaded from environment variables, parsed from a JSON
//! document, or constructed programmatically.

use std::env;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

/// Default prefix of multipart boundaries produced by the form-data module.
pub const DEFAULT_BOUNDARY_PREFIX: &str = "----MirrorFormBoundary";

/// Bridge configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Queue UI commands and hand them over in batches instead of one by one.
    pub batch_updates: bool,
    /// Prefix of every multipart boundary.
    pub form_data_boundary_prefix: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            batch_updates: false,
            form_data_boundary_prefix: String::from(DEFAULT_BOUNDARY_PREFIX),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `MIRROR_BATCH_UPDATES`: `1` or `true` enables batching (default: disabled)
    /// - `MIRROR_FORM_BOUNDARY`: boundary prefix (default: [`DEFAULT_BOUNDARY_PREFIX`])
    #[must_use]
    pub fn from_env() -> Self {
        let batch_updates = env::var("MIRROR_BATCH_UPDATES")
            .ok()
            .is_some_and(|val| val == "1" || val.eq_ignore_ascii_case("true"));
        let form_data_boundary_prefix = env::var("MIRROR_FORM_BOUNDARY")
            .ok()
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| String::from(DEFAULT_BOUNDARY_PREFIX));
        Self {
            batch_updates,
            form_data_boundary_prefix,
        }
    }

    /// Parse configuration from JSON. Missing fields take their defaults.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).context("invalid bridge configuration")
    }

    /// Builder-style toggle for batched command delivery.
    #[must_use]
    pub fn with_batch_updates(mut self, batch_updates: bool) -> Self {
        self.batch_updates = batch_updates;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = BridgeConfig::from_json(r#"{ "batch_updates": true }"#).unwrap();
        assert!(config.batch_updates);
        assert_eq!(config.form_data_boundary_prefix, DEFAULT_BOUNDARY_PREFIX);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let error = BridgeConfig::from_json("{ batch").unwrap_err();
        assert!(error.to_string().contains("invalid bridge configuration"));
    }
}
