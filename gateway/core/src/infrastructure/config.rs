// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Gateway Configuration
//!
//! YAML configuration for the gateway process.
//!
//! ```yaml
//! unit: u
//! bind: 127.0.0.1:8000
//! intake_capacity: 256
//! trees:
//!   two-stalls: ["sequence", "stall", "stall"]
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::domain::tree::Tree;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Environment tag baked into every allocated exid.
    pub unit: String,
    /// Listen address of the HTTP front door.
    pub bind: String,
    /// Bound of the engine intake queue.
    pub intake_capacity: usize,
    /// Named trees registered into the engine at startup, launchable via
    /// the `name` field of a launch message.
    pub trees: HashMap<String, serde_json::Value>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            unit: "g0".to_string(),
            bind: "127.0.0.1:8000".to_string(),
            intake_capacity: 256,
            trees: HashMap::new(),
        }
    }
}

impl GatewayConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse the configured named trees, skipping malformed entries.
    pub fn parsed_trees(&self) -> Vec<(String, Tree)> {
        self.trees
            .iter()
            .filter_map(|(name, value)| match Tree::from_json(value) {
                Ok(tree) => Some((name.clone(), tree)),
                Err(_) => {
                    warn!(name = %name, "skipping malformed tree in config");
                    None
                }
            })
            .collect()
    }
}
