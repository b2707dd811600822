//! Client configuration.
//!
//! Deserialized from a JSON document and validated before any I/O. A zero
//! batch size never reaches the network.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BetwireError, Result};

/// Where bet records are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SourceConfig {
    /// A plain file with one comma-separated record per line.
    Plain { path: PathBuf },
    /// A zip archive; every entry named `agency-<client_id>*` is read in
    /// name order as one continuous record stream.
    Archive { path: PathBuf },
}

/// Configuration used by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Agency identifier; stamped on every record and sent with the results
    /// query.
    pub client_id: String,
    /// Server address in `host:port` form.
    pub server_address: String,
    /// Maximum records per batch.
    pub batch_max_amount: usize,
    /// Record source selection.
    pub source: SourceConfig,
    /// Optional pause after a successful run before the connection is
    /// closed, in milliseconds.
    #[serde(default)]
    pub grace_period_ms: Option<u64>,
}

impl ClientConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration before any I/O happens.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(BetwireError::Config("client_id must not be empty".to_string()));
        }
        if self.server_address.is_empty() {
            return Err(BetwireError::Config(
                "server_address must not be empty".to_string(),
            ));
        }
        if self.batch_max_amount == 0 {
            return Err(BetwireError::Config(
                "batch_max_amount must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Post-submission grace period, if configured.
    pub fn grace_period(&self) -> Option<Duration> {
        self.grace_period_ms.map(Duration::from_millis)
    }
}
