//! Vault configuration
//!
//! Defaults, then an optional `vaultgraph.json` in the vault root, then
//! environment overrides:
//!
//! * `VAULTGRAPH_ECHO_TTL_MS` - write-echo window in milliseconds
//! * `VAULTGRAPH_CONTEXT_DISTANCE` - hop limit for context extraction
//! * `VAULTGRAPH_CONTEXT_LEVEL` - `titles`, `summaries` or `full`

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, VaultError};
use crate::operations::ExternalEdgePolicy;
use crate::traversal::ContentLevel;

/// Name of the optional per-vault configuration file
pub const CONFIG_FILE_NAME: &str = "vaultgraph.json";

pub const ECHO_TTL_ENV: &str = "VAULTGRAPH_ECHO_TTL_MS";
pub const CONTEXT_DISTANCE_ENV: &str = "VAULTGRAPH_CONTEXT_DISTANCE";
pub const CONTEXT_LEVEL_ENV: &str = "VAULTGRAPH_CONTEXT_LEVEL";

/// Configuration of a vault session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VaultConfig {
    /// Directory holding the node files
    pub vault_root: PathBuf,
    /// How long an own write is remembered for echo suppression (default: 300)
    pub echo_ttl_ms: u64,
    /// Hop limit used by context extraction (default: 3)
    pub context_max_distance: usize,
    /// Text carried per node in context bundles (default: full content)
    pub context_content_level: ContentLevel,
    /// Buffered graph events per subscriber (default: 256)
    pub event_channel_capacity: usize,
    /// Default handling of edges leaving a merged selection
    pub merge_edge_policy: ExternalEdgePolicy,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            vault_root: PathBuf::from("."),
            echo_ttl_ms: 300,
            context_max_distance: 3,
            context_content_level: ContentLevel::FullContent,
            event_channel_capacity: 256,
            merge_edge_policy: ExternalEdgePolicy::Preserve,
        }
    }
}

impl VaultConfig {
    /// Default configuration for `vault_root`
    pub fn new(vault_root: impl Into<PathBuf>) -> Self {
        Self {
            vault_root: vault_root.into(),
            ..Self::default()
        }
    }

    /// Load the configuration of the vault at `vault_root`.
    ///
    /// A missing config file is not an error. The `vault_root` stored in the
    /// file, if any, is ignored in favour of the argument.
    pub fn load(vault_root: impl AsRef<Path>) -> Result<Self> {
        let vault_root = vault_root.as_ref();
        let config_path = vault_root.join(CONFIG_FILE_NAME);

        let mut config = if config_path.is_file() {
            let text = std::fs::read_to_string(&config_path)
                .map_err(|e| VaultError::io(&config_path, e))?;
            let config: VaultConfig = serde_json::from_str(&text).map_err(|e| {
                VaultError::config(format!("{}: {}", config_path.display(), e))
            })?;
            info!("Loaded vault configuration from {}", config_path.display());
            config
        } else {
            VaultConfig::default()
        };

        config.vault_root = vault_root.to_path_buf();
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate().map_err(VaultError::Config)?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (the process environment in [`load`](Self::load)).
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ttl) = parse_override(&lookup, ECHO_TTL_ENV) {
            self.echo_ttl_ms = ttl;
        }
        if let Some(distance) = parse_override(&lookup, CONTEXT_DISTANCE_ENV) {
            self.context_max_distance = distance;
        }
        if let Some(level) = parse_override(&lookup, CONTEXT_LEVEL_ENV) {
            self.context_content_level = level;
        }
    }

    /// Check the configuration for values the session cannot run with
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.vault_root.as_os_str().is_empty() {
            return Err("vault_root must not be empty".to_string());
        }
        if self.echo_ttl_ms == 0 {
            return Err("echo_ttl_ms must be greater than zero".to_string());
        }
        if self.event_channel_capacity == 0 {
            return Err("event_channel_capacity must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn echo_ttl(&self) -> Duration {
        Duration::from_millis(self.echo_ttl_ms)
    }
}

fn parse_override<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) => {
            info!("Using {} from environment: {}", name, raw.trim());
            Some(value)
        }
        Err(_) => {
            warn!("Ignoring invalid {} value: {:?}", name, raw);
            None
        }
    }
}
