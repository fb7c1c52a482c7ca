//! Startup configuration: pre-warm lists and spawner settings.
//!
//! Layers are merged in order:
//! 1. Default values
//! 2. TOML file (if given)
//! 3. Environment variables (`POOL_` prefix, `__` between nested keys)

use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to load or merge configuration.
    #[error("configuration error: {0}")]
    Load(String),
}

/// Top-level pool configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    /// Instances to create before the first acquire.
    #[serde(default)]
    pub prewarm: Vec<PrewarmEntry>,
    /// Periodic spawner settings.
    #[serde(default)]
    pub spawner: SpawnerConfig,
}

/// One pre-warm instruction: create `count` idle instances of `template`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrewarmEntry {
    /// Name the template was registered under.
    pub template: String,
    /// Number of idle instances to create.
    #[serde(default = "default_prewarm_count")]
    pub count: usize,
}

impl PrewarmEntry {
    /// Creates an entry.
    pub fn new(template: impl Into<String>, count: usize) -> Self {
        PrewarmEntry {
            template: template.into(),
            count,
        }
    }
}

fn default_prewarm_count() -> usize {
    1
}

/// Whether spawned objects come from the pool or are built directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnMode {
    /// Acquire from the pool and return on expiry.
    #[default]
    Pooled,
    /// Instantiate from the prefab and drop on expiry.
    Direct,
}

/// Spawner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnerConfig {
    /// Milliseconds between two spawns.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Milliseconds a spawned object lives before it is retired.
    #[serde(default = "default_lifetime_ms")]
    pub lifetime_ms: u64,
    /// Where objects are spawned around.
    #[serde(default)]
    pub origin: [f32; 3],
    /// Template names picked from at random. Empty means every template.
    #[serde(default)]
    pub templates: Vec<String>,
    /// Pooled or direct construction.
    #[serde(default)]
    pub mode: SpawnMode,
    /// Seed for template choice and placement jitter.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SpawnerConfig {
    /// Returns the spawn interval as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Returns the object lifetime as a `Duration`.
    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        SpawnerConfig {
            interval_ms: default_interval_ms(),
            lifetime_ms: default_lifetime_ms(),
            origin: [0.0; 3],
            templates: Vec::new(),
            mode: SpawnMode::default(),
            seed: None,
        }
    }
}

fn default_interval_ms() -> u64 {
    100
}
fn default_lifetime_ms() -> u64 {
    5_000
}

/// Loads configuration by merging defaults, an optional TOML file and
/// `POOL_` environment variables.
pub fn load_config(config_path: Option<&str>) -> Result<PoolConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(PoolConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("POOL_").split("__"));

    figment
        .extract()
        .map_err(|e| ConfigError::Load(e.to_string()))
}
