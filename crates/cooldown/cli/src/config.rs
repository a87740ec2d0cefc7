//! Configuration for cooldownctl

use std::collections::HashMap;
use std::time::Duration;

use cooldown_gate::{
    GateConfig, ACTION_SEARCH, DEFAULT_COOLDOWN, FEATURE_SEARCH_COOLDOWN_REDUCTION,
};
use serde::{Deserialize, Serialize};

/// Main CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Gate configuration
    #[serde(default)]
    pub gate: GateSection,

    /// Progression simulation
    #[serde(default)]
    pub progression: ProgressionSection,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gate configuration, durations in whole seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSection {
    /// Never reject; still record usage
    #[serde(default)]
    pub dev_mode: bool,

    /// Cooldown for actions without an override or built-in default
    #[serde(default = "default_cooldown_secs")]
    pub default_cooldown_secs: u64,

    /// Per-action overrides
    #[serde(default)]
    pub cooldowns: HashMap<String, u64>,

    /// Action → progression feature key
    #[serde(default = "default_progression_features")]
    pub progression_features: HashMap<String, String>,
}

impl Default for GateSection {
    fn default() -> Self {
        Self {
            dev_mode: false,
            default_cooldown_secs: default_cooldown_secs(),
            cooldowns: HashMap::new(),
            progression_features: default_progression_features(),
        }
    }
}

/// Fixed progression reductions, in seconds per feature key.
///
/// With no reductions configured the gate runs without a progression service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressionSection {
    #[serde(default)]
    pub reductions: HashMap<String, f64>,
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage, lost on exit
    #[default]
    Memory,

    /// PostgreSQL storage
    Postgres {
        /// Connection URL
        url: String,

        /// Maximum connections in pool
        #[serde(default = "default_pool_size")]
        max_connections: u32,

        /// Connection timeout in seconds
        #[serde(default = "default_connection_timeout")]
        connect_timeout_secs: u64,
    },
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_cooldown_secs() -> u64 {
    DEFAULT_COOLDOWN.as_secs()
}

fn default_progression_features() -> HashMap<String, String> {
    HashMap::from([(
        ACTION_SEARCH.to_string(),
        FEATURE_SEARCH_COOLDOWN_REDUCTION.to_string(),
    )])
}

fn default_pool_size() -> u32 {
    10
}

fn default_connection_timeout() -> u64 {
    5
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl CliConfig {
    /// Load configuration: defaults, then the optional file, then `COOLDOWN_*`
    /// environment variables (`COOLDOWN_GATE__DEV_MODE=true`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        Self::load_with_env(path, None)
    }

    /// As [`CliConfig::load`], reading environment variables from `env`
    /// instead of the process environment when given.
    pub fn load_with_env(
        path: Option<&str>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&CliConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("COOLDOWN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        builder.build()?.try_deserialize()
    }

    /// Gate configuration built from the `gate` section.
    pub fn gate_config(&self) -> GateConfig {
        let mut gate = GateConfig::default()
            .with_dev_mode(self.gate.dev_mode)
            .with_default_cooldown(Duration::from_secs(self.gate.default_cooldown_secs))
            .without_progression();
        for (action, secs) in &self.gate.cooldowns {
            gate = gate.with_cooldown(action.clone(), Duration::from_secs(*secs));
        }
        for (action, feature) in &self.gate.progression_features {
            gate = gate.with_progression_feature(action.clone(), feature.clone());
        }
        gate
    }
}
