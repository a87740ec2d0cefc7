//! CLI error types

use cooldown_gate::CooldownError;
use cooldown_storage::StorageError;
use thiserror::Error;

/// CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Includes cooldown rejections from `enforce`.
    #[error("{0}")]
    Cooldown(#[from] CooldownError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Interrupted")]
    Interrupted,
}

impl CliError {
    /// Process exit status: 2 for rejections, 1 for every other failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Cooldown(err) if err.is_on_cooldown() => 2,
            _ => 1,
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
