use async_trait::async_trait;

use crate::error::ProgressionError;

/// External progression/leveling collaborator.
///
/// Given a feature key and a base value, returns the value after any unlocked
/// upgrades are applied. The gate passes cooldown lengths in nanoseconds and
/// reads the result back in nanoseconds.
#[async_trait]
pub trait ProgressionService: Send + Sync {
    async fn modified_value(
        &self,
        feature_key: &str,
        base_value: f64,
    ) -> Result<f64, ProgressionError>;
}
