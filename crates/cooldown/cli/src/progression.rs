//! Fixed progression reductions from configuration.

use std::collections::HashMap;

use async_trait::async_trait;
use cooldown_gate::{ProgressionError, ProgressionService};

const NANOS_PER_SEC: f64 = 1e9;

/// Subtracts a configured reduction per feature key.
///
/// Reductions are configured in seconds; values exchanged with the gate are
/// nanoseconds.
#[derive(Debug, Clone, Default)]
pub struct StaticProgression {
    reductions_nanos: HashMap<String, f64>,
}

impl StaticProgression {
    pub fn new(reductions_secs: HashMap<String, f64>) -> Self {
        Self {
            reductions_nanos: reductions_secs
                .into_iter()
                .map(|(feature, secs)| (feature, secs * NANOS_PER_SEC))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reductions_nanos.is_empty()
    }
}

#[async_trait]
impl ProgressionService for StaticProgression {
    async fn modified_value(
        &self,
        feature_key: &str,
        base_value: f64,
    ) -> Result<f64, ProgressionError> {
        self.reductions_nanos
            .get(feature_key)
            .map(|reduction| base_value - reduction)
            .ok_or_else(|| ProgressionError::UnknownFeature(feature_key.to_string()))
    }
}
