use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::GateConfig;
use crate::traits::ProgressionService;

/// Resolves the cooldown length actually applied to a check.
///
/// Nothing is cached: every call consults configuration and, for
/// progression-enabled actions, the progression service, so upgrades apply to
/// the very next check.
#[derive(Clone)]
pub struct DurationResolver {
    config: GateConfig,
    progression: Option<Arc<dyn ProgressionService>>,
}

impl std::fmt::Debug for DurationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurationResolver")
            .field("config", &self.config)
            .field("progression", &self.progression.is_some())
            .finish()
    }
}

impl DurationResolver {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            progression: None,
        }
    }

    pub fn with_progression(mut self, progression: Arc<dyn ProgressionService>) -> Self {
        self.progression = Some(progression);
        self
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Configured length, before progression.
    pub fn base_cooldown(&self, action: &str) -> Duration {
        self.config.cooldown_duration(action)
    }

    /// Length after progression. Any progression failure yields the base length.
    pub async fn effective_cooldown(&self, action: &str) -> Duration {
        let base = self.base_cooldown(action);
        let (Some(progression), Some(feature_key)) = (
            self.progression.as_ref(),
            self.config.progression_feature(action),
        ) else {
            return base;
        };

        match progression
            .modified_value(feature_key, base.as_nanos() as f64)
            .await
        {
            Ok(value) => modified_duration(value).unwrap_or(base),
            Err(err) => {
                debug!(
                    action = %action,
                    feature = %feature_key,
                    error = %err,
                    "Progression lookup failed, using base cooldown"
                );
                base
            }
        }
    }
}

/// Nanoseconds from the progression service as a duration. Non-positive
/// values disable the cooldown; non-finite or overflowing values are rejected.
fn modified_duration(nanos: f64) -> Option<Duration> {
    if !nanos.is_finite() || nanos >= u64::MAX as f64 {
        return None;
    }
    if nanos <= 0.0 {
        return Some(Duration::ZERO);
    }
    Some(Duration::from_nanos(nanos.round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ACTION_SEARCH, FEATURE_SEARCH_COOLDOWN_REDUCTION};
    use crate::mocks::MockProgressionService;

    const BASE: Duration = Duration::from_secs(300);

    fn config() -> GateConfig {
        GateConfig::default()
            .with_cooldown(ACTION_SEARCH, BASE)
            .with_cooldown("other", BASE)
    }

    #[tokio::test]
    async fn without_progression_service() {
        let resolver = DurationResolver::new(config());
        assert_eq!(resolver.effective_cooldown(ACTION_SEARCH).await, BASE);
    }

    #[tokio::test]
    async fn modified_value_is_applied() {
        let progression = Arc::new(MockProgressionService::fixed(240e9));
        let resolver = DurationResolver::new(config()).with_progression(progression.clone());

        assert_eq!(
            resolver.effective_cooldown(ACTION_SEARCH).await,
            Duration::from_secs(240)
        );
        assert_eq!(
            progression.calls(),
            vec![(FEATURE_SEARCH_COOLDOWN_REDUCTION.to_string(), 300e9)]
        );
    }

    #[tokio::test]
    async fn reductions_are_exchanged_in_nanoseconds() {
        // A one-minute reduction expressed the way existing progression
        // services apply it.
        let progression = Arc::new(MockProgressionService::reduce_by(
            FEATURE_SEARCH_COOLDOWN_REDUCTION,
            60.0 * 1e9,
        ));
        let resolver = DurationResolver::new(config()).with_progression(progression);

        assert_eq!(
            resolver.effective_cooldown(ACTION_SEARCH).await,
            Duration::from_secs(240)
        );
    }

    #[tokio::test]
    async fn progression_error_falls_back_to_base_exactly() {
        let progression = Arc::new(MockProgressionService::failing());
        let resolver = DurationResolver::new(config()).with_progression(progression.clone());

        assert_eq!(resolver.effective_cooldown(ACTION_SEARCH).await, BASE);
        assert_eq!(progression.call_count(), 1);
    }

    #[tokio::test]
    async fn actions_without_feature_skip_progression() {
        let progression = Arc::new(MockProgressionService::fixed(1e9));
        let resolver = DurationResolver::new(config()).with_progression(progression.clone());

        assert_eq!(resolver.effective_cooldown("other").await, BASE);
        assert_eq!(progression.call_count(), 0);
    }

    #[tokio::test]
    async fn configured_feature_enables_progression() {
        let progression = Arc::new(MockProgressionService::reduce_by("explore_speed", 100e9));
        let resolver = DurationResolver::new(
            config().with_progression_feature("other", "explore_speed"),
        )
        .with_progression(progression);

        assert_eq!(
            resolver.effective_cooldown("other").await,
            Duration::from_secs(200)
        );
    }

    #[tokio::test]
    async fn out_of_range_values() {
        for (value, expected) in [
            (-30e9, Duration::ZERO),
            (0.0, Duration::ZERO),
            (f64::NAN, BASE),
            (f64::INFINITY, BASE),
            (f64::MAX, BASE),
            (1.5e9, Duration::from_millis(1500)),
            (0.4, Duration::ZERO),
            (2.6, Duration::from_nanos(3)),
        ] {
            let resolver = DurationResolver::new(config())
                .with_progression(Arc::new(MockProgressionService::fixed(value)));
            assert_eq!(
                resolver.effective_cooldown(ACTION_SEARCH).await,
                expected,
                "value {value}"
            );
        }
    }
}
