use std::collections::HashMap;
use std::time::Duration;

/// Fallback cooldown for actions with neither an override nor a built-in default.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5 * 60);

/// The search action; the only action progression-modified out of the box.
pub const ACTION_SEARCH: &str = "search";

/// Progression feature that shortens the search cooldown.
pub const FEATURE_SEARCH_COOLDOWN_REDUCTION: &str = "search_cooldown_reduction";

/// Built-in per-action defaults, consulted after configured overrides.
const BUILTIN_COOLDOWNS: &[(&str, Duration)] = &[(ACTION_SEARCH, Duration::from_secs(30 * 60))];

/// Configuration threaded into a [`CooldownGate`](crate::CooldownGate) at construction.
#[derive(Clone, Debug)]
pub struct GateConfig {
    /// Suppress cooldown rejections while still recording usage (default: false)
    pub dev_mode: bool,
    /// Used for actions without an override or built-in default (default: 5m)
    pub default_cooldown: Duration,
    /// Per-action overrides
    pub cooldowns: HashMap<String, Duration>,
    /// Action → progression feature key for actions whose cooldown can be reduced
    pub progression_features: HashMap<String, String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            default_cooldown: DEFAULT_COOLDOWN,
            cooldowns: HashMap::new(),
            progression_features: HashMap::from([(
                ACTION_SEARCH.to_string(),
                FEATURE_SEARCH_COOLDOWN_REDUCTION.to_string(),
            )]),
        }
    }
}

impl GateConfig {
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    pub fn with_default_cooldown(mut self, duration: Duration) -> Self {
        self.default_cooldown = duration;
        self
    }

    pub fn with_cooldown(mut self, action: impl Into<String>, duration: Duration) -> Self {
        self.cooldowns.insert(action.into(), duration);
        self
    }

    pub fn with_progression_feature(
        mut self,
        action: impl Into<String>,
        feature_key: impl Into<String>,
    ) -> Self {
        self.progression_features
            .insert(action.into(), feature_key.into());
        self
    }

    /// Drop every progression mapping, including the built-in one.
    pub fn without_progression(mut self) -> Self {
        self.progression_features.clear();
        self
    }

    /// Base (unmodified) cooldown for an action.
    pub fn cooldown_duration(&self, action: &str) -> Duration {
        if let Some(duration) = self.cooldowns.get(action) {
            return *duration;
        }
        BUILTIN_COOLDOWNS
            .iter()
            .find(|(name, _)| *name == action)
            .map(|(_, duration)| *duration)
            .unwrap_or(self.default_cooldown)
    }

    /// Progression feature key for an action, if its cooldown is modifiable.
    pub fn progression_feature(&self, action: &str) -> Option<&str> {
        self.progression_features.get(action).map(String::as_str)
    }
}
