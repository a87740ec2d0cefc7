//! Output formatting for CLI

use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use cooldown_gate::{format_remaining, CooldownStatus};
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
}

/// One (user, action) pair as reported by the CLI.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CooldownView {
    pub user_id: String,
    pub action: String,
    pub on_cooldown: bool,
    pub remaining_secs: f64,
    #[serde(skip)]
    pub remaining: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl CooldownView {
    pub fn new(
        user_id: impl Into<String>,
        action: impl Into<String>,
        status: CooldownStatus,
        last_used_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            action: action.into(),
            on_cooldown: status.on_cooldown,
            remaining_secs: status.remaining.as_secs_f64(),
            remaining: status.remaining,
            last_used_at,
        }
    }

    pub fn render_text(&self) -> String {
        let state = if self.on_cooldown {
            format!(
                "on cooldown, {} remaining",
                format_remaining(&self.remaining)
            )
        } else {
            "ready".to_string()
        };
        match self.last_used_at {
            Some(at) => format!(
                "{}:{} {} (last used {})",
                self.user_id,
                self.action,
                state,
                at.to_rfc3339()
            ),
            None => format!("{}:{} {}", self.user_id, self.action, state),
        }
    }
}
