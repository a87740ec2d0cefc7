//! cooldownctl subcommands

use clap::Subcommand;
use cooldown_gate::{CooldownError, CooldownGate, CooldownStatus};
use cooldown_storage::CooldownStore;
use tracing::info;

use crate::error::CliResult;
use crate::output::{CooldownView, OutputFormat};

/// Available commands
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Report whether an action is cooling down
    Check { user_id: String, action: String },

    /// Record a use of an action, failing if it is cooling down
    Enforce { user_id: String, action: String },

    /// Clear the cooldown of an action
    Reset { user_id: String, action: String },

    /// Show when an action was last used
    LastUsed { user_id: String, action: String },

    /// List every recorded action of a user
    List { user_id: String },
}

/// Run `command` against `gate` and render its result.
pub async fn execute<S: CooldownStore>(
    gate: &CooldownGate<S>,
    command: Command,
    format: OutputFormat,
) -> CliResult<String> {
    match command {
        Command::Check { user_id, action } => {
            let status = gate.check_cooldown(&user_id, &action).await?;
            let last_used = gate.get_last_used(&user_id, &action).await?;
            render(format, &[CooldownView::new(user_id, action, status, last_used)])
        }
        Command::Enforce { user_id, action } => {
            gate.enforce_cooldown(&user_id, &action, || async { Ok::<_, CooldownError>(()) })
                .await?;
            info!(user_id = %user_id, action = %action, "Cooldown recorded");
            let last_used = gate.get_last_used(&user_id, &action).await?;
            let status = gate.check_cooldown(&user_id, &action).await?;
            render(format, &[CooldownView::new(user_id, action, status, last_used)])
        }
        Command::Reset { user_id, action } => {
            gate.reset_cooldown(&user_id, &action).await?;
            info!(user_id = %user_id, action = %action, "Cooldown reset");
            render(
                format,
                &[CooldownView::new(user_id, action, CooldownStatus::READY, None)],
            )
        }
        Command::LastUsed { user_id, action } => {
            let last_used = gate.get_last_used(&user_id, &action).await?;
            match format {
                OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "user_id": user_id,
                    "action": action,
                    "last_used_at": last_used,
                }))?),
                OutputFormat::Text => Ok(match last_used {
                    Some(at) => at.to_rfc3339(),
                    None => "never".to_string(),
                }),
            }
        }
        Command::List { user_id } => {
            let views: Vec<CooldownView> = gate
                .list_cooldowns(&user_id)
                .await?
                .into_iter()
                .map(|(record, status)| {
                    let last_used = Some(record.last_used_at);
                    CooldownView::new(record.key.user_id, record.key.action, status, last_used)
                })
                .collect();
            render(format, &views)
        }
    }
}

fn render(format: OutputFormat, views: &[CooldownView]) -> CliResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(views)?),
        OutputFormat::Text => Ok(views
            .iter()
            .map(CooldownView::render_text)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
