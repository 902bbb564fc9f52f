use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::task::JoinHandle;

use super::suppression::SuppressionStore;
use crate::domain::entities::report::{ActionReport, ActionStatus};
use crate::domain::entities::target::{Target, TargetSet};
use crate::domain::ports::log_source::LogSource;
use crate::domain::ports::notifier::Notifier;
use crate::domain::ports::service_manager::ServiceManager;
use crate::domain::ports::store::{AuditLogStore, AuditRecord};
use crate::domain::value_objects::alert_action::{ActionKind, ActionTokenError, AlertAction};

/// Largest log chunk sent in one message; leaves room for markup under Telegram's 4096.
pub const LOG_CHUNK_CHARS: usize = 3800;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error(transparent)]
    Token(#[from] ActionTokenError),
    #[error("no handler registered for {0}")]
    NoHandler(ActionKind),
    #[error("unknown target: {0}")]
    UnknownTarget(String),
    #[error("handler for {handler} cannot run {action}")]
    Mismatch { handler: ActionKind, action: ActionKind },
}

/// Immediate answer to an action press. Long-running work continues in `task`.
#[derive(Debug)]
pub struct ActionOutcome {
    /// Short text shown to the operator right away.
    pub notice: String,
    pub task: Option<JoinHandle<()>>,
}

impl ActionOutcome {
    fn notice(text: impl Into<String>) -> Self {
        Self {
            notice: text.into(),
            task: None,
        }
    }
}

/// Executes one kind of [`AlertAction`]. Must return promptly; slow work is spawned.
pub trait ActionHandler: Send + Sync {
    /// # Errors
    ///
    /// Returns `ActionError` if the action cannot be started.
    fn handle(&self, action: &AlertAction, operator_id: i64) -> Result<ActionOutcome, ActionError>;
}

/// Maps action kinds to handlers. Tokens are decoded here and nowhere else.
#[derive(Default)]
pub struct ActionRouter {
    handlers: HashMap<ActionKind, Arc<dyn ActionHandler>>,
}

impl ActionRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one for the same kind.
    pub fn register(&mut self, kind: ActionKind, handler: Arc<dyn ActionHandler>) {
        self.handlers.insert(kind, handler);
    }

    /// # Errors
    ///
    /// Returns `ActionError` if the token is malformed or the handler rejects it.
    pub fn dispatch_token(&self, token: &str, operator_id: i64) -> Result<ActionOutcome, ActionError> {
        let action = AlertAction::from_token(token)?;
        self.dispatch(&action, operator_id)
    }

    /// # Errors
    ///
    /// Returns `ActionError` if no handler is registered or the handler rejects the action.
    pub fn dispatch(&self, action: &AlertAction, operator_id: i64) -> Result<ActionOutcome, ActionError> {
        let kind = action.kind();
        let handler = self.handlers.get(&kind).ok_or(ActionError::NoHandler(kind))?;
        tracing::info!(action = %kind, operator_id, "Dispatching action");
        handler.handle(action, operator_id)
    }
}

/// Everything the recovery handlers need to act on a target and report back.
pub struct ActionContext {
    pub targets: Arc<TargetSet>,
    pub services: Arc<dyn ServiceManager>,
    pub logs: Arc<dyn LogSource>,
    pub notifier: Arc<dyn Notifier>,
    pub audit: Arc<dyn AuditLogStore>,
    pub settings: ActionSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSettings {
    pub restart_timeout: Duration,
    /// Wait between the restart and the follow-up state query.
    pub restart_settle: Duration,
    pub query_timeout: Duration,
    pub log_timeout: Duration,
    pub log_lines: usize,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            restart_timeout: Duration::from_secs(30),
            restart_settle: Duration::from_secs(3),
            query_timeout: Duration::from_secs(10),
            log_timeout: Duration::from_secs(20),
            log_lines: 50,
        }
    }
}

impl ActionContext {
    fn target(&self, key: &str) -> Result<Target, ActionError> {
        self.targets
            .get(key)
            .cloned()
            .ok_or_else(|| ActionError::UnknownTarget(key.to_string()))
    }

    fn audit(&self, record: &AuditRecord) {
        if let Err(e) = self.audit.log_action(record) {
            tracing::warn!("Failed to log action: {e}");
        }
    }

    async fn report(&self, report: &ActionReport) {
        if let Err(e) = self.notifier.notify_action_result(report).await {
            tracing::warn!(action = %report.action, "Action report failed: {e}");
        }
    }
}

fn record(
    operator_id: i64,
    action: ActionKind,
    target: &str,
    status: ActionStatus,
    details: Option<String>,
) -> AuditRecord {
    AuditRecord {
        timestamp: Utc::now(),
        operator_id,
        action: action.to_string(),
        target: target.to_string(),
        status,
        details,
    }
}

/// Mutes or unmutes an alert identity.
pub struct AcknowledgeHandler {
    suppression: Arc<SuppressionStore>,
    audit: Arc<dyn AuditLogStore>,
}

impl AcknowledgeHandler {
    #[must_use]
    pub fn new(suppression: Arc<SuppressionStore>, audit: Arc<dyn AuditLogStore>) -> Self {
        Self { suppression, audit }
    }
}

impl ActionHandler for AcknowledgeHandler {
    fn handle(&self, action: &AlertAction, operator_id: i64) -> Result<ActionOutcome, ActionError> {
        let (identity, status, notice) = match action {
            AlertAction::Acknowledge { identity } => {
                let changed = self.suppression.acknowledge(identity);
                let notice = if changed {
                    "\u{2705} Alert acknowledged, repeats muted"
                } else {
                    "Alert was already acknowledged"
                };
                (identity, ActionStatus::Acknowledged, notice)
            }
            AlertAction::Unacknowledge { identity } => {
                let changed = self.suppression.unacknowledge(identity);
                let notice = if changed {
                    "\u{1f514} Alert unmuted"
                } else {
                    "Alert was not muted"
                };
                (identity, ActionStatus::Unacknowledged, notice)
            }
            other => {
                return Err(ActionError::Mismatch {
                    handler: ActionKind::Acknowledge,
                    action: other.kind(),
                })
            }
        };

        tracing::info!(identity = %identity, operator_id, %status, "Alert mute changed");
        let entry = record(operator_id, action.kind(), identity.as_str(), status, None);
        if let Err(e) = self.audit.log_action(&entry) {
            tracing::warn!("Failed to log action: {e}");
        }
        Ok(ActionOutcome::notice(notice))
    }
}

/// Restarts a target's unit in the background and reports the resulting state.
pub struct RestartHandler {
    ctx: Arc<ActionContext>,
}

impl RestartHandler {
    #[must_use]
    pub const fn new(ctx: Arc<ActionContext>) -> Self {
        Self { ctx }
    }
}

impl ActionHandler for RestartHandler {
    fn handle(&self, action: &AlertAction, operator_id: i64) -> Result<ActionOutcome, ActionError> {
        let AlertAction::Restart { target } = action else {
            return Err(ActionError::Mismatch {
                handler: ActionKind::Restart,
                action: action.kind(),
            });
        };
        let target = self.ctx.target(target)?;
        let notice = format!("\u{23f3} Restarting {}...", target.service);
        let ctx = Arc::clone(&self.ctx);
        let task = tokio::spawn(async move { restart_and_verify(&ctx, &target, operator_id).await });
        Ok(ActionOutcome {
            notice,
            task: Some(task),
        })
    }
}

/// Restart, settle, confirm. Success means the unit is `active` afterwards.
pub async fn restart_and_verify(ctx: &ActionContext, target: &Target, operator_id: i64) {
    let settings = ctx.settings;
    let (success, summary) = match ctx
        .services
        .restart(&target.service, settings.restart_timeout)
        .await
    {
        Err(e) => (false, format!("Restart failed: {e}")),
        Ok(_) => {
            tokio::time::sleep(settings.restart_settle).await;
            match ctx
                .services
                .query_active(&target.service, settings.query_timeout)
                .await
            {
                Ok(state) => (state.is_active(), format!("State after restart: {state}")),
                Err(e) => (false, format!("State query failed: {e}")),
            }
        }
    };

    if success {
        tracing::info!(target = %target.key, "Restart succeeded");
    } else {
        tracing::warn!(target = %target.key, %summary, "Restart did not bring the service up");
    }

    let status = if success {
        ActionStatus::Success
    } else {
        ActionStatus::Failed
    };
    ctx.audit(&record(
        operator_id,
        ActionKind::Restart,
        &target.service,
        status,
        Some(summary.clone()),
    ));
    ctx.report(&ActionReport {
        action: ActionKind::Restart,
        target_key: target.key.clone(),
        service: target.service.clone(),
        success,
        summary,
        body: None,
    })
    .await;
}

/// Sends the recent journal of a target in bounded chunks.
pub struct FetchLogsHandler {
    ctx: Arc<ActionContext>,
}

impl FetchLogsHandler {
    #[must_use]
    pub const fn new(ctx: Arc<ActionContext>) -> Self {
        Self { ctx }
    }
}

impl ActionHandler for FetchLogsHandler {
    fn handle(&self, action: &AlertAction, _operator_id: i64) -> Result<ActionOutcome, ActionError> {
        let AlertAction::FetchLogs { target } = action else {
            return Err(ActionError::Mismatch {
                handler: ActionKind::FetchLogs,
                action: action.kind(),
            });
        };
        let target = self.ctx.target(target)?;
        let ctx = Arc::clone(&self.ctx);
        let task = tokio::spawn(async move { send_logs(&ctx, &target).await });
        Ok(ActionOutcome {
            notice: "\u{23f3} Fetching logs...".into(),
            task: Some(task),
        })
    }
}

async fn send_logs(ctx: &ActionContext, target: &Target) {
    let settings = ctx.settings;
    let base = ActionReport {
        action: ActionKind::FetchLogs,
        target_key: target.key.clone(),
        service: target.service.clone(),
        success: false,
        summary: String::new(),
        body: None,
    };

    let logs = match ctx
        .logs
        .tail(&target.service, settings.log_lines, settings.log_timeout)
        .await
    {
        Ok(logs) if !logs.trim().is_empty() => logs,
        Ok(_) => {
            ctx.report(&ActionReport {
                summary: "Logs unavailable: journal is empty".into(),
                ..base
            })
            .await;
            return;
        }
        Err(e) => {
            ctx.report(&ActionReport {
                summary: format!("Logs unavailable: {e}"),
                ..base
            })
            .await;
            return;
        }
    };

    let chunks = chunk_lines(&logs, LOG_CHUNK_CHARS);
    let total = chunks.len();
    for (i, chunk) in chunks.into_iter().enumerate() {
        let summary = if total == 1 {
            format!("Last {} log lines", settings.log_lines)
        } else {
            format!("Last {} log lines ({}/{total})", settings.log_lines, i + 1)
        };
        ctx.report(&ActionReport {
            success: true,
            summary,
            body: Some(chunk),
            ..base.clone()
        })
        .await;
    }
}

/// Split text on line boundaries into chunks of at most `max_chars` characters.
/// A single line longer than `max_chars` is cut.
#[must_use]
pub fn chunk_lines(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in text.lines() {
        let mut rest: Vec<char> = line.chars().collect();
        while rest.len() > max_chars {
            if current_len > 0 {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let tail = rest.split_off(max_chars);
            chunks.push(rest.into_iter().collect());
            rest = tail;
        }

        let needed = rest.len() + usize::from(current_len > 0);
        if current_len + needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push('\n');
            current_len += 1;
        }
        current_len += rest.len();
        current.extend(rest);
    }

    if current_len > 0 {
        chunks.push(current);
    }
    chunks
}
