use serde::{Deserialize, Serialize};

use crate::domain::value_objects::alert_action::ActionKind;

/// Outcome of a one-shot recovery action, reported back to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    pub action: ActionKind,
    pub target_key: String,
    pub service: String,
    pub success: bool,
    pub summary: String,
    /// Long output such as log lines; notifiers split it as needed.
    pub body: Option<String>,
}

/// Result of an action already carried out by a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Success,
    Failed,
    Acknowledged,
    Unacknowledged,
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Acknowledged => "acknowledged",
            Self::Unacknowledged => "unacknowledged",
        })
    }
}
