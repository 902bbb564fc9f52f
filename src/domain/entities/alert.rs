use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::alert_action::AlertAction;
use crate::domain::value_objects::alert_identity::AlertIdentity;
use crate::domain::value_objects::severity::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    ServiceDown,
    CriticalLog,
}

impl AlertKind {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::ServiceDown => "Service Down",
            Self::CriticalLog => "Critical Error",
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::ServiceDown => "service_down",
            Self::CriticalLog => "critical",
        })
    }
}

/// An unsent alert produced by the classifier for one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateAlert {
    pub kind: AlertKind,
    pub identity: AlertIdentity,
    pub target_key: String,
    pub service: String,
    pub severity: Severity,
    /// Raw state for service-down, a preview of matching lines for critical logs.
    pub payload: String,
    /// Matching log lines in the sample; zero for service-down.
    pub match_count: usize,
    pub detected_at: DateTime<Utc>,
}

impl CandidateAlert {
    /// Recovery actions offered alongside the alert, most relevant first.
    #[must_use]
    pub fn recovery_actions(&self) -> Vec<AlertAction> {
        let ack = AlertAction::Acknowledge {
            identity: self.identity.clone(),
        };
        let restart = AlertAction::Restart {
            target: self.target_key.clone(),
        };
        let logs = AlertAction::FetchLogs {
            target: self.target_key.clone(),
        };
        match self.kind {
            AlertKind::ServiceDown => vec![ack, restart, logs],
            AlertKind::CriticalLog => vec![ack, logs, restart],
        }
    }
}

/// Suppression state of one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRecord {
    pub identity: AlertIdentity,
    pub last_sent_at: Option<DateTime<Utc>>,
    pub acknowledged: bool,
}

impl AlertRecord {
    #[must_use]
    pub const fn new(identity: AlertIdentity) -> Self {
        Self {
            identity,
            last_sent_at: None,
            acknowledged: false,
        }
    }
}
