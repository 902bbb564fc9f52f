use thiserror::Error;

use super::alert_identity::AlertIdentity;

/// Telegram rejects `callback_data` longer than this.
pub const MAX_TOKEN_BYTES: usize = 64;

/// Discriminant of [`AlertAction`], used as the router registration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Acknowledge,
    Unacknowledge,
    Restart,
    FetchLogs,
}

impl ActionKind {
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Acknowledge => "ack",
            Self::Unacknowledge => "unack",
            Self::Restart => "restart",
            Self::FetchLogs => "logs",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "ack" => Some(Self::Acknowledge),
            "unack" => Some(Self::Unacknowledge),
            "restart" => Some(Self::Restart),
            "logs" => Some(Self::FetchLogs),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Acknowledge => "acknowledge",
            Self::Unacknowledge => "unacknowledge",
            Self::Restart => "restart",
            Self::FetchLogs => "fetch_logs",
        })
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ActionTokenError {
    #[error("malformed action token: {0}")]
    Malformed(String),
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("action token is missing its parameter")]
    MissingParameter,
}

/// Recovery action attached to an alert message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertAction {
    Acknowledge { identity: AlertIdentity },
    Unacknowledge { identity: AlertIdentity },
    Restart { target: String },
    FetchLogs { target: String },
}

impl AlertAction {
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Acknowledge { .. } => ActionKind::Acknowledge,
            Self::Unacknowledge { .. } => ActionKind::Unacknowledge,
            Self::Restart { .. } => ActionKind::Restart,
            Self::FetchLogs { .. } => ActionKind::FetchLogs,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Acknowledge { .. } => "\u{2705} Acknowledge",
            Self::Unacknowledge { .. } => "\u{1f514} Unmute",
            Self::Restart { .. } => "\u{1f504} Restart",
            Self::FetchLogs { .. } => "\u{1f4dc} Logs (50)",
        }
    }

    fn parameter(&self) -> &str {
        match self {
            Self::Acknowledge { identity } | Self::Unacknowledge { identity } => identity.as_str(),
            Self::Restart { target } | Self::FetchLogs { target } => target,
        }
    }

    /// Opaque callback token, `<prefix>:<parameter>`.
    #[must_use]
    pub fn token(&self) -> String {
        format!("{}:{}", self.kind().prefix(), self.parameter())
    }

    /// Decode a callback token. This is the only place tokens are parsed.
    ///
    /// # Errors
    ///
    /// Returns `ActionTokenError` if the token is oversized, has no separator,
    /// names an unknown action, or carries an empty parameter.
    pub fn from_token(token: &str) -> Result<Self, ActionTokenError> {
        if token.len() > MAX_TOKEN_BYTES {
            return Err(ActionTokenError::Malformed(format!(
                "{} bytes exceeds {MAX_TOKEN_BYTES}",
                token.len()
            )));
        }
        let (prefix, param) = token
            .split_once(':')
            .ok_or_else(|| ActionTokenError::Malformed(token.to_string()))?;
        let kind = ActionKind::from_prefix(prefix)
            .ok_or_else(|| ActionTokenError::UnknownAction(prefix.to_string()))?;
        if param.trim().is_empty() {
            return Err(ActionTokenError::MissingParameter);
        }
        Ok(match kind {
            ActionKind::Acknowledge => Self::Acknowledge {
                identity: AlertIdentity::from_raw(param),
            },
            ActionKind::Unacknowledge => Self::Unacknowledge {
                identity: AlertIdentity::from_raw(param),
            },
            ActionKind::Restart => Self::Restart {
                target: param.to_string(),
            },
            ActionKind::FetchLogs => Self::FetchLogs {
                target: param.to_string(),
            },
        })
    }
}
