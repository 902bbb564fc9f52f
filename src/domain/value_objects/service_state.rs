use serde::{Deserialize, Serialize};

/// Active-state of a systemd unit as reported by `systemctl is-active`.
///
/// Anything other than [`ServiceState::Active`] is a negative health signal,
/// including query failures (`Timeout`, `Unknown`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    Active,
    Inactive,
    Failed,
    Activating,
    Deactivating,
    Timeout,
    Unknown(String),
}

impl ServiceState {
    /// Parse the first non-empty line printed by `systemctl is-active`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let word = raw
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("");
        match word {
            "active" => Self::Active,
            "inactive" => Self::Inactive,
            "failed" => Self::Failed,
            "activating" => Self::Activating,
            "deactivating" => Self::Deactivating,
            "" => Self::Unknown("empty response".into()),
            other => Self::Unknown(other.to_string()),
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Failed => "failed",
            Self::Activating => "activating",
            Self::Deactivating => "deactivating",
            Self::Timeout => "timeout",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(detail) => write!(f, "unknown ({detail})"),
            other => f.write_str(other.as_str()),
        }
    }
}
