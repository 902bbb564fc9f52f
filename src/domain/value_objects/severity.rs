use serde::{Deserialize, Serialize};

/// How urgently an alert or host reading needs the operator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl Severity {
    #[must_use]
    pub const fn emoji(&self) -> &str {
        match self {
            Self::Low => "\u{2139}\u{fe0f}",
            Self::Medium => "\u{26a0}\u{fe0f}",
            Self::High => "\u{1f525}",
            Self::Critical => "\u{1f6a8}",
        }
    }
}
