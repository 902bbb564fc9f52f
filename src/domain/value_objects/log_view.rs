use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogViewError {
    #[error("unknown log level '{0}', expected critical, errors or warnings")]
    UnknownLevel(String),
    #[error("unknown time window '{0}', expected 1h, 3h, 24h or today")]
    UnknownWindow(String),
}

/// Severity class used to narrow a journal tail down to the interesting lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevelFilter {
    Critical,
    Errors,
    Warnings,
}

impl LogLevelFilter {
    /// Lowercase markers; a line matches when it contains any of them, ignoring case.
    const fn markers(self) -> &'static [&'static str] {
        match self {
            Self::Critical => &["critical", "fatal", "traceback"],
            Self::Errors => &["error", "critical", "exception", "traceback"],
            Self::Warnings => &["warning"],
        }
    }

    /// Lines shown when the operator gives no count.
    #[must_use]
    pub const fn default_lines(self) -> usize {
        match self {
            Self::Critical => 10,
            Self::Errors | Self::Warnings => 50,
        }
    }

    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Critical => "\u{1f525}",
            Self::Errors => "\u{1f6a8}",
            Self::Warnings => "\u{26a0}\u{fe0f}",
        }
    }

    #[must_use]
    pub fn matches(self, line: &str) -> bool {
        let lower = line.to_lowercase();
        self.markers().iter().any(|m| lower.contains(m))
    }

    /// The last `lines` matching lines of `raw`, oldest first. Empty when nothing matches.
    #[must_use]
    pub fn filter(self, raw: &str, lines: usize) -> String {
        let matching: Vec<&str> = raw.lines().filter(|l| self.matches(l)).collect();
        let skip = matching.len().saturating_sub(lines);
        matching[skip..].join("\n")
    }
}

impl fmt::Display for LogLevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Critical => "critical",
            Self::Errors => "errors",
            Self::Warnings => "warnings",
        })
    }
}

impl FromStr for LogLevelFilter {
    type Err = LogViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "critical" | "crit" => Ok(Self::Critical),
            "errors" | "error" => Ok(Self::Errors),
            "warnings" | "warning" | "warn" => Ok(Self::Warnings),
            _ => Err(LogViewError::UnknownLevel(s.to_string())),
        }
    }
}

/// Fixed journal windows offered to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogWindow {
    LastHour,
    LastThreeHours,
    LastDay,
    Today,
}

impl LogWindow {
    /// Expression for `journalctl --since`.
    #[must_use]
    pub const fn since_expr(self) -> &'static str {
        match self {
            Self::LastHour => "1 hour ago",
            Self::LastThreeHours => "3 hours ago",
            Self::LastDay => "1 day ago",
            Self::Today => "today",
        }
    }
}

impl fmt::Display for LogWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LastHour => "last hour",
            Self::LastThreeHours => "last 3 hours",
            Self::LastDay => "last 24 hours",
            Self::Today => "today",
        })
    }
}

impl FromStr for LogWindow {
    type Err = LogViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "1h" => Ok(Self::LastHour),
            "3h" => Ok(Self::LastThreeHours),
            "24h" | "1d" => Ok(Self::LastDay),
            "today" => Ok(Self::Today),
            _ => Err(LogViewError::UnknownWindow(s.to_string())),
        }
    }
}
