use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Characters of the triggering log line that feed the fingerprint.
pub const FINGERPRINT_WINDOW_CHARS: usize = 200;

/// Hex characters kept from the SHA-256 digest.
const FINGERPRINT_HEX_LEN: usize = 16;

/// De-duplication key of a recurring condition.
///
/// `service_down:<target>` or `critical:<target>:<fingerprint>`. Two log lines
/// that agree on their first 200 characters share an identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertIdentity(String);

impl AlertIdentity {
    #[must_use]
    pub fn service_down(target_key: &str) -> Self {
        Self(format!("service_down:{target_key}"))
    }

    #[must_use]
    pub fn critical_log(target_key: &str, line: &str) -> Self {
        Self(format!("critical:{target_key}:{}", fingerprint(line)))
    }

    /// Rebuild an identity received back from an action token.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AlertIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable content fingerprint of a log line, computed over its first
/// [`FINGERPRINT_WINDOW_CHARS`] characters.
#[must_use]
pub fn fingerprint(line: &str) -> String {
    let window: String = line.chars().take(FINGERPRINT_WINDOW_CHARS).collect();
    let digest = Sha256::digest(window.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(FINGERPRINT_HEX_LEN);
    hex
}
