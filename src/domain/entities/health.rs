use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::service_state::ServiceState;

/// One probe reading for a target: unit state plus the tail of its journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSample {
    pub state: ServiceState,
    /// Empty when the log source was unavailable or not queried.
    pub recent_log: String,
    pub sampled_at: DateTime<Utc>,
}

impl HealthSample {
    #[must_use]
    pub fn new(state: ServiceState, recent_log: impl Into<String>) -> Self {
        Self {
            state,
            recent_log: recent_log.into(),
            sampled_at: Utc::now(),
        }
    }
}
