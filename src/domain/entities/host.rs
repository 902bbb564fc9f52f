use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::severity::Severity;

/// Root filesystem usage that raises a warning.
pub const DISK_WARN_PERCENT: f64 = 80.0;
/// Root filesystem usage considered critical.
pub const DISK_CRITICAL_PERCENT: f64 = 90.0;
/// Free space on the root filesystem considered critical regardless of percentage.
pub const DISK_CRITICAL_FREE_GB: f64 = 2.0;

/// Point-in-time view of the host the bot runs on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub timestamp: DateTime<Utc>,
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
    pub load_avg: [f64; 3],
    pub uptime_secs: u64,
    pub root_disk: Option<RootDisk>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootDisk {
    pub mount_point: String,
    pub used_percent: f64,
    pub free_gb: f64,
}

impl RootDisk {
    /// `None` when usage is healthy.
    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        if self.used_percent >= DISK_CRITICAL_PERCENT || self.free_gb < DISK_CRITICAL_FREE_GB {
            Some(Severity::Critical)
        } else if self.used_percent >= DISK_WARN_PERCENT {
            Some(Severity::Medium)
        } else {
            None
        }
    }
}
