use std::sync::Mutex;

use sysinfo::System;

use super::disk_collector::DiskCollector;
use crate::domain::entities::host::HostSnapshot;
use crate::domain::ports::collector::{CollectionError, HostCollector};

const BYTES_PER_MB: u64 = 1_048_576;

/// Collects host memory, load and root-disk usage using the `sysinfo` crate.
///
/// `Mutex<System>` because `HostCollector` takes `&self` but refreshing needs `&mut`.
pub struct SysinfoCollector {
    sys: Mutex<System>,
    disk_collector: DiskCollector,
}

impl SysinfoCollector {
    #[must_use]
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        Self {
            sys: Mutex::new(sys),
            disk_collector: DiskCollector::new(),
        }
    }
}

impl Default for SysinfoCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl HostCollector for SysinfoCollector {
    fn collect(&self) -> Result<HostSnapshot, CollectionError> {
        let mut sys = self.sys.lock().map_err(|e| {
            CollectionError::MetricsUnavailable(format!("system lock poisoned: {e}"))
        })?;
        sys.refresh_memory();
        let memory_used_mb = sys.used_memory() / BYTES_PER_MB;
        let memory_total_mb = sys.total_memory() / BYTES_PER_MB;
        drop(sys);

        let load = System::load_average();

        Ok(HostSnapshot {
            timestamp: chrono::Utc::now(),
            memory_used_mb,
            memory_total_mb,
            load_avg: [load.one, load.five, load.fifteen],
            uptime_secs: System::uptime(),
            root_disk: self.disk_collector.root_disk()?,
        })
    }
}
