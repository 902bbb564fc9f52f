use std::path::Path;
use std::sync::Mutex;

use sysinfo::Disks;

use crate::domain::entities::host::RootDisk;
use crate::domain::ports::collector::CollectionError;

const BYTES_PER_GB: f64 = 1_073_741_824.0;

/// Reports usage of the filesystem mounted at `/`.
pub struct DiskCollector {
    disks: Mutex<Disks>,
}

impl DiskCollector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            disks: Mutex::new(Disks::new_with_refreshed_list()),
        }
    }

    /// `Ok(None)` when no root mount is visible, e.g. inside some containers.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::MetricsUnavailable` if the internal mutex is poisoned.
    pub fn root_disk(&self) -> Result<Option<RootDisk>, CollectionError> {
        let mut disks = self
            .disks
            .lock()
            .map_err(|e| CollectionError::MetricsUnavailable(format!("disk lock poisoned: {e}")))?;
        disks.refresh();

        Ok(disks
            .iter()
            .find(|d| d.mount_point() == Path::new("/") && d.total_space() > 0)
            .map(|d| usage(d.total_space(), d.available_space())))
    }
}

impl Default for DiskCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::cast_precision_loss)]
fn usage(total: u64, available: u64) -> RootDisk {
    let used = total.saturating_sub(available);
    let used_percent = if total > 0 {
        ((used as f64 / total as f64) * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    RootDisk {
        mount_point: "/".into(),
        used_percent,
        free_gb: available as f64 / BYTES_PER_GB,
    }
}
