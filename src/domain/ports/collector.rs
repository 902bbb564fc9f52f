use thiserror::Error;

use crate::domain::entities::host::HostSnapshot;

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("failed to collect host metrics: {0}")]
    MetricsUnavailable(String),
}

pub trait HostCollector: Send + Sync {
    /// Collect a snapshot of the host.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError` if metrics are unavailable.
    fn collect(&self) -> Result<HostSnapshot, CollectionError>;
}
