use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::value_objects::service_state::ServiceState;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("service manager unavailable: {0}")]
    Unavailable(String),
    #[error("service command failed: {0}")]
    CommandFailed(String),
    #[error("service command timed out after {0:?}")]
    Timeout(Duration),
}

/// Wraps the host's service manager (systemd).
#[async_trait]
pub trait ServiceManager: Send + Sync {
    /// Query the unit's active-state.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query cannot be run or exceeds `timeout`.
    async fn query_active(
        &self,
        service: &str,
        timeout: Duration,
    ) -> Result<ServiceState, ServiceError>;

    /// Restart the unit, returning the manager's combined output.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the restart command fails or exceeds `timeout`.
    async fn restart(&self, service: &str, timeout: Duration) -> Result<String, ServiceError>;

    /// Human-readable status report of the unit.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the status command cannot be run or exceeds `timeout`.
    async fn status(&self, service: &str, timeout: Duration) -> Result<String, ServiceError>;
}
