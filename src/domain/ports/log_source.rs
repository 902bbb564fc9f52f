use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("log source unavailable: {0}")]
    Unavailable(String),
    #[error("log query failed: {0}")]
    QueryFailed(String),
    #[error("log query timed out after {0:?}")]
    Timeout(Duration),
}

/// Read access to a service's log stream.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Last `lines` lines of the service log.
    ///
    /// # Errors
    ///
    /// Returns `LogError` if the log cannot be read within `timeout`.
    async fn tail(&self, service: &str, lines: usize, timeout: Duration)
        -> Result<String, LogError>;

    /// Log lines since a timeframe understood by the source (e.g. `"1 hour ago"`).
    ///
    /// # Errors
    ///
    /// Returns `LogError` if the log cannot be read within `timeout`.
    async fn since(
        &self,
        service: &str,
        timeframe: &str,
        timeout: Duration,
    ) -> Result<String, LogError>;
}
