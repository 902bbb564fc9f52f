use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::health::HealthSample;
use crate::domain::entities::target::Target;
use crate::domain::ports::log_source::LogSource;
use crate::domain::ports::service_manager::{ServiceError, ServiceManager};
use crate::domain::value_objects::service_state::ServiceState;

/// Limits applied to every probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    pub query_timeout: Duration,
    pub log_timeout: Duration,
    pub log_lines: usize,
    /// Skip the journal read when nothing consumes it.
    pub fetch_logs: bool,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(10),
            log_timeout: Duration::from_secs(20),
            log_lines: 50,
            fetch_logs: true,
        }
    }
}

impl ProbeSettings {
    /// Worst-case wall time of one sample, used as the per-target budget.
    #[must_use]
    pub fn worst_case(&self) -> Duration {
        let logs = if self.fetch_logs {
            self.log_timeout
        } else {
            Duration::ZERO
        };
        self.query_timeout + logs
    }
}

/// Reads one target's unit state and recent journal. Never fails: query errors
/// become a non-active state and log errors become an empty log.
pub struct HealthProbe {
    services: Arc<dyn ServiceManager>,
    logs: Arc<dyn LogSource>,
    settings: ProbeSettings,
}

impl HealthProbe {
    #[must_use]
    pub fn new(
        services: Arc<dyn ServiceManager>,
        logs: Arc<dyn LogSource>,
        settings: ProbeSettings,
    ) -> Self {
        Self {
            services,
            logs,
            settings,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    pub async fn sample(&self, target: &Target) -> HealthSample {
        let state = match self
            .services
            .query_active(&target.service, self.settings.query_timeout)
            .await
        {
            Ok(state) => state,
            Err(ServiceError::Timeout(after)) => {
                tracing::warn!(target = %target.key, ?after, "State query timed out");
                ServiceState::Timeout
            }
            Err(e) => {
                tracing::warn!(target = %target.key, "State query failed: {e}");
                ServiceState::Unknown(e.to_string())
            }
        };

        let recent_log = if self.settings.fetch_logs {
            match self
                .logs
                .tail(
                    &target.service,
                    self.settings.log_lines,
                    self.settings.log_timeout,
                )
                .await
            {
                Ok(log) => log,
                Err(e) => {
                    tracing::debug!(target = %target.key, "Log read failed: {e}");
                    String::new()
                }
            }
        } else {
            String::new()
        };

        HealthSample::new(state, recent_log)
    }
}
