use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use super::probe::HealthProbe;
use super::suppression::SuppressionStore;
use crate::domain::entities::target::{Target, TargetSet};
use crate::domain::ports::notifier::Notifier;
use crate::domain::rules::Classifier;

/// Slack added on top of the probe's own timeouts before a target is given up on.
pub const SAMPLE_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogSettings {
    pub interval: Duration,
    pub error_backoff: Duration,
}

impl Default for WatchdogSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            error_backoff: Duration::from_secs(60),
        }
    }
}

/// Counters of a single watchdog pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub targets_probed: usize,
    /// Targets whose sample exceeded its budget or whose check panicked.
    pub targets_failed: usize,
    pub candidates: usize,
    pub emitted: usize,
    pub suppressed: usize,
    pub send_failures: usize,
    pub swept: usize,
}

impl CycleReport {
    /// A pass where no target could be sampled at all.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.targets_probed > 0 && self.targets_failed == self.targets_probed
    }
}

/// Orchestrates a watchdog pass: sweep → probe → classify → suppress → notify.
pub struct WatchdogService {
    targets: Arc<TargetSet>,
    probe: HealthProbe,
    classifier: Classifier,
    suppression: Arc<SuppressionStore>,
    notifier: Arc<dyn Notifier>,
    settings: WatchdogSettings,
}

impl WatchdogService {
    #[must_use]
    pub fn new(
        targets: Arc<TargetSet>,
        probe: HealthProbe,
        classifier: Classifier,
        suppression: Arc<SuppressionStore>,
        notifier: Arc<dyn Notifier>,
        settings: WatchdogSettings,
    ) -> Self {
        Self {
            targets,
            probe,
            classifier,
            suppression,
            notifier,
            settings,
        }
    }

    fn sample_budget(&self) -> Duration {
        self.probe.settings().worst_case() + SAMPLE_GRACE
    }

    /// Run a single pass over every target, in configuration order.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport {
            swept: self.suppression.sweep(),
            ..CycleReport::default()
        };
        if report.swept > 0 {
            tracing::debug!(swept = report.swept, "Dropped stale alert records");
        }

        for target in self.targets.iter() {
            report.targets_probed += 1;
            let checked = AssertUnwindSafe(self.check_target(target, &mut report))
                .catch_unwind()
                .await;
            if checked.is_err() {
                tracing::error!(target = %target.key, "Target check panicked, moving on");
                report.targets_failed += 1;
            }
        }

        report
    }

    async fn check_target(&self, target: &Target, report: &mut CycleReport) {
        let budget = self.sample_budget();
        let Ok(sample) = tokio::time::timeout(budget, self.probe.sample(target)).await else {
            tracing::warn!(target = %target.key, ?budget, "Probe exceeded its budget, skipping");
            report.targets_failed += 1;
            return;
        };

        let candidates = self.classifier.classify(target, &sample);
        if candidates.is_empty() {
            tracing::debug!(target = %target.key, state = %sample.state, "Target OK");
        }
        report.candidates += candidates.len();

        for candidate in &candidates {
            if !self.suppression.should_emit(&candidate.identity) {
                tracing::debug!(identity = %candidate.identity, "Alert suppressed");
                report.suppressed += 1;
                continue;
            }
            let actions = candidate.recovery_actions();
            match self.notifier.notify_alert(candidate, &actions).await {
                Ok(()) => {
                    self.suppression.mark_sent(&candidate.identity);
                    tracing::info!(
                        target = %target.key,
                        identity = %candidate.identity,
                        "Alert sent"
                    );
                    report.emitted += 1;
                }
                Err(e) => {
                    tracing::warn!(identity = %candidate.identity, "Alert notification failed: {e}");
                    report.send_failures += 1;
                }
            }
        }
    }

    /// Poll until `cancel` fires. A failed or panicking pass is followed by the
    /// error backoff. Cancellation is observed during every wait and pass.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            targets = self.targets.len(),
            interval = ?self.settings.interval,
            "Watchdog started"
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.settings.interval) => {}
            }

            let outcome = tokio::select! {
                () = cancel.cancelled() => break,
                outcome = AssertUnwindSafe(self.run_cycle()).catch_unwind() => outcome,
            };

            let failed = match outcome {
                Ok(report) if report.is_failure() => {
                    tracing::error!(failed = report.targets_failed, "Watchdog pass failed for every target");
                    true
                }
                Ok(report) => {
                    tracing::debug!(?report, "Watchdog pass complete");
                    false
                }
                Err(_) => {
                    tracing::error!("Watchdog pass panicked");
                    true
                }
            };

            if failed {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(self.settings.error_backoff) => {}
                }
            }
        }

        tracing::info!("Watchdog stopped");
    }
}
