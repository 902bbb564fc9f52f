pub mod critical_log;
pub mod service_down;

use crate::domain::entities::alert::CandidateAlert;
use crate::domain::entities::health::HealthSample;
use crate::domain::entities::target::Target;

/// A deterministic rule that inspects one probe sample and produces candidate alerts.
/// Rules are pure functions: target + sample in, candidates out. No I/O.
pub trait AlertRule: Send + Sync {
    /// Returns the unique name of this rule
    fn name(&self) -> &'static str;

    /// Evaluates the rule against a sample of the given target
    fn evaluate(&self, target: &Target, sample: &HealthSample) -> Vec<CandidateAlert>;
}

/// Returns the watchdog rules; the log rule is left out when critical-log alerts are disabled.
#[must_use]
pub fn default_rules(alert_on_critical_errors: bool) -> Vec<Box<dyn AlertRule>> {
    let mut rules: Vec<Box<dyn AlertRule>> = vec![Box::new(service_down::ServiceDownRule)];
    if alert_on_critical_errors {
        rules.push(Box::new(critical_log::CriticalLogRule));
    }
    rules
}

/// Runs every rule against a sample
pub struct Classifier {
    rules: Vec<Box<dyn AlertRule>>,
}

impl Classifier {
    #[must_use]
    pub fn new(rules: Vec<Box<dyn AlertRule>>) -> Self {
        Self { rules }
    }

    /// Candidates from all rules, most severe first. Rules are independent, so
    /// one sample may yield both a service-down and a critical-log candidate.
    #[must_use]
    pub fn classify(&self, target: &Target, sample: &HealthSample) -> Vec<CandidateAlert> {
        let mut candidates: Vec<CandidateAlert> = self
            .rules
            .iter()
            .flat_map(|rule| rule.evaluate(target, sample))
            .collect();
        candidates.sort_by(|a, b| b.severity.cmp(&a.severity));
        candidates
    }
}
