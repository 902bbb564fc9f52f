use crate::domain::entities::alert::{AlertKind, CandidateAlert};
use crate::domain::entities::health::HealthSample;
use crate::domain::entities::target::Target;
use crate::domain::value_objects::alert_identity::AlertIdentity;
use crate::domain::value_objects::severity::Severity;

use super::AlertRule;

/// Fires whenever the unit is not `active`, including failed or timed-out queries.
pub struct ServiceDownRule;

impl AlertRule for ServiceDownRule {
    fn name(&self) -> &'static str {
        "service_down"
    }

    fn evaluate(&self, target: &Target, sample: &HealthSample) -> Vec<CandidateAlert> {
        if sample.state.is_active() {
            return vec![];
        }

        vec![CandidateAlert {
            kind: AlertKind::ServiceDown,
            identity: AlertIdentity::service_down(&target.key),
            target_key: target.key.clone(),
            service: target.service.clone(),
            severity: Severity::Critical,
            payload: sample.state.to_string(),
            match_count: 0,
            detected_at: sample.sampled_at,
        }]
    }
}
