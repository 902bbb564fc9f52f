use crate::domain::entities::alert::{AlertKind, CandidateAlert};
use crate::domain::entities::health::HealthSample;
use crate::domain::entities::target::Target;
use crate::domain::value_objects::alert_identity::AlertIdentity;
use crate::domain::value_objects::severity::Severity;

use super::AlertRule;

/// Severity markers searched for, case-insensitively.
const CRITICAL_MARKERS: &[&str] = &["critical", "fatal"];

/// Matching lines shown in the alert body.
const PREVIEW_LINES: usize = 3;

/// Upper bound on the alert body, in characters.
pub const PREVIEW_MAX_CHARS: usize = 1000;

/// Scans the recent log for CRITICAL / FATAL lines. The identity is derived from
/// the most recent match, so a different recurring error yields a new alert.
pub struct CriticalLogRule;

fn is_critical(line: &str) -> bool {
    let lower = line.to_lowercase();
    CRITICAL_MARKERS.iter().any(|m| lower.contains(m))
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

impl AlertRule for CriticalLogRule {
    fn name(&self) -> &'static str {
        "critical_log"
    }

    fn evaluate(&self, target: &Target, sample: &HealthSample) -> Vec<CandidateAlert> {
        let matches: Vec<&str> = sample
            .recent_log
            .lines()
            .filter(|l| is_critical(l))
            .collect();

        let Some(last) = matches.last() else {
            return vec![];
        };

        let preview = matches[matches.len().saturating_sub(PREVIEW_LINES)..].join("\n");

        vec![CandidateAlert {
            kind: AlertKind::CriticalLog,
            identity: AlertIdentity::critical_log(&target.key, last),
            target_key: target.key.clone(),
            service: target.service.clone(),
            severity: Severity::High,
            payload: truncate_chars(&preview, PREVIEW_MAX_CHARS),
            match_count: matches.len(),
            detected_at: sample.sampled_at,
        }]
    }
}
