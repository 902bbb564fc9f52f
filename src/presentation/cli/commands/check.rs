use colored::Colorize;
use serde::Serialize;

use crate::application::services::probe::HealthProbe;
use crate::domain::entities::alert::CandidateAlert;
use crate::domain::entities::target::TargetSet;
use crate::domain::rules::Classifier;
use crate::domain::value_objects::service_state::ServiceState;
use crate::infrastructure::notifications::terminal::sanitize;
use crate::presentation::cli::formatters::alert_fmt::{format_alerts, print_no_alerts};
use crate::presentation::cli::formatters::status_fmt::{print_section_header, state_badge};

/// Outcome of one dry-run probe.
#[derive(Debug, Clone, Serialize)]
pub struct TargetCheck {
    pub target: String,
    pub service: String,
    pub state: ServiceState,
    pub alerts: Vec<CandidateAlert>,
}

/// Probe and classify every target once, in configuration order. Nothing is sent.
pub async fn collect_checks(
    targets: &TargetSet,
    probe: &HealthProbe,
    classifier: &Classifier,
) -> Vec<TargetCheck> {
    let mut checks = Vec::with_capacity(targets.len());
    for target in targets.iter() {
        let sample = probe.sample(target).await;
        let alerts = classifier.classify(target, &sample);
        checks.push(TargetCheck {
            target: target.key.clone(),
            service: target.service.clone(),
            state: sample.state,
            alerts,
        });
    }
    checks
}

/// # Errors
///
/// Returns an error if JSON serialization fails.
pub async fn run_check(
    targets: &TargetSet,
    probe: &HealthProbe,
    classifier: &Classifier,
    json: bool,
) -> anyhow::Result<()> {
    let checks = collect_checks(targets, probe, classifier).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&checks)?);
        return Ok(());
    }

    println!("{}", "warden — Check".bold().cyan());
    println!("{}", "━".repeat(50));
    for check in &checks {
        print_section_header(&format!(
            "\n{} ({})",
            sanitize(&check.target),
            sanitize(&check.service)
        ));
        println!("  State: {}", state_badge(&check.state));
        if check.alerts.is_empty() {
            print_no_alerts();
        } else {
            format_alerts(&check.alerts);
        }
    }

    let total: usize = checks.iter().map(|c| c.alerts.len()).sum();
    println!("\n{total} alert(s) across {} target(s)", checks.len());
    Ok(())
}
