use warden::domain::entities::alert::AlertKind;
use warden::domain::entities::health::HealthSample;
use warden::domain::entities::target::Target;
use warden::domain::rules::critical_log::PREVIEW_MAX_CHARS;
use warden::domain::rules::{default_rules, Classifier};
use warden::domain::value_objects::alert_identity::AlertIdentity;
use warden::domain::value_objects::service_state::ServiceState;
use warden::domain::value_objects::severity::Severity;

fn target() -> Target {
    Target::new("api", "api.service", "/srv/api")
}

fn classifier() -> Classifier {
    Classifier::new(default_rules(true))
}

#[test]
fn every_non_active_state_is_service_down() {
    let states = [
        ServiceState::Inactive,
        ServiceState::Failed,
        ServiceState::Activating,
        ServiceState::Deactivating,
        ServiceState::Timeout,
        ServiceState::Unknown("exit 4".into()),
    ];
    for state in states {
        let alerts = classifier().classify(&target(), &HealthSample::new(state.clone(), ""));
        assert_eq!(alerts.len(), 1, "{state} should alert");
        assert_eq!(alerts[0].kind, AlertKind::ServiceDown);
        assert_eq!(alerts[0].severity, Severity::Critical);
    }
}

#[test]
fn active_state_is_never_service_down() {
    let alerts = classifier().classify(&target(), &HealthSample::new(ServiceState::Active, ""));
    assert!(alerts.is_empty());
}

#[test]
fn markers_match_case_insensitively() {
    for line in ["critical: disk gone", "Fatal error in worker", "[CRITICAL] boom"] {
        let alerts =
            classifier().classify(&target(), &HealthSample::new(ServiceState::Active, line));
        assert_eq!(alerts.len(), 1, "{line} should match");
        assert_eq!(alerts[0].kind, AlertKind::CriticalLog);
    }
}

#[test]
fn same_line_keeps_identity_across_cycles() {
    let log = "boot\nCRITICAL: database unreachable";
    let first = classifier().classify(&target(), &HealthSample::new(ServiceState::Active, log));
    let second = classifier().classify(&target(), &HealthSample::new(ServiceState::Active, log));
    assert_eq!(first[0].identity, second[0].identity);
    assert_eq!(
        first[0].identity,
        AlertIdentity::critical_log("api", "CRITICAL: database unreachable")
    );
}

#[test]
fn different_lines_get_different_identities() {
    let a = classifier().classify(
        &target(),
        &HealthSample::new(ServiceState::Active, "CRITICAL: database unreachable"),
    );
    let b = classifier().classify(
        &target(),
        &HealthSample::new(ServiceState::Active, "CRITICAL: cache unreachable"),
    );
    assert_ne!(a[0].identity, b[0].identity);
}

#[test]
fn lines_equal_in_first_200_chars_share_identity() {
    let prefix = format!("FATAL {}", "x".repeat(250));
    let a = format!("{prefix} tail one");
    let b = format!("{prefix} tail two");
    assert_eq!(
        AlertIdentity::critical_log("api", &a),
        AlertIdentity::critical_log("api", &b)
    );
}

#[test]
fn payload_is_bounded() {
    let log: String = (0..20)
        .map(|i| format!("CRITICAL {i} {}\n", "y".repeat(600)))
        .collect();
    let alerts = classifier().classify(&target(), &HealthSample::new(ServiceState::Active, &log));
    assert_eq!(alerts[0].match_count, 20);
    assert!(alerts[0].payload.chars().count() <= PREVIEW_MAX_CHARS);
}

#[test]
fn critical_rule_can_be_disabled() {
    let classifier = Classifier::new(default_rules(false));
    let alerts = classifier.classify(
        &target(),
        &HealthSample::new(ServiceState::Active, "FATAL: gone"),
    );
    assert!(alerts.is_empty());
}
