use std::time::Duration;

use warden::domain::entities::alert::AlertKind;
use warden::domain::value_objects::alert_action::ActionKind;
use warden::domain::value_objects::service_state::ServiceState;

use crate::support::harness;

const COOLDOWN: Duration = Duration::from_secs(15 * 60);

#[tokio::test]
async fn healthy_target_sends_nothing() {
    let h = harness(&["api"], COOLDOWN);
    h.host.set_log("api.service", "started\nlistening on :8080");

    let report = h.watchdog.run_cycle().await;

    assert_eq!(report.targets_probed, 1);
    assert_eq!(report.candidates, 0);
    assert_eq!(h.notifier.alert_count(), 0);
}

#[tokio::test]
async fn failed_target_alerts_once_per_cooldown() {
    let h = harness(&["api"], COOLDOWN);
    h.host.set_state("api.service", ServiceState::Failed);

    h.watchdog.run_cycle().await;
    let second = h.watchdog.run_cycle().await;

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    let (alert, actions) = &sent[0];
    assert_eq!(alert.kind, AlertKind::ServiceDown);
    assert_eq!(alert.identity.as_str(), "service_down:api");
    assert_eq!(alert.payload, "failed");
    assert!(actions.contains(&ActionKind::Acknowledge));
    assert!(actions.contains(&ActionKind::Restart));
    assert_eq!(second.suppressed, 1);
    assert_eq!(second.emitted, 0);
}

#[tokio::test]
async fn error_lines_alone_never_alert() {
    let h = harness(&["api"], COOLDOWN);
    h.host
        .set_log("api.service", "2024-01-01 ERROR foo\n2024-01-01 WARNING bar");

    let report = h.watchdog.run_cycle().await;

    assert_eq!(report.candidates, 0);
    assert_eq!(h.notifier.alert_count(), 0);
}

#[tokio::test]
async fn failed_send_is_retried_next_cycle() {
    let h = harness(&["api"], COOLDOWN);
    h.host.set_state("api.service", ServiceState::Inactive);

    h.notifier.set_failing(true);
    let first = h.watchdog.run_cycle().await;
    assert_eq!(first.send_failures, 1);
    assert!(h.suppression.is_empty());

    h.notifier.set_failing(false);
    let second = h.watchdog.run_cycle().await;
    assert_eq!(second.emitted, 1);
    assert_eq!(h.notifier.alert_count(), 1);
}

#[tokio::test]
async fn down_and_critical_on_same_target_both_alert() {
    let h = harness(&["api"], COOLDOWN);
    h.host.set_state("api.service", ServiceState::Failed);
    h.host.set_log("api.service", "FATAL: cannot bind port");

    h.watchdog.run_cycle().await;

    let kinds: Vec<AlertKind> = h.notifier.sent().iter().map(|(a, _)| a.kind).collect();
    assert_eq!(kinds, [AlertKind::ServiceDown, AlertKind::CriticalLog]);
}

#[tokio::test(start_paused = true)]
async fn hung_target_does_not_block_the_others() {
    let h = harness(&["a", "b", "c"], COOLDOWN);
    h.host.hang("a.service");
    h.host.set_state("b.service", ServiceState::Failed);
    h.host.set_state("c.service", ServiceState::Failed);

    let report = h.watchdog.run_cycle().await;

    assert_eq!(report.targets_probed, 3);
    assert_eq!(report.targets_failed, 1);
    assert!(!report.is_failure());
    assert_eq!(h.host.queried(), ["a.service", "b.service", "c.service"]);
    let alerted: Vec<String> = h
        .notifier
        .sent()
        .iter()
        .map(|(a, _)| a.target_key.clone())
        .collect();
    assert_eq!(alerted, ["b", "c"]);
}

#[tokio::test(start_paused = true)]
async fn every_target_hung_is_a_failed_cycle() {
    let h = harness(&["a", "b"], COOLDOWN);
    h.host.hang("a.service");
    h.host.hang("b.service");

    let report = h.watchdog.run_cycle().await;

    assert!(report.is_failure());
    assert_eq!(h.notifier.alert_count(), 0);
}
