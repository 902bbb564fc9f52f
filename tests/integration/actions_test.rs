use std::sync::Arc;
use std::time::Duration;

use warden::application::services::actions::{
    AcknowledgeHandler, ActionContext, ActionError, ActionRouter, ActionSettings,
    FetchLogsHandler, RestartHandler,
};
use warden::domain::entities::report::ActionStatus;
use warden::domain::ports::store::AuditLogStore;
use warden::domain::value_objects::alert_action::{ActionKind, AlertAction};
use warden::domain::value_objects::service_state::ServiceState;
use warden::infrastructure::persistence::in_memory_store::InMemoryStore;

use crate::support::{harness, targets, Harness};

const OPERATOR: i64 = 4242;

fn router(h: &Harness, audit: &Arc<InMemoryStore>) -> ActionRouter {
    let ctx = Arc::new(ActionContext {
        targets: targets(&["api"]),
        services: Arc::clone(&h.host) as _,
        logs: Arc::clone(&h.host) as _,
        notifier: Arc::clone(&h.notifier) as _,
        audit: Arc::clone(audit) as _,
        settings: ActionSettings {
            restart_settle: Duration::ZERO,
            ..ActionSettings::default()
        },
    });
    let acknowledge = Arc::new(AcknowledgeHandler::new(
        Arc::clone(&h.suppression),
        Arc::clone(audit) as _,
    ));
    let mut router = ActionRouter::new();
    router.register(ActionKind::Acknowledge, Arc::clone(&acknowledge) as _);
    router.register(ActionKind::Unacknowledge, acknowledge);
    router.register(ActionKind::Restart, Arc::new(RestartHandler::new(Arc::clone(&ctx))));
    router.register(ActionKind::FetchLogs, Arc::new(FetchLogsHandler::new(ctx)));
    router
}

#[tokio::test]
async fn acknowledged_critical_line_stays_silent_until_it_changes() {
    // Zero cooldown: only the acknowledgment keeps repeats quiet.
    let h = harness(&["api"], Duration::ZERO);
    let audit = Arc::new(InMemoryStore::new());
    let router = router(&h, &audit);
    h.host
        .set_log("api.service", "boot\nCRITICAL: database unreachable");

    h.watchdog.run_cycle().await;
    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    let identity = sent[0].0.identity.clone();
    assert!(identity.as_str().starts_with("critical:api:"));

    let token = AlertAction::Acknowledge {
        identity: identity.clone(),
    }
    .token();
    router.dispatch_token(&token, OPERATOR).expect("ack accepted");

    for _ in 0..5 {
        h.watchdog.run_cycle().await;
    }
    assert_eq!(h.notifier.alert_count(), 1);

    h.host
        .set_log("api.service", "boot\nCRITICAL: database unreachable (retry 2)");
    h.watchdog.run_cycle().await;

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 2);
    assert_ne!(sent[1].0.identity, identity);

    let records = audit.recent_actions(10).expect("audit readable");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].operator_id, OPERATOR);
    assert_eq!(records[0].status, ActionStatus::Acknowledged);
    assert_eq!(records[0].target, identity.as_str());
}

#[tokio::test]
async fn unacknowledge_resumes_alerts() {
    let h = harness(&["api"], Duration::ZERO);
    let audit = Arc::new(InMemoryStore::new());
    let router = router(&h, &audit);
    h.host.set_state("api.service", ServiceState::Failed);

    h.watchdog.run_cycle().await;
    router
        .dispatch_token("ack:service_down:api", OPERATOR)
        .expect("ack accepted");
    h.watchdog.run_cycle().await;
    assert_eq!(h.notifier.alert_count(), 1);

    router
        .dispatch_token("unack:service_down:api", OPERATOR)
        .expect("unack accepted");
    h.watchdog.run_cycle().await;
    assert_eq!(h.notifier.alert_count(), 2);
}

#[tokio::test]
async fn restart_button_recovers_the_service() {
    let h = harness(&["api"], Duration::from_secs(900));
    let audit = Arc::new(InMemoryStore::new());
    let router = router(&h, &audit);
    h.host.set_state("api.service", ServiceState::Failed);

    let outcome = router
        .dispatch_token("restart:api", OPERATOR)
        .expect("restart accepted");
    outcome
        .task
        .expect("restart runs in the background")
        .await
        .expect("restart task completes");

    assert_eq!(h.host.restarts(), ["api.service"]);
    let reports = h.notifier.reports();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].success);
    assert_eq!(reports[0].action, ActionKind::Restart);
    let records = audit.recent_actions(10).expect("audit readable");
    assert_eq!(records[0].status, ActionStatus::Success);
}

#[tokio::test]
async fn logs_button_reports_the_journal() {
    let h = harness(&["api"], Duration::from_secs(900));
    let audit = Arc::new(InMemoryStore::new());
    let router = router(&h, &audit);
    h.host.set_log("api.service", "line one\nline two");

    let outcome = router
        .dispatch_token("logs:api", OPERATOR)
        .expect("logs accepted");
    outcome
        .task
        .expect("log fetch runs in the background")
        .await
        .expect("log task completes");

    let reports = h.notifier.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].body.as_deref(), Some("line one\nline two"));
}

#[tokio::test]
async fn unknown_target_spawns_nothing() {
    let h = harness(&["api"], Duration::from_secs(900));
    let audit = Arc::new(InMemoryStore::new());
    let router = router(&h, &audit);

    let err = router
        .dispatch_token("restart:ghost", OPERATOR)
        .expect_err("unknown target rejected");
    assert!(matches!(err, ActionError::UnknownTarget(ref key) if key == "ghost"));
    assert!(h.host.restarts().is_empty());
}

#[test]
fn malformed_tokens_are_rejected_at_the_boundary() {
    let h = harness(&["api"], Duration::from_secs(900));
    let audit = Arc::new(InMemoryStore::new());
    let router = router(&h, &audit);

    let oversized = format!("logs:{}", "x".repeat(65));
    for token in ["", "restart", "reboot:api", "ack:", oversized.as_str()] {
        let err = router
            .dispatch_token(token, OPERATOR)
            .expect_err("token rejected");
        assert!(matches!(err, ActionError::Token(_)), "{token}: {err}");
    }
}
