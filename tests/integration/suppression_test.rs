use std::time::Duration;

use chrono::{TimeDelta, TimeZone, Utc};

use warden::application::services::suppression::SuppressionStore;
use warden::domain::value_objects::alert_identity::AlertIdentity;

const COOLDOWN_SECS: i64 = 900;

fn store() -> SuppressionStore {
    SuppressionStore::new(Duration::from_secs(900), 1024)
}

fn identities() -> Vec<AlertIdentity> {
    vec![
        AlertIdentity::service_down("api"),
        AlertIdentity::service_down("worker"),
        AlertIdentity::critical_log("api", "CRITICAL: database unreachable"),
        AlertIdentity::critical_log("web", "FATAL: out of file descriptors"),
    ]
}

#[test]
fn cooldown_holds_for_every_identity() {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid date");
    let store = store();
    for id in identities() {
        assert!(store.should_emit_at(&id, t0));
        store.mark_sent_at(&id, t0);
        for offset in [0, 1, 60, COOLDOWN_SECS - 1] {
            assert!(
                !store.should_emit_at(&id, t0 + TimeDelta::seconds(offset)),
                "{id} emitted {offset}s after send"
            );
        }
        assert!(store.should_emit_at(&id, t0 + TimeDelta::seconds(COOLDOWN_SECS)));
        assert!(store.should_emit_at(&id, t0 + TimeDelta::days(3)));
    }
    assert_eq!(store.len(), identities().len());
}

#[test]
fn acknowledgment_outlasts_any_cooldown() {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid date");
    let store = store();
    for id in identities() {
        store.mark_sent_at(&id, t0);
        assert!(store.acknowledge(&id));
        for days in [0, 1, 30, 365] {
            assert!(!store.should_emit_at(&id, t0 + TimeDelta::days(days)));
        }
        assert!(store.unacknowledge(&id));
        assert!(store.should_emit_at(&id, t0 + TimeDelta::days(1)));
    }
}

#[test]
fn acknowledging_before_any_alert_mutes_it() {
    let store = store();
    let id = AlertIdentity::service_down("api");
    assert!(store.acknowledge(&id));
    assert!(!store.should_emit(&id));
    assert_eq!(store.acknowledged(), vec![id]);
}

#[test]
fn sweep_keeps_muted_and_recent_records() {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid date");
    let store = store();
    let stale = AlertIdentity::service_down("old");
    let muted = AlertIdentity::service_down("muted");
    let fresh = AlertIdentity::service_down("fresh");

    store.mark_sent_at(&stale, t0);
    store.mark_sent_at(&muted, t0);
    store.acknowledge(&muted);
    let later = t0 + TimeDelta::seconds(5 * COOLDOWN_SECS);
    store.mark_sent_at(&fresh, later);

    assert_eq!(store.sweep_at(later), 1);
    assert!(store.record(&stale).is_none());
    assert!(store.is_acknowledged(&muted));
    assert!(store.record(&fresh).is_some());
}

#[test]
fn capacity_is_never_exceeded() {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid date");
    let store = SuppressionStore::new(Duration::from_secs(900), 8);
    for i in 0..50 {
        let id = AlertIdentity::critical_log("api", &format!("CRITICAL line {i}"));
        store.mark_sent_at(&id, t0 + TimeDelta::seconds(i));
        assert!(store.len() <= 8);
    }
    let newest = AlertIdentity::critical_log("api", "CRITICAL line 49");
    assert!(store.record(&newest).is_some());
}
