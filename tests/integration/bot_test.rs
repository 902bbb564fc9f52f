use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use warden::application::services::actions::{AcknowledgeHandler, ActionRouter};
use warden::application::services::selection::TargetSelector;
use warden::domain::entities::host::HostSnapshot;
use warden::domain::ports::collector::{CollectionError, HostCollector};
use warden::domain::ports::store::SelectionStore;
use warden::domain::value_objects::alert_action::{ActionKind, AlertAction};
use warden::domain::value_objects::alert_identity::AlertIdentity;
use warden::infrastructure::persistence::in_memory_store::InMemoryStore;
use warden::infrastructure::telegram::poller::UpdateHandler;
use warden::presentation::bot::handler::{BotHandler, BotSettings};

use crate::support::{harness, targets, Harness};

const CHAT: i64 = 99;

struct StaticHost;

impl HostCollector for StaticHost {
    fn collect(&self) -> Result<HostSnapshot, CollectionError> {
        Ok(HostSnapshot {
            timestamp: Utc::now(),
            memory_used_mb: 100,
            memory_total_mb: 1000,
            load_avg: [0.0, 0.0, 0.0],
            uptime_secs: 60,
            root_disk: None,
        })
    }
}

fn bot(h: &Harness, store: &Arc<InMemoryStore>) -> BotHandler {
    let targets = targets(&["api", "worker"]);
    let acknowledge = Arc::new(AcknowledgeHandler::new(
        Arc::clone(&h.suppression),
        Arc::clone(store) as _,
    ));
    let mut router = ActionRouter::new();
    router.register(ActionKind::Acknowledge, Arc::clone(&acknowledge) as _);
    router.register(ActionKind::Unacknowledge, acknowledge);

    BotHandler::new(
        Arc::clone(&targets),
        TargetSelector::new(targets, Arc::clone(store) as _),
        Arc::clone(&h.host) as _,
        Arc::clone(&h.host) as _,
        Arc::new(StaticHost),
        Arc::new(router),
        Arc::clone(&h.suppression),
        BotSettings {
            status_timeout: Duration::from_secs(1),
            log_timeout: Duration::from_secs(1),
            max_output_chars: 4000,
        },
    )
}

#[tokio::test]
async fn use_switches_the_active_target() {
    let h = harness(&["api"], Duration::from_secs(900));
    let store = Arc::new(InMemoryStore::new());
    let bot = bot(&h, &store);

    let reply = bot.on_command(CHAT, "/use worker").await;
    assert!(reply.text.contains("worker"));
    assert_eq!(
        store.get_selection(CHAT).expect("selection readable").as_deref(),
        Some("worker")
    );

    let status = bot.on_command(CHAT, "/status").await;
    assert!(status.text.contains("worker.service"));
    let kinds: Vec<ActionKind> = status.actions.iter().map(AlertAction::kind).collect();
    assert_eq!(kinds, [ActionKind::Restart, ActionKind::FetchLogs]);
}

#[tokio::test]
async fn use_rejects_unknown_keys() {
    let h = harness(&["api"], Duration::from_secs(900));
    let store = Arc::new(InMemoryStore::new());
    let bot = bot(&h, &store);

    let reply = bot.on_command(CHAT, "/use ghost").await;
    assert!(reply.text.contains("ghost"));
    assert!(store.get_selection(CHAT).expect("selection readable").is_none());
}

#[tokio::test]
async fn logs_use_the_active_target_and_escape_html() {
    let h = harness(&["api"], Duration::from_secs(900));
    let store = Arc::new(InMemoryStore::new());
    let bot = bot(&h, &store);
    h.host.set_log("api.service", "<b>boom</b>");

    let reply = bot.on_command(CHAT, "/logs 5").await;
    assert!(reply.text.contains("&lt;b&gt;boom&lt;/b&gt;"));

    let bad = bot.on_command(CHAT, "/logs 0").await;
    assert!(bad.text.starts_with("Usage"));
}

#[tokio::test]
async fn level_filters_narrow_the_journal() {
    let h = harness(&["api"], Duration::from_secs(900));
    let store = Arc::new(InMemoryStore::new());
    let bot = bot(&h, &store);
    h.host.set_log(
        "api.service",
        "INFO start\nWARNING cache cold\nERROR upstream 502\nINFO ok\nFATAL cannot bind",
    );

    let errors = bot.on_command(CHAT, "/logs errors").await;
    assert!(errors.text.contains("ERROR upstream 502"));
    assert!(!errors.text.contains("INFO"));
    assert!(!errors.text.contains("WARNING"));

    let critical = bot.on_command(CHAT, "/logs critical 1").await;
    assert!(critical.text.contains("FATAL cannot bind"));
    assert!(!critical.text.contains("ERROR upstream"));

    h.host.set_log("api.service", "INFO quiet");
    let none = bot.on_command(CHAT, "/logs warnings").await;
    assert!(none.text.contains("(no log lines)"));
}

#[tokio::test]
async fn since_goes_through_the_journal_window() {
    let h = harness(&["api"], Duration::from_secs(900));
    let store = Arc::new(InMemoryStore::new());
    let bot = bot(&h, &store);
    h.host.set_log("api.service", "INFO recent");

    let reply = bot.on_command(CHAT, "/since 3h").await;
    assert!(reply.text.contains("last 3 hours"));
    assert!(reply.text.contains("INFO recent"));
    bot.on_command(CHAT, "/since today").await;
    assert_eq!(h.host.windows(), ["3 hours ago", "today"]);

    let bad = bot.on_command(CHAT, "/since 2h").await;
    assert!(bad.text.starts_with("Usage"));
    assert_eq!(h.host.windows().len(), 2);
}

#[tokio::test]
async fn mute_buttons_round_trip_through_the_router() {
    let h = harness(&["api"], Duration::from_secs(900));
    let store = Arc::new(InMemoryStore::new());
    let bot = bot(&h, &store);
    let identity = AlertIdentity::service_down("api");

    let notice = bot.on_callback("ack:service_down:api", CHAT).await;
    assert!(notice.contains("acknowledged"));
    assert!(h.suppression.is_acknowledged(&identity));

    let muted = bot.on_command(CHAT, "/muted").await;
    assert!(muted.text.contains("service_down:api"));
    assert_eq!(
        muted.actions,
        vec![AlertAction::Unacknowledge {
            identity: identity.clone()
        }]
    );

    bot.on_callback("unack:service_down:api", CHAT).await;
    assert!(!h.suppression.is_acknowledged(&identity));
}

#[tokio::test]
async fn unregistered_actions_answer_with_an_error() {
    let h = harness(&["api"], Duration::from_secs(900));
    let store = Arc::new(InMemoryStore::new());
    let bot = bot(&h, &store);

    let notice = bot.on_callback("restart:api", CHAT).await;
    assert!(notice.contains("no handler"));
    assert!(h.host.restarts().is_empty());
}

#[tokio::test]
async fn commands_accept_bot_mentions() {
    let h = harness(&["api"], Duration::from_secs(900));
    let store = Arc::new(InMemoryStore::new());
    let bot = bot(&h, &store);

    let reply = bot.on_command(CHAT, "/host@warden_bot").await;
    assert!(reply.text.contains("100 / 1000 MB"));
    let unknown = bot.on_command(CHAT, "/reboot").await;
    assert!(unknown.text.contains("/help"));
}
