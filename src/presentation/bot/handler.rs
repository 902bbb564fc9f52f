use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::services::actions::ActionRouter;
use crate::application::services::selection::TargetSelector;
use crate::application::services::suppression::SuppressionStore;
use crate::domain::entities::host::HostSnapshot;
use crate::domain::entities::target::TargetSet;
use crate::domain::ports::collector::HostCollector;
use crate::domain::ports::log_source::{LogError, LogSource};
use crate::domain::ports::service_manager::ServiceManager;
use crate::domain::value_objects::alert_action::AlertAction;
use crate::domain::value_objects::log_view::{LogLevelFilter, LogWindow};
use crate::infrastructure::notifications::html::escape_html;
use crate::infrastructure::os::command::{keep_tail, truncate_output};
use crate::infrastructure::telegram::poller::{Reply, UpdateHandler};

const DEFAULT_LOG_LINES: usize = 50;
const MAX_LOG_LINES: usize = 500;
/// Journal lines scanned when a level filter is applied.
const FILTER_SCAN_LINES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotSettings {
    pub status_timeout: Duration,
    pub log_timeout: Duration,
    pub max_output_chars: usize,
}

/// Operator chat commands plus routing of inline button presses.
pub struct BotHandler {
    targets: Arc<TargetSet>,
    selector: TargetSelector,
    services: Arc<dyn ServiceManager>,
    logs: Arc<dyn LogSource>,
    host: Arc<dyn HostCollector>,
    router: Arc<ActionRouter>,
    suppression: Arc<SuppressionStore>,
    settings: BotSettings,
}

impl BotHandler {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        targets: Arc<TargetSet>,
        selector: TargetSelector,
        services: Arc<dyn ServiceManager>,
        logs: Arc<dyn LogSource>,
        host: Arc<dyn HostCollector>,
        router: Arc<ActionRouter>,
        suppression: Arc<SuppressionStore>,
        settings: BotSettings,
    ) -> Self {
        Self {
            targets,
            selector,
            services,
            logs,
            host,
            router,
            suppression,
            settings,
        }
    }

    fn pre(&self, text: &str) -> String {
        format!(
            "<pre>{}</pre>",
            escape_html(&truncate_output(text, self.settings.max_output_chars))
        )
    }

    fn targets_reply(&self, chat_id: i64) -> Reply {
        let active = self.selector.active_target(chat_id);
        let mut text = String::from("\u{1f3af} <b>Targets</b>\n");
        for target in self.targets.iter() {
            let marker = if target.key == active.key { "\u{25b6}\u{fe0f}" } else { "\u{2022}" };
            text.push_str(&format!(
                "{marker} <code>{}</code> \u{2192} {}\n",
                escape_html(&target.key),
                escape_html(&target.service)
            ));
        }
        text.push_str("\nSwitch with /use &lt;key&gt;");
        Reply::text(text)
    }

    fn use_reply(&self, chat_id: i64, key: &str) -> Reply {
        if key.is_empty() {
            return Reply::text("Usage: /use &lt;key&gt;");
        }
        match self.selector.set_active(chat_id, key) {
            Ok(target) => Reply::text(format!(
                "\u{2705} Active target: <code>{}</code> ({})",
                escape_html(&target.key),
                escape_html(&target.service)
            )),
            Err(e) => Reply::text(format!("\u{274c} {}", escape_html(&e.to_string()))),
        }
    }

    async fn status_reply(&self, chat_id: i64) -> Reply {
        let target = self.selector.active_target(chat_id);
        let body = match self
            .services
            .status(&target.service, self.settings.status_timeout)
            .await
        {
            Ok(text) => self.pre(&text),
            Err(e) => format!("\u{274c} {}", escape_html(&e.to_string())),
        };
        Reply::text(format!(
            "\u{1f4e6} <b>{}</b> (<code>{}</code>)\n{body}",
            escape_html(&target.service),
            escape_html(&target.key)
        ))
        .with_actions(vec![
            AlertAction::Restart {
                target: target.key.clone(),
            },
            AlertAction::FetchLogs { target: target.key },
        ])
    }

    async fn logs_reply(&self, chat_id: i64, args: &str) -> Reply {
        let query = match parse_logs_args(args) {
            Ok(query) => query,
            Err(msg) => return Reply::text(msg),
        };
        let target = self.selector.active_target(chat_id);
        let fetch = if query.level.is_some() {
            FILTER_SCAN_LINES
        } else {
            query.lines
        };
        let result = self
            .logs
            .tail(&target.service, fetch, self.settings.log_timeout)
            .await
            .map(|text| match query.level {
                Some(level) => level.filter(&text, query.lines),
                None => text,
            });

        let title = match query.level {
            Some(level) => format!(
                "{} <b>Logs</b> <code>{}</code>, last {} {level}",
                level.emoji(),
                escape_html(&target.key),
                query.lines
            ),
            None => format!(
                "\u{1f4dc} <b>Logs</b> <code>{}</code>, last {}",
                escape_html(&target.key),
                query.lines
            ),
        };
        Reply::text(format!("{title}\n{}", self.log_body(result)))
    }

    async fn since_reply(&self, chat_id: i64, args: &str) -> Reply {
        let Ok(window) = args.parse::<LogWindow>() else {
            return Reply::text("Usage: /since 1h|3h|24h|today");
        };
        let target = self.selector.active_target(chat_id);
        let result = self
            .logs
            .since(&target.service, window.since_expr(), self.settings.log_timeout)
            .await;
        Reply::text(format!(
            "\u{23f0} <b>Logs</b> <code>{}</code>, {window}\n{}",
            escape_html(&target.key),
            self.log_body(result)
        ))
    }

    fn log_body(&self, result: Result<String, LogError>) -> String {
        match result {
            Ok(text) if text.trim().is_empty() => "(no log lines)".to_string(),
            Ok(text) => format!(
                "<pre>{}</pre>",
                escape_html(&keep_tail(&text, self.settings.max_output_chars))
            ),
            Err(e) => format!("\u{274c} {}", escape_html(&e.to_string())),
        }
    }

    fn host_reply(&self) -> Reply {
        match self.host.collect() {
            Ok(snapshot) => Reply::text(format_host(&snapshot)),
            Err(e) => Reply::text(format!("\u{274c} {}", escape_html(&e.to_string()))),
        }
    }

    fn muted_reply(&self) -> Reply {
        let muted = self.suppression.acknowledged();
        if muted.is_empty() {
            return Reply::text("\u{1f514} No muted alerts");
        }
        let mut text = String::from("\u{1f515} <b>Muted alerts</b>\n");
        for identity in &muted {
            text.push_str(&format!("\u{2022} <code>{}</code>\n", escape_html(identity.as_str())));
        }
        // One unmute button per identity, capped to keep the keyboard usable.
        let actions = muted
            .into_iter()
            .take(5)
            .map(|identity| AlertAction::Unacknowledge { identity })
            .collect();
        Reply::text(text).with_actions(actions)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LogsQuery {
    level: Option<LogLevelFilter>,
    lines: usize,
}

/// `/logs [critical|errors|warnings] [n]`
fn parse_logs_args(args: &str) -> Result<LogsQuery, String> {
    let usage = || format!("Usage: /logs [critical|errors|warnings] [1-{MAX_LOG_LINES}]");
    let mut words = args.split_whitespace();
    let first = words.next();
    let (level, count) = match first.map(str::parse::<LogLevelFilter>) {
        Some(Ok(level)) => (Some(level), words.next()),
        _ => (None, first),
    };
    if words.next().is_some() {
        return Err(usage());
    }

    let lines = match count {
        None => level.map_or(DEFAULT_LOG_LINES, LogLevelFilter::default_lines),
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if (1..=MAX_LOG_LINES).contains(&n) => n,
            _ => return Err(usage()),
        },
    };
    Ok(LogsQuery { level, lines })
}

fn help_text() -> String {
    [
        "<b>warden</b> commands:",
        "/targets - list targets",
        "/use &lt;key&gt; - switch active target",
        "/status - systemctl status of the active target",
        "/logs [n] - last n journal lines (default 50)",
        "/logs critical|errors|warnings [n] - last n matching lines",
        "/since 1h|3h|24h|today - journal of a time window",
        "/host - memory, load and disk of this host",
        "/muted - acknowledged alerts",
    ]
    .join("\n")
}

#[must_use]
pub fn format_host(snapshot: &HostSnapshot) -> String {
    let days = snapshot.uptime_secs / 86_400;
    let hours = (snapshot.uptime_secs % 86_400) / 3_600;
    let mut text = format!(
        "\u{1f5a5} <b>Host</b>\n\u{23f1} Uptime: {days}d {hours}h\n\u{1f4be} Memory: {} / {} MB\n\u{1f4c8} Load: {:.2} {:.2} {:.2}\n",
        snapshot.memory_used_mb,
        snapshot.memory_total_mb,
        snapshot.load_avg[0],
        snapshot.load_avg[1],
        snapshot.load_avg[2],
    );
    match &snapshot.root_disk {
        Some(disk) => {
            let badge = match disk.severity() {
                Some(severity) => severity.emoji().to_string(),
                None => "\u{2705}".to_string(),
            };
            text.push_str(&format!(
                "{badge} Disk /: {:.1}% used, {:.1} GB free",
                disk.used_percent, disk.free_gb
            ));
        }
        None => text.push_str("Disk /: unavailable"),
    }
    text
}

#[async_trait]
impl UpdateHandler for BotHandler {
    async fn on_command(&self, chat_id: i64, text: &str) -> Reply {
        let mut parts = text.trim().splitn(2, char::is_whitespace);
        let raw = parts.next().unwrap_or_default();
        let args = parts.next().unwrap_or_default().trim();
        let command = raw.split('@').next().unwrap_or(raw);

        tracing::debug!(chat_id, command, "Bot command");
        match command {
            "/start" | "/help" => Reply::text(help_text()),
            "/targets" => self.targets_reply(chat_id),
            "/use" => self.use_reply(chat_id, args),
            "/status" => self.status_reply(chat_id).await,
            "/logs" => self.logs_reply(chat_id, args).await,
            "/since" => self.since_reply(chat_id, args).await,
            "/host" => self.host_reply(),
            "/muted" => self.muted_reply(),
            _ if command.starts_with('/') => {
                Reply::text("Unknown command. Send /help for supported commands.")
            }
            _ => Reply::default(),
        }
    }

    async fn on_callback(&self, data: &str, operator_id: i64) -> String {
        match self.router.dispatch_token(data, operator_id) {
            Ok(outcome) => outcome.notice,
            Err(e) => {
                tracing::warn!(token = data, "Action rejected: {e}");
                format!("\u{274c} {e}")
            }
        }
    }
}
