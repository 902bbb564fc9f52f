use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use warden::application::config::AppConfig;
use warden::application::services::actions::{
    AcknowledgeHandler, ActionContext, ActionRouter, ActionSettings, FetchLogsHandler,
    RestartHandler,
};
use warden::application::services::probe::{HealthProbe, ProbeSettings};
use warden::application::services::selection::TargetSelector;
use warden::application::services::suppression::SuppressionStore;
use warden::application::services::watchdog::{WatchdogService, WatchdogSettings};
use warden::domain::entities::target::TargetSet;
use warden::domain::ports::collector::HostCollector;
use warden::domain::ports::log_source::LogSource;
use warden::domain::ports::notifier::Notifier;
use warden::domain::ports::service_manager::ServiceManager;
use warden::domain::rules::{default_rules, Classifier};
use warden::domain::value_objects::alert_action::ActionKind;
use warden::infrastructure::collectors::journal_collector::JournalctlLogSource;
use warden::infrastructure::collectors::sysinfo_collector::SysinfoCollector;
use warden::infrastructure::notifications::composite::CompositeNotifier;
use warden::infrastructure::notifications::telegram::TelegramNotifier;
use warden::infrastructure::notifications::terminal::TerminalNotifier;
use warden::infrastructure::os::systemctl::SystemctlManager;
use warden::infrastructure::persistence::sqlite_store::SqliteStore;
use warden::infrastructure::telegram::poller::TelegramPoller;
use warden::infrastructure::telegram::TelegramClient;
use warden::presentation::bot::handler::{BotHandler, BotSettings};
use warden::presentation::cli::app::{Cli, Commands};
use warden::presentation::cli::commands::audit::run_audit;
use warden::presentation::cli::commands::check::run_check;
use warden::presentation::cli::commands::daemon::run_daemon;
use warden::presentation::cli::commands::logs::run_logs;
use warden::presentation::cli::commands::restart::run_restart;
use warden::presentation::cli::commands::status::run_status;
use warden::presentation::cli::commands::targets::run_targets;

fn print_banner(targets: &TargetSet) {
    println!("{}", "━".repeat(40).cyan());
    println!("{}", "  WARDEN — Service Watchdog".bold().cyan());
    println!("  watching: {}", targets.keys().join(", "));
    println!("{}", "━".repeat(40).cyan());
}

fn setup_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn open_store(config: &AppConfig) -> anyhow::Result<Arc<SqliteStore>> {
    let path = config.database_path()?;
    let store = SqliteStore::open(&path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    match store.cleanup_old(config.database.retention_days) {
        Ok(0) => {}
        Ok(removed) => tracing::info!(removed, "Pruned old audit records"),
        Err(e) => tracing::warn!("Failed to prune old audit records: {e}"),
    }
    Ok(Arc::new(store))
}

fn probe_settings(config: &AppConfig) -> ProbeSettings {
    ProbeSettings {
        query_timeout: config.timeouts.query(),
        log_timeout: config.timeouts.log(),
        log_lines: config.watchdog.critical_log_sample_size,
        fetch_logs: config.watchdog.alert_on_critical_errors,
    }
}

fn action_settings(config: &AppConfig) -> ActionSettings {
    ActionSettings {
        restart_timeout: config.timeouts.restart(),
        restart_settle: config.watchdog.restart_settle(),
        query_timeout: config.timeouts.query(),
        log_timeout: config.timeouts.log(),
        log_lines: config.watchdog.critical_log_sample_size,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    let config = if let Some(ref path) = cli.config {
        AppConfig::load_from(path)?
    } else {
        AppConfig::load()?
    };
    config.validate()?;

    // Manual DI: main.rs is the only place that knows concrete types
    let targets = Arc::new(config.target_set()?);
    let services: Arc<dyn ServiceManager> = Arc::new(SystemctlManager::new(
        config.general.use_sudo,
        config.general.max_output_chars,
    ));
    let logs: Arc<dyn LogSource> =
        Arc::new(JournalctlLogSource::new(config.general.max_output_chars));
    let classifier = Classifier::new(default_rules(config.watchdog.alert_on_critical_errors));

    match cli.command {
        Some(Commands::Check { json }) => {
            let probe = HealthProbe::new(services, logs, probe_settings(&config));
            run_check(&targets, &probe, &classifier, json).await?;
        }
        Some(Commands::Status { target, json }) => {
            let host = SysinfoCollector::new();
            run_status(
                &targets,
                &*services,
                &host,
                target.as_deref(),
                json,
                config.timeouts.query(),
                config.timeouts.status(),
            )
            .await?;
        }
        Some(Commands::Logs {
            target,
            lines,
            since,
        }) => {
            let target = targets.get(&target).with_context(|| {
                format!(
                    "Unknown target '{target}', available: {}",
                    targets.keys().join(", ")
                )
            })?;
            run_logs(
                &*logs,
                target,
                lines,
                since.as_deref(),
                config.timeouts.log(),
            )
            .await?;
        }
        Some(Commands::Restart { target }) => {
            let store = open_store(&config)?;
            let ctx = ActionContext {
                targets: Arc::clone(&targets),
                services,
                logs,
                notifier: Arc::new(TerminalNotifier::new()),
                audit: store,
                settings: action_settings(&config),
            };
            run_restart(&ctx, &target).await?;
        }
        Some(Commands::Targets) => run_targets(&targets),
        Some(Commands::Audit { limit, json }) => {
            let store = open_store(&config)?;
            run_audit(&*store, limit, json)?;
        }
        Some(Commands::Daemon { echo }) => {
            run_daemon_command(&config, targets, services, logs, classifier, echo).await?;
        }
        None => {
            run_daemon_command(&config, targets, services, logs, classifier, false).await?;
        }
    }

    Ok(())
}

async fn run_daemon_command(
    config: &AppConfig,
    targets: Arc<TargetSet>,
    services: Arc<dyn ServiceManager>,
    logs: Arc<dyn LogSource>,
    classifier: Classifier,
    echo: bool,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let suppression = Arc::new(SuppressionStore::new(
        config.watchdog.cooldown(),
        config.watchdog.max_tracked_alerts,
    ));

    let client = match config.telegram.credentials() {
        Some((token, admin_id)) => Some((
            Arc::new(TelegramClient::new(&token, config.telegram.poll_timeout_secs)?),
            admin_id,
        )),
        None => {
            tracing::warn!("telegram.token or telegram.admin_id missing, running without the bot");
            None
        }
    };

    let notifier: Arc<dyn Notifier> = match &client {
        Some((client, admin_id)) if echo => Arc::new(CompositeNotifier::new(vec![
            Box::new(TelegramNotifier::new(Arc::clone(client), *admin_id)),
            Box::new(TerminalNotifier::new()),
        ])),
        Some((client, admin_id)) => Arc::new(TelegramNotifier::new(Arc::clone(client), *admin_id)),
        None => Arc::new(TerminalNotifier::new()),
    };

    let watchdog = config.watchdog.enabled.then(|| {
        let probe = HealthProbe::new(
            Arc::clone(&services),
            Arc::clone(&logs),
            probe_settings(config),
        );
        Arc::new(WatchdogService::new(
            Arc::clone(&targets),
            probe,
            classifier,
            Arc::clone(&suppression),
            Arc::clone(&notifier),
            WatchdogSettings {
                interval: config.watchdog.alert_interval(),
                error_backoff: config.watchdog.error_backoff(),
            },
        ))
    });

    let poller = client.map(|(client, admin_id)| {
        let ctx = Arc::new(ActionContext {
            targets: Arc::clone(&targets),
            services: Arc::clone(&services),
            logs: Arc::clone(&logs),
            notifier: Arc::clone(&notifier),
            audit: Arc::clone(&store) as _,
            settings: action_settings(config),
        });
        let acknowledge = Arc::new(AcknowledgeHandler::new(
            Arc::clone(&suppression),
            Arc::clone(&store) as _,
        ));
        let mut router = ActionRouter::new();
        router.register(ActionKind::Acknowledge, Arc::clone(&acknowledge) as _);
        router.register(ActionKind::Unacknowledge, acknowledge);
        router.register(ActionKind::Restart, Arc::new(RestartHandler::new(Arc::clone(&ctx))));
        router.register(ActionKind::FetchLogs, Arc::new(FetchLogsHandler::new(ctx)));

        let host: Arc<dyn HostCollector> = Arc::new(SysinfoCollector::new());
        let handler = BotHandler::new(
            Arc::clone(&targets),
            TargetSelector::new(Arc::clone(&targets), Arc::clone(&store) as _),
            Arc::clone(&services),
            Arc::clone(&logs),
            host,
            Arc::new(router),
            Arc::clone(&suppression),
            BotSettings {
                status_timeout: config.timeouts.status(),
                log_timeout: config.timeouts.log(),
                max_output_chars: config.general.max_output_chars,
            },
        );
        Arc::new(TelegramPoller::new(client, admin_id, Arc::new(handler)))
    });

    print_banner(&targets);
    tracing::info!(
        targets = targets.len(),
        interval_secs = config.watchdog.alert_interval_secs,
        cooldown_minutes = config.watchdog.cooldown_minutes,
        "Daemon starting"
    );
    run_daemon(watchdog, poller, CancellationToken::new()).await
}
