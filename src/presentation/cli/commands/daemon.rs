use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::application::services::watchdog::WatchdogService;
use crate::infrastructure::telegram::poller::TelegramPoller;

/// Run the watchdog loop and the Telegram poller until shutdown.
///
/// Ctrl+C and SIGTERM cancel `cancel`; both tasks observe it and stop. A task
/// that panics cancels the other one as well.
///
/// # Errors
///
/// Returns an error if there is nothing to run.
pub async fn run_daemon(
    watchdog: Option<Arc<WatchdogService>>,
    poller: Option<Arc<TelegramPoller>>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    if watchdog.is_none() && poller.is_none() {
        anyhow::bail!(
            "Nothing to run: the watchdog is disabled and Telegram credentials are not configured"
        );
    }

    let signals = tokio::spawn(forward_shutdown(cancel.clone()));
    let mut tasks = JoinSet::new();

    if let Some(watchdog) = watchdog {
        let cancel = cancel.clone();
        tasks.spawn(async move { watchdog.run(cancel).await });
    } else {
        tracing::info!("Watchdog disabled in configuration");
    }
    if let Some(poller) = poller {
        let cancel = cancel.clone();
        tasks.spawn(async move { poller.run(cancel).await });
    } else {
        tracing::info!("Telegram not configured, alerts go to the terminal only");
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Daemon task aborted: {e}");
            cancel.cancel();
        }
    }

    signals.abort();
    tracing::info!("Daemon stopped");
    Ok(())
}

async fn forward_shutdown(cancel: CancellationToken) {
    tokio::select! {
        () = wait_for_signal() => {
            tracing::info!("Shutdown signal received");
            println!("\nStopping warden...");
            cancel.cancel();
        }
        () = cancel.cancelled() => {}
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Ctrl+C handler unavailable: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                () = ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!("SIGTERM handler unavailable: {e}");
            ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    ctrl_c().await;
}
