use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use warden::application::services::probe::{HealthProbe, ProbeSettings};
use warden::application::services::suppression::SuppressionStore;
use warden::application::services::watchdog::{WatchdogService, WatchdogSettings};
use warden::domain::entities::alert::CandidateAlert;
use warden::domain::entities::report::ActionReport;
use warden::domain::entities::target::{Target, TargetSet};
use warden::domain::ports::log_source::{LogError, LogSource};
use warden::domain::ports::notifier::{NotificationError, Notifier};
use warden::domain::ports::service_manager::{ServiceError, ServiceManager};
use warden::domain::rules::{default_rules, Classifier};
use warden::domain::value_objects::alert_action::{ActionKind, AlertAction};
use warden::domain::value_objects::service_state::ServiceState;

pub fn targets(keys: &[&str]) -> Arc<TargetSet> {
    let list = keys
        .iter()
        .map(|key| Target::new(*key, format!("{key}.service"), format!("/srv/{key}")))
        .collect();
    Arc::new(TargetSet::new(list).expect("valid targets"))
}

/// Unit states and journals per service, changeable between cycles.
#[derive(Default)]
pub struct FakeHost {
    states: Mutex<HashMap<String, ServiceState>>,
    logs: Mutex<HashMap<String, String>>,
    hung: Mutex<Vec<String>>,
    queried: Mutex<Vec<String>>,
    restarts: Mutex<Vec<String>>,
    windows: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn set_state(&self, service: &str, state: ServiceState) {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(service.to_string(), state);
    }

    pub fn set_log(&self, service: &str, log: &str) {
        self.logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(service.to_string(), log.to_string());
    }

    /// Queries for this service never return.
    pub fn hang(&self, service: &str) {
        self.hung
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(service.to_string());
    }

    pub fn queried(&self) -> Vec<String> {
        self.queried
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn restarts(&self) -> Vec<String> {
        self.restarts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `--since` expressions requested so far.
    pub fn windows(&self) -> Vec<String> {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn is_hung(&self, service: &str) -> bool {
        self.hung
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|s| s == service)
    }
}

#[async_trait]
impl ServiceManager for FakeHost {
    async fn query_active(
        &self,
        service: &str,
        _timeout: Duration,
    ) -> Result<ServiceState, ServiceError> {
        self.queried
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(service.to_string());
        if self.is_hung(service) {
            std::future::pending::<()>().await;
        }
        Ok(self
            .states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(service)
            .cloned()
            .unwrap_or(ServiceState::Active))
    }

    async fn restart(&self, service: &str, _timeout: Duration) -> Result<String, ServiceError> {
        self.restarts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(service.to_string());
        self.set_state(service, ServiceState::Active);
        Ok(String::new())
    }

    async fn status(&self, service: &str, _timeout: Duration) -> Result<String, ServiceError> {
        Ok(format!("● {service}"))
    }
}

#[async_trait]
impl LogSource for FakeHost {
    async fn tail(&self, service: &str, _lines: usize, _timeout: Duration) -> Result<String, LogError> {
        Ok(self
            .logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(service)
            .cloned()
            .unwrap_or_default())
    }

    async fn since(
        &self,
        service: &str,
        timeframe: &str,
        timeout: Duration,
    ) -> Result<String, LogError> {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(timeframe.to_string());
        self.tail(service, 0, timeout).await
    }
}

/// Delivered alerts and reports; can be switched to fail every send.
#[derive(Default)]
pub struct RecordingNotifier {
    pub alerts: Mutex<Vec<(CandidateAlert, Vec<ActionKind>)>>,
    pub reports: Mutex<Vec<ActionReport>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn sent(&self) -> Vec<(CandidateAlert, Vec<ActionKind>)> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn reports(&self) -> Vec<ActionReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_alert(
        &self,
        alert: &CandidateAlert,
        actions: &[AlertAction],
    ) -> Result<(), NotificationError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError::SendFailed("chat unreachable".into()));
        }
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((alert.clone(), actions.iter().map(AlertAction::kind).collect()));
        Ok(())
    }

    async fn notify_action_result(&self, report: &ActionReport) -> Result<(), NotificationError> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }
}

pub struct Harness {
    pub host: Arc<FakeHost>,
    pub notifier: Arc<RecordingNotifier>,
    pub suppression: Arc<SuppressionStore>,
    pub watchdog: WatchdogService,
}

pub fn harness(keys: &[&str], cooldown: Duration) -> Harness {
    let host = Arc::new(FakeHost::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let suppression = Arc::new(SuppressionStore::new(cooldown, 1024));
    let probe = HealthProbe::new(
        Arc::clone(&host) as Arc<dyn ServiceManager>,
        Arc::clone(&host) as Arc<dyn LogSource>,
        ProbeSettings::default(),
    );
    let watchdog = WatchdogService::new(
        targets(keys),
        probe,
        Classifier::new(default_rules(true)),
        Arc::clone(&suppression),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        WatchdogSettings::default(),
    );
    Harness {
        host,
        notifier,
        suppression,
        watchdog,
    }
}
