use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::entities::target::{Target, TargetSet};

/// Environment variable that overrides `telegram.token`.
pub const TOKEN_ENV_VAR: &str = "WARDEN_TELEGRAM_TOKEN";

/// Top-level application configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub watchdog: WatchdogConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub targets: Vec<Target>,
}

/// Privilege escalation and output limits for external commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_true")]
    pub use_sudo: bool,
    #[serde(default = "default_max_output_chars")]
    pub max_output_chars: usize,
}

/// Background watchdog: polling cadence, cooldown and suppression bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchdogConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_alert_interval")]
    pub alert_interval_secs: u64,
    #[serde(default = "default_true")]
    pub alert_on_critical_errors: bool,
    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes: u64,
    #[serde(default = "default_sample_size")]
    pub critical_log_sample_size: usize,
    #[serde(default = "default_error_backoff")]
    pub error_backoff_secs: u64,
    #[serde(default = "default_max_tracked_alerts")]
    pub max_tracked_alerts: usize,
    #[serde(default = "default_restart_settle")]
    pub restart_settle_secs: u64,
}

/// Per-command timeouts, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_query_timeout")]
    pub query_secs: u64,
    #[serde(default = "default_log_timeout")]
    pub log_secs: u64,
    #[serde(default = "default_restart_timeout")]
    pub restart_secs: u64,
    #[serde(default = "default_status_timeout")]
    pub status_secs: u64,
}

/// Bot API credentials and the single operator allowed to drive the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub admin_id: Option<i64>,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

/// Database storage path (tilde-expanded at point of use) and audit retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
}

// --- Defaults ---

const fn default_true() -> bool {
    true
}

const fn default_max_output_chars() -> usize {
    4000
}

const fn default_alert_interval() -> u64 {
    300
}

const fn default_cooldown_minutes() -> u64 {
    15
}

const fn default_sample_size() -> usize {
    50
}

const fn default_error_backoff() -> u64 {
    60
}

const fn default_max_tracked_alerts() -> usize {
    1024
}

const fn default_restart_settle() -> u64 {
    3
}

const fn default_query_timeout() -> u64 {
    10
}

const fn default_log_timeout() -> u64 {
    20
}

const fn default_restart_timeout() -> u64 {
    30
}

const fn default_status_timeout() -> u64 {
    15
}

const fn default_poll_timeout() -> u64 {
    30
}

fn default_database_path() -> String {
    "~/.local/share/warden/warden.db".into()
}

const fn default_retention_days() -> u64 {
    90
}

// --- Default impls ---

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            use_sudo: default_true(),
            max_output_chars: default_max_output_chars(),
        }
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            alert_interval_secs: default_alert_interval(),
            alert_on_critical_errors: default_true(),
            cooldown_minutes: default_cooldown_minutes(),
            critical_log_sample_size: default_sample_size(),
            error_backoff_secs: default_error_backoff(),
            max_tracked_alerts: default_max_tracked_alerts(),
            restart_settle_secs: default_restart_settle(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            query_secs: default_query_timeout(),
            log_secs: default_log_timeout(),
            restart_secs: default_restart_timeout(),
            status_secs: default_status_timeout(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            admin_id: None,
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            retention_days: default_retention_days(),
        }
    }
}

impl WatchdogConfig {
    #[must_use]
    pub const fn alert_interval(&self) -> Duration {
        Duration::from_secs(self.alert_interval_secs)
    }

    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_minutes * 60)
    }

    #[must_use]
    pub const fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }

    #[must_use]
    pub const fn restart_settle(&self) -> Duration {
        Duration::from_secs(self.restart_settle_secs)
    }
}

impl TimeoutConfig {
    #[must_use]
    pub const fn query(&self) -> Duration {
        Duration::from_secs(self.query_secs)
    }

    #[must_use]
    pub const fn log(&self) -> Duration {
        Duration::from_secs(self.log_secs)
    }

    #[must_use]
    pub const fn restart(&self) -> Duration {
        Duration::from_secs(self.restart_secs)
    }

    #[must_use]
    pub const fn status(&self) -> Duration {
        Duration::from_secs(self.status_secs)
    }
}

impl TelegramConfig {
    /// Bot token, preferring the environment over the file.
    #[must_use]
    pub fn resolved_token(&self) -> Option<String> {
        self.token_with_override(std::env::var(TOKEN_ENV_VAR).ok())
    }

    fn token_with_override(&self, env_token: Option<String>) -> Option<String> {
        env_token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.token.clone())
            .filter(|t| !t.trim().is_empty())
    }

    /// Token and operator id, when both are configured.
    #[must_use]
    pub fn credentials(&self) -> Option<(String, i64)> {
        Some((self.resolved_token()?, self.admin_id?))
    }
}

// --- AppConfig methods ---

impl AppConfig {
    /// Load config from default path or create default config file
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined,
    /// the file cannot be read, or the TOML content is invalid.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_or_create(&path)
    }

    /// Load from a specific path, or create a default config file if missing
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is invalid,
    /// or the default config file cannot be written.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!(path = %path.display(), "Created default config; add [[targets]] to it");
            Ok(config)
        }
    }

    /// Load from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML content is invalid.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save config to a specific path, creating parent directories if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created,
    /// serialization fails, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Default location, `<config dir>/warden/config.toml`
    ///
    /// # Errors
    ///
    /// Returns an error if the platform config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("warden").join("config.toml"))
    }

    /// Check values that serde cannot express
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.watchdog.alert_interval_secs == 0 {
            bail!("watchdog.alert_interval_secs must be at least 1");
        }
        if self.watchdog.max_tracked_alerts == 0 {
            bail!("watchdog.max_tracked_alerts must be at least 1");
        }
        if self.watchdog.critical_log_sample_size == 0 {
            bail!("watchdog.critical_log_sample_size must be at least 1");
        }
        if self.general.max_output_chars == 0 {
            bail!("general.max_output_chars must be at least 1");
        }
        self.target_set()?;
        Ok(())
    }

    /// Validated target set, in configuration order
    ///
    /// # Errors
    ///
    /// Returns an error if no targets are configured or a target is invalid.
    pub fn target_set(&self) -> Result<TargetSet> {
        TargetSet::new(self.targets.clone()).context("Invalid [[targets]] configuration")
    }

    /// Expanded database path
    ///
    /// # Errors
    ///
    /// Returns an error if the path references an undefined variable.
    pub fn database_path(&self) -> Result<PathBuf> {
        let expanded = shellexpand::full(&self.database.path)
            .with_context(|| format!("Failed to expand database path '{}'", self.database.path))?;
        Ok(PathBuf::from(expanded.as_ref()))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[general]
use_sudo = false

[watchdog]
alert_interval_secs = 60
cooldown_minutes = 5

[telegram]
token = "123:abc"
admin_id = 42

[[targets]]
key = "api"
service = "api.service"
path = "/srv/api"

[[targets]]
key = "worker"
service = "worker.service"
path = "/srv/worker"
log_file = "/var/log/worker.log"
"#;

    #[test]
    fn default_config_has_sensible_values() {
        let config = AppConfig::default();
        assert!(config.general.use_sudo);
        assert_eq!(config.general.max_output_chars, 4000);
        assert!(config.watchdog.enabled);
        assert_eq!(config.watchdog.alert_interval_secs, 300);
        assert!(config.watchdog.alert_on_critical_errors);
        assert_eq!(config.watchdog.cooldown(), Duration::from_secs(900));
        assert_eq!(config.watchdog.critical_log_sample_size, 50);
        assert_eq!(config.watchdog.error_backoff(), Duration::from_secs(60));
        assert_eq!(config.watchdog.max_tracked_alerts, 1024);
        assert_eq!(config.watchdog.restart_settle(), Duration::from_secs(3));
        assert_eq!(config.timeouts.query(), Duration::from_secs(10));
        assert_eq!(config.timeouts.log(), Duration::from_secs(20));
        assert_eq!(config.timeouts.restart(), Duration::from_secs(30));
        assert_eq!(config.timeouts.status(), Duration::from_secs(15));
        assert!(config.telegram.token.is_none());
        assert!(config.telegram.admin_id.is_none());
        assert_eq!(config.telegram.poll_timeout_secs, 30);
        assert_eq!(config.database.path, "~/.local/share/warden/warden.db");
        assert_eq!(config.database.retention_days, 90);
        assert!(config.targets.is_empty());
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("").expect("parse empty toml");
        assert_eq!(config.watchdog.alert_interval_secs, 300);
        assert_eq!(config.timeouts.query_secs, 10);
    }

    #[test]
    fn partial_toml_fills_missing_with_defaults() {
        let config: AppConfig = toml::from_str(SAMPLE).expect("parse sample");
        assert!(!config.general.use_sudo);
        assert_eq!(config.general.max_output_chars, 4000);
        assert_eq!(config.watchdog.alert_interval(), Duration::from_secs(60));
        assert_eq!(config.watchdog.cooldown(), Duration::from_secs(300));
        assert_eq!(config.watchdog.max_tracked_alerts, 1024);
        assert_eq!(config.telegram.admin_id, Some(42));
        assert_eq!(config.targets.len(), 2);
    }

    #[test]
    fn targets_keep_configuration_order() {
        let config: AppConfig = toml::from_str(SAMPLE).expect("parse sample");
        let set = config.target_set().expect("target set");
        assert_eq!(set.keys(), vec!["api", "worker"]);
        let worker = set.get("worker").expect("worker");
        assert_eq!(worker.resolved_log_file(), PathBuf::from("/var/log/worker.log"));
        assert_eq!(
            set.first().resolved_env_file(),
            PathBuf::from("/srv/api/.env")
        );
    }

    #[test]
    fn validate_accepts_sample() {
        let config: AppConfig = toml::from_str(SAMPLE).expect("parse sample");
        config.validate().expect("valid config");
    }

    #[test]
    fn validate_rejects_missing_targets() {
        let err = AppConfig::default().validate().expect_err("no targets");
        assert!(format!("{err:#}").contains("no targets configured"));
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut config: AppConfig = toml::from_str(SAMPLE).expect("parse sample");
        config.watchdog.alert_interval_secs = 0;
        let err = config.validate().expect_err("zero interval");
        assert!(err.to_string().contains("alert_interval_secs"));
    }

    #[test]
    fn validate_rejects_duplicate_keys() {
        let mut config: AppConfig = toml::from_str(SAMPLE).expect("parse sample");
        config.targets[1].key = "api".into();
        let err = config.validate().expect_err("duplicate");
        assert!(format!("{err:#}").contains("duplicate target key"));
    }

    fn telegram(token: Option<&str>) -> TelegramConfig {
        TelegramConfig {
            token: token.map(String::from),
            admin_id: Some(7),
            poll_timeout_secs: 30,
        }
    }

    #[test]
    fn credentials_require_admin_id() {
        let mut config = telegram(Some("123:abc"));
        config.admin_id = None;
        assert!(config.credentials().is_none());
    }

    #[test]
    fn env_token_overrides_file_token() {
        let config = telegram(Some("from-file"));
        assert_eq!(
            config.token_with_override(Some("from-env".into())).as_deref(),
            Some("from-env")
        );
        assert_eq!(
            config.token_with_override(None).as_deref(),
            Some("from-file")
        );
    }

    #[test]
    fn blank_tokens_are_ignored() {
        let config = telegram(Some("   "));
        assert!(config.token_with_override(None).is_none());
        assert!(config.token_with_override(Some(String::new())).is_none());

        let config = telegram(Some("from-file"));
        assert_eq!(
            config.token_with_override(Some(" ".into())).as_deref(),
            Some("from-file")
        );
    }

    #[test]
    fn database_path_expands_tilde() {
        let config = AppConfig::default();
        let path = config.database_path().expect("expand");
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("warden/warden.db"));
    }

    #[test]
    fn load_from_file() {
        let mut tmpfile = tempfile::NamedTempFile::new().expect("create tempfile");
        tmpfile.write_all(SAMPLE.as_bytes()).expect("write tmpfile");

        let config = AppConfig::load_from(tmpfile.path()).expect("load from file");
        assert_eq!(config.targets[0].key, "api");
        assert_eq!(config.telegram.token.as_deref(), Some("123:abc"));
    }

    #[test]
    fn config_path_contains_warden() {
        let path = AppConfig::config_path().expect("config path");
        assert!(path.to_string_lossy().contains("warden"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn save_to_creates_file_and_directories() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join("subdir").join("config.toml");

        let config: AppConfig = toml::from_str(SAMPLE).expect("parse sample");
        config.save_to(&path).expect("save_to");

        let reloaded = AppConfig::load_from(&path).expect("reload");
        assert_eq!(reloaded.targets, config.targets);
        assert_eq!(reloaded.database.path, config.database.path);
    }

    #[test]
    fn load_or_create_creates_default_when_missing() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join("warden").join("config.toml");

        assert!(!path.exists());
        let config = AppConfig::load_or_create(&path).expect("load_or_create");

        assert!(path.exists());
        assert!(config.targets.is_empty());
        let reloaded = AppConfig::load_from(&path).expect("reload created file");
        assert_eq!(reloaded.watchdog.alert_interval_secs, 300);
    }

    #[test]
    fn load_or_create_loads_existing_file() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).expect("write");

        let config = AppConfig::load_or_create(&path).expect("load_or_create");
        assert_eq!(config.targets.len(), 2);
    }

    #[test]
    fn invalid_toml_fails() {
        let mut tmpfile = tempfile::NamedTempFile::new().expect("create tempfile");
        tmpfile
            .write_all(b"this is not valid toml [[[")
            .expect("write");
        assert!(AppConfig::load_from(tmpfile.path()).is_err());
    }
}
