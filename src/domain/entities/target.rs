use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest accepted target key; keeps action tokens inside Telegram's 64-byte limit.
pub const MAX_TARGET_KEY_LEN: usize = 32;

/// One externally managed service the bot can observe and control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub key: String,
    pub service: String,
    pub path: PathBuf,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub interpreter: Option<PathBuf>,
    #[serde(default)]
    pub env_file: Option<PathBuf>,
    #[serde(default)]
    pub requirements_file: Option<PathBuf>,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Target {
    #[must_use]
    pub fn new(key: impl Into<String>, service: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            key: key.into(),
            service: service.into(),
            path: path.into(),
            repo: None,
            interpreter: None,
            env_file: None,
            requirements_file: None,
            log_file: None,
        }
    }

    #[must_use]
    pub fn resolved_env_file(&self) -> PathBuf {
        self.env_file
            .clone()
            .unwrap_or_else(|| self.path.join(".env"))
    }

    #[must_use]
    pub fn resolved_requirements_file(&self) -> PathBuf {
        self.requirements_file
            .clone()
            .unwrap_or_else(|| self.path.join("requirements.txt"))
    }

    #[must_use]
    pub fn resolved_log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.path.join("bot.log"))
    }

    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.path
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TargetError {
    #[error("no targets configured")]
    Empty,
    #[error("duplicate target key: {0}")]
    DuplicateKey(String),
    #[error("invalid target key '{0}': use 1-32 chars of [A-Za-z0-9_-]")]
    InvalidKey(String),
    #[error("target '{0}' has an empty service name")]
    MissingService(String),
    #[error("target '{0}' has an empty path")]
    MissingPath(String),
}

fn valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_TARGET_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Ordered, immutable set of targets. Iteration follows configuration order.
#[derive(Debug, Clone)]
pub struct TargetSet {
    targets: Vec<Target>,
    index: HashMap<String, usize>,
}

impl TargetSet {
    /// Build a validated set.
    ///
    /// # Errors
    ///
    /// Returns `TargetError` if the list is empty, a key is malformed or
    /// repeated, or a target lacks a service name or path.
    pub fn new(targets: Vec<Target>) -> Result<Self, TargetError> {
        if targets.is_empty() {
            return Err(TargetError::Empty);
        }
        let mut index = HashMap::with_capacity(targets.len());
        for (i, target) in targets.iter().enumerate() {
            if !valid_key(&target.key) {
                return Err(TargetError::InvalidKey(target.key.clone()));
            }
            if target.service.trim().is_empty() {
                return Err(TargetError::MissingService(target.key.clone()));
            }
            if target.path.as_os_str().is_empty() {
                return Err(TargetError::MissingPath(target.key.clone()));
            }
            if index.insert(target.key.clone(), i).is_some() {
                return Err(TargetError::DuplicateKey(target.key.clone()));
            }
        }
        Ok(Self { targets, index })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Target> {
        self.index.get(key).map(|&i| &self.targets[i])
    }

    /// The first configured target; a validated set is never empty.
    #[must_use]
    pub fn first(&self) -> &Target {
        &self.targets[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.key.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
