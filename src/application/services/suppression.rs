use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::entities::alert::AlertRecord;
use crate::domain::value_objects::alert_identity::AlertIdentity;

/// Records older than this many cooldowns are dropped by [`SuppressionStore::sweep`].
const SWEEP_COOLDOWN_FACTOR: i32 = 4;

/// Per-identity emission history shared by the watchdog loop and the action handlers.
///
/// An identity is emitted when it is not acknowledged and its last emission is at
/// least one cooldown old. The map is bounded: past `max_tracked` entries the
/// non-acknowledged record with the oldest emission is evicted. Acknowledged
/// records are kept until unacknowledged.
pub struct SuppressionStore {
    cooldown: TimeDelta,
    max_tracked: usize,
    records: Mutex<HashMap<AlertIdentity, AlertRecord>>,
}

impl SuppressionStore {
    #[must_use]
    pub fn new(cooldown: Duration, max_tracked: usize) -> Self {
        Self {
            cooldown: TimeDelta::from_std(cooldown).unwrap_or(TimeDelta::MAX),
            max_tracked: max_tracked.max(1),
            records: Mutex::new(HashMap::new()),
        }
    }

    // No await happens while the guard is held, so a poisoned map is still consistent.
    fn records(&self) -> MutexGuard<'_, HashMap<AlertIdentity, AlertRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn should_emit(&self, identity: &AlertIdentity) -> bool {
        self.should_emit_at(identity, Utc::now())
    }

    #[must_use]
    pub fn should_emit_at(&self, identity: &AlertIdentity, now: DateTime<Utc>) -> bool {
        let records = self.records();
        let Some(record) = records.get(identity) else {
            return true;
        };
        if record.acknowledged {
            return false;
        }
        record
            .last_sent_at
            .is_none_or(|sent| now.signed_duration_since(sent) >= self.cooldown)
    }

    /// Record a confirmed emission. Call only after the notifier reported success.
    pub fn mark_sent(&self, identity: &AlertIdentity) {
        self.mark_sent_at(identity, Utc::now());
    }

    pub fn mark_sent_at(&self, identity: &AlertIdentity, now: DateTime<Utc>) {
        let mut records = self.records();
        if !records.contains_key(identity) && records.len() >= self.max_tracked {
            Self::evict_oldest(&mut records);
        }
        records
            .entry(identity.clone())
            .or_insert_with(|| AlertRecord::new(identity.clone()))
            .last_sent_at = Some(now);
    }

    fn evict_oldest(records: &mut HashMap<AlertIdentity, AlertRecord>) {
        let oldest = records
            .values()
            .filter(|r| !r.acknowledged)
            .min_by_key(|r| r.last_sent_at)
            .map(|r| r.identity.clone());
        if let Some(identity) = oldest {
            tracing::debug!(identity = %identity, "Evicting oldest alert record");
            records.remove(&identity);
        }
    }

    /// Mute an identity until it is unacknowledged. Returns `false` if it already was muted.
    pub fn acknowledge(&self, identity: &AlertIdentity) -> bool {
        let mut records = self.records();
        let record = records
            .entry(identity.clone())
            .or_insert_with(|| AlertRecord::new(identity.clone()));
        let changed = !record.acknowledged;
        record.acknowledged = true;
        changed
    }

    /// Lift a mute. The cooldown still applies from the last emission.
    /// Returns `false` if the identity was not acknowledged.
    pub fn unacknowledge(&self, identity: &AlertIdentity) -> bool {
        let mut records = self.records();
        let Some(record) = records.get_mut(identity) else {
            return false;
        };
        if !record.acknowledged {
            return false;
        }
        record.acknowledged = false;
        if record.last_sent_at.is_none() {
            records.remove(identity);
        }
        true
    }

    #[must_use]
    pub fn is_acknowledged(&self, identity: &AlertIdentity) -> bool {
        self.records()
            .get(identity)
            .is_some_and(|r| r.acknowledged)
    }

    #[must_use]
    pub fn record(&self, identity: &AlertIdentity) -> Option<AlertRecord> {
        self.records().get(identity).cloned()
    }

    /// Identities currently muted, sorted.
    #[must_use]
    pub fn acknowledged(&self) -> Vec<AlertIdentity> {
        let mut muted: Vec<AlertIdentity> = self
            .records()
            .values()
            .filter(|r| r.acknowledged)
            .map(|r| r.identity.clone())
            .collect();
        muted.sort();
        muted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Drop stale non-acknowledged records. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let Some(window) = self.cooldown.checked_mul(SWEEP_COOLDOWN_FACTOR) else {
            return 0;
        };
        let mut records = self.records();
        let before = records.len();
        records.retain(|_, r| {
            r.acknowledged
                || r
                    .last_sent_at
                    .is_some_and(|sent| now.signed_duration_since(sent) <= window)
        });
        before - records.len()
    }
}
