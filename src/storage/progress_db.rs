//! Durable per-account progress records. One JSON file holds the whole
//! collection; every mutation is a load-all / mutate / save-all cycle under a
//! single coarse lock. Contention is one write per account step at
//! minute-scale intervals, so the coarse lock is sufficient.

use crate::actions::ActionPlan;
use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountProgress {
    pub account_id: u32,
    #[serde(default)]
    pub generated_actions: Vec<ActionPlan>,
    #[serde(default)]
    pub generated_intervals: Vec<Duration>,
    #[serde(default)]
    pub generated_duration: Duration,
    #[serde(default)]
    pub completed_actions: Vec<ActionPlan>,
    #[serde(default)]
    pub action_intervals: Vec<Duration>,
    #[serde(default)]
    pub total_elapsed: Duration,
    pub last_action_at: Option<SystemTime>,
    pub last_processed_at: Option<SystemTime>,
}

impl AccountProgress {
    pub fn new(account_id: u32) -> Self {
        Self {
            account_id,
            generated_actions: Vec::new(),
            generated_intervals: Vec::new(),
            generated_duration: Duration::ZERO,
            completed_actions: Vec::new(),
            action_intervals: Vec::new(),
            total_elapsed: Duration::ZERO,
            last_action_at: None,
            last_processed_at: None,
        }
    }

    /// Index of the first step not yet attempted.
    pub fn completed_steps(&self) -> usize {
        self.completed_actions.len()
    }

    pub fn is_fully_consumed(&self) -> bool {
        !self.generated_actions.is_empty()
            && self.completed_steps() >= self.generated_actions.len()
    }
}

pub struct ProgressDb {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ProgressDb {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Upsert one account's record without disturbing the others.
    pub fn save(&self, progress: &AccountProgress) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut records = self.load_all();
        upsert(&mut records, progress.clone());
        self.save_all(&records)
    }

    /// Absent is not an error; it means "no prior run".
    pub fn load(&self, account_id: u32) -> Option<AccountProgress> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        self.load_all()
            .into_iter()
            .find(|record| record.account_id == account_id)
    }

    pub fn has_any(&self) -> bool {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        !self.load_all().is_empty()
    }

    /// Append one attempted step. Read-modify-write under the store lock so
    /// concurrent workers for other accounts cannot interleave destructively.
    pub fn append_completed_step(
        &self,
        account_id: u32,
        action: &ActionPlan,
        interval: Duration,
    ) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut records = self.load_all();
        let record = match records
            .iter_mut()
            .find(|record| record.account_id == account_id)
        {
            Some(record) => record,
            None => {
                records.push(AccountProgress::new(account_id));
                records.last_mut().expect("just pushed")
            }
        };

        let now = SystemTime::now();
        record.completed_actions.push(action.clone());
        record.action_intervals.push(interval);
        record.total_elapsed += interval;
        record.last_action_at = Some(now);
        record.last_processed_at = Some(now);

        self.save_all(&records)
    }

    pub fn clear(&self, account_id: u32) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut records = self.load_all();
        records.retain(|record| record.account_id != account_id);
        self.save_all(&records)
    }

    pub fn clear_all(&self) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        self.save_all(&[])
    }

    /// A missing, empty, or malformed file reads as zero records so a fresh
    /// environment starts cleanly.
    fn load_all(&self) -> Vec<AccountProgress> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        "[STORE] unreadable state file {}: {err}; treating as empty",
                        self.path.display()
                    );
                }
                return Vec::new();
            }
        };
        if raw.trim().is_empty() {
            return Vec::new();
        }
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(
                    "[STORE] malformed state file {}: {err}; treating as empty",
                    self.path.display()
                );
                Vec::new()
            }
        }
    }

    fn save_all(&self, records: &[AccountProgress]) -> Result<()> {
        let encoded = serde_json::to_string_pretty(records).map_err(StoreError::from)?;
        fs::write(&self.path, encoded).map_err(StoreError::from)?;
        Ok(())
    }
}

fn upsert(records: &mut Vec<AccountProgress>, progress: AccountProgress) {
    match records
        .iter_mut()
        .find(|record| record.account_id == progress.account_id)
    {
        Some(existing) => *existing = progress,
        None => records.push(progress),
    }
}
