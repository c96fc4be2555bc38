//! Saved-jobs store
//!
//! One persisted record, `job-store`, holding the saved job ids and the
//! last list of jobs shown. It is read once when opened and rewritten on
//! every mutation.

use std::fs;
use std::path::{Path, PathBuf};

use common::Job;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Storage key; the record lives in `<dir>/job-store.json`.
pub const STORE_KEY: &str = "job-store";
const STORE_VERSION: u32 = 0;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStoreState {
    #[serde(default)]
    jobs: Vec<Job>,
    #[serde(default)]
    saved_jobs: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PersistedRecord {
    state: JobStoreState,
}

#[derive(Serialize)]
struct PersistedRecordRef<'a> {
    state: &'a JobStoreState,
    version: u32,
}

#[derive(Debug)]
pub struct SavedJobsStore {
    path: PathBuf,
    state: JobStoreState,
}

impl SavedJobsStore {
    /// Opens the store kept in `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        Self::load(dir.join(format!("{STORE_KEY}.json")))
    }

    /// Reads the record at `path`; a missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let record: PersistedRecord = serde_json::from_str(&content)?;
            record.state
        } else {
            JobStoreState::default()
        };

        tracing::debug!(path = %path.display(), saved = state.saved_jobs.len(), "opened saved-jobs store");
        Ok(Self { path, state })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_saved(&self, job_id: &str) -> bool {
        self.state.saved_jobs.iter().any(|id| id == job_id)
    }

    /// Flips membership of `job_id` and persists. Returns the new membership.
    /// If the write fails the membership is left as it was.
    pub fn toggle(&mut self, job_id: &str) -> Result<bool> {
        let was_saved = self.is_saved(job_id);
        if was_saved {
            self.state.saved_jobs.retain(|id| id != job_id);
        } else {
            self.state.saved_jobs.push(job_id.to_string());
        }

        if let Err(err) = self.persist() {
            if was_saved {
                self.state.saved_jobs.push(job_id.to_string());
            } else {
                self.state.saved_jobs.retain(|id| id != job_id);
            }
            return Err(err);
        }
        Ok(!was_saved)
    }

    /// Saved ids in the order they were saved.
    pub fn saved(&self) -> &[String] {
        &self.state.saved_jobs
    }

    /// Replaces the cached job list and persists.
    pub fn set_jobs(&mut self, jobs: Vec<Job>) -> Result<()> {
        self.state.jobs = jobs;
        self.persist()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.state.jobs
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let record = PersistedRecordRef {
            state: &self.state,
            version: STORE_VERSION,
        };
        // staged beside the record, then renamed over it
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, serde_json::to_string_pretty(&record)?)?;
        if let Err(err) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }
        Ok(())
    }
}
