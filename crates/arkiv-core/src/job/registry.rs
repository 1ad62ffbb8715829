//! Registry of in-flight transfer jobs, keyed by file id.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

use super::{Job, JobError};

/// Shared map of file id -> running job. Event-delivery threads look jobs up
/// and remove them; the submitting side registers them. All operations on a
/// single file id are atomic under the lock.
#[derive(Default)]
pub struct RunningJobs {
    jobs: RwLock<HashMap<String, Job>>,
}

impl RunningJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job before its transfer is submitted.
    pub fn register(&self, job: Job) -> Result<(), JobError> {
        let mut jobs = self.jobs.write().unwrap();
        match jobs.entry(job.file_id.clone()) {
            Entry::Occupied(_) => Err(JobError::Duplicate(job.file_id)),
            Entry::Vacant(entry) => {
                entry.insert(job);
                Ok(())
            }
        }
    }

    /// Look up the job for a file id mentioned in a notification.
    /// An unknown id means the event source and the registry disagree.
    pub fn lookup(&self, file_id: &str) -> Result<Job, JobError> {
        self.jobs
            .read()
            .unwrap()
            .get(file_id)
            .cloned()
            .ok_or_else(|| JobError::Unknown(file_id.to_string()))
    }

    /// Remove a job once it has reached a terminal state. Idempotent;
    /// removing a job that is no longer registered is logged as an anomaly.
    pub fn remove(&self, job: &Job) {
        if self.jobs.write().unwrap().remove(&job.file_id).is_none() {
            tracing::warn!(
                "removed job for '{}' which was not registered",
                job.file_id
            );
        }
    }

    pub fn contains(&self, file_id: &str) -> bool {
        self.jobs.read().unwrap().contains_key(file_id)
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().unwrap().is_empty()
    }
}
