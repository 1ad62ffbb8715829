//! Transfer jobs and the bookkeeping shared with the event-delivery threads.

mod registry;
mod retry_queue;

pub use registry::RunningJobs;
pub use retry_queue::RetryQueue;

use std::path::PathBuf;
use url::Url;

/// Error in the job bookkeeping protocol.
///
/// Both variants indicate a logic error between the event source and the
/// registry; they are surfaced immediately and never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    #[error("a transfer job for file id '{0}' is already registered")]
    Duplicate(String),
    #[error("no running transfer job for file id '{0}'")]
    Unknown(String),
}

/// One file transfer unit.
///
/// A job is never mutated after construction: it is either registered in
/// [`RunningJobs`] or has been handed off to the [`RetryQueue`] (or
/// completed). Resubmitting after a retry builds a fresh `Job`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Local destination the file is written to.
    pub local_file: PathBuf,
    /// Logical file id, unique within the collection.
    pub file_id: String,
    /// Expected checksum, when the caller knows one.
    pub checksum: Option<String>,
    /// Remote locator of the temporary copy; used both to fetch and to
    /// delete it.
    pub url: Url,
}

impl Job {
    pub fn new(local_file: PathBuf, file_id: String, checksum: Option<String>, url: Url) -> Self {
        Self {
            local_file,
            file_id,
            checksum,
            url,
        }
    }
}
