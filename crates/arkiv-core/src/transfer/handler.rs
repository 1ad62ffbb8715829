//! Turns operation-outcome notifications into local file-system actions.

use std::fs::File;
use std::io;
use std::sync::Arc;

use crate::exchange::FileExchange;
use crate::job::{Job, JobError, RetryQueue, RunningJobs};
use crate::status::StatusReporter;

use super::TransferEvent;

/// Handler invoked by the protocol client's delivery threads, one call per
/// notification. Safe to invoke concurrently for distinct file ids.
///
/// Every notification is validated against the registry first; a file id the
/// registry does not know is a protocol violation and is returned as an
/// error rather than recovered from. Local fetch failures are absorbed into
/// the failed path (remote cleanup, retry queue, registry removal) so the
/// rest of the operation keeps going.
pub struct TransferEventHandler<E, R> {
    exchange: E,
    running_jobs: Arc<RunningJobs>,
    failed_queue: Arc<RetryQueue>,
    reporter: R,
}

impl<E: FileExchange, R: StatusReporter> TransferEventHandler<E, R> {
    pub fn new(
        exchange: E,
        running_jobs: Arc<RunningJobs>,
        failed_queue: Arc<RetryQueue>,
        reporter: R,
    ) -> Self {
        Self {
            exchange,
            running_jobs,
            failed_queue,
            reporter,
        }
    }

    pub fn handle_event(&self, event: TransferEvent) -> Result<(), JobError> {
        let job = self.running_jobs.lookup(event.file_id())?;
        match event {
            TransferEvent::Complete { .. } => self.complete_job(job),
            TransferEvent::Failed { .. } => self.fail_job(job),
            // The lookup above already checked bookkeeping consistency;
            // nothing else to do for non-terminal notifications.
            TransferEvent::Progress { .. } => {}
        }
        Ok(())
    }

    fn complete_job(&self, job: Job) {
        match self.fetch_file(&job) {
            Ok(()) => {
                self.reporter.report_finish(&job.file_id);
                self.running_jobs.remove(&job);
                self.delete_remote_copy(&job);
            }
            Err(e) => {
                tracing::warn!("fetching '{}' failed, queueing for retry: {}", job.file_id, e);
                self.fail_job(job);
            }
        }
    }

    fn fail_job(&self, job: Job) {
        self.delete_remote_copy(&job);
        self.failed_queue.push(job.clone());
        self.running_jobs.remove(&job);
    }

    fn fetch_file(&self, job: &Job) -> io::Result<()> {
        let mut out = File::create(&job.local_file)?;
        self.exchange.get_file(&mut out, &job.url)
    }

    // Delete failures are not distinguished from successes at this layer.
    fn delete_remote_copy(&self, job: &Job) {
        if let Err(e) = self.exchange.delete_file(&job.url) {
            tracing::warn!(
                "could not delete remote copy of '{}' at {}: {}",
                job.file_id,
                job.url,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use url::Url;

    /// Exchange fake that appends to a shared call log. Each entry records
    /// the registry/queue state observed at call time, which pins down the
    /// ordering of registry removal and retry enqueueing relative to the
    /// collaborator calls.
    struct ProbeExchange {
        log: Arc<Mutex<Vec<String>>>,
        running_jobs: Arc<RunningJobs>,
        failed_queue: Arc<RetryQueue>,
        file_id: String,
        body: &'static [u8],
        fail_fetch: bool,
    }

    impl FileExchange for ProbeExchange {
        fn get_file(&self, out: &mut dyn Write, _url: &Url) -> io::Result<()> {
            self.log.lock().unwrap().push("get_file".to_string());
            if self.fail_fetch {
                return Err(io::Error::other("bogus exchange failure"));
            }
            out.write_all(self.body)
        }

        fn delete_file(&self, _url: &Url) -> io::Result<()> {
            self.log.lock().unwrap().push(format!(
                "delete_file registered={} queued={}",
                self.running_jobs.contains(&self.file_id),
                self.failed_queue.len()
            ));
            Ok(())
        }
    }

    struct ProbeReporter {
        log: Arc<Mutex<Vec<String>>>,
        running_jobs: Arc<RunningJobs>,
        file_id: String,
    }

    impl StatusReporter for ProbeReporter {
        fn report_finish(&self, file_id: &str) {
            self.log.lock().unwrap().push(format!(
                "report_finish {} registered={}",
                file_id,
                self.running_jobs.contains(&self.file_id)
            ));
        }
    }

    struct Fixture {
        handler: TransferEventHandler<ProbeExchange, ProbeReporter>,
        running_jobs: Arc<RunningJobs>,
        failed_queue: Arc<RetryQueue>,
        log: Arc<Mutex<Vec<String>>>,
        job: Job,
        _dir: tempfile::TempDir,
    }

    fn fixture(file_id: &str, fail_fetch: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let running_jobs = Arc::new(RunningJobs::new());
        let failed_queue = Arc::new(RetryQueue::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let job = Job::new(
            dir.path().join(file_id),
            file_id.to_string(),
            None,
            Url::parse(&format!("http://fake-server/dav/{}", file_id)).unwrap(),
        );
        running_jobs.register(job.clone()).unwrap();

        let exchange = ProbeExchange {
            log: Arc::clone(&log),
            running_jobs: Arc::clone(&running_jobs),
            failed_queue: Arc::clone(&failed_queue),
            file_id: file_id.to_string(),
            body: b"remote bytes",
            fail_fetch,
        };
        let reporter = ProbeReporter {
            log: Arc::clone(&log),
            running_jobs: Arc::clone(&running_jobs),
            file_id: file_id.to_string(),
        };
        let handler = TransferEventHandler::new(
            exchange,
            Arc::clone(&running_jobs),
            Arc::clone(&failed_queue),
            reporter,
        );

        Fixture {
            handler,
            running_jobs,
            failed_queue,
            log,
            job,
            _dir: dir,
        }
    }

    #[test]
    fn complete_event_fetches_reports_removes_then_deletes() {
        let fx = fixture("f1", false);
        fx.handler
            .handle_event(TransferEvent::Complete {
                file_id: "f1".to_string(),
            })
            .unwrap();

        // fetch -> report (job still registered) -> remove -> remote delete
        // (job gone, nothing queued).
        assert_eq!(
            *fx.log.lock().unwrap(),
            vec![
                "get_file".to_string(),
                "report_finish f1 registered=true".to_string(),
                "delete_file registered=false queued=0".to_string(),
            ]
        );
        assert!(fx.running_jobs.is_empty());
        assert!(fx.failed_queue.is_empty());
        assert_eq!(std::fs::read(&fx.job.local_file).unwrap(), b"remote bytes");
    }

    #[test]
    fn failed_event_deletes_enqueues_then_removes() {
        let fx = fixture("f1", false);
        fx.handler
            .handle_event(TransferEvent::Failed {
                file_id: "f1".to_string(),
            })
            .unwrap();

        // remote delete happens first, while the job is still registered and
        // before it is queued for retry.
        assert_eq!(
            *fx.log.lock().unwrap(),
            vec!["delete_file registered=true queued=0".to_string()]
        );
        assert!(fx.running_jobs.is_empty());
        assert_eq!(fx.failed_queue.try_pop(), Some(fx.job.clone()));
        assert!(fx.failed_queue.is_empty());
    }

    #[test]
    fn fetch_failure_degrades_to_failed_path() {
        let fx = fixture("f1", true);
        fx.handler
            .handle_event(TransferEvent::Complete {
                file_id: "f1".to_string(),
            })
            .unwrap();

        // One fetch attempt, no success report, then the failed path in
        // order: delete -> enqueue -> remove.
        assert_eq!(
            *fx.log.lock().unwrap(),
            vec![
                "get_file".to_string(),
                "delete_file registered=true queued=0".to_string(),
            ]
        );
        assert!(fx.running_jobs.is_empty());
        assert_eq!(fx.failed_queue.try_pop(), Some(fx.job.clone()));
    }

    #[test]
    fn progress_event_only_checks_the_registry() {
        let fx = fixture("f1", false);
        fx.handler
            .handle_event(TransferEvent::Progress {
                file_id: "f1".to_string(),
            })
            .unwrap();

        assert!(fx.log.lock().unwrap().is_empty());
        // The job stays in flight.
        assert!(fx.running_jobs.contains("f1"));
        assert!(fx.failed_queue.is_empty());
    }

    #[test]
    fn unknown_file_id_is_a_protocol_error() {
        let fx = fixture("f1", false);
        let err = fx
            .handler
            .handle_event(TransferEvent::Complete {
                file_id: "ghost".to_string(),
            })
            .unwrap_err();

        assert_eq!(err, JobError::Unknown("ghost".to_string()));
        assert!(fx.log.lock().unwrap().is_empty());
        assert!(fx.running_jobs.contains("f1"));
    }
}
