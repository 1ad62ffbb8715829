//! Bounded worker pool delivering transfer events to the handler.
//!
//! The protocol client hands events to [`EventPump::deliver`]; a fixed set
//! of worker threads performs the blocking fetch/cleanup work. Events are
//! routed to a worker by hash of the file id, so all events for one file id
//! are handled in delivery order without any global lock.

use anyhow::{anyhow, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::exchange::FileExchange;
use crate::job::JobError;
use crate::status::StatusReporter;

use super::{TransferEvent, TransferEventHandler};

pub struct EventPump {
    senders: Vec<mpsc::Sender<TransferEvent>>,
    workers: Vec<JoinHandle<Result<(), JobError>>>,
}

impl EventPump {
    /// Start `workers` threads (at least one) sharing `handler`.
    pub fn start<E, R>(handler: Arc<TransferEventHandler<E, R>>, workers: usize) -> Self
    where
        E: FileExchange + Send + Sync + 'static,
        R: StatusReporter + Send + Sync + 'static,
    {
        let workers = workers.max(1);
        let mut senders = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let (tx, rx) = mpsc::channel::<TransferEvent>();
            senders.push(tx);
            let handler = Arc::clone(&handler);
            handles.push(std::thread::spawn(move || {
                for event in rx {
                    if let Err(e) = handler.handle_event(event) {
                        // Bookkeeping is inconsistent with the event source;
                        // stop this worker and surface the error on shutdown.
                        tracing::error!("event delivery stopped: {}", e);
                        return Err(e);
                    }
                }
                Ok(())
            }));
        }
        Self {
            senders,
            workers: handles,
        }
    }

    /// Route one event to its worker. Fails if that worker has already
    /// stopped on a protocol error.
    pub fn deliver(&self, event: TransferEvent) -> Result<()> {
        let index = (shard(event.file_id()) as usize) % self.senders.len();
        self.senders[index]
            .send(event)
            .map_err(|e| anyhow!("event worker stopped, dropping event for '{}'", e.0.file_id()))
    }

    /// Close the intake, drain remaining events, and join the pool.
    /// Returns the first worker error, if any.
    pub fn shutdown(self) -> Result<()> {
        drop(self.senders);
        let mut first_error: Option<anyhow::Error> = None;
        for worker in self.workers {
            match worker.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    if first_error.is_none() {
                        first_error = Some(anyhow::Error::new(e));
                    }
                }
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(anyhow!("event worker panicked: {:?}", e));
                    }
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn shard(file_id: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    file_id.hash(&mut hasher);
    hasher.finish()
}
