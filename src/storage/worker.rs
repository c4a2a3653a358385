//! Background save worker
//!
//! Checkpoint saves are queued to a single task and written in request
//! order, so an earlier slow save can never land after a later one. The
//! controller never waits on this queue during a transition.

use crate::storage::SaveGame;
use crate::storage::store::{PersistenceError, SaveStore};
use crate::types::SessionKey;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

enum SaveJob {
    Write { key: SessionKey, save: Box<SaveGame> },
    Delete { key: SessionKey },
    Flush(oneshot::Sender<()>),
}

pub struct SaveWorker {
    jobs: mpsc::UnboundedSender<SaveJob>,
    failures: mpsc::UnboundedReceiver<PersistenceError>,
}

impl SaveWorker {
    /// Start the worker on the current tokio runtime
    pub fn spawn(store: Arc<dyn SaveStore>) -> Result<Self, PersistenceError> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| PersistenceError::unavailable(format!("no tokio runtime: {e}")))?;

        let (jobs, mut queue) = mpsc::unbounded_channel::<SaveJob>();
        let (report, failures) = mpsc::unbounded_channel();

        handle.spawn(async move {
            while let Some(job) = queue.recv().await {
                let result = match job {
                    SaveJob::Write { key, save } => store.save(&key, &save).await,
                    SaveJob::Delete { key } => store.delete(&key).await,
                    SaveJob::Flush(done) => {
                        let _ = done.send(());
                        continue;
                    }
                };
                if let Err(error) = result {
                    log::warn!("[Save] background save failed: {}", error);
                    let _ = report.send(error);
                }
            }
            log::debug!("[Save] worker stopped");
        });

        Ok(Self { jobs, failures })
    }

    pub fn enqueue_save(&self, key: SessionKey, save: SaveGame) -> Result<(), PersistenceError> {
        self.send(SaveJob::Write {
            key,
            save: Box::new(save),
        })
    }

    pub fn enqueue_delete(&self, key: SessionKey) -> Result<(), PersistenceError> {
        self.send(SaveJob::Delete { key })
    }

    /// Wait until every job queued so far has been processed
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.send(SaveJob::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }

    /// Failures reported by the worker since the last call
    pub fn take_failures(&mut self) -> Vec<PersistenceError> {
        let mut failures = Vec::new();
        while let Ok(error) = self.failures.try_recv() {
            failures.push(error);
        }
        failures
    }

    fn send(&self, job: SaveJob) -> Result<(), PersistenceError> {
        self.jobs
            .send(job)
            .map_err(|_| PersistenceError::unavailable("save worker has stopped"))
    }
}
