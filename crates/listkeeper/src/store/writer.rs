//! # Per-List Write Queue
//!
//! Every list id gets its own worker task fed by an unbounded channel. Jobs for
//! one id run strictly one after another, in the order they were enqueued, so
//! two writes to the same file are never in flight together and the last
//! enqueued snapshot is the one left on disk. Workers for different ids run
//! independently.
//!
//! ```text
//! ListStore ──enqueue(id, op)──► worker[id] ──spawn_blocking──► StorageBackend
//!     ▲                               │
//!     └──────── PersistTicket ◄───────┘ (oneshot)
//! ```
//!
//! Enqueueing never blocks. Each job reports its outcome through a
//! [`PersistTicket`]; failures also go to the error sink, so a dropped ticket
//! loses nothing.
//!
//! A `Remove` retires its worker: the sender is dropped and the task exits once
//! drained. If the id is written again before that, the new worker first waits
//! for the retired one, so the one-at-a-time rule holds across retirement.

use super::backend::StorageBackend;
use crate::error::{Result, StoreError};
use crate::model::List;
use crate::sink::ErrorSink;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{self, JoinHandle};
use tracing::{debug, warn};

#[derive(Debug)]
pub(crate) enum WriteOp {
    Save(List),
    Remove(String),
}

impl WriteOp {
    fn label(&self) -> &'static str {
        match self {
            WriteOp::Save(_) => "save",
            WriteOp::Remove(_) => "remove",
        }
    }

    fn apply<B: StorageBackend>(self, backend: &B) -> Result<()> {
        match self {
            WriteOp::Save(list) => backend.save(&list),
            WriteOp::Remove(id) => backend.remove(&id),
        }
    }
}

enum Job {
    Write {
        op: WriteOp,
        reply: oneshot::Sender<Result<()>>,
    },
    Flush(oneshot::Sender<()>),
}

/// Completion notice for one queued write.
#[derive(Debug)]
pub struct PersistTicket {
    rx: oneshot::Receiver<Result<()>>,
}

impl PersistTicket {
    /// Waits for the write to finish and returns its outcome.
    pub async fn wait(self) -> Result<()> {
        self.rx.await.unwrap_or_else(|_| {
            Err(StoreError::Runtime(
                "persistence worker stopped before completing the write".to_string(),
            ))
        })
    }
}

struct Worker {
    tx: mpsc::UnboundedSender<Job>,
    handle: JoinHandle<()>,
}

/// Shared sink slot; workers look it up on every report, so a replaced sink
/// takes effect for workers that are already running.
#[derive(Clone)]
struct SinkSlot(Arc<RwLock<Arc<dyn ErrorSink>>>);

impl SinkSlot {
    fn new(sink: Arc<dyn ErrorSink>) -> Self {
        Self(Arc::new(RwLock::new(sink)))
    }

    fn get(&self) -> Arc<dyn ErrorSink> {
        let guard = self.0.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&*guard)
    }

    fn set(&self, sink: Arc<dyn ErrorSink>) {
        *self.0.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = sink;
    }
}

pub(crate) struct WriteQueue<B> {
    backend: Arc<B>,
    sink: SinkSlot,
    runtime: Handle,
    workers: HashMap<String, Worker>,
    retired: HashMap<String, JoinHandle<()>>,
}

impl<B: StorageBackend + 'static> WriteQueue<B> {
    pub(crate) fn new(backend: Arc<B>, sink: Arc<dyn ErrorSink>, runtime: Handle) -> Self {
        Self {
            backend,
            sink: SinkSlot::new(sink),
            runtime,
            workers: HashMap::new(),
            retired: HashMap::new(),
        }
    }

    pub(crate) fn set_sink(&mut self, sink: Arc<dyn ErrorSink>) {
        self.sink.set(sink);
    }

    pub(crate) fn sink(&self) -> Arc<dyn ErrorSink> {
        self.sink.get()
    }

    pub(crate) fn runtime(&self) -> &Handle {
        &self.runtime
    }

    /// Queues `op` behind any pending work for `id`.
    pub(crate) fn enqueue(&mut self, id: &str, op: WriteOp) -> PersistTicket {
        let retire = matches!(op, WriteOp::Remove(_));
        let (reply, rx) = oneshot::channel();
        debug!(list_id = %id, op = op.label(), "queueing write");

        let mut job = Job::Write { op, reply };
        // A worker only goes away after its sender is dropped, so a failed
        // send means the task died; start a fresh one and resend.
        for _ in 0..2 {
            let worker = self.worker(id);
            match worker.tx.send(job) {
                Ok(()) => break,
                Err(mpsc::error::SendError(returned)) => {
                    warn!(list_id = %id, "write worker was gone, restarting it");
                    self.workers.remove(id);
                    job = returned;
                }
            }
        }

        if retire {
            self.retire(id);
        }
        PersistTicket { rx }
    }

    /// Waits until every job queued so far has finished.
    pub(crate) async fn flush(&mut self) {
        let mut barriers = Vec::with_capacity(self.workers.len());
        for worker in self.workers.values() {
            let (tx, rx) = oneshot::channel();
            if worker.tx.send(Job::Flush(tx)).is_ok() {
                barriers.push(rx);
            }
        }
        for barrier in barriers {
            let _ = barrier.await;
        }

        for (id, handle) in self.retired.drain() {
            if let Err(err) = handle.await {
                warn!(list_id = %id, error = %err, "write worker ended abnormally");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn active_workers(&self) -> usize {
        self.workers.len()
    }

    #[cfg(test)]
    pub(crate) fn retired_workers(&self) -> usize {
        self.retired.len()
    }

    fn worker(&mut self, id: &str) -> &Worker {
        if !self.workers.contains_key(id) {
            let predecessor = self
                .retired
                .remove(id)
                .filter(|handle| !handle.is_finished());
            let (tx, rx) = mpsc::unbounded_channel();
            let handle = self.runtime.spawn(run_worker(
                id.to_string(),
                Arc::clone(&self.backend),
                self.sink.clone(),
                predecessor,
                rx,
            ));
            self.workers.insert(id.to_string(), Worker { tx, handle });
        }
        &self.workers[id]
    }

    /// Drops the sender for `id`; the worker drains what it has, then exits.
    fn retire(&mut self, id: &str) {
        if let Some(worker) = self.workers.remove(id) {
            self.retired.retain(|_, handle| !handle.is_finished());
            // A previous retiree for `id` was handed to the worker being
            // retired now, so at most one handle per id is outstanding.
            self.retired.insert(id.to_string(), worker.handle);
        }
    }
}

async fn run_worker<B: StorageBackend + 'static>(
    id: String,
    backend: Arc<B>,
    sink: SinkSlot,
    predecessor: Option<JoinHandle<()>>,
    mut rx: mpsc::UnboundedReceiver<Job>,
) {
    if let Some(previous) = predecessor {
        debug!(list_id = %id, "waiting for retired write worker");
        if let Err(err) = previous.await {
            warn!(list_id = %id, error = %err, "write worker ended abnormally");
        }
    }

    while let Some(job) = rx.recv().await {
        match job {
            Job::Write { op, reply } => {
                let label = op.label();
                let backend = Arc::clone(&backend);
                let result = task::spawn_blocking(move || op.apply(backend.as_ref()))
                    .await
                    .unwrap_or_else(|err| {
                        Err(StoreError::Runtime(format!("write task failed: {err}")))
                    });

                match &result {
                    Ok(()) => debug!(list_id = %id, op = label, "write complete"),
                    Err(err) => sink.get().report(err),
                }
                // The caller may have dropped its ticket; the sink already has the error.
                let _ = reply.send(result);
            }
            Job::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!(list_id = %id, "write worker stopped");
}
