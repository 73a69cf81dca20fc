//! Best-effort mirror between the local board and a remote store.
//!
//! Outbound writes go through a queue drained by one worker task, in the order
//! they were enqueued. Failures never reach the caller; they are logged and
//! published on the failure channel handed out by [`SyncBridge::connect`].

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
#[cfg(test)]
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::domain::{Idea, LogEntry, Task};
use crate::remote::{RemoteChange, RemoteError, RemoteStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOp {
    UpsertIdea,
    UpsertTask,
    InsertLog,
    FetchIdeas,
    FetchTasks,
    Subscribe,
    Session,
}

impl RemoteOp {
    pub fn as_str(self) -> &'static str {
        match self {
            RemoteOp::UpsertIdea => "upsert_idea",
            RemoteOp::UpsertTask => "upsert_task",
            RemoteOp::InsertLog => "insert_log",
            RemoteOp::FetchIdeas => "fetch_ideas",
            RemoteOp::FetchTasks => "fetch_tasks",
            RemoteOp::Subscribe => "subscribe",
            RemoteOp::Session => "session",
        }
    }
}

impl fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFailure {
    pub op: RemoteOp,
    pub id: Option<String>,
    pub message: String,
}

impl RemoteFailure {
    fn new(op: RemoteOp, id: Option<&str>, err: &RemoteError) -> Self {
        Self {
            op,
            id: id.map(str::to_string),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{} {} failed: {}", self.op, id, self.message),
            None => write!(f, "{} failed: {}", self.op, self.message),
        }
    }
}

enum Outbound {
    UpsertIdea(Idea),
    UpsertTask(Task),
    InsertLog(LogEntry),
    #[cfg(test)]
    Barrier(oneshot::Sender<()>),
}

struct Link {
    remote: Arc<dyn RemoteStore>,
    outbound: mpsc::UnboundedSender<Outbound>,
    failures: mpsc::UnboundedSender<RemoteFailure>,
    worker: JoinHandle<()>,
}

pub struct SyncBridge {
    link: Option<Link>,
}

impl SyncBridge {
    /// No remote configured: every operation is a silent no-op.
    pub fn disabled() -> Self {
        Self { link: None }
    }

    /// Spawns the outbound worker; must be called inside a tokio runtime.
    pub fn connect(
        remote: Arc<dyn RemoteStore>,
    ) -> (Self, mpsc::UnboundedReceiver<RemoteFailure>) {
        let (outbound, queue) = mpsc::unbounded_channel();
        let (failures, failure_rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(drain_outbound(
            Arc::clone(&remote),
            queue,
            failures.clone(),
        ));
        let link = Link {
            remote,
            outbound,
            failures,
            worker,
        };
        (Self { link: Some(link) }, failure_rx)
    }

    pub fn is_enabled(&self) -> bool {
        self.link.is_some()
    }

    pub fn upsert_idea(&self, idea: &Idea) {
        self.enqueue(Outbound::UpsertIdea(idea.clone()));
    }

    pub fn upsert_task(&self, task: &Task) {
        self.enqueue(Outbound::UpsertTask(task.clone()));
    }

    pub fn insert_log(&self, entry: &LogEntry) {
        self.enqueue(Outbound::InsertLog(entry.clone()));
    }

    fn enqueue(&self, message: Outbound) {
        let Some(link) = &self.link else {
            return;
        };
        if let Err(mpsc::error::SendError(message)) = link.outbound.send(message) {
            let (op, id) = match &message {
                Outbound::UpsertIdea(idea) => (RemoteOp::UpsertIdea, Some(idea.id.as_str())),
                Outbound::UpsertTask(task) => (RemoteOp::UpsertTask, Some(task.id.as_str())),
                Outbound::InsertLog(entry) => (RemoteOp::InsertLog, Some(entry.id.as_str())),
                #[cfg(test)]
                Outbound::Barrier(_) => return,
            };
            report(
                &link.failures,
                RemoteFailure::new(op, id, &RemoteError::Closed),
            );
        }
    }

    /// Both remote collections, or `None` when disabled or either fetch failed.
    pub async fn fetch_all(&self) -> Option<(Vec<Idea>, Vec<Task>)> {
        let link = self.link.as_ref()?;
        let ideas = match link.remote.fetch_ideas().await {
            Ok(ideas) => ideas,
            Err(err) => {
                report(&link.failures, RemoteFailure::new(RemoteOp::FetchIdeas, None, &err));
                return None;
            }
        };
        let tasks = match link.remote.fetch_tasks().await {
            Ok(tasks) => tasks,
            Err(err) => {
                report(&link.failures, RemoteFailure::new(RemoteOp::FetchTasks, None, &err));
                return None;
            }
        };
        Some((ideas, tasks))
    }

    pub async fn session_name(&self) -> Option<String> {
        let link = self.link.as_ref()?;
        match link.remote.session().await {
            Ok(session) => session
                .map(|session| session.display_name.trim().to_string())
                .filter(|name| !name.is_empty()),
            Err(err) => {
                report(&link.failures, RemoteFailure::new(RemoteOp::Session, None, &err));
                None
            }
        }
    }

    pub async fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<RemoteChange>> {
        let link = self.link.as_ref()?;
        match link.remote.subscribe().await {
            Ok(changes) => Some(changes),
            Err(err) => {
                report(&link.failures, RemoteFailure::new(RemoteOp::Subscribe, None, &err));
                None
            }
        }
    }

    /// Resolves once everything enqueued before this call has been attempted.
    #[cfg(test)]
    pub async fn settle(&self) {
        let Some(link) = &self.link else {
            return;
        };
        let (done_tx, done_rx) = oneshot::channel();
        if link.outbound.send(Outbound::Barrier(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    /// Closes the queue and waits for the worker to drain it.
    pub async fn flush(self) {
        let Some(link) = self.link else {
            return;
        };
        let Link {
            outbound, worker, ..
        } = link;
        drop(outbound);
        if let Err(err) = worker.await {
            tracing::warn!(error = %err, "remote sync worker ended abnormally");
        }
    }
}

async fn drain_outbound(
    remote: Arc<dyn RemoteStore>,
    mut queue: mpsc::UnboundedReceiver<Outbound>,
    failures: mpsc::UnboundedSender<RemoteFailure>,
) {
    while let Some(message) = queue.recv().await {
        let (op, id, result) = match message {
            Outbound::UpsertIdea(idea) => {
                let result = remote.upsert_idea(&idea).await;
                (RemoteOp::UpsertIdea, idea.id, result)
            }
            Outbound::UpsertTask(task) => {
                let result = remote.upsert_task(&task).await;
                (RemoteOp::UpsertTask, task.id, result)
            }
            Outbound::InsertLog(entry) => {
                let result = remote.insert_log(&entry).await;
                (RemoteOp::InsertLog, entry.id, result)
            }
            #[cfg(test)]
            Outbound::Barrier(done) => {
                let _ = done.send(());
                continue;
            }
        };
        match result {
            Ok(()) => tracing::debug!(op = %op, id = %id, "remote write applied"),
            Err(err) => report(&failures, RemoteFailure::new(op, Some(&id), &err)),
        }
    }
}

fn report(failures: &mpsc::UnboundedSender<RemoteFailure>, failure: RemoteFailure) {
    tracing::warn!(
        op = %failure.op,
        id = failure.id.as_deref().unwrap_or("-"),
        error = %failure.message,
        "remote operation failed"
    );
    let _ = failures.send(failure);
}
