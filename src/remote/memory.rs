use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{Idea, LogEntry, Task};

use super::{RemoteChange, RemoteError, RemoteStore, Session};

/// In-process remote. Clones share the same rows and subscribers.
#[derive(Clone, Default)]
pub struct MemoryRemote {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    rows: Mutex<Rows>,
    offline: AtomicBool,
}

#[derive(Default)]
struct Rows {
    ideas: Vec<Idea>,
    tasks: Vec<Task>,
    logs: Vec<LogEntry>,
    session: Option<Session>,
    subscribers: Vec<mpsc::UnboundedSender<RemoteChange>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with `RemoteError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_session(&self, display_name: Option<&str>) {
        self.rows().session = display_name.map(|name| Session {
            display_name: name.to_string(),
        });
    }

    pub fn ideas(&self) -> Vec<Idea> {
        self.rows().ideas.clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.rows().tasks.clone()
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.rows().logs.clone()
    }

    fn rows(&self) -> MutexGuard<'_, Rows> {
        self.inner
            .rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_online(&self) -> Result<(), RemoteError> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable(
                "memory remote is offline".to_string(),
            ));
        }
        Ok(())
    }
}

impl Rows {
    fn publish(&mut self, change: RemoteChange) {
        self.subscribers
            .retain(|subscriber| subscriber.send(change.clone()).is_ok());
    }
}

fn replace_or_push<T, F>(rows: &mut Vec<T>, row: T, same: F)
where
    F: Fn(&T) -> bool,
{
    match rows.iter_mut().find(|existing| same(existing)) {
        Some(existing) => *existing = row,
        None => rows.push(row),
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn upsert_idea(&self, idea: &Idea) -> Result<(), RemoteError> {
        self.ensure_online()?;
        let mut rows = self.rows();
        replace_or_push(&mut rows.ideas, idea.clone(), |row| row.id == idea.id);
        rows.publish(RemoteChange::Idea(idea.clone()));
        Ok(())
    }

    async fn upsert_task(&self, task: &Task) -> Result<(), RemoteError> {
        self.ensure_online()?;
        let mut rows = self.rows();
        replace_or_push(&mut rows.tasks, task.clone(), |row| row.id == task.id);
        rows.publish(RemoteChange::Task(task.clone()));
        Ok(())
    }

    async fn insert_log(&self, entry: &LogEntry) -> Result<(), RemoteError> {
        self.ensure_online()?;
        let mut rows = self.rows();
        if rows.logs.iter().any(|row| row.id == entry.id) {
            return Err(RemoteError::Duplicate {
                collection: "logs",
                id: entry.id.clone(),
            });
        }
        rows.logs.push(entry.clone());
        Ok(())
    }

    async fn fetch_ideas(&self) -> Result<Vec<Idea>, RemoteError> {
        self.ensure_online()?;
        Ok(self.ideas())
    }

    async fn fetch_tasks(&self) -> Result<Vec<Task>, RemoteError> {
        self.ensure_online()?;
        Ok(self.tasks())
    }

    async fn subscribe(&self) -> Result<mpsc::UnboundedReceiver<RemoteChange>, RemoteError> {
        self.ensure_online()?;
        let (tx, rx) = mpsc::unbounded_channel();
        self.rows().subscribers.push(tx);
        Ok(rx)
    }

    async fn session(&self) -> Result<Option<Session>, RemoteError> {
        self.ensure_online()?;
        Ok(self.rows().session.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryRemote;
    use crate::domain::{ActionType, Domain, Idea, IdeaStatus, LogEntry};
    use crate::remote::{RemoteChange, RemoteError, RemoteStore};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn idea(id: &str, title: &str) -> Idea {
        Idea {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            domain: Domain::Dev,
            status: IdeaStatus::New,
            votes: BTreeMap::new(),
            tags: Vec::new(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            author: String::new(),
        }
    }

    #[tokio::test]
    async fn upsert_replaces_by_id_and_notifies_subscribers() {
        let remote = MemoryRemote::new();
        let mut changes = remote.subscribe().await.expect("subscribe should work");

        remote
            .upsert_idea(&idea("I-1", "first"))
            .await
            .expect("upsert should work");
        remote
            .upsert_idea(&idea("I-1", "renamed"))
            .await
            .expect("upsert should work");

        let ideas = remote.fetch_ideas().await.expect("fetch should work");
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].title, "renamed");

        let first = changes.recv().await.expect("first change");
        let second = changes.recv().await.expect("second change");
        assert!(matches!(first, RemoteChange::Idea(ref row) if row.title == "first"));
        assert!(matches!(second, RemoteChange::Idea(ref row) if row.title == "renamed"));
    }

    #[tokio::test]
    async fn log_inserts_reject_duplicates() {
        let remote = MemoryRemote::new();
        let entry = LogEntry {
            id: "L-1".to_string(),
            action: ActionType::AddIdea,
            payload: json!({"id": "I-1", "title": "x"}),
            user: String::new(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
        };
        remote.insert_log(&entry).await.expect("first insert");
        let err = remote
            .insert_log(&entry)
            .await
            .expect_err("second insert should fail");
        assert!(matches!(err, RemoteError::Duplicate { .. }));
        assert_eq!(remote.logs().len(), 1);
    }

    #[tokio::test]
    async fn offline_remote_fails_every_call() {
        let remote = MemoryRemote::new();
        remote.set_offline(true);
        assert!(remote.fetch_tasks().await.is_err());
        assert!(remote.upsert_idea(&idea("I-1", "x")).await.is_err());
        assert!(remote.ideas().is_empty());
        remote.set_offline(false);
        assert!(remote.upsert_idea(&idea("I-1", "x")).await.is_ok());
    }

    #[tokio::test]
    async fn session_reports_configured_display_name() {
        let remote = MemoryRemote::new();
        assert_eq!(remote.session().await.expect("session"), None);
        remote.set_session(Some("Lea"));
        let session = remote.session().await.expect("session").expect("some session");
        assert_eq!(session.display_name, "Lea");
    }
}
