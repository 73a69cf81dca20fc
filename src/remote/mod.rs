//! Remote data store seam: row-level upsert, select-all, insert, and change feed.

use std::error::Error;
use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{Idea, LogEntry, Task};

#[cfg(test)]
mod memory;
mod sqlite;

#[cfg(test)]
pub use memory::MemoryRemote;
pub use sqlite::SqliteRemote;

/// A changed row delivered by the remote's realtime feed.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteChange {
    Idea(Idea),
    Task(Task),
}

impl RemoteChange {
    pub fn id(&self) -> &str {
        match self {
            RemoteChange::Idea(idea) => &idea.id,
            RemoteChange::Task(task) => &task.id,
        }
    }

    pub fn collection(&self) -> &'static str {
        match self {
            RemoteChange::Idea(_) => "ideas",
            RemoteChange::Task(_) => "tasks",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub display_name: String,
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Replace-by-id; the last writer wins.
    async fn upsert_idea(&self, idea: &Idea) -> Result<(), RemoteError>;

    async fn upsert_task(&self, task: &Task) -> Result<(), RemoteError>;

    /// Append-only; an entry is never updated once inserted.
    async fn insert_log(&self, entry: &LogEntry) -> Result<(), RemoteError>;

    async fn fetch_ideas(&self) -> Result<Vec<Idea>, RemoteError>;

    async fn fetch_tasks(&self) -> Result<Vec<Task>, RemoteError>;

    /// Changes committed after this call, in commit order.
    async fn subscribe(&self) -> Result<mpsc::UnboundedReceiver<RemoteChange>, RemoteError>;

    async fn session(&self) -> Result<Option<Session>, RemoteError> {
        Ok(None)
    }
}

#[derive(Debug)]
pub enum RemoteError {
    Io(std::io::Error),
    Db(rusqlite::Error),
    Json(serde_json::Error),
    #[cfg(test)]
    Unavailable(String),
    Duplicate { collection: &'static str, id: String },
    Closed,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Io(err) => write!(f, "remote I/O error: {}", err),
            RemoteError::Db(err) => write!(f, "remote database error: {}", err),
            RemoteError::Json(err) => write!(f, "remote row encoding error: {}", err),
            #[cfg(test)]
            RemoteError::Unavailable(message) => write!(f, "remote unavailable: {}", message),
            RemoteError::Duplicate { collection, id } => {
                write!(f, "remote {} already contains '{}'", collection, id)
            }
            RemoteError::Closed => write!(f, "remote sync queue is closed"),
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RemoteError::Io(err) => Some(err),
            RemoteError::Db(err) => Some(err),
            RemoteError::Json(err) => Some(err),
            #[cfg(test)]
            RemoteError::Unavailable(_) => None,
            RemoteError::Duplicate { .. } => None,
            RemoteError::Closed => None,
        }
    }
}

impl From<std::io::Error> for RemoteError {
    fn from(value: std::io::Error) -> Self {
        RemoteError::Io(value)
    }
}

impl From<rusqlite::Error> for RemoteError {
    fn from(value: rusqlite::Error) -> Self {
        RemoteError::Db(value)
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(value: serde_json::Error) -> Self {
        RemoteError::Json(value)
    }
}
