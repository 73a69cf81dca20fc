use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::clock::now_utc_rfc3339;
use crate::db::configure_for_speed;
use crate::domain::{Idea, LogEntry, Task};

use super::{RemoteChange, RemoteError, RemoteStore, Session};

const REMOTE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS ideas (
    id TEXT PRIMARY KEY,
    row TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    row TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS logs (
    id TEXT PRIMARY KEY,
    row TEXT NOT NULL,
    inserted_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS changes (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    row_id TEXT NOT NULL,
    row TEXT NOT NULL,
    changed_at TEXT NOT NULL
);
"#;

/// Remote backed by a SQLite file shared between devices.
///
/// Every upsert also appends to the `changes` feed; subscribers poll the feed
/// from the high-water mark they saw when subscribing.
#[derive(Clone)]
pub struct SqliteRemote {
    conn: Arc<Mutex<Connection>>,
    poll_interval: Duration,
    session: Option<Session>,
}

impl SqliteRemote {
    pub fn open(
        path: &Path,
        poll_interval: Duration,
        session_user: Option<&str>,
    ) -> Result<Self, RemoteError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        configure_for_speed(&conn)?;
        conn.execute_batch(REMOTE_SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            poll_interval,
            session: session_user
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| Session {
                    display_name: name.to_string(),
                }),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn upsert_row<T: Serialize>(
        &self,
        collection: &'static str,
        id: &str,
        row: &T,
    ) -> Result<(), RemoteError> {
        let encoded = serde_json::to_string(row)?;
        let now = now_utc_rfc3339();
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO {collection} (id, row, updated_at) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(id) DO UPDATE SET row = excluded.row, updated_at = excluded.updated_at"
            ),
            params![id, encoded, now],
        )?;
        tx.execute(
            "INSERT INTO changes (collection, row_id, row, changed_at) VALUES (?1, ?2, ?3, ?4)",
            params![collection, id, encoded, now],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn select_rows<T: DeserializeOwned>(
        &self,
        collection: &'static str,
    ) -> Result<Vec<T>, RemoteError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("SELECT id, row FROM {collection} ORDER BY rowid"))?;
        let mut rows = stmt.query([])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let id: String = row.get(0)?;
            let raw: String = row.get(1)?;
            match serde_json::from_str(&raw) {
                Ok(value) => result.push(value),
                Err(err) => {
                    tracing::warn!(
                        collection,
                        id = %id,
                        error = %err,
                        "skipping malformed remote row"
                    );
                }
            }
        }
        Ok(result)
    }
}

fn high_water_mark(conn: &Connection) -> Result<i64, RemoteError> {
    let seq: i64 = conn.query_row("SELECT COALESCE(MAX(seq), 0) FROM changes", [], |row| {
        row.get(0)
    })?;
    Ok(seq)
}

/// Rows after `cursor`; undecodable rows come back as `None` so the cursor still advances.
fn changes_since(
    conn: &Connection,
    cursor: i64,
) -> Result<Vec<(i64, Option<RemoteChange>)>, RemoteError> {
    let mut stmt = conn.prepare(
        "SELECT seq, collection, row_id, row FROM changes WHERE seq > ?1 ORDER BY seq ASC",
    )?;
    let mut rows = stmt.query(params![cursor])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let seq: i64 = row.get(0)?;
        let collection: String = row.get(1)?;
        let row_id: String = row.get(2)?;
        let raw: String = row.get(3)?;
        let decoded = match collection.as_str() {
            "ideas" => serde_json::from_str(&raw).map(RemoteChange::Idea),
            "tasks" => serde_json::from_str(&raw).map(RemoteChange::Task),
            _ => continue,
        };
        match decoded {
            Ok(change) => result.push((seq, Some(change))),
            Err(err) => {
                tracing::warn!(
                    seq,
                    collection = %collection,
                    id = %row_id,
                    error = %err,
                    "skipping malformed change row"
                );
                result.push((seq, None));
            }
        }
    }
    Ok(result)
}

#[async_trait]
impl RemoteStore for SqliteRemote {
    async fn upsert_idea(&self, idea: &Idea) -> Result<(), RemoteError> {
        self.upsert_row("ideas", &idea.id, idea)
    }

    async fn upsert_task(&self, task: &Task) -> Result<(), RemoteError> {
        self.upsert_row("tasks", &task.id, task)
    }

    async fn insert_log(&self, entry: &LogEntry) -> Result<(), RemoteError> {
        let encoded = serde_json::to_string(entry)?;
        let result = self.conn().execute(
            "INSERT INTO logs (id, row, inserted_at) VALUES (?1, ?2, ?3)",
            params![entry.id, encoded, now_utc_rfc3339()],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(RemoteError::Duplicate {
                    collection: "logs",
                    id: entry.id.clone(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn fetch_ideas(&self) -> Result<Vec<Idea>, RemoteError> {
        self.select_rows("ideas")
    }

    async fn fetch_tasks(&self) -> Result<Vec<Task>, RemoteError> {
        self.select_rows("tasks")
    }

    async fn subscribe(&self) -> Result<mpsc::UnboundedReceiver<RemoteChange>, RemoteError> {
        let mut cursor = high_water_mark(&self.conn())?;
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = Arc::clone(&self.conn);
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tokio::spawn(async move {
            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    break;
                }
                let batch = {
                    let guard = conn.lock().unwrap_or_else(PoisonError::into_inner);
                    changes_since(&guard, cursor)
                };
                let batch = match batch {
                    Ok(batch) => batch,
                    Err(err) => {
                        tracing::warn!(error = %err, "remote change poll failed");
                        continue;
                    }
                };
                for (seq, change) in batch {
                    cursor = seq;
                    let Some(change) = change else {
                        continue;
                    };
                    if tx.send(change).is_err() {
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn session(&self) -> Result<Option<Session>, RemoteError> {
        Ok(self.session.clone())
    }
}

#[cfg(test)]
mod tests;
