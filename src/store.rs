use std::error::Error;
use std::fmt;
use std::path::Path;

use rusqlite::Connection;

use crate::db;
use crate::snapshot::Snapshot;

pub const SNAPSHOT_KEY: &str = "board_snapshot";

/// Durable home of the whole board snapshot. Knows nothing about ideas or tasks.
pub struct LocalStore {
    conn: Connection,
}

impl LocalStore {
    pub fn open(db_path: &str) -> Result<Self, StoreError> {
        ensure_parent_dir(db_path)?;
        let conn = db::open_connection(db_path)?;
        Ok(Self { conn })
    }

    pub fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(snapshot)?;
        db::put_value(&self.conn, SNAPSHOT_KEY, &encoded)?;
        tracing::debug!(
            ideas = snapshot.ideas.len(),
            tasks = snapshot.tasks.len(),
            logs = snapshot.logs.len(),
            "snapshot persisted"
        );
        Ok(())
    }

    /// Absent, unreadable, or corrupt data all load as the empty snapshot.
    pub fn load(&self) -> Snapshot {
        match db::get_value(&self.conn, SNAPSHOT_KEY) {
            Ok(Some(raw)) => Snapshot::from_json_lenient(&raw),
            Ok(None) => Snapshot::default(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read stored snapshot; starting empty");
                Snapshot::default()
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn write_raw(&self, raw: &str) -> Result<(), StoreError> {
        db::put_value(&self.conn, SNAPSHOT_KEY, raw)?;
        Ok(())
    }
}

fn ensure_parent_dir(db_path: &str) -> Result<(), StoreError> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Db(rusqlite::Error),
    Json(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "I/O error: {}", err),
            StoreError::Db(err) => write!(f, "database error: {}", err),
            StoreError::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err),
            StoreError::Db(err) => Some(err),
            StoreError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        StoreError::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        StoreError::Db(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        StoreError::Json(value)
    }
}
