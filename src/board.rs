use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::audit;
use crate::clock::{local_tomorrow, now_utc_rfc3339};
use crate::config::ConfigError;
use crate::domain::task::MAX_FOCUS_TASKS;
use crate::domain::{ActionType, Domain, Idea, IdeaStatus, Priority, Task, Vote};
use crate::ids::{generate_id, IdKind};
use crate::remote::{RemoteChange, RemoteError};
use crate::snapshot::Snapshot;
use crate::store::{LocalStore, StoreError};
use crate::sync::SyncBridge;

/// Voter identity used when no acting user is set.
pub const ANONYMOUS_VOTER: &str = "anonymous";

/// Owns the in-memory snapshot and pushes every change to its mirrors.
pub struct Board {
    snapshot: Snapshot,
    store: LocalStore,
    sync: SyncBridge,
}

#[derive(Debug, Clone, Default)]
pub struct NewIdea {
    pub title: String,
    pub description: String,
    pub domain: Domain,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub domain: Domain,
    pub tags: Vec<String>,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub ideas_added: usize,
    pub tasks_added: usize,
    pub skipped: usize,
}

enum Changed<'a> {
    Idea(&'a Idea),
    Task(&'a Task),
}

impl Board {
    pub fn open(store: LocalStore, sync: SyncBridge) -> Self {
        let snapshot = store.load();
        Self {
            snapshot,
            store,
            sync,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn current_user(&self) -> &str {
        &self.snapshot.current_user
    }

    pub fn voter_identity(&self) -> &str {
        if self.snapshot.current_user.is_empty() {
            ANONYMOUS_VOTER
        } else {
            &self.snapshot.current_user
        }
    }

    /// Stores the trimmed display name. Not audited and not mirrored.
    pub fn set_current_user(&mut self, name: &str) -> Result<(), BoardError> {
        self.snapshot.current_user = name.trim().to_string();
        self.store.persist(&self.snapshot)?;
        Ok(())
    }

    pub fn create_idea(&mut self, input: NewIdea) -> Result<Idea, BoardError> {
        let title = required_title(&input.title)?;
        let id = generate_id(IdKind::Idea, |candidate| {
            self.snapshot.idea(candidate).is_some()
        });
        let idea = Idea {
            id,
            title,
            description: input.description.trim().to_string(),
            domain: input.domain,
            status: IdeaStatus::New,
            votes: BTreeMap::new(),
            tags: input.tags,
            created_at: now_utc_rfc3339(),
            author: self.snapshot.current_user.clone(),
        };
        self.snapshot.ideas.push(idea.clone());
        self.commit(
            ActionType::AddIdea,
            audit::add_idea_payload(&idea),
            Changed::Idea(&idea),
        )?;
        Ok(idea)
    }

    pub fn create_task(&mut self, input: NewTask) -> Result<Task, BoardError> {
        let title = required_title(&input.title)?;
        let id = generate_id(IdKind::Task, |candidate| {
            self.snapshot.task(candidate).is_some()
        });
        let user = self.snapshot.current_user.clone();
        let task = Task {
            id,
            title,
            description: input.description.trim().to_string(),
            domain: input.domain,
            done: false,
            due_date: None,
            assignee: user.clone(),
            tags: input.tags,
            priority: input.priority,
            focus: false,
            from_idea: None,
            created_at: now_utc_rfc3339(),
            author: user,
            subtasks: Vec::new(),
        };
        self.snapshot.tasks.push(task.clone());
        self.commit(
            ActionType::AddTask,
            audit::add_task_payload(&task),
            Changed::Task(&task),
        )?;
        Ok(task)
    }

    /// Re-voting replaces the voter's earlier vote. Unknown ids are ignored.
    pub fn cast_vote(
        &mut self,
        idea_id: &str,
        voter: &str,
        vote: Vote,
    ) -> Result<Option<Idea>, BoardError> {
        let Some(idea) = self.idea_mut(idea_id) else {
            return Ok(None);
        };
        idea.cast_vote(voter, vote);
        let idea = idea.clone();
        self.commit(
            ActionType::Vote,
            audit::vote_payload(&idea.id, vote),
            Changed::Idea(&idea),
        )?;
        Ok(Some(idea))
    }

    /// Creates a task from the idea; the idea itself is left untouched.
    pub fn promote_idea(&mut self, idea_id: &str) -> Result<Option<Task>, BoardError> {
        let Some(idea) = self.snapshot.idea(idea_id) else {
            return Ok(None);
        };
        let id = generate_id(IdKind::Task, |candidate| {
            self.snapshot.task(candidate).is_some()
        });
        let task = Task {
            id,
            title: idea.title.clone(),
            description: idea.description.clone(),
            domain: idea.domain,
            done: false,
            due_date: None,
            assignee: String::new(),
            tags: idea.tags.clone(),
            priority: Priority::Medium,
            focus: false,
            from_idea: Some(idea.id.clone()),
            created_at: now_utc_rfc3339(),
            author: self.snapshot.current_user.clone(),
            subtasks: Vec::new(),
        };
        let payload = audit::promote_payload(&idea.id, &task.id);
        self.snapshot.tasks.push(task.clone());
        self.commit(ActionType::PromoteIdea, payload, Changed::Task(&task))?;
        Ok(Some(task))
    }

    pub fn toggle_task_done(&mut self, task_id: &str) -> Result<Option<Task>, BoardError> {
        let Some(task) = self.task_mut(task_id) else {
            return Ok(None);
        };
        task.done = !task.done;
        let task = task.clone();
        self.commit(
            ActionType::ToggleTask,
            audit::toggle_task_payload(&task),
            Changed::Task(&task),
        )?;
        Ok(Some(task))
    }

    /// Turning focus on is refused once `MAX_FOCUS_TASKS` tasks already carry it.
    pub fn toggle_task_focus(&mut self, task_id: &str) -> Result<Option<Task>, BoardError> {
        let focused = self.snapshot.focus_count();
        let Some(task) = self.task_mut(task_id) else {
            return Ok(None);
        };
        if !task.focus && focused >= MAX_FOCUS_TASKS {
            return Err(BoardError::FocusLimit {
                limit: MAX_FOCUS_TASKS,
            });
        }
        task.focus = !task.focus;
        let task = task.clone();
        self.commit(
            ActionType::ToggleFocus,
            audit::toggle_focus_payload(&task),
            Changed::Task(&task),
        )?;
        Ok(Some(task))
    }

    /// Moves the due date to tomorrow on the local calendar.
    pub fn delay_task(&mut self, task_id: &str) -> Result<Option<Task>, BoardError> {
        let Some(task) = self.task_mut(task_id) else {
            return Ok(None);
        };
        task.due_date = Some(local_tomorrow());
        let task = task.clone();
        self.commit(
            ActionType::DelayTask,
            audit::delay_payload(&task),
            Changed::Task(&task),
        )?;
        Ok(Some(task))
    }

    /// Replaces the local collections with the remote ones. A failed fetch
    /// leaves them as they were and returns `false`.
    pub async fn bootstrap(&mut self) -> Result<bool, BoardError> {
        if !self.sync.is_enabled() {
            return Ok(false);
        }

        if self.snapshot.current_user.is_empty() {
            if let Some(name) = self.sync.session_name().await {
                tracing::info!(user = %name, "acting user taken from remote session");
                self.set_current_user(&name)?;
            }
        }

        let Some((ideas, tasks)) = self.sync.fetch_all().await else {
            return Ok(false);
        };
        tracing::info!(
            ideas = ideas.len(),
            tasks = tasks.len(),
            "replaced local collections from remote"
        );
        self.snapshot.ideas = ideas;
        self.snapshot.tasks = tasks;
        self.store.persist(&self.snapshot)?;
        Ok(true)
    }

    /// Runs after the remote session changed.
    pub async fn reauthenticate(&mut self) -> Result<bool, BoardError> {
        self.bootstrap().await
    }

    pub async fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<RemoteChange>> {
        self.sync.subscribe().await
    }

    /// Last received wins: the row replaces the entry with the same id or is appended.
    pub fn apply_remote_change(&mut self, change: RemoteChange) -> Result<(), BoardError> {
        tracing::info!(
            collection = change.collection(),
            id = change.id(),
            "applying remote change"
        );
        match change {
            RemoteChange::Idea(idea) => {
                let id = idea.id.clone();
                replace_or_append(&mut self.snapshot.ideas, idea, |row| row.id == id);
            }
            RemoteChange::Task(task) => {
                let id = task.id.clone();
                replace_or_append(&mut self.snapshot.tasks, task, |row| row.id == id);
            }
        }
        self.store.persist(&self.snapshot)?;
        Ok(())
    }

    pub fn export_document(&self) -> Result<String, BoardError> {
        Ok(serde_json::to_string_pretty(&self.snapshot)?)
    }

    /// Adds ideas and tasks whose ids are not on the board yet and mirrors the
    /// added rows. Logs and the acting user of the document are ignored.
    pub fn import_document(&mut self, raw: &str) -> Result<ImportSummary, BoardError> {
        let document: Value = serde_json::from_str(raw)?;
        let mut summary = ImportSummary::default();
        let ideas_before = self.snapshot.ideas.len();
        let tasks_before = self.snapshot.tasks.len();

        for item in array_field(&document, "ideas") {
            match serde_json::from_value::<Idea>(item.clone()) {
                Ok(idea) if self.snapshot.idea(&idea.id).is_none() => {
                    self.snapshot.ideas.push(idea);
                    summary.ideas_added += 1;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed imported idea");
                    summary.skipped += 1;
                }
            }
        }

        for item in array_field(&document, "tasks") {
            match serde_json::from_value::<Task>(item.clone()) {
                Ok(task) if self.snapshot.task(&task.id).is_none() => {
                    self.snapshot.tasks.push(task);
                    summary.tasks_added += 1;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed imported task");
                    summary.skipped += 1;
                }
            }
        }

        self.store.persist(&self.snapshot)?;
        for idea in &self.snapshot.ideas[ideas_before..] {
            self.sync.upsert_idea(idea);
        }
        for task in &self.snapshot.tasks[tasks_before..] {
            self.sync.upsert_task(task);
        }
        Ok(summary)
    }

    /// Waits until every remote write enqueued so far has been attempted.
    #[cfg(test)]
    pub async fn settle_remote(&self) {
        self.sync.settle().await;
    }

    /// Delivers pending remote writes, then releases the board.
    pub async fn close(self) {
        self.sync.flush().await;
    }

    fn idea_mut(&mut self, id: &str) -> Option<&mut Idea> {
        self.snapshot.ideas.iter_mut().find(|idea| idea.id == id)
    }

    fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.snapshot.tasks.iter_mut().find(|task| task.id == id)
    }

    /// Appends the audit entry, persists, then mirrors the entity and the entry.
    fn commit(
        &mut self,
        action: ActionType,
        payload: Value,
        changed: Changed<'_>,
    ) -> Result<(), BoardError> {
        let entry = audit::new_entry(
            action,
            payload,
            &self.snapshot.current_user,
            &self.snapshot.logs,
        );
        self.snapshot.logs.push(entry.clone());
        self.store.persist(&self.snapshot)?;

        match changed {
            Changed::Idea(idea) => self.sync.upsert_idea(idea),
            Changed::Task(task) => self.sync.upsert_task(task),
        }
        self.sync.insert_log(&entry);
        Ok(())
    }
}

fn required_title(raw: &str) -> Result<String, BoardError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(BoardError::InvalidArgument(
            "title is required".to_string(),
        ));
    }
    Ok(title.to_string())
}

fn replace_or_append<T, F>(rows: &mut Vec<T>, row: T, same: F)
where
    F: Fn(&T) -> bool,
{
    match rows.iter().position(same) {
        Some(index) => rows[index] = row,
        None => rows.push(row),
    }
}

fn array_field<'a>(document: &'a Value, name: &str) -> &'a [Value] {
    document
        .get(name)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

#[derive(Debug)]
pub enum BoardError {
    Io(std::io::Error),
    Store(StoreError),
    Json(serde_json::Error),
    Config(ConfigError),
    Remote(RemoteError),
    InvalidArgument(String),
    FocusLimit { limit: usize },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::Io(err) => write!(f, "I/O error: {}", err),
            BoardError::Store(err) => write!(f, "local store error: {}", err),
            BoardError::Json(err) => write!(f, "invalid JSON document: {}", err),
            BoardError::Config(err) => write!(f, "configuration error: {}", err),
            BoardError::Remote(err) => write!(f, "{}", err),
            BoardError::InvalidArgument(message) => write!(f, "{}", message),
            BoardError::FocusLimit { limit } => {
                write!(f, "at most {} weekly priorities can be focused", limit)
            }
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BoardError::Io(err) => Some(err),
            BoardError::Store(err) => Some(err),
            BoardError::Json(err) => Some(err),
            BoardError::Config(err) => Some(err),
            BoardError::Remote(err) => Some(err),
            BoardError::InvalidArgument(_) => None,
            BoardError::FocusLimit { .. } => None,
        }
    }
}

impl From<std::io::Error> for BoardError {
    fn from(value: std::io::Error) -> Self {
        BoardError::Io(value)
    }
}

impl From<StoreError> for BoardError {
    fn from(value: StoreError) -> Self {
        BoardError::Store(value)
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(value: serde_json::Error) -> Self {
        BoardError::Json(value)
    }
}

impl From<ConfigError> for BoardError {
    fn from(value: ConfigError) -> Self {
        BoardError::Config(value)
    }
}

impl From<RemoteError> for BoardError {
    fn from(value: RemoteError) -> Self {
        BoardError::Remote(value)
    }
}
