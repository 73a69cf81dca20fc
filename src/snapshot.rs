use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Idea, LogEntry, Task};

/// Everything the board persists, in the document shape shared by storage and export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub ideas: Vec<Idea>,
    pub tasks: Vec<Task>,
    pub logs: Vec<LogEntry>,
    pub current_user: String,
}

impl Snapshot {
    /// Reads each top-level field on its own; a missing or malformed field becomes empty.
    pub fn from_value_lenient(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            tracing::warn!("stored snapshot is not a JSON object; starting empty");
            return Snapshot::default();
        };

        Snapshot {
            ideas: lenient_field(object.get("ideas"), "ideas"),
            tasks: lenient_field(object.get("tasks"), "tasks"),
            logs: lenient_field(object.get("logs"), "logs"),
            current_user: object
                .get("currentUser")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }

    pub fn from_json_lenient(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value_lenient(&value),
            Err(err) => {
                tracing::warn!(error = %err, "stored snapshot is not valid JSON; starting empty");
                Snapshot::default()
            }
        }
    }

    pub fn idea(&self, id: &str) -> Option<&Idea> {
        self.ideas.iter().find(|idea| idea.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn focus_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.focus).count()
    }
}

/// A non-array field becomes empty; inside an array only the malformed items are dropped.
fn lenient_field<T: DeserializeOwned>(value: Option<&Value>, name: &str) -> Vec<T> {
    let Some(value) = value.filter(|value| !value.is_null()) else {
        return Vec::new();
    };
    let Some(items) = value.as_array() else {
        tracing::warn!(field = name, "discarding snapshot field that is not a list");
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(field = name, error = %err, "skipping malformed snapshot item");
                None
            }
        })
        .collect()
}
