use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Vote,
    PromoteIdea,
    ToggleTask,
    ToggleFocus,
    DelayTask,
    AddIdea,
    AddTask,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Vote => "vote",
            ActionType::PromoteIdea => "promote_idea",
            ActionType::ToggleTask => "toggle_task",
            ActionType::ToggleFocus => "toggle_focus",
            ActionType::DelayTask => "delay_task",
            ActionType::AddIdea => "add_idea",
            ActionType::AddTask => "add_task",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record. Never edited once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub action: ActionType,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub user: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::{ActionType, LogEntry};
    use serde_json::json;

    #[test]
    fn action_type_uses_snake_case_on_the_wire() {
        let entry = LogEntry {
            id: "L-0001".to_string(),
            action: ActionType::PromoteIdea,
            payload: json!({"ideaId": "I-1", "taskId": "T-1"}),
            user: "lea".to_string(),
            timestamp: "2026-03-01T10:00:00Z".to_string(),
        };
        let value = serde_json::to_value(&entry).expect("entry should serialize");
        assert_eq!(value["type"], "promote_idea");
        assert_eq!(value["payload"]["taskId"], "T-1");

        let back: LogEntry = serde_json::from_value(value).expect("entry should parse");
        assert_eq!(back, entry);
    }
}
