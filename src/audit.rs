use serde_json::{json, Value};

use crate::clock::{format_date, now_utc_rfc3339};
use crate::domain::{ActionType, Idea, LogEntry, Task, Vote};
use crate::ids::{generate_id, IdKind};

/// Builds a fresh entry stamped now, with an id not already used in `existing`.
pub fn new_entry(action: ActionType, payload: Value, user: &str, existing: &[LogEntry]) -> LogEntry {
    let id = generate_id(IdKind::Log, |candidate| {
        existing.iter().any(|entry| entry.id == candidate)
    });
    LogEntry {
        id,
        action,
        payload,
        user: user.to_string(),
        timestamp: now_utc_rfc3339(),
    }
}

pub fn vote_payload(idea_id: &str, vote: Vote) -> Value {
    json!({ "ideaId": idea_id, "vote": vote.as_str() })
}

pub fn promote_payload(idea_id: &str, task_id: &str) -> Value {
    json!({ "ideaId": idea_id, "taskId": task_id })
}

pub fn toggle_task_payload(task: &Task) -> Value {
    json!({ "taskId": task.id, "done": task.done })
}

pub fn toggle_focus_payload(task: &Task) -> Value {
    json!({ "taskId": task.id, "focus": task.focus })
}

pub fn delay_payload(task: &Task) -> Value {
    let due = task.due_date.map(format_date).unwrap_or_default();
    json!({ "taskId": task.id, "newDueDate": due })
}

pub fn add_idea_payload(idea: &Idea) -> Value {
    json!({ "id": idea.id, "title": idea.title })
}

pub fn add_task_payload(task: &Task) -> Value {
    json!({ "id": task.id, "title": task.title })
}

/// One-line human summary used by `opsboard log`.
pub fn describe(entry: &LogEntry) -> String {
    let field = |name: &str| {
        entry
            .payload
            .get(name)
            .map(|value| match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| "?".to_string())
    };

    match entry.action {
        ActionType::Vote => format!("voted {} on {}", field("vote"), field("ideaId")),
        ActionType::PromoteIdea => {
            format!("promoted {} to {}", field("ideaId"), field("taskId"))
        }
        ActionType::ToggleTask => format!("set {} done={}", field("taskId"), field("done")),
        ActionType::ToggleFocus => format!("set {} focus={}", field("taskId"), field("focus")),
        ActionType::DelayTask => format!("delayed {} to {}", field("taskId"), field("newDueDate")),
        ActionType::AddIdea => format!("added idea {} \"{}\"", field("id"), field("title")),
        ActionType::AddTask => format!("added task {} \"{}\"", field("id"), field("title")),
    }
}

#[cfg(test)]
mod tests {
    use super::{delay_payload, describe, new_entry, vote_payload};
    use crate::domain::{ActionType, Domain, LogEntry, Priority, Task, Vote};
    use serde_json::json;
    use time::{Date, Month};

    fn task() -> Task {
        Task {
            id: "T-1".to_string(),
            title: "Ship it".to_string(),
            description: String::new(),
            domain: Domain::Dev,
            done: false,
            due_date: None,
            assignee: String::new(),
            tags: Vec::new(),
            priority: Priority::Low,
            focus: false,
            from_idea: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            author: String::new(),
            subtasks: Vec::new(),
        }
    }

    #[test]
    fn new_entry_is_stamped_and_avoids_existing_ids() {
        let first = new_entry(ActionType::AddIdea, json!({}), "lea", &[]);
        assert!(first.id.starts_with("L-"));
        assert_eq!(first.user, "lea");
        assert!(!first.timestamp.is_empty());

        let existing = vec![first.clone()];
        let second = new_entry(ActionType::AddIdea, json!({}), "", &existing);
        assert_ne!(second.id, first.id);
        assert_eq!(second.user, "");
    }

    #[test]
    fn payloads_use_document_field_names() {
        assert_eq!(
            vote_payload("I-1", Vote::Maybe),
            json!({"ideaId": "I-1", "vote": "maybe"})
        );

        let mut delayed = task();
        assert_eq!(
            delay_payload(&delayed),
            json!({"taskId": "T-1", "newDueDate": ""})
        );
        delayed.due_date = Some(Date::from_calendar_date(2026, Month::May, 2).expect("date"));
        assert_eq!(
            delay_payload(&delayed),
            json!({"taskId": "T-1", "newDueDate": "2026-05-02"})
        );
    }

    #[test]
    fn describe_tolerates_missing_payload_fields() {
        let entry = LogEntry {
            id: "L-1".to_string(),
            action: ActionType::ToggleTask,
            payload: json!({"taskId": "T-9", "done": true}),
            user: String::new(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
        };
        assert_eq!(describe(&entry), "set T-9 done=true");

        let bare = LogEntry {
            payload: json!(null),
            action: ActionType::Vote,
            ..entry
        };
        assert_eq!(describe(&bare), "voted ? on ?");
    }
}
