use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Date;

use super::idea::ParseChoiceError;
use super::Domain;

/// At most this many tasks carry the weekly focus flag.
pub const MAX_FOCUS_TASKS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseChoiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == normalized)
            .ok_or_else(|| ParseChoiceError::new("priority", value, &Priority::ALL))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(rename = "desc", default)]
    pub description: String,
    pub domain: Domain,
    #[serde(default)]
    pub done: bool,
    #[serde(default, with = "due_date")]
    pub due_date: Option<Date>,
    /// Empty means visible to everyone.
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "priority_or_default")]
    pub priority: Priority,
    #[serde(default)]
    pub focus: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_idea: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub subtasks: Vec<Value>,
}

impl Task {
    pub fn is_visible_to(&self, user: &str) -> bool {
        self.assignee.is_empty() || self.assignee == user
    }
}

fn priority_or_default<'de, D>(deserializer: D) -> Result<Priority, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Priority>::deserialize(deserializer)?.unwrap_or_default())
}

/// `dueDate` travels as `YYYY-MM-DD` or an empty string.
mod due_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use crate::clock::{format_date, parse_date};

    pub fn serialize<S: Serializer>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&format_date(*date)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Date>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        if raw.trim().is_empty() {
            return Ok(None);
        }
        parse_date(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid due date '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::{Priority, Task};
    use crate::domain::Domain;
    use std::str::FromStr;
    use time::{Date, Month};

    #[test]
    fn missing_or_null_priority_defaults_to_low() {
        let raw = r#"{"id":"t1","title":"Call bank","domain":"entreprise","createdAt":"x"}"#;
        let task: Task = serde_json::from_str(raw).expect("task should parse");
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.due_date, None);
        assert!(!task.done);
        assert!(!task.focus);
        assert_eq!(task.from_idea, None);

        let raw = r#"{"id":"t2","title":"x","domain":"dev","createdAt":"x","priority":null}"#;
        let task: Task = serde_json::from_str(raw).expect("null priority should parse");
        assert_eq!(task.priority, Priority::Low);
    }

    #[test]
    fn due_date_round_trips_through_wire_form() {
        let raw = r#"{
            "id": "t3", "title": "Ship", "desc": "", "domain": "dev",
            "done": false, "dueDate": "2026-04-01", "assignee": "",
            "tags": ["release"], "priority": "high", "focus": true,
            "fromIdea": "I-0001", "createdAt": "2026-03-30T08:00:00Z",
            "author": "lea", "subtasks": []
        }"#;
        let task: Task = serde_json::from_str(raw).expect("task should parse");
        assert_eq!(
            task.due_date,
            Some(Date::from_calendar_date(2026, Month::April, 1).expect("valid date"))
        );
        assert_eq!(task.domain, Domain::Dev);
        let value = serde_json::to_value(&task).expect("task should serialize");
        assert_eq!(value["dueDate"], "2026-04-01");
        assert_eq!(value["fromIdea"], "I-0001");

        let mut undated = task.clone();
        undated.due_date = None;
        let value = serde_json::to_value(&undated).expect("task should serialize");
        assert_eq!(value["dueDate"], "");
    }

    #[test]
    fn rejects_garbage_due_date() {
        let raw = r#"{"id":"t4","title":"x","domain":"dev","createdAt":"x","dueDate":"soon"}"#;
        assert!(serde_json::from_str::<Task>(raw).is_err());
    }

    #[test]
    fn unassigned_tasks_are_visible_to_everyone() {
        let raw = r#"{"id":"t5","title":"x","domain":"dev","createdAt":"x"}"#;
        let mut task: Task = serde_json::from_str(raw).expect("task should parse");
        assert!(task.is_visible_to("anyone"));
        task.assignee = "lea".to_string();
        assert!(task.is_visible_to("lea"));
        assert!(!task.is_visible_to("sam"));
    }

    #[test]
    fn parses_priority_names() {
        assert_eq!(Priority::from_str(" HIGH ").unwrap(), Priority::High);
        assert!(Priority::from_str("urgent").is_err());
    }
}
