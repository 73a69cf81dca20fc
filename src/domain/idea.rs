use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::tally::{status_for, VoteCounts};
use super::Domain;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaStatus {
    #[default]
    New,
    InDiscussion,
    Approved,
    Rejected,
}

impl IdeaStatus {
    /// Inbox column order.
    pub const ALL: [IdeaStatus; 4] = [
        IdeaStatus::New,
        IdeaStatus::InDiscussion,
        IdeaStatus::Approved,
        IdeaStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IdeaStatus::New => "new",
            IdeaStatus::InDiscussion => "in_discussion",
            IdeaStatus::Approved => "approved",
            IdeaStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdeaStatus {
    type Err = ParseChoiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        IdeaStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseChoiceError::new("idea status", value, &IdeaStatus::ALL))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Yes,
    No,
    Maybe,
}

impl Vote {
    pub const ALL: [Vote; 3] = [Vote::Yes, Vote::No, Vote::Maybe];

    pub fn as_str(self) -> &'static str {
        match self {
            Vote::Yes => "yes",
            Vote::No => "no",
            Vote::Maybe => "maybe",
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vote {
    type Err = ParseChoiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "oui" => Ok(Vote::Yes),
            "no" | "n" | "non" => Ok(Vote::No),
            "maybe" | "?" => Ok(Vote::Maybe),
            _ => Err(ParseChoiceError::new("vote", value, &Vote::ALL)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: String,
    pub title: String,
    #[serde(rename = "desc", default)]
    pub description: String,
    pub domain: Domain,
    #[serde(default)]
    pub status: IdeaStatus,
    #[serde(default)]
    pub votes: BTreeMap<String, Vote>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
    #[serde(default)]
    pub author: String,
}

impl Idea {
    pub fn vote_counts(&self) -> VoteCounts {
        VoteCounts::tally(&self.votes)
    }

    /// Records `voter`'s vote, replacing any earlier one, and re-derives the status.
    pub fn cast_vote(&mut self, voter: &str, vote: Vote) {
        self.votes.insert(voter.to_string(), vote);
        self.status = status_for(&self.votes);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseChoiceError {
    kind: &'static str,
    value: String,
    expected: String,
}

impl ParseChoiceError {
    pub(crate) fn new<T: fmt::Display>(kind: &'static str, value: &str, choices: &[T]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: choices
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl fmt::Display for ParseChoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} '{}': expected one of {}",
            self.kind, self.value, self.expected
        )
    }
}

impl Error for ParseChoiceError {}

#[cfg(test)]
mod tests {
    use super::{Idea, IdeaStatus, Vote};
    use crate::domain::Domain;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn sample_idea() -> Idea {
        Idea {
            id: "I-1a2b3c4d".to_string(),
            title: "Weekly demo".to_string(),
            description: String::new(),
            domain: Domain::Dev,
            status: IdeaStatus::New,
            votes: BTreeMap::new(),
            tags: Vec::new(),
            created_at: "2026-03-02T09:00:00Z".to_string(),
            author: "nadia".to_string(),
        }
    }

    #[test]
    fn revote_replaces_previous_vote() {
        let mut idea = sample_idea();
        idea.cast_vote("nadia", Vote::No);
        idea.cast_vote("nadia", Vote::Yes);
        assert_eq!(idea.votes.len(), 1);
        assert_eq!(idea.votes["nadia"], Vote::Yes);
        assert_eq!(idea.vote_counts().yes, 1);
        assert_eq!(idea.vote_counts().no, 0);
        assert_eq!(idea.status, IdeaStatus::InDiscussion);
    }

    #[test]
    fn deserializes_original_field_names_with_defaults() {
        let raw = r#"{
            "id": "_k3j2h1",
            "title": "Newsletter",
            "desc": "monthly",
            "domain": "marketing",
            "createdAt": "2025-08-25T10:00:00.000Z"
        }"#;
        let idea: Idea = serde_json::from_str(raw).expect("idea should parse");
        assert_eq!(idea.description, "monthly");
        assert_eq!(idea.status, IdeaStatus::New);
        assert!(idea.votes.is_empty());
        assert!(idea.tags.is_empty());
        assert_eq!(idea.author, "");
    }

    #[test]
    fn serializes_status_and_votes_in_wire_form() {
        let mut idea = sample_idea();
        idea.cast_vote("sam", Vote::Maybe);
        let value = serde_json::to_value(&idea).expect("idea should serialize");
        assert_eq!(value["status"], "in_discussion");
        assert_eq!(value["votes"]["sam"], "maybe");
        assert_eq!(value["createdAt"], "2026-03-02T09:00:00Z");
        assert!(value.get("desc").is_some());
    }

    #[test]
    fn parses_vote_and_status_names() {
        assert_eq!(Vote::from_str("Oui").unwrap(), Vote::Yes);
        assert_eq!(Vote::from_str("maybe").unwrap(), Vote::Maybe);
        assert!(Vote::from_str("perhaps").is_err());
        assert_eq!(
            IdeaStatus::from_str("in-discussion").unwrap(),
            IdeaStatus::InDiscussion
        );
        let err = IdeaStatus::from_str("done").expect_err("done is not a status");
        assert!(err.to_string().contains("new, in_discussion, approved, rejected"));
    }
}
