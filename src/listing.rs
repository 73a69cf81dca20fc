use serde::Serialize;
use time::Date;

use crate::clock::format_date;
use crate::domain::{Domain, Idea, IdeaStatus, Task};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboxFilter {
    pub status: Option<IdeaStatus>,
    pub domain: Option<Domain>,
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InboxColumn<'a> {
    pub status: IdeaStatus,
    pub ideas: Vec<&'a Idea>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Checklist<'a> {
    pub domain: Domain,
    pub open: Vec<&'a Task>,
    pub done: Vec<&'a Task>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CalendarEntry<'a> {
    pub id: &'a str,
    pub title: &'a str,
    #[serde(serialize_with = "serialize_date")]
    pub start: Date,
    pub domain: Domain,
    pub done: bool,
}

/// One column per status, in status order. A status filter keeps only its column.
pub fn inbox<'a>(ideas: &'a [Idea], filter: &InboxFilter) -> Vec<InboxColumn<'a>> {
    let query = filter
        .query
        .as_deref()
        .map(|query| query.trim().to_lowercase())
        .filter(|query| !query.is_empty());

    IdeaStatus::ALL
        .into_iter()
        .filter(|status| filter.status.map_or(true, |wanted| wanted == *status))
        .map(|status| InboxColumn {
            status,
            ideas: ideas
                .iter()
                .filter(|idea| idea.status == status)
                .filter(|idea| filter.domain.map_or(true, |domain| idea.domain == domain))
                .filter(|idea| query.as_deref().map_or(true, |query| matches_query(idea, query)))
                .collect(),
        })
        .collect()
}

fn matches_query(idea: &Idea, query: &str) -> bool {
    format!("{} {}", idea.title, idea.description)
        .to_lowercase()
        .contains(query)
}

pub fn checklist(tasks: &[Task], domain: Domain) -> Checklist<'_> {
    let (done, open): (Vec<&Task>, Vec<&Task>) = tasks
        .iter()
        .filter(|task| task.domain == domain)
        .partition(|task| task.done);
    Checklist { domain, open, done }
}

/// The next idea waiting for a decision.
pub fn meeting(ideas: &[Idea]) -> Option<&Idea> {
    ideas.iter().find(|idea| idea.status == IdeaStatus::New)
}

pub fn my_day<'a>(tasks: &'a [Task], user: &str) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| !task.done && task.is_visible_to(user))
        .collect()
}

pub fn priorities(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|task| task.focus).collect()
}

pub fn calendar(tasks: &[Task]) -> Vec<CalendarEntry<'_>> {
    let mut entries: Vec<CalendarEntry<'_>> = tasks
        .iter()
        .filter_map(|task| {
            task.due_date.map(|start| CalendarEntry {
                id: &task.id,
                title: &task.title,
                start,
                domain: task.domain,
                done: task.done,
            })
        })
        .collect();
    entries.sort_by(|left, right| {
        left.start
            .cmp(&right.start)
            .then_with(|| left.title.cmp(right.title))
    });
    entries
}

fn serialize_date<S: serde::Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_date(*date))
}

#[cfg(test)]
#[path = "listing_tests_ext.rs"]
mod tests;
