use super::{calendar, checklist, inbox, meeting, my_day, priorities, InboxFilter};
use crate::domain::{Domain, Idea, IdeaStatus, Priority, Task};
use std::collections::BTreeMap;
use time::{Date, Month};

fn idea(id: &str, title: &str, status: IdeaStatus, domain: Domain) -> Idea {
    Idea {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("about {title}"),
        domain,
        status,
        votes: BTreeMap::new(),
        tags: Vec::new(),
        created_at: "2026-02-23T10:00:00Z".to_string(),
        author: String::new(),
    }
}

fn task(id: &str, title: &str, domain: Domain) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        domain,
        done: false,
        due_date: None,
        assignee: String::new(),
        tags: Vec::new(),
        priority: Priority::Low,
        focus: false,
        from_idea: None,
        created_at: "2026-02-23T10:00:00Z".to_string(),
        author: String::new(),
        subtasks: Vec::new(),
    }
}

fn date(day: u8) -> Date {
    Date::from_calendar_date(2026, Month::March, day).expect("valid date")
}

fn idea_ids<'a>(rows: &[&'a Idea]) -> Vec<&'a str> {
    rows.iter().map(|row| row.id.as_str()).collect()
}

fn task_ids<'a>(rows: &[&'a Task]) -> Vec<&'a str> {
    rows.iter().map(|row| row.id.as_str()).collect()
}

fn sample_ideas() -> Vec<Idea> {
    vec![
        idea("I-1", "Blog relaunch", IdeaStatus::Approved, Domain::Marketing),
        idea("I-2", "Team lunch", IdeaStatus::New, Domain::Social),
        idea("I-3", "Rust rewrite", IdeaStatus::InDiscussion, Domain::Dev),
        idea("I-4", "Contract review", IdeaStatus::New, Domain::Legal),
        idea("I-5", "Cold outreach", IdeaStatus::Rejected, Domain::Marketing),
    ]
}

#[test]
fn inbox_groups_ideas_by_status_in_column_order() {
    let ideas = sample_ideas();
    let columns = inbox(&ideas, &InboxFilter::default());
    let statuses: Vec<IdeaStatus> = columns.iter().map(|column| column.status).collect();
    assert_eq!(statuses, IdeaStatus::ALL.to_vec());
    assert_eq!(idea_ids(&columns[0].ideas), vec!["I-2", "I-4"]);
    assert_eq!(columns[1].ideas.len(), 1);
    assert_eq!(columns[2].ideas[0].id, "I-1");
    assert_eq!(columns[3].ideas[0].id, "I-5");
}

#[test]
fn inbox_filters_by_status_domain_and_query() {
    let ideas = sample_ideas();

    let only_new = inbox(
        &ideas,
        &InboxFilter {
            status: Some(IdeaStatus::New),
            ..InboxFilter::default()
        },
    );
    assert_eq!(only_new.len(), 1);
    assert_eq!(only_new[0].ideas.len(), 2);

    let marketing = inbox(
        &ideas,
        &InboxFilter {
            domain: Some(Domain::Marketing),
            ..InboxFilter::default()
        },
    );
    let total: usize = marketing.iter().map(|column| column.ideas.len()).sum();
    assert_eq!(total, 2);

    let query = inbox(
        &ideas,
        &InboxFilter {
            query: Some("  ABOUT rust ".to_string()),
            ..InboxFilter::default()
        },
    );
    let matched: Vec<&str> = query
        .iter()
        .flat_map(|column| column.ideas.iter().map(|idea| idea.id.as_str()))
        .collect();
    assert_eq!(matched, vec!["I-3"]);

    let blank_query = inbox(
        &ideas,
        &InboxFilter {
            query: Some("   ".to_string()),
            ..InboxFilter::default()
        },
    );
    let total: usize = blank_query.iter().map(|column| column.ideas.len()).sum();
    assert_eq!(total, ideas.len());
}

#[test]
fn query_spans_title_and_description() {
    let ideas = vec![idea("I-1", "Launch", IdeaStatus::New, Domain::Dev)];
    let columns = inbox(
        &ideas,
        &InboxFilter {
            query: Some("launch about".to_string()),
            ..InboxFilter::default()
        },
    );
    assert_eq!(columns[0].ideas.len(), 1);
}

#[test]
fn checklist_lists_open_tasks_before_done_ones() {
    let mut tasks = vec![
        task("T-1", "done first", Domain::Dev),
        task("T-2", "open", Domain::Dev),
        task("T-3", "other domain", Domain::Entreprise),
        task("T-4", "open too", Domain::Dev),
    ];
    tasks[0].done = true;

    let list = checklist(&tasks, Domain::Dev);
    assert_eq!(list.domain, Domain::Dev);
    assert_eq!(task_ids(&list.open), vec!["T-2", "T-4"]);
    assert_eq!(task_ids(&list.done), vec!["T-1"]);

    let empty = checklist(&tasks, Domain::Legal);
    assert!(empty.open.is_empty() && empty.done.is_empty());
}

#[test]
fn meeting_picks_the_first_new_idea() {
    let ideas = sample_ideas();
    assert_eq!(meeting(&ideas).map(|idea| idea.id.as_str()), Some("I-2"));
    let decided = vec![idea("I-9", "Done deal", IdeaStatus::Approved, Domain::Dev)];
    assert_eq!(meeting(&decided), None);
}

#[test]
fn my_day_shows_open_tasks_for_the_user_or_everyone() {
    let mut tasks = vec![
        task("T-1", "unassigned", Domain::Dev),
        task("T-2", "mine", Domain::Dev),
        task("T-3", "theirs", Domain::Dev),
        task("T-4", "mine but done", Domain::Dev),
    ];
    tasks[1].assignee = "lea".to_string();
    tasks[2].assignee = "sam".to_string();
    tasks[3].assignee = "lea".to_string();
    tasks[3].done = true;

    assert_eq!(task_ids(&my_day(&tasks, "lea")), vec!["T-1", "T-2"]);
    assert_eq!(task_ids(&my_day(&tasks, "")), vec!["T-1"]);
}

#[test]
fn priorities_are_the_focused_tasks() {
    let mut tasks = vec![task("T-1", "a", Domain::Dev), task("T-2", "b", Domain::Dev)];
    tasks[1].focus = true;
    tasks[1].done = true;
    assert_eq!(task_ids(&priorities(&tasks)), vec!["T-2"]);
}

#[test]
fn calendar_orders_dated_tasks_by_date_then_title() {
    let mut tasks = vec![
        task("T-1", "zeta", Domain::Dev),
        task("T-2", "alpha", Domain::Dev),
        task("T-3", "undated", Domain::Dev),
        task("T-4", "beta", Domain::Legal),
    ];
    tasks[0].due_date = Some(date(5));
    tasks[1].due_date = Some(date(9));
    tasks[3].due_date = Some(date(5));
    tasks[3].done = true;

    let entries = calendar(&tasks);
    let order: Vec<&str> = entries.iter().map(|entry| entry.id).collect();
    assert_eq!(order, vec!["T-4", "T-1", "T-2"]);
    assert!(entries[0].done);

    let encoded = serde_json::to_value(&entries[0]).expect("entry should serialize");
    assert_eq!(encoded["start"], "2026-03-05");
    assert_eq!(encoded["domain"], "legal");
}
