use super::{
    filter_summary, format_idea_row, format_task_row, priority_color_code, status_color_code,
    Palette,
};
use crate::domain::{Domain, Idea, IdeaStatus, Priority, Task, Vote};
use crate::listing::InboxFilter;
use std::collections::BTreeMap;
use time::{Date, Month};

fn plain() -> Palette {
    Palette { enabled: false }
}

fn sample_idea() -> Idea {
    Idea {
        id: "I-1".to_string(),
        title: "Team offsite".to_string(),
        description: String::new(),
        domain: Domain::Social,
        status: IdeaStatus::InDiscussion,
        votes: BTreeMap::from([
            ("lea".to_string(), Vote::Yes),
            ("sam".to_string(), Vote::Maybe),
        ]),
        tags: vec!["q3".to_string(), "travel".to_string()],
        created_at: "2026-03-01T10:00:00Z".to_string(),
        author: "lea".to_string(),
    }
}

fn sample_task() -> Task {
    Task {
        id: "T-1".to_string(),
        title: "Book venue".to_string(),
        description: String::new(),
        domain: Domain::Social,
        done: false,
        due_date: Some(Date::from_calendar_date(2026, Month::March, 9).expect("valid date")),
        assignee: "lea".to_string(),
        tags: Vec::new(),
        priority: Priority::High,
        focus: true,
        from_idea: Some("I-1".to_string()),
        created_at: "2026-03-01T10:00:00Z".to_string(),
        author: "lea".to_string(),
        subtasks: Vec::new(),
    }
}

#[test]
fn filter_summary_formats_only_active_filters() {
    let filter = InboxFilter {
        status: Some(IdeaStatus::Approved),
        domain: Some(Domain::Dev),
        query: Some("  rust ".to_string()),
    };
    assert_eq!(
        filter_summary(&filter).as_deref(),
        Some("status=approved domain=dev query=rust")
    );
}

#[test]
fn filter_summary_is_none_for_empty_filters() {
    assert!(filter_summary(&InboxFilter::default()).is_none());
    let blank = InboxFilter {
        query: Some("   ".to_string()),
        ..InboxFilter::default()
    };
    assert!(filter_summary(&blank).is_none());
}

#[test]
fn idea_row_shows_status_domain_tags_and_votes() {
    let row = format_idea_row(&sample_idea(), &plain());
    assert_eq!(
        row,
        "I-1 [IN_DISCUSSION] Team offsite (social) #q3 #travel 2 vote(s)"
    );
}

#[test]
fn task_row_shows_flags_due_date_and_assignee() {
    let mut task = sample_task();
    assert_eq!(
        format_task_row(&task, &plain()),
        "[ ] T-1 Book venue high *focus due 2026-03-09 @lea"
    );

    task.done = true;
    task.focus = false;
    task.due_date = None;
    task.assignee.clear();
    assert_eq!(format_task_row(&task, &plain()), "[x] T-1 Book venue high");
}

#[test]
fn disabled_palette_leaves_text_plain() {
    let palette = plain();
    assert_eq!(palette.heading("Inbox"), "Inbox");
    assert_eq!(palette.status(IdeaStatus::New), "[NEW]");

    let colored = Palette { enabled: true };
    assert_eq!(colored.dim("x"), "\x1b[2mx\x1b[0m");
}

#[test]
fn color_codes_follow_status_and_priority() {
    assert_eq!(status_color_code(IdeaStatus::Approved), "32");
    assert_eq!(status_color_code(IdeaStatus::Rejected), "31");
    assert_eq!(priority_color_code(Priority::High), "1;31");
    assert_eq!(priority_color_code(Priority::Low), "37");
}
