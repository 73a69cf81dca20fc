use std::io::{self, BufRead, IsTerminal, Write};

use crate::audit;
use crate::board::ImportSummary;
use crate::clock::format_date;
use crate::domain::{Domain, Idea, IdeaStatus, LogEntry, Priority, Task};
use crate::listing::{CalendarEntry, Checklist, InboxColumn, InboxFilter};

pub fn print_inbox(columns: &[InboxColumn<'_>], filter: &InboxFilter) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Inbox"));
    if let Some(summary) = filter_summary(filter) {
        println!("{}", palette.dim(&format!("filters: {summary}")));
    }

    let mut shown = 0;
    for column in columns {
        println!(
            "{} {}",
            palette.status(column.status),
            palette.dim(&format!("({})", column.ideas.len()))
        );
        for idea in &column.ideas {
            println!("  {}", format_idea_row(idea, &palette));
        }
        shown += column.ideas.len();
    }
    if shown == 0 {
        println!("{}", palette.dim("no ideas matched"));
    }
}

pub fn print_idea(idea: &Idea) {
    let palette = Palette::auto();
    println!("{}", format_idea_row(idea, &palette));
}

/// The decision card: one idea with its description and vote counts.
pub fn print_meeting(idea: Option<&Idea>) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Next decision"));
    let Some(idea) = idea else {
        println!("{}", palette.dim("no new ideas waiting"));
        return;
    };

    println!("{}", format_idea_row(idea, &palette));
    if !idea.description.is_empty() {
        println!("  {}", idea.description);
    }
    let counts = idea.vote_counts();
    println!(
        "  {}",
        palette.dim(&format!(
            "yes {}  no {}  maybe {}",
            counts.yes, counts.no, counts.maybe
        ))
    );
}

fn format_idea_row(idea: &Idea, palette: &Palette) -> String {
    let mut line = format!(
        "{} {} {}",
        palette.id(&idea.id),
        palette.status(idea.status),
        idea.title
    );
    line.push(' ');
    line.push_str(&palette.domain(idea.domain));
    if !idea.tags.is_empty() {
        line.push(' ');
        line.push_str(&palette.tags(&format!("#{}", idea.tags.join(" #"))));
    }
    let total = idea.vote_counts().total();
    if total > 0 {
        line.push(' ');
        line.push_str(&palette.dim(&format!("{total} vote(s)")));
    }
    line
}

pub fn print_checklist(list: &Checklist<'_>) {
    let palette = Palette::auto();
    println!(
        "{} {}",
        palette.heading("Checklist"),
        palette.domain(list.domain)
    );
    if list.open.is_empty() && list.done.is_empty() {
        println!("{}", palette.dim("no tasks in this domain"));
        return;
    }
    for task in list.open.iter().chain(list.done.iter()) {
        println!("{}", format_task_row(task, &palette));
    }
    println!(
        "{}",
        palette.dim(&format!("{} open, {} done", list.open.len(), list.done.len()))
    );
}

pub fn print_tasks(heading: &str, tasks: &[&Task], empty: &str) {
    let palette = Palette::auto();
    println!("{}", palette.heading(heading));
    if tasks.is_empty() {
        println!("{}", palette.dim(empty));
        return;
    }
    for task in tasks {
        println!("{}", format_task_row(task, &palette));
    }
}

pub fn print_task(task: &Task) {
    let palette = Palette::auto();
    println!("{}", format_task_row(task, &palette));
}

fn format_task_row(task: &Task, palette: &Palette) -> String {
    let check = if task.done { "[x]" } else { "[ ]" };
    let mut line = format!("{} {} {}", check, palette.id(&task.id), task.title);
    line.push(' ');
    line.push_str(&palette.priority(task.priority));
    if task.focus {
        line.push(' ');
        line.push_str(&palette.paint("1;33", "*focus"));
    }
    if let Some(due) = task.due_date {
        line.push(' ');
        line.push_str(&palette.dim(&format!("due {}", format_date(due))));
    }
    if !task.assignee.is_empty() {
        line.push(' ');
        line.push_str(&palette.dim(&format!("@{}", task.assignee)));
    }
    line
}

pub fn print_calendar(entries: &[CalendarEntry<'_>]) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Calendar"));
    if entries.is_empty() {
        println!("{}", palette.dim("no dated tasks"));
        return;
    }
    for entry in entries {
        let check = if entry.done { "[x]" } else { "[ ]" };
        println!(
            "{} {} {} {} {}",
            palette.dim(&format_date(entry.start)),
            check,
            palette.id(entry.id),
            entry.title,
            palette.domain(entry.domain)
        );
    }
}

pub fn print_log(entries: &[LogEntry]) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Activity"));
    if entries.is_empty() {
        println!("{}", palette.dim("no activity yet"));
        return;
    }
    for entry in entries {
        let user = if entry.user.is_empty() {
            "anonymous"
        } else {
            entry.user.as_str()
        };
        println!(
            "{} {} {}",
            palette.dim(&entry.timestamp),
            palette.id(user),
            audit::describe(entry)
        );
    }
}

pub fn print_import_summary(summary: &ImportSummary) {
    let palette = Palette::auto();
    println!(
        "imported {} idea(s) and {} task(s)",
        summary.ideas_added, summary.tasks_added
    );
    if summary.skipped > 0 {
        println!(
            "{}",
            palette.dim(&format!("skipped {} malformed item(s)", summary.skipped))
        );
    }
}

/// Asks for a display name on an interactive terminal. `None` when stdin is
/// not a terminal or the answer is blank.
pub fn prompt_user_name() -> io::Result<Option<String>> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Ok(None);
    }
    let mut stdout = io::stdout();
    write!(stdout, "Your name: ")?;
    stdout.flush()?;

    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    Ok(non_empty(&answer).map(str::to_string))
}

fn filter_summary(filter: &InboxFilter) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(status) = filter.status {
        parts.push(format!("status={status}"));
    }
    if let Some(domain) = filter.domain {
        parts.push(format!("domain={domain}"));
    }
    if let Some(query) = filter.query.as_deref().and_then(non_empty) {
        parts.push(format!("query={query}"));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn non_empty(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

struct Palette {
    enabled: bool,
}

impl Palette {
    fn auto() -> Self {
        let enabled = std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();
        Self { enabled }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        self.paint("1;36", text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    fn id(&self, text: &str) -> String {
        self.paint("1;94", text)
    }

    fn status(&self, status: IdeaStatus) -> String {
        let upper = status.as_str().to_ascii_uppercase();
        self.paint(status_color_code(status), &format!("[{upper}]"))
    }

    fn domain(&self, domain: Domain) -> String {
        self.paint("35", &format!("({domain})"))
    }

    fn priority(&self, priority: Priority) -> String {
        self.paint(priority_color_code(priority), priority.as_str())
    }

    fn tags(&self, text: &str) -> String {
        self.paint("90", text)
    }
}

fn status_color_code(status: IdeaStatus) -> &'static str {
    match status {
        IdeaStatus::New => "34",
        IdeaStatus::InDiscussion => "33",
        IdeaStatus::Approved => "32",
        IdeaStatus::Rejected => "31",
    }
}

fn priority_color_code(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "37",
        Priority::Medium => "33",
        Priority::High => "1;31",
    }
}

#[cfg(test)]
#[path = "ui_tests_ext.rs"]
mod tests;
