pub mod area;
pub mod idea;
pub mod log;
pub mod tally;
pub mod task;

pub use area::Domain;
pub use idea::{Idea, IdeaStatus, Vote};
pub use log::{ActionType, LogEntry};
pub use task::{Priority, Task};

/// Splits comma separated tag input, dropping one leading `#` and empty items.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .map(|tag| tag.strip_prefix('#').unwrap_or(tag).trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
