use std::collections::BTreeMap;

use serde::Serialize;

use super::{IdeaStatus, Vote};

/// Votes of one value needed to settle an idea.
pub const DECISION_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VoteCounts {
    pub yes: u32,
    pub no: u32,
    pub maybe: u32,
}

impl VoteCounts {
    pub fn tally(votes: &BTreeMap<String, Vote>) -> Self {
        let mut counts = VoteCounts::default();
        for vote in votes.values() {
            match vote {
                Vote::Yes => counts.yes += 1,
                Vote::No => counts.no += 1,
                Vote::Maybe => counts.maybe += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> u32 {
        self.yes + self.no + self.maybe
    }
}

/// Yes is checked before no, so an idea past both thresholds is approved.
pub fn derive_status(counts: &VoteCounts) -> IdeaStatus {
    if counts.yes >= DECISION_THRESHOLD {
        IdeaStatus::Approved
    } else if counts.no >= DECISION_THRESHOLD {
        IdeaStatus::Rejected
    } else if counts.total() > 0 {
        IdeaStatus::InDiscussion
    } else {
        IdeaStatus::New
    }
}

pub fn status_for(votes: &BTreeMap<String, Vote>) -> IdeaStatus {
    derive_status(&VoteCounts::tally(votes))
}
