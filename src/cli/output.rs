use chrono::NaiveDate;
use serde::Serialize;

use crate::complete::{Candidate, Entity};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct CompletionJson {
    pub strategy: Option<&'static str>,
    pub query: String,
    /// Byte range the accepted candidate replaces
    pub start: usize,
    pub end: usize,
    pub items: Vec<CandidateJson>,
}

#[derive(Serialize)]
pub struct CandidateJson {
    pub label: String,
    pub score: u32,
    #[serde(flatten)]
    pub entity: Entity,
    /// Full text after accepting this candidate
    pub result: String,
    pub caret: usize,
}

#[derive(Serialize)]
pub struct DateJson {
    pub date: NaiveDate,
    pub token: String,
    pub result: String,
    pub caret: usize,
}

#[derive(Serialize)]
pub struct TagJson {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// One candidate per line: the label, then what accepting it inserts.
pub fn format_candidate(candidate: &Candidate, inserted: &str) -> String {
    let kind = match &candidate.entity {
        Entity::Tag { .. } => "tag",
        Entity::File { target } if !target.exists => "new",
        Entity::File { .. } => "file",
        Entity::Heading { .. } => "heading",
        Entity::Block { .. } => "block",
        Entity::Time { .. } => "time",
    };
    format!("{:<8}{:<40}{}", kind, candidate.label, inserted)
}
