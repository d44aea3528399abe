//! Candidate data model: the polymorphic items the engine ranks.
//!
//! Events, venues, organizations and short "stories" all flow through one
//! gate/dedup/score pipeline, so they share a single struct with a kind tag
//! and a common subset of optional fields. Missing fields are normal, not
//! errors; they degrade to neutral scoring contributions downstream.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Identity of the upstream source that supplied a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SourceRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: None,
            url: None,
        }
    }

    pub fn with_slug(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: Some(slug.into()),
            url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    Event,
    Venue,
    Organization,
    Story,
}

/// One rankable item. `id` + `source` are stable across repeated fetches
/// within a session, which is what dedup keys and idempotent re-ranking
/// rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub kind: CandidateKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    /// Distance from the context's reference point, in kilometers.
    /// Computed by the retrieval layer; `None` means unknown, not far.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    /// Recorded upcoming occurrences for venues/organizations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upcoming_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_free: Option<bool>,
    pub source: SourceRef,
}

impl Candidate {
    /// Title + description, the text the keyword-sentiment scan runs over.
    pub fn body_text(&self) -> String {
        match &self.description {
            Some(d) if !d.is_empty() => format!("{} {}", self.title, d),
            _ => self.title.clone(),
        }
    }

    /// Title + category + source text, used by the open-discovery
    /// community-focus check.
    pub fn search_text(&self) -> String {
        let mut out = self.title.clone();
        if let Some(c) = &self.category {
            out.push(' ');
            out.push_str(c);
        }
        out.push(' ');
        out.push_str(&self.source.name);
        if let Some(s) = &self.source.slug {
            out.push(' ');
            out.push_str(s);
        }
        out
    }

    /// Time-bound items are keyed per occurrence in dedup; the rest are
    /// keyed by normalized title.
    pub fn is_time_bound(&self) -> bool {
        matches!(self.kind, CandidateKind::Event)
    }

    /// Human-readable schedule label for presentation shaping.
    /// Undated items read as "Ongoing" rather than blank.
    pub fn schedule_label(&self) -> String {
        match (self.start_date, self.start_time) {
            (Some(d), Some(t)) => format!("{} · {}", d.format("%b %-d"), t.format("%-I:%M %p")),
            (Some(d), None) => d.format("%b %-d").to_string(),
            (None, _) => "Ongoing".to_string(),
        }
    }
}
