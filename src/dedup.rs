//! Deduplicator: collapses near-duplicate candidates surfaced by multiple
//! sources into one. Stable order, first occurrence wins, idempotent.
//!
//! Key derivation depends on kind:
//! - Time-bound items (events): `(id, start_date, start_time)`. The same
//!   identifier recurring at a different date/time is a distinct item (a
//!   recurring class), while exact re-fetches of one instance collapse.
//! - Story/venue/organization aggregation: `(normalized_title, date)`,
//!   with a near-identical-title guard for sloppy cross-source re-posts.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use strsim::normalized_levenshtein;

use crate::candidate::Candidate;

/// Titles this similar (normalized Levenshtein) on the same date are
/// treated as the same logical item.
const NEAR_TITLE_SIMILARITY: f64 = 0.92;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DedupKey {
    Timed(String, Option<NaiveDate>, Option<NaiveTime>),
    Titled(String, Option<NaiveDate>),
}

fn key_for(c: &Candidate) -> DedupKey {
    if c.is_time_bound() {
        DedupKey::Timed(c.id.clone(), c.start_date, c.start_time)
    } else {
        DedupKey::Titled(normalize_title(&c.title), c.start_date)
    }
}

/// Decode HTML entities, lowercase, collapse whitespace.
pub fn normalize_title(title: &str) -> String {
    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));
    let decoded = html_escape::decode_html_entities(title);
    RE_WS
        .replace_all(decoded.trim(), " ")
        .to_ascii_lowercase()
}

/// First-wins dedup with stable order. `dedupe(dedupe(x)) == dedupe(x)`.
pub fn dedupe(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen: HashSet<DedupKey> = HashSet::new();
    let mut kept_titles: Vec<(String, Option<NaiveDate>)> = Vec::new();
    let mut out = Vec::with_capacity(candidates.len());

    for c in candidates {
        let key = key_for(&c);
        if !seen.insert(key.clone()) {
            continue;
        }
        if let DedupKey::Titled(title, date) = &key {
            let near = kept_titles.iter().any(|(t, d)| {
                d == date && normalized_levenshtein(t, title) >= NEAR_TITLE_SIMILARITY
            });
            if near {
                continue;
            }
            kept_titles.push((title.clone(), *date));
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{CandidateKind, SourceRef};

    fn event(id: &str, date: Option<(i32, u32, u32)>, hour: Option<u32>) -> Candidate {
        Candidate {
            id: id.into(),
            kind: CandidateKind::Event,
            title: format!("Event {id}"),
            description: None,
            category: None,
            start_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            start_time: hour.and_then(|h| NaiveTime::from_hms_opt(h, 0, 0)),
            distance_km: None,
            upcoming_count: None,
            image_url: None,
            is_free: None,
            source: SourceRef::named("City Parks & Recreation"),
        }
    }

    fn story(id: &str, title: &str, source: &str) -> Candidate {
        Candidate {
            id: id.into(),
            kind: CandidateKind::Story,
            title: title.into(),
            description: None,
            category: None,
            start_date: NaiveDate::from_ymd_opt(2026, 6, 12),
            start_time: None,
            distance_km: None,
            upcoming_count: None,
            image_url: None,
            is_free: None,
            source: SourceRef::named(source),
        }
    }

    #[test]
    fn exact_refetch_collapses_recurring_instance_survives() {
        let input = vec![
            event("yoga", Some((2026, 6, 12)), Some(9)),
            event("yoga", Some((2026, 6, 12)), Some(9)), // re-fetch
            event("yoga", Some((2026, 6, 19)), Some(9)), // next week's class
        ];
        let out = dedupe(input);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn stories_collapse_on_normalized_title_and_date() {
        let input = vec![
            story("a", "Garden &amp; Grove opening", "Community Table Coalition"),
            story("b", "garden & grove   opening", "Neighborhood Arts Council"),
        ];
        let out = dedupe(input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "a"); // first occurrence wins
    }

    #[test]
    fn near_identical_titles_collapse() {
        let input = vec![
            story("a", "Community garden plots open for spring", "A"),
            story("b", "Community garden plots open for spring!", "B"),
        ];
        assert_eq!(dedupe(input).len(), 1);
    }

    #[test]
    fn distinct_titles_survive() {
        let input = vec![
            story("a", "Garden plots open for spring", "A"),
            story("b", "Mural grows on Fifth Street", "B"),
        ];
        assert_eq!(dedupe(input).len(), 2);
    }

    #[test]
    fn dedupe_is_idempotent() {
        let input = vec![
            story("a", "Garden &amp; Grove opening", "A"),
            story("b", "garden & grove opening", "B"),
            event("yoga", Some((2026, 6, 12)), Some(9)),
            event("yoga", Some((2026, 6, 12)), Some(9)),
        ];
        let once = dedupe(input);
        let twice = dedupe(once.clone());
        assert_eq!(once, twice);
    }
}
