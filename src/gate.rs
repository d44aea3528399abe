//! Policy gate: decides which raw candidates are eligible to be scored at
//! all. Hard exclusion happens here, before any scoring is attempted.
//!
//! Two modes, on purpose:
//! - Governed tracks (`requires_known_source`): the source must resolve in
//!   the policy registry and be allowed for this track + audience mode.
//!   Hospital/community stories come only from vetted partners.
//! - Open discovery tracks: no source vetting, only a topical relevance
//!   pre-check (community category, community pattern, or track keyword
//!   hints).
//!
//! Competitor exclusion applies in both modes, independent of trust.

use crate::candidate::Candidate;
use crate::context::RankContext;
use crate::policy::{is_competitor_excluded, normalize, PolicyRegistry};
use crate::signals::Signals;
use crate::tracks::Track;

/// Filter `candidates` down to the subset eligible for scoring.
/// Order-preserving.
pub fn gate(
    candidates: Vec<Candidate>,
    track: &Track,
    ctx: &RankContext,
    registry: &PolicyRegistry,
    signals: &Signals,
) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|c| is_eligible(c, track, ctx, registry, signals))
        .collect()
}

fn is_eligible(
    c: &Candidate,
    track: &Track,
    ctx: &RankContext,
    registry: &PolicyRegistry,
    signals: &Signals,
) -> bool {
    // Competitor denylist first: title, source name, and slug can each trip
    // it, even for otherwise trusted sources.
    let excl = &registry.competitor_exclusions;
    if is_competitor_excluded(&c.title, excl)
        || is_competitor_excluded(&c.source.name, excl)
        || c.source
            .slug
            .as_deref()
            .map(|s| is_competitor_excluded(s, excl))
            .unwrap_or(false)
    {
        return false;
    }

    if track.requires_known_source {
        let Some(src) = registry.resolve_source(&c.source) else {
            return false; // unresolved == untrusted
        };
        if !track.allows(ctx.audience, src) {
            return false;
        }
        // Governed feeds drop junk titles (bare dates, single short tokens)
        // even from trusted partners.
        if is_low_information_title(&c.title) {
            return false;
        }
        true
    } else {
        // Open discovery: topical relevance only.
        if let Some(cat) = &c.category {
            if signals.is_community_category(cat) {
                return true;
            }
        }
        let text = c.search_text();
        if signals.matches_community_pattern(&text) {
            return true;
        }
        let t = normalize(&text);
        track.keyword_hints.iter().any(|h| {
            let h = normalize(h);
            !h.is_empty() && t.contains(&h)
        })
    }
}

/// A title is low-information when it carries no alphabetic token of four
/// or more characters: bare date strings, lone abbreviations, etc.
pub fn is_low_information_title(title: &str) -> bool {
    !normalize(title)
        .split_whitespace()
        .any(|tok| tok.len() >= 4 && tok.chars().all(|ch| ch.is_alphabetic()))
}
