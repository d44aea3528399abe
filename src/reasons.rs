//! Reason chips: short human-readable "why is this here" tags.
//!
//! A side read-only pass over the same signal breakdown used for scoring,
//! expressed as an ordered list of (predicate, label) rules evaluated in
//! priority order, time-fit first. Deduplicated and capped.

use crate::context::{DayPart, RankContext};
use crate::scorer::{ScoredCandidate, SignalBreakdown};

pub const DEFAULT_MAX_REASONS: usize = 3;

struct ReasonRule {
    applies: fn(&SignalBreakdown, &ScoredCandidate, &RankContext) -> bool,
    label: fn(&RankContext) -> String,
}

fn day_part_label(ctx: &RankContext) -> String {
    match ctx.day_part {
        DayPart::Morning => "Great this morning".to_string(),
        DayPart::Afternoon => "Good this afternoon".to_string(),
        DayPart::Evening => "Perfect for tonight".to_string(),
        DayPart::LateNight => "Late-night pick".to_string(),
    }
}

const RULES: &[ReasonRule] = &[
    // Time fit: only the strong (ideal-window) signal earns a chip.
    ReasonRule {
        applies: |b, _, _| b.time_fit >= 6.0,
        label: day_part_label,
    },
    ReasonRule {
        applies: |b, _, _| b.proximity >= 4.0,
        label: |_| "Walkable from here".to_string(),
    },
    ReasonRule {
        applies: |b, _, _| (2.0..4.0).contains(&b.proximity),
        label: |_| "A short trip away".to_string(),
    },
    ReasonRule {
        applies: |b, _, _| b.category >= 3.0,
        label: |_| "Right up your alley".to_string(),
    },
    ReasonRule {
        applies: |b, _, _| b.keywords >= 1.5,
        label: |_| "Crowd favorite".to_string(),
    },
    ReasonRule {
        applies: |b, sc, _| b.activity >= 1.5 && sc.candidate.start_date.is_some(),
        label: |_| "Happening soon".to_string(),
    },
    ReasonRule {
        applies: |_, sc, _| sc.candidate.is_free == Some(true),
        label: |_| "Free entry".to_string(),
    },
];

/// Assemble up to `max` chips for one scored candidate.
pub fn reason_chips(sc: &ScoredCandidate, ctx: &RankContext, max: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for rule in RULES {
        if out.len() >= max {
            break;
        }
        if (rule.applies)(&sc.breakdown, sc, ctx) {
            let label = (rule.label)(ctx);
            if !out.contains(&label) {
                out.push(label);
            }
        }
    }
    out
}
