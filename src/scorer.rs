//! Signal scorer: pure, deterministic relevance scoring for one candidate
//! under one context.
//!
//! The score is a sum of independent, capped contributions so no single
//! signal can dominate pathologically. Missing fields contribute neutral
//! values rather than raising. Scores are only meaningful in relative
//! (sort) order; no normalization to [0,1] is performed. The final sum is
//! rounded to two decimals for stable, human-inspectable output.

use crate::candidate::Candidate;
use crate::context::{DayPart, RankContext};
use crate::signals::Signals;

// Time-fit contributions.
const TIME_IDEAL: f64 = 6.0;
const TIME_ADJACENT: f64 = 2.0;
const TIME_OFF: f64 = -4.0;
/// All-day/undated items get a small neutral-positive constant so they are
/// not punished relative to badly-timed ones.
const TIME_UNKNOWN: f64 = 1.5;

// Keyword sentiment. Negative hits are weighted far more heavily: surfacing
// administrative/clinical content in a leisure feed is more damaging than a
// missed opportunity.
const KEYWORD_POSITIVE: f64 = 0.75;
const KEYWORD_NEGATIVE: f64 = -4.0;
const KEYWORD_POSITIVE_CAP: usize = 4;

// Proximity step function (km).
const NEAR_KM: f64 = 1.0;
const MODERATE_KM: f64 = 3.0;
const FAR_KM: f64 = 8.0;
const PROX_NEAR: f64 = 4.0;
const PROX_MODERATE: f64 = 2.0;
const PROX_FAR: f64 = 0.5;
const PROX_BEYOND: f64 = -2.0;

// Activity/recency.
const SOON_TODAY: f64 = 2.5;
const SOON_TOMORROW: f64 = 1.5;
const SOON_THIS_WEEK: f64 = 0.75;
const ACTIVITY_PER_UPCOMING: f64 = 0.25;
const ACTIVITY_COUNT_CAP: u32 = 10;

// Presentation completeness.
const HAS_IMAGE: f64 = 0.5;
const IS_FREE: f64 = 0.5;

/// Per-signal contributions; the reason-chip pass reads these instead of
/// re-deriving anything.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalBreakdown {
    pub time_fit: f64,
    pub category: f64,
    pub keywords: f64,
    pub proximity: f64,
    pub activity: f64,
    pub presentation: f64,
}

impl SignalBreakdown {
    pub fn total(&self) -> f64 {
        round2(
            self.time_fit
                + self.category
                + self.keywords
                + self.proximity
                + self.activity
                + self.presentation,
        )
    }
}

/// A candidate paired with its score for the duration of one ranking call.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f64,
    pub breakdown: SignalBreakdown,
}

/// Score one candidate under one context. Same inputs, same output.
pub fn score(candidate: &Candidate, ctx: &RankContext, signals: &Signals) -> ScoredCandidate {
    let breakdown = SignalBreakdown {
        time_fit: time_fit(ctx.day_part, candidate.start_time.map(|t| {
            use chrono::Timelike;
            t.hour()
        })),
        category: category_affinity(candidate, ctx.day_part, signals),
        keywords: keyword_sentiment(candidate, signals),
        proximity: proximity(candidate.distance_km),
        activity: activity(candidate, ctx),
        presentation: presentation(candidate),
    };
    ScoredCandidate {
        candidate: candidate.clone(),
        score: breakdown.total(),
        breakdown,
    }
}

/// Strong positive inside the day-part's ideal window, mild positive in the
/// two adjacent hours, penalty elsewhere.
fn time_fit(day_part: DayPart, start_hour: Option<u32>) -> f64 {
    let Some(hour) = start_hour else {
        return TIME_UNKNOWN;
    };
    // Late-night wraps past midnight; shift small hours onto a 24+ scale.
    let (lo, hi) = match day_part {
        DayPart::Morning => (6, 10),
        DayPart::Afternoon => (12, 16),
        DayPart::Evening => (17, 23),
        DayPart::LateNight => (21, 26),
    };
    let h = if day_part == DayPart::LateNight && hour < 6 {
        i64::from(hour) + 24
    } else {
        i64::from(hour)
    };
    if (lo..=hi).contains(&h) {
        TIME_IDEAL
    } else if (lo - 2..lo).contains(&h) || (hi + 1..=hi + 2).contains(&h) {
        TIME_ADJACENT
    } else {
        TIME_OFF
    }
}

fn category_affinity(candidate: &Candidate, day_part: DayPart, signals: &Signals) -> f64 {
    let Some(cat) = &candidate.category else {
        return 0.0;
    };
    signals.base_category_affinity(cat) + signals.day_part_boost(day_part, cat)
}

fn keyword_sentiment(candidate: &Candidate, signals: &Signals) -> f64 {
    let hits = signals.keyword_hits(&candidate.body_text());
    let pos = hits.positive.min(KEYWORD_POSITIVE_CAP) as f64;
    pos * KEYWORD_POSITIVE + hits.negative as f64 * KEYWORD_NEGATIVE
}

/// Step function of distance; absent distance is neutral, not penalized.
fn proximity(distance_km: Option<f64>) -> f64 {
    match distance_km {
        None => 0.0,
        Some(d) if d <= NEAR_KM => PROX_NEAR,
        Some(d) if d <= MODERATE_KM => PROX_MODERATE,
        Some(d) if d <= FAR_KM => PROX_FAR,
        Some(_) => PROX_BEYOND,
    }
}

/// Upcoming-soon boost (needs the caller-supplied reference date) plus a
/// capped per-occurrence boost for busy venues/organizations.
fn activity(candidate: &Candidate, ctx: &RankContext) -> f64 {
    let mut out = 0.0;
    if let (Some(today), Some(start)) = (ctx.today, candidate.start_date) {
        let days = (start - today).num_days();
        out += match days {
            0 => SOON_TODAY,
            1 => SOON_TOMORROW,
            2..=3 => SOON_THIS_WEEK,
            _ => 0.0,
        };
    }
    if let Some(n) = candidate.upcoming_count {
        out += f64::from(n.min(ACTIVITY_COUNT_CAP)) * ACTIVITY_PER_UPCOMING;
    }
    out
}

fn presentation(candidate: &Candidate) -> f64 {
    let mut out = 0.0;
    if candidate.image_url.as_deref().is_some_and(|u| !u.is_empty()) {
        out += HAS_IMAGE;
    }
    if candidate.is_free == Some(true) {
        out += IS_FREE;
    }
    out
}

#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{CandidateKind, SourceRef};
    use chrono::{NaiveDate, NaiveTime};

    fn cand() -> Candidate {
        Candidate {
            id: "e1".into(),
            kind: CandidateKind::Event,
            title: "Rooftop jazz night".into(),
            description: Some("Live quartet on the patio".into()),
            category: Some("music".into()),
            start_date: NaiveDate::from_ymd_opt(2026, 6, 12),
            start_time: NaiveTime::from_hms_opt(19, 0, 0),
            distance_km: Some(0.6),
            upcoming_count: None,
            image_url: Some("https://img.example/jazz.jpg".into()),
            is_free: Some(true),
            source: SourceRef::named("Downtown Alliance"),
        }
    }

    fn ctx(day_part: DayPart) -> RankContext {
        RankContext::new("hotel-ember", "tonight", day_part)
    }

    #[test]
    fn evening_ideal_window() {
        assert_eq!(time_fit(DayPart::Evening, Some(19)), TIME_IDEAL);
        assert_eq!(time_fit(DayPart::Evening, Some(15)), TIME_ADJACENT);
        assert_eq!(time_fit(DayPart::Evening, Some(8)), TIME_OFF);
    }

    #[test]
    fn late_night_wraps_past_midnight() {
        assert_eq!(time_fit(DayPart::LateNight, Some(23)), TIME_IDEAL);
        assert_eq!(time_fit(DayPart::LateNight, Some(1)), TIME_IDEAL);
        assert_eq!(time_fit(DayPart::LateNight, Some(19)), TIME_ADJACENT);
        assert_eq!(time_fit(DayPart::LateNight, Some(10)), TIME_OFF);
    }

    #[test]
    fn undated_is_neutral_positive_not_penalized() {
        assert_eq!(time_fit(DayPart::Evening, None), TIME_UNKNOWN);
        assert!(time_fit(DayPart::Evening, None) > time_fit(DayPart::Evening, Some(8)));
    }

    #[test]
    fn negative_keywords_outweigh_positive() {
        let signals = Signals::seed();
        let mut c = cand();
        c.title = "Rooftop vaccine clinic".into();
        c.description = None;
        let k = keyword_sentiment(&c, &signals);
        // 1 positive hit (+0.75) against 2 negative (-8.0).
        assert!(k < -7.0, "got {k}");
    }

    #[test]
    fn proximity_steps() {
        assert_eq!(proximity(Some(0.4)), PROX_NEAR);
        assert_eq!(proximity(Some(2.0)), PROX_MODERATE);
        assert_eq!(proximity(Some(5.0)), PROX_FAR);
        assert_eq!(proximity(Some(20.0)), PROX_BEYOND);
        assert_eq!(proximity(None), 0.0);
    }

    #[test]
    fn upcoming_soon_diminishes_with_days() {
        let mut c = cand();
        let mut ctx = ctx(DayPart::Evening);
        ctx.today = NaiveDate::from_ymd_opt(2026, 6, 12);
        assert_eq!(activity(&c, &ctx), SOON_TODAY);
        c.start_date = NaiveDate::from_ymd_opt(2026, 6, 13);
        assert_eq!(activity(&c, &ctx), SOON_TOMORROW);
        c.start_date = NaiveDate::from_ymd_opt(2026, 6, 20);
        assert_eq!(activity(&c, &ctx), 0.0);
    }

    #[test]
    fn upcoming_count_is_capped() {
        let mut c = cand();
        c.start_date = None;
        c.upcoming_count = Some(500);
        let ctx = ctx(DayPart::Evening);
        assert_eq!(
            activity(&c, &ctx),
            f64::from(ACTIVITY_COUNT_CAP) * ACTIVITY_PER_UPCOMING
        );
    }

    #[test]
    fn score_is_deterministic_and_rounded() {
        let signals = Signals::seed();
        let c = cand();
        let ctx = ctx(DayPart::Evening);
        let a = score(&c, &ctx, &signals);
        let b = score(&c, &ctx, &signals);
        assert_eq!(a.score, b.score);
        assert_eq!(a.score, round2(a.score));
        assert!(a.score > 10.0, "evening jazz should score high: {}", a.score);
    }

    #[test]
    fn missing_fields_degrade_gracefully() {
        let signals = Signals::seed();
        let bare = Candidate {
            id: "x".into(),
            kind: CandidateKind::Story,
            title: "Untitled update".into(),
            description: None,
            category: None,
            start_date: None,
            start_time: None,
            distance_km: None,
            upcoming_count: None,
            image_url: None,
            is_free: None,
            source: SourceRef::named("somewhere"),
        };
        let s = score(&bare, &ctx(DayPart::Morning), &signals);
        assert_eq!(s.score, TIME_UNKNOWN); // only the neutral time constant
    }
}
