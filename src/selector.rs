//! Ranked selector: Gate → Dedup → Score → Sort, then the strict / relaxed /
//! fallback acceptance decision.
//!
//! The three-tier degradation is the central design decision of the engine:
//! "no good matches" and "no matches at all" are different failure
//! severities with different remedies. A strict shortfall falls back to the
//! full scored set; an empty governed story list gets the track's authored
//! fallback items, flagged non-live.
//!
//! Pure and synchronous: no I/O, no suspension points. Callers may invoke
//! concurrently per track; nothing here is shared mutable state.

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::info;

use crate::candidate::Candidate;
use crate::config::PortalConfig;
use crate::context::RankContext;
use crate::dedup::dedupe;
use crate::gate::gate;
use crate::policy::TrustRail;
use crate::reasons::reason_chips;
use crate::scorer::{score, ScoredCandidate};
use crate::tracks::Track;

/// Which acceptance tier produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Acceptance {
    Strict,
    Relaxed,
    FallbackInjected,
}

/// One output item: candidate (score stripped), reason chips, liveness and
/// presentation shaping.
#[derive(Debug, Clone, Serialize)]
pub struct RankedItem {
    #[serde(flatten)]
    pub candidate: Candidate,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
    pub is_live: bool,
    pub schedule_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_label: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    pub items: Vec<RankedItem>,
    pub acceptance: Acceptance,
    pub live_count: usize,
    pub fallback_count: usize,
}

impl RankedResult {
    pub fn used_fallback(&self) -> bool {
        self.acceptance == Acceptance::FallbackInjected
    }
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("rank_strict_total", "Ranking calls accepted on the strict tier.");
        describe_counter!("rank_relaxed_total", "Ranking calls accepted on the relaxed tier.");
        describe_counter!(
            "rank_fallback_total",
            "Ranking calls that injected authored fallback content."
        );
        describe_counter!("rank_gated_out_total", "Candidates removed by the policy gate.");
        describe_counter!("rank_dedup_total", "Candidates removed by deduplication.");
    });
}

/// Rank one candidate list under one context.
///
/// Fails only for structurally invalid input (bad context, unknown track
/// key); data-quality problems degrade instead. Never returns an empty list
/// for a governed track that has authored fallback items.
pub fn rank(
    candidates: Vec<Candidate>,
    ctx: &RankContext,
    cfg: &PortalConfig,
) -> anyhow::Result<RankedResult> {
    ensure_metrics_described();
    ctx.validate()?;
    let track = cfg
        .tracks
        .get(&ctx.track_key)
        .ok_or_else(|| anyhow::anyhow!("unknown track key `{}`", ctx.track_key))?;

    let raw_count = candidates.len();
    let gated = gate(candidates, track, ctx, &cfg.policy, &cfg.signals);
    let gated_out = raw_count - gated.len();

    let deduped_input = gated.len();
    let deduped = dedupe(gated);
    let dedup_out = deduped_input - deduped.len();

    let mut scored: Vec<ScoredCandidate> = deduped
        .iter()
        .map(|c| score(c, ctx, &cfg.signals))
        .collect();
    sort_scored(&mut scored);

    let cutoff = ctx.strict_cutoff.unwrap_or(cfg.engine.strict_cutoff);
    let strict_count = scored.iter().filter(|s| s.score >= cutoff).count();

    let (mut picked, acceptance): (Vec<ScoredCandidate>, Acceptance) =
        if strict_count >= ctx.min_results {
            (
                scored
                    .into_iter()
                    .filter(|s| s.score >= cutoff)
                    .take(ctx.display_limit)
                    .collect(),
                Acceptance::Strict,
            )
        } else {
            // Below-threshold items are better than an empty feed.
            (
                scored.into_iter().take(ctx.display_limit).collect(),
                Acceptance::Relaxed,
            )
        };

    let live_count = picked.len();
    let mut items: Vec<RankedItem> = picked
        .drain(..)
        .map(|sc| {
            let reasons = reason_chips(&sc, ctx, cfg.engine.max_reasons);
            live_item(sc, reasons, cfg)
        })
        .collect();

    // Governed story tracks never come back empty while authored content
    // exists.
    let mut acceptance = acceptance;
    let mut fallback_count = 0;
    if track.requires_known_source && live_count == 0 && !track.fallback.is_empty() {
        for c in track.fallback_candidates().into_iter().take(ctx.display_limit) {
            fallback_count += 1;
            items.push(fallback_item(c, track));
        }
        acceptance = Acceptance::FallbackInjected;
    }

    match acceptance {
        Acceptance::Strict => counter!("rank_strict_total").increment(1),
        Acceptance::Relaxed => counter!("rank_relaxed_total").increment(1),
        Acceptance::FallbackInjected => counter!("rank_fallback_total").increment(1),
    }
    counter!("rank_gated_out_total").increment(gated_out as u64);
    counter!("rank_dedup_total").increment(dedup_out as u64);

    dev_log_rank(ctx, &items, acceptance, gated_out, dedup_out);

    Ok(RankedResult {
        items,
        acceptance,
        live_count,
        fallback_count,
    })
}

/// Descending score; ties broken by lower distance, then alphabetical title.
fn sort_scored(scored: &mut [ScoredCandidate]) {
    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| {
                let da = a.candidate.distance_km.unwrap_or(f64::INFINITY);
                let db = b.candidate.distance_km.unwrap_or(f64::INFINITY);
                da.total_cmp(&db)
            })
            .then_with(|| a.candidate.title.cmp(&b.candidate.title))
    });
}

fn live_item(sc: ScoredCandidate, reasons: Vec<String>, cfg: &PortalConfig) -> RankedItem {
    let tier_label = cfg
        .policy
        .resolve_source(&sc.candidate.source)
        .map(|src| match src.rail {
            TrustRail::Owner => "Partner".to_string(),
            TrustRail::Federated => "Community partner".to_string(),
        });
    let schedule_label = sc.candidate.schedule_label();
    RankedItem {
        candidate: sc.candidate,
        reasons,
        is_live: true,
        schedule_label,
        tier_label,
    }
}

fn fallback_item(c: Candidate, track: &Track) -> RankedItem {
    // Shaped like live content (schedule label + tier annotation), tagged
    // non-live internally for observability and tests.
    let schedule_label = track
        .fallback
        .iter()
        .find(|f| f.title == c.title)
        .and_then(|f| f.schedule_label.clone())
        .unwrap_or_else(|| c.schedule_label());
    RankedItem {
        candidate: c,
        reasons: Vec::new(),
        is_live: false,
        schedule_label,
        tier_label: Some("Editorial".to_string()),
    }
}

/// Dev-gated, anonymized diagnostics: hashed titles only, never raw text.
fn dev_log_rank(
    ctx: &RankContext,
    items: &[RankedItem],
    acceptance: Acceptance,
    gated_out: usize,
    dedup_out: usize,
) {
    if !dev_logging_enabled() {
        return;
    }
    let ids: Vec<String> = items.iter().take(5).map(|i| anon_hash(&i.candidate.title)).collect();
    info!(
        target: "rank",
        tenant = %ctx.tenant_id,
        track = %ctx.track_key,
        day_part = ctx.day_part.as_str(),
        ?acceptance,
        gated_out,
        dedup_out,
        top = ?ids,
        "ranked"
    );
}

/// PORTAL_DEV_LOG=1 AND a dev environment (debug build or PORTAL_ENV in
/// {local, development, dev}).
pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var("PORTAL_DEV_LOG").ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) || cfg!(feature = "debug") {
        return true;
    }
    matches!(
        std::env::var("PORTAL_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
