//! Ranking context: the immutable "why" of one ranking call.
//!
//! Supplied once per call and never mutated mid-computation. Context picks
//! the scoring weights (day-part) and the policy track (track key +
//! audience mode); everything else on it is limits and reference data.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPart {
    Morning,
    Afternoon,
    Evening,
    LateNight,
}

impl DayPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayPart::Morning => "morning",
            DayPart::Afternoon => "afternoon",
            DayPart::Evening => "evening",
            DayPart::LateNight => "late_night",
        }
    }
}

/// Audience mode selects per-track allow-lists. Hospital tenants use the
/// clinical modes; city/hotel tenants mostly stay on `Visitor`/`General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudienceMode {
    Urgent,
    Treatment,
    Staff,
    Visitor,
    General,
}

impl AudienceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudienceMode::Urgent => "urgent",
            AudienceMode::Treatment => "treatment",
            AudienceMode::Staff => "staff",
            AudienceMode::Visitor => "visitor",
            AudienceMode::General => "general",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

fn default_audience() -> AudienceMode {
    AudienceMode::General
}

fn default_min_results() -> usize {
    3
}

fn default_display_limit() -> usize {
    8
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankContext {
    pub tenant_id: String,
    pub track_key: String,
    pub day_part: DayPart,
    #[serde(default = "default_audience")]
    pub audience: AudienceMode,
    /// Geographic reference the retrieval layer measured distances from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_point: Option<GeoPoint>,
    /// Reference date for upcoming-soon boosts. Caller-supplied so that
    /// the same (candidates, context) pair always scores identically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today: Option<chrono::NaiveDate>,
    /// Strict-eligible count must reach this before the strict tier wins.
    #[serde(default = "default_min_results")]
    pub min_results: usize,
    /// Overrides the configured strict score cutoff when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_cutoff: Option<f64>,
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,
}

impl RankContext {
    pub fn new(tenant_id: impl Into<String>, track_key: impl Into<String>, day_part: DayPart) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            track_key: track_key.into(),
            day_part,
            audience: default_audience(),
            reference_point: None,
            today: None,
            min_results: default_min_results(),
            strict_cutoff: None,
            display_limit: default_display_limit(),
        }
    }

    /// Structural validation. A missing track key or tenant is a caller
    /// programming error and fails loudly; data-quality gaps never do.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tenant_id.trim().is_empty() {
            anyhow::bail!("rank context missing tenant_id");
        }
        if self.track_key.trim().is_empty() {
            anyhow::bail!("rank context missing track_key");
        }
        if self.display_limit == 0 {
            anyhow::bail!("rank context display_limit must be >= 1");
        }
        Ok(())
    }
}
