//! Keyword and category signal tables: the per-context data the scorer and
//! the open-discovery gate read. Pure data + lookup functions.
//!
//! All lists are tenant-editable config rather than hard-coded constants, so
//! false positives of the substring heuristics (a venue literally named
//! "The Clinic Bar" would hit the health-clinic negative keyword) can be
//! patched per tenant without code changes.

use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

use crate::context::DayPart;
use crate::policy::normalize;

/// Raw TOML shape. Compiled into [`Signals`] before use.
#[derive(Debug, Clone, Deserialize)]
pub struct SignalConfig {
    /// Small fixed bonus per hit.
    #[serde(default)]
    pub positive_keywords: Vec<String>,
    /// Much larger fixed penalty per hit. Surfacing clinical/administrative
    /// content in a leisure feed is worse than missing a good item.
    #[serde(default)]
    pub negative_keywords: Vec<String>,
    #[serde(default)]
    pub high_signal_categories: Vec<String>,
    #[serde(default)]
    pub low_signal_categories: Vec<String>,
    /// Categories the open-discovery gate treats as topically relevant.
    #[serde(default)]
    pub community_categories: Vec<String>,
    /// Regex over combined title+category+source text, the other half of
    /// the open-discovery pre-check.
    #[serde(default)]
    pub community_pattern: Option<String>,
    /// Per-day-part category re-weighting, keyed by day-part name.
    #[serde(default)]
    pub day_part_category_boosts: HashMap<String, HashMap<String, f64>>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl SignalConfig {
    pub fn default_seed() -> Self {
        let v = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let mut boosts: HashMap<String, HashMap<String, f64>> = HashMap::new();
        let mut put = |day: &str, pairs: &[(&str, f64)]| {
            boosts.insert(
                day.to_string(),
                pairs.iter().map(|(k, w)| (k.to_string(), *w)).collect(),
            );
        };
        put(
            "morning",
            &[("fitness", 2.0), ("learning", 1.0), ("nightlife", -3.0)],
        );
        put("afternoon", &[("art", 1.0), ("film", 1.0), ("community", 0.5)]);
        put(
            "evening",
            &[("nightlife", 2.0), ("music", 1.5), ("dining", 1.0), ("fitness", -1.0)],
        );
        put(
            "late_night",
            &[("nightlife", 3.0), ("comedy", 1.0), ("fitness", -2.0), ("learning", -1.0)],
        );

        Self {
            positive_keywords: v(&[
                "rooftop", "live", "festival", "patio", "tasting", "jazz", "happy hour",
                "brunch", "trivia", "outdoor",
            ]),
            negative_keywords: v(&[
                "clinic", "vaccine", "committee", "hearing", "webinar", "zoning",
                "insurance", "support group",
            ]),
            high_signal_categories: v(&[
                "music", "nightlife", "dining", "food_drink", "comedy", "theater", "film",
                "art",
            ]),
            low_signal_categories: v(&[
                "community", "learning", "fitness", "volunteer", "religion", "civic",
            ]),
            community_categories: v(&[
                "music", "nightlife", "dining", "food_drink", "comedy", "theater", "film",
                "art", "community", "learning", "fitness", "volunteer", "market", "wellness",
            ]),
            community_pattern: Some(
                r"(?i)\b(community|neighborhood|local|family|wellness|market|festival|block party|volunteer)\b"
                    .to_string(),
            ),
            day_part_category_boosts: boosts,
        }
    }

    /// Compile: normalize keyword lists once and build the community regex.
    pub fn compile(self) -> anyhow::Result<Signals> {
        let community_re = match &self.community_pattern {
            Some(p) if !p.is_empty() => Some(
                Regex::new(p)
                    .map_err(|e| anyhow::anyhow!("community_pattern regex error: {}", e))?,
            ),
            _ => None,
        };
        let norm = |xs: &[String]| xs.iter().map(|s| normalize(s)).collect::<Vec<_>>();
        Ok(Signals {
            positive_keywords: norm(&self.positive_keywords),
            negative_keywords: norm(&self.negative_keywords),
            high_signal_categories: norm(&self.high_signal_categories),
            low_signal_categories: norm(&self.low_signal_categories),
            community_categories: norm(&self.community_categories),
            community_re,
            cfg: self,
        })
    }
}

/// Compiled signal tables with normalized lists and a prebuilt regex.
#[derive(Debug)]
pub struct Signals {
    pub cfg: SignalConfig,
    positive_keywords: Vec<String>,
    negative_keywords: Vec<String>,
    high_signal_categories: Vec<String>,
    low_signal_categories: Vec<String>,
    community_categories: Vec<String>,
    community_re: Option<Regex>,
}

/// Keyword hit counts over one text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordHits {
    pub positive: usize,
    pub negative: usize,
}

impl Signals {
    pub fn seed() -> Self {
        SignalConfig::default_seed()
            .compile()
            .expect("seed signal tables compile")
    }

    /// Case-insensitive substring scan of `text` for both keyword lists.
    pub fn keyword_hits(&self, text: &str) -> KeywordHits {
        let t = normalize(text);
        let count = |list: &[String]| list.iter().filter(|k| !k.is_empty() && t.contains(k.as_str())).count();
        KeywordHits {
            positive: count(&self.positive_keywords),
            negative: count(&self.negative_keywords),
        }
    }

    /// Base category affinity before day-part re-weighting.
    pub fn base_category_affinity(&self, category: &str) -> f64 {
        let c = normalize(category);
        if self.high_signal_categories.contains(&c) {
            3.0
        } else if self.low_signal_categories.contains(&c) {
            -3.0
        } else {
            0.0
        }
    }

    /// Day-part re-weight for a category; 0.0 when not configured.
    pub fn day_part_boost(&self, day_part: DayPart, category: &str) -> f64 {
        let c = normalize(category);
        self.cfg
            .day_part_category_boosts
            .get(day_part.as_str())
            .and_then(|m| m.iter().find(|(k, _)| normalize(k) == c))
            .map(|(_, w)| *w)
            .unwrap_or(0.0)
    }

    pub fn is_community_category(&self, category: &str) -> bool {
        self.community_categories.contains(&normalize(category))
    }

    pub fn matches_community_pattern(&self, text: &str) -> bool {
        self.community_re
            .as_ref()
            .map(|re| re.is_match(text))
            .unwrap_or(false)
    }
}
