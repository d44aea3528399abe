//! Track configuration: named thematic buckets with display copy, source
//! allow-lists, keyword hints, and authored fallback items.
//!
//! Tracks are configuration, not runtime state. Governed story tracks
//! (`requires_known_source = true`) only surface vetted partners; open
//! discovery tracks only need topical relevance.

use serde::Deserialize;
use std::collections::HashMap;

use crate::candidate::{Candidate, CandidateKind, SourceRef};
use crate::context::AudienceMode;
use crate::policy::{normalize, PolicySource};

/// Authored placeholder content, injected only when live content for a
/// governed track is insufficient.
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackItem {
    pub title: String,
    #[serde(default)]
    pub blurb: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub schedule_label: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub blurb: Option<String>,
    /// Governed story tracks require the candidate's source to resolve in
    /// the policy registry; open discovery tracks do not.
    #[serde(default)]
    pub requires_known_source: bool,
    /// Source slug/name fragments that feed this track when no explicit
    /// allow-list is configured.
    #[serde(default)]
    pub source_hints: Vec<String>,
    /// Extra content keywords the open-discovery gate accepts.
    #[serde(default)]
    pub keyword_hints: Vec<String>,
    /// Audience-mode → allowed source ids. The `"default"` key applies to
    /// modes without their own entry.
    #[serde(default)]
    pub allow: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub fallback: Vec<FallbackItem>,
}

impl Track {
    /// Whether a resolved source may feed this track for the given audience
    /// mode.
    ///
    /// Precedence: explicit allow-list for the mode (or `"default"`), then
    /// source hints, then the tier rule: tier-1 sources pass an
    /// unconfigured track, tier-2 sources must be named explicitly.
    pub fn allows(&self, mode: AudienceMode, source: &PolicySource) -> bool {
        if let Some(ids) = self
            .allow
            .get(mode.as_str())
            .or_else(|| self.allow.get("default"))
        {
            return ids.iter().any(|id| normalize(id) == normalize(&source.id));
        }
        if !self.source_hints.is_empty() {
            let id = normalize(&source.id);
            let name = normalize(&source.name);
            return self.source_hints.iter().any(|h| {
                let h = normalize(h);
                !h.is_empty() && (id.contains(&h) || name.contains(&h))
            });
        }
        source.tier == 1
    }

    /// Materialize authored fallback items as candidates. Flagged non-live
    /// by the selector; shaped here so they render like live content.
    pub fn fallback_candidates(&self) -> Vec<Candidate> {
        self.fallback
            .iter()
            .enumerate()
            .map(|(i, f)| Candidate {
                id: format!("fallback-{}-{}", self.key, i),
                kind: CandidateKind::Story,
                title: f.title.clone(),
                description: f.blurb.clone(),
                category: f.category.clone(),
                start_date: None,
                start_time: None,
                distance_km: None,
                upcoming_count: None,
                image_url: None,
                is_free: None,
                source: SourceRef {
                    name: self.title.clone(),
                    slug: None,
                    url: f.url.clone(),
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackSet {
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl TrackSet {
    pub fn get(&self, key: &str) -> Option<&Track> {
        let k = normalize(key);
        self.tracks.iter().find(|t| normalize(&t.key) == k)
    }

    pub fn default_seed() -> Self {
        let fb = |title: &str, blurb: &str, category: &str, label: &str| FallbackItem {
            title: title.to_string(),
            blurb: Some(blurb.to_string()),
            category: Some(category.to_string()),
            url: None,
            schedule_label: Some(label.to_string()),
        };

        let mut stories_allow = HashMap::new();
        stories_allow.insert(
            "default".to_string(),
            vec![
                "community-table".to_string(),
                "neighborhood-arts".to_string(),
                "st-luke-health".to_string(),
            ],
        );
        stories_allow.insert("staff".to_string(), vec!["st-luke-health".to_string()]);

        Self {
            tracks: vec![
                Track {
                    key: "tonight".into(),
                    title: "Out Tonight".into(),
                    blurb: Some("Hand-picked things to do nearby.".into()),
                    requires_known_source: false,
                    source_hints: vec![],
                    keyword_hints: vec!["concert".into(), "open mic".into()],
                    allow: HashMap::new(),
                    fallback: vec![],
                },
                Track {
                    key: "community-stories".into(),
                    title: "Community Stories".into(),
                    blurb: Some("What our partners are up to this week.".into()),
                    requires_known_source: true,
                    source_hints: vec![],
                    keyword_hints: vec![],
                    allow: stories_allow,
                    fallback: vec![
                        fb(
                            "Meet the Community Table volunteers",
                            "How a weekly food-shelf run became a neighborhood fixture.",
                            "community",
                            "Ongoing",
                        ),
                        fb(
                            "A mural grows on Fifth Street",
                            "The arts council's summer wall, painted one Saturday at a time.",
                            "art",
                            "Ongoing",
                        ),
                        fb(
                            "Garden plots open for spring",
                            "Community garden signups and what to plant first.",
                            "community",
                            "Seasonal",
                        ),
                    ],
                },
                Track {
                    key: "food-access".into(),
                    title: "Food Access".into(),
                    blurb: Some("Markets, meals, and food support near you.".into()),
                    requires_known_source: true,
                    source_hints: vec!["community table".into(), "riverfront".into()],
                    keyword_hints: vec![],
                    allow: HashMap::new(),
                    fallback: vec![fb(
                        "Where to find a weekly market",
                        "A standing guide to market days across the neighborhood.",
                        "market",
                        "Weekly",
                    )],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{PolicyRegistry, TrustRail};

    fn seed() -> (TrackSet, PolicyRegistry) {
        (TrackSet::default_seed(), PolicyRegistry::default_seed())
    }

    #[test]
    fn get_is_key_normalized() {
        let (ts, _) = seed();
        assert!(ts.get("Community-Stories").is_some());
        assert!(ts.get("no-such-track").is_none());
    }

    #[test]
    fn allow_list_per_audience_mode() {
        let (ts, reg) = seed();
        let track = ts.get("community-stories").unwrap();
        let arts = reg.resolve("neighborhood-arts").unwrap();
        assert!(track.allows(AudienceMode::Visitor, arts));
        // Staff mode narrows to the owner source only.
        assert!(!track.allows(AudienceMode::Staff, arts));
        let owner = reg.resolve("st-luke-health").unwrap();
        assert!(track.allows(AudienceMode::Staff, owner));
    }

    #[test]
    fn source_hints_substitute_for_allow_list() {
        let (ts, reg) = seed();
        let track = ts.get("food-access").unwrap();
        let table = reg.resolve("community-table").unwrap();
        let market = reg.resolve("riverfront-markets").unwrap();
        let parks = reg.resolve("city-parks").unwrap();
        assert!(track.allows(AudienceMode::General, table));
        assert!(track.allows(AudienceMode::General, market)); // tier 2, but hinted
        assert!(!track.allows(AudienceMode::General, parks));
    }

    #[test]
    fn tier_two_needs_explicit_naming() {
        let (_, _) = seed();
        let bare = Track {
            key: "bare".into(),
            title: "Bare".into(),
            blurb: None,
            requires_known_source: true,
            source_hints: vec![],
            keyword_hints: vec![],
            allow: HashMap::new(),
            fallback: vec![],
        };
        let reg = PolicyRegistry::default_seed();
        let tier1 = reg.resolve("community-table").unwrap();
        let tier2 = reg.resolve("riverfront-markets").unwrap();
        assert_eq!(tier1.tier, 1);
        assert_eq!(tier2.tier, 2);
        assert!(bare.allows(AudienceMode::General, tier1));
        assert!(!bare.allows(AudienceMode::General, tier2));
        assert_eq!(tier2.rail, TrustRail::Federated);
    }

    #[test]
    fn fallback_candidates_are_stories_with_stable_ids() {
        let (ts, _) = seed();
        let track = ts.get("community-stories").unwrap();
        let fb = track.fallback_candidates();
        assert_eq!(fb.len(), 3);
        assert_eq!(fb[0].id, "fallback-community-stories-0");
        assert!(fb.iter().all(|c| c.kind == CandidateKind::Story));
    }
}
