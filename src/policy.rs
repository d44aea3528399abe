//! # Policy source registry
//!
//! Configurable table of trusted upstream sources, each tagged with a trust
//! rail (owner-controlled vs federated-community), a tier, and alias strings
//! for loose name/slug matching.
//!
//! - Case-insensitive lookup with normalization of punctuation, dashes, etc.
//! - Slug lookup is attempted before name lookup (slugs are less ambiguous).
//! - Fallback order: exact id/name → substring alias match → none.
//! - `None` means "untrusted", never an error.
//! - Competitor exclusion is a separate denylist check, applied to title
//!   text as well as source identity, independent of trust.

use serde::Deserialize;

use crate::candidate::SourceRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustRail {
    /// Content the tenant itself authors or directly controls.
    Owner,
    /// Vetted community/federation partners.
    Federated,
}

fn default_tier() -> u8 {
    1
}

/// A registered upstream source. Created by tenant configuration only;
/// read-only during ranking.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct PolicySource {
    pub id: String,
    pub name: String,
    pub rail: TrustRail,
    /// Tier 1: always eligible. Tier 2: eligible only for tracks that name
    /// it explicitly (allow-list or source hints).
    #[serde(default = "default_tier")]
    pub tier: u8,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyRegistry {
    #[serde(default)]
    pub sources: Vec<PolicySource>,
    /// Hard denylist: substring containment against title/source text.
    #[serde(default)]
    pub competitor_exclusions: Vec<String>,
}

impl PolicyRegistry {
    /// Resolve a raw upstream name or slug to a registered source.
    ///
    /// Steps:
    /// 1. Exact match against each source's normalized id, then name.
    /// 2. Substring containment against the normalized alias list.
    /// 3. No match → `None` ("untrusted").
    pub fn resolve(&self, name_or_slug: &str) -> Option<&PolicySource> {
        let n = normalize(name_or_slug);
        if n.is_empty() {
            return None;
        }
        for src in &self.sources {
            if normalize(&src.id) == n || normalize(&src.name) == n {
                return Some(src);
            }
        }
        for src in &self.sources {
            for alias in &src.aliases {
                let a = normalize(alias);
                if !a.is_empty() && n.contains(&a) {
                    return Some(src);
                }
            }
        }
        None
    }

    /// Resolve a candidate's source reference: slug first, then name.
    pub fn resolve_source(&self, source: &SourceRef) -> Option<&PolicySource> {
        if let Some(slug) = &source.slug {
            if let Some(hit) = self.resolve(slug) {
                return Some(hit);
            }
        }
        self.resolve(&source.name)
    }

    /// Built-in seed with the stock hospital/city partner set. Used as a
    /// fallback when no tenant config is found.
    pub fn default_seed() -> Self {
        let src = |id: &str, name: &str, rail: TrustRail, tier: u8, aliases: &[&str]| PolicySource {
            id: id.to_string(),
            name: name.to_string(),
            rail,
            tier,
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
        };

        Self {
            sources: vec![
                src(
                    "st-luke-health",
                    "St. Luke Health Network",
                    TrustRail::Owner,
                    1,
                    &["st luke", "st lukes", "saint luke"],
                ),
                src(
                    "city-parks",
                    "City Parks & Recreation",
                    TrustRail::Owner,
                    1,
                    &["parks and rec", "parks department"],
                ),
                src(
                    "downtown-alliance",
                    "Downtown Alliance",
                    TrustRail::Owner,
                    1,
                    &["downtown partnership"],
                ),
                src(
                    "community-table",
                    "Community Table Coalition",
                    TrustRail::Federated,
                    1,
                    &["community table", "food shelf coalition"],
                ),
                src(
                    "neighborhood-arts",
                    "Neighborhood Arts Council",
                    TrustRail::Federated,
                    1,
                    &["arts council"],
                ),
                src(
                    "riverfront-markets",
                    "Riverfront Markets",
                    TrustRail::Federated,
                    2,
                    &["riverfront farmers market"],
                ),
                src(
                    "wellness-collective",
                    "Wellness Collective",
                    TrustRail::Federated,
                    2,
                    &[],
                ),
            ],
            competitor_exclusions: vec![
                "mercy general".to_string(),
                "brightpath urgent care".to_string(),
            ],
        }
    }
}

/// Pure rail predicate.
pub fn is_allowed_for_rail(source: &PolicySource, rail: TrustRail) -> bool {
    source.rail == rail
}

/// Case-insensitive substring containment against the denylist.
/// Title text alone can trigger this, even from a trusted source.
pub fn is_competitor_excluded(text: &str, exclusions: &[String]) -> bool {
    if exclusions.is_empty() {
        return false;
    }
    let t = normalize(text);
    exclusions.iter().any(|x| {
        let x = normalize(x);
        !x.is_empty() && t.contains(&x)
    })
}

/// Normalize input: lowercase, collapse non-alphanumeric runs to single
/// spaces, trim.
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_space = true;
    for ch in s.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg() -> PolicyRegistry {
        PolicyRegistry::default_seed()
    }

    #[test]
    fn normalize_collapses_punctuation_runs() {
        assert_eq!(normalize("St.  Luke's -- Health!"), "st luke s health");
        assert_eq!(normalize("  CITY_PARKS  "), "city parks");
    }

    #[test]
    fn exact_id_match() {
        let r = reg();
        assert_eq!(r.resolve("city-parks").unwrap().id, "city-parks");
    }

    #[test]
    fn exact_name_match_case_insensitive() {
        let r = reg();
        assert_eq!(
            r.resolve("CITY PARKS & RECREATION").unwrap().id,
            "city-parks"
        );
    }

    #[test]
    fn alias_substring_match() {
        let r = reg();
        // Loosely formatted upstream name containing a registered alias.
        assert_eq!(
            r.resolve("The St. Luke's Volunteer Office").unwrap().id,
            "st-luke-health"
        );
    }

    #[test]
    fn slug_resolves_before_name() {
        let r = reg();
        // Name would alias-match st-luke-health; slug must win.
        let src = SourceRef {
            name: "St Luke Satellite".into(),
            slug: Some("community-table".into()),
            url: None,
        };
        assert_eq!(r.resolve_source(&src).unwrap().id, "community-table");
    }

    #[test]
    fn no_match_is_none_not_error() {
        let r = reg();
        assert!(r.resolve("totally unknown blog").is_none());
        assert!(r.resolve("").is_none());
    }

    #[test]
    fn rail_predicate() {
        let r = reg();
        let owner = r.resolve("city-parks").unwrap();
        assert!(is_allowed_for_rail(owner, TrustRail::Owner));
        assert!(!is_allowed_for_rail(owner, TrustRail::Federated));
    }

    #[test]
    fn competitor_exclusion_hits_title_text() {
        let r = reg();
        assert!(is_competitor_excluded(
            "Flu shots at Mercy General this week",
            &r.competitor_exclusions
        ));
        assert!(!is_competitor_excluded(
            "Flu shots at St. Luke this week",
            &r.competitor_exclusions
        ));
    }

    #[test]
    fn competitor_exclusion_is_case_and_punct_insensitive() {
        let r = reg();
        assert!(is_competitor_excluded(
            "MERCY-GENERAL open house",
            &r.competitor_exclusions
        ));
    }
}
