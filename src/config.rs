//! Portal configuration: policy registry + tracks + signal tables +
//! engine knobs, loaded once from a single TOML file into an immutable
//! value. Tests substitute alternate policy sets without touching global
//! state; the running service swaps configs through [`EngineHandle`].

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

use crate::candidate::Candidate;
use crate::context::RankContext;
use crate::policy::{PolicyRegistry, PolicySource};
use crate::selector::{rank, RankedResult};
use crate::signals::{SignalConfig, Signals};
use crate::tracks::TrackSet;

// --- env defaults & names ---
pub const DEFAULT_CONFIG_PATH: &str = "config/portal.toml";
pub const DEFAULT_STRICT_CUTOFF: f64 = 4.0;

pub const ENV_CONFIG_PATH: &str = "PORTAL_CONFIG_PATH";
pub const ENV_STRICT_CUTOFF: &str = "PORTAL_STRICT_CUTOFF";

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    #[serde(default = "default_cutoff")]
    pub strict_cutoff: f64,
    #[serde(default = "default_max_reasons")]
    pub max_reasons: usize,
}

fn default_cutoff() -> f64 {
    DEFAULT_STRICT_CUTOFF
}

fn default_max_reasons() -> usize {
    crate::reasons::DEFAULT_MAX_REASONS
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            strict_cutoff: default_cutoff(),
            max_reasons: default_max_reasons(),
        }
    }
}

/* ----------------------------
Config schema (from TOML)
---------------------------- */

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigRoot {
    #[serde(default)]
    engine: Option<EngineSection>,
    #[serde(default)]
    policy: Option<PolicyRegistry>,
    #[serde(default)]
    signals: Option<SignalConfig>,
    #[serde(default)]
    tracks: Vec<crate::tracks::Track>,
}

/// Compiled tenant configuration. Read-only during ranking.
#[derive(Debug)]
pub struct PortalConfig {
    pub engine: EngineSection,
    pub policy: PolicyRegistry,
    pub signals: Signals,
    pub tracks: TrackSet,
}

impl PortalConfig {
    /// Built-in seed used when no tenant config is found.
    pub fn default_seed() -> Self {
        Self {
            engine: EngineSection::default(),
            policy: PolicyRegistry::default_seed(),
            signals: Signals::seed(),
            tracks: TrackSet::default_seed(),
        }
    }

    /// Parse a TOML document. Missing sections fall back to the seed
    /// defaults so tenants only override what they need.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let root: ConfigRoot = toml::from_str(toml_str)?;
        let signals = root
            .signals
            .unwrap_or_else(SignalConfig::default_seed)
            .compile()?;
        let tracks = if root.tracks.is_empty() {
            TrackSet::default_seed()
        } else {
            TrackSet {
                tracks: root.tracks,
            }
        };
        let mut cfg = Self {
            engine: root.engine.unwrap_or_default(),
            policy: root.policy.unwrap_or_else(PolicyRegistry::default_seed),
            signals,
            tracks,
        };
        if !cfg.engine.strict_cutoff.is_finite() {
            cfg.engine.strict_cutoff = DEFAULT_STRICT_CUTOFF;
        }
        Ok(cfg)
    }

    /// Load from `PORTAL_CONFIG_PATH` (default `config/portal.toml`),
    /// falling back to the seed when the file is missing. An env cutoff
    /// override wins over the file value.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();
        let mut cfg = match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_str(&content).map_err(|e| {
                anyhow::anyhow!("invalid portal config at {}: {}", path.display(), e)
            })?,
            Err(_) => {
                info!(path = %path.display(), "no portal config file, using seed");
                Self::default_seed()
            }
        };
        if let Some(cutoff) = parse_cutoff_env(std::env::var(ENV_STRICT_CUTOFF).ok()) {
            cfg.engine.strict_cutoff = cutoff;
        }
        Ok(cfg)
    }
}

pub fn config_path() -> PathBuf {
    std::env::var(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn parse_cutoff_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/* ----------------------------
Thread-safe handle + hot reload
---------------------------- */

/// Threadsafe handle over the engine config, hot-reloadable in dev/local.
/// - Enable by setting PORTAL_HOT_RELOAD=1
/// - Dev-gated: active only if cfg!(debug_assertions) OR PORTAL_ENV is
///   "local"/"development"/"dev".
#[derive(Clone)]
pub struct EngineHandle {
    inner: Arc<RwLock<PortalConfig>>,
}

impl EngineHandle {
    pub fn new(cfg: PortalConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(cfg)),
        }
    }

    /// Rank under the current config snapshot.
    pub fn rank(
        &self,
        candidates: Vec<Candidate>,
        ctx: &RankContext,
    ) -> anyhow::Result<RankedResult> {
        let guard = self
            .inner
            .read()
            .map_err(|_| anyhow::anyhow!("engine config lock poisoned"))?;
        rank(candidates, ctx, &guard)
    }

    /// Resolve a raw source name/slug against the current registry
    /// (debug endpoint support).
    pub fn resolve_source(&self, name_or_slug: &str) -> Option<PolicySource> {
        self.inner
            .read()
            .ok()
            .and_then(|g| g.policy.resolve(name_or_slug).cloned())
    }

    /// Swap in a freshly loaded config.
    pub fn reload(&self) -> anyhow::Result<()> {
        let fresh = PortalConfig::load()?;
        let mut guard = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("engine config lock poisoned"))?;
        *guard = fresh;
        Ok(())
    }
}

fn hot_reload_enabled() -> bool {
    let want = std::env::var("PORTAL_HOT_RELOAD")
        .ok()
        .map(|v| v == "1")
        .unwrap_or(false);
    if !want {
        return false;
    }
    if cfg!(debug_assertions) {
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

/// Poll the config file's mtime every 2s and swap the engine on change.
pub fn start_hot_reload_thread(handle: EngineHandle, path: PathBuf) {
    if !hot_reload_enabled() {
        return;
    }

    thread::spawn(move || {
        let poll = Duration::from_secs(2);
        let mut last_mtime: Option<SystemTime> = None;

        loop {
            match fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(mtime) => {
                    let changed = match last_mtime {
                        None => {
                            last_mtime = Some(mtime);
                            false
                        }
                        Some(prev) => mtime > prev,
                    };
                    if changed {
                        if let Err(e) = handle.reload() {
                            warn!(error = %e, "portal config reload failed, keeping previous");
                        }
                        last_mtime = Some(mtime);
                    }
                }
                Err(_) => {
                    // File missing or unreadable; keep trying.
                }
            }
            thread::sleep(poll);
        }
    });
}
