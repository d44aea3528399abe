// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod candidate;
pub mod config;
pub mod context;
pub mod dedup;
pub mod gate;
pub mod policy;
pub mod reasons;
pub mod scorer;
pub mod selector;
pub mod signals;
pub mod tracks;

// ---- Re-exports for stable public API ----
pub use crate::candidate::{Candidate, CandidateKind, SourceRef};
pub use crate::config::{EngineHandle, PortalConfig};
pub use crate::context::{AudienceMode, DayPart, RankContext};
pub use crate::selector::{rank, Acceptance, RankedItem, RankedResult};

use crate::api::AppState;
use axum::Router;

/// Build the HTTP facade with the tenant config resolved from the
/// environment (or the built-in seed). Used by the binary and the HTTP
/// integration tests.
pub fn app() -> anyhow::Result<Router> {
    let cfg = PortalConfig::load()?;
    let engine = EngineHandle::new(cfg);
    Ok(api::create_router(AppState { engine }))
}
