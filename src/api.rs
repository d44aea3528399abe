//! Thin HTTP facade over the engine. Handlers only deserialize, hand lists
//! to the engine, and serialize the result; all ranking logic lives in the
//! library so it can be unit-tested without this layer.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use tower_http::cors::CorsLayer;

use crate::candidate::Candidate;
use crate::config::EngineHandle;
use crate::context::RankContext;
use crate::selector::RankedResult;

#[derive(Clone)]
pub struct AppState {
    pub engine: EngineHandle,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/rank", post(rank_feed))
        .route("/debug/resolve-source", get(debug_resolve_source))
        .route("/admin/reload-config", get(admin_reload_config))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct RankRequest {
    context: RankContext,
    #[serde(default)]
    candidates: Vec<Candidate>,
}

async fn rank_feed(
    State(state): State<AppState>,
    Json(body): Json<RankRequest>,
) -> Result<Json<RankedResult>, (StatusCode, String)> {
    state
        .engine
        .rank(body.candidates, &body.context)
        .map(Json)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
}

async fn debug_resolve_source(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> String {
    let name = q.get("name").cloned().unwrap_or_default();
    match state.engine.resolve_source(&name) {
        Some(src) => format!(
            "'{}' -> id={} rail={:?} tier={}",
            name, src.id, src.rail, src.tier
        ),
        None => format!("'{}' -> untrusted", name),
    }
}

async fn admin_reload_config(State(state): State<AppState>) -> String {
    match state.engine.reload() {
        Ok(()) => "reloaded".to_string(),
        Err(e) => format!("failed: {e}"),
    }
}
