//! Axum router construction for the game state API.
//!
//! The route table is fixed at construction. Every request passes through
//! the CORS middleware, including preflights (answered there), unmatched
//! paths (JSON 404 fallback) and method mismatches.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::cors::{self, CorsPolicy};
use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /api/health` -- liveness probe
/// - `GET /api/server` -- aggregate server metadata
/// - `GET /api/host` -- host metrics with peaks
/// - `GET /api/players` -- online roster
/// - `GET /api/player/{name}` -- player profile
/// - `GET /api/player/{name}/stats|equipment|skills|skills-full|quests`
/// - `OPTIONS *` -- CORS preflight
/// - JSON 404 for unknown paths, JSON 405 for unsupported methods
pub fn build_router(state: Arc<AppState>, cors: Arc<CorsPolicy>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/server", get(handlers::server_info))
        .route("/api/host", get(handlers::host_info))
        .route("/api/players", get(handlers::online_players))
        // Player-scoped
        .route("/api/player/", get(handlers::player_name_missing))
        .route("/api/player/{name}", get(handlers::player_info))
        .route("/api/player/{name}/stats", get(handlers::player_stats))
        .route("/api/player/{name}/equipment", get(handlers::player_equipment))
        .route("/api/player/{name}/skills", get(handlers::player_skills))
        .route("/api/player/{name}/skills-full", get(handlers::player_skills_full))
        .route("/api/player/{name}/quests", get(handlers::player_quests))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(middleware::from_fn_with_state(cors, cors::apply_cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
