//! REST API endpoint handlers.
//!
//! Handlers validate input, call the [`GameStateAccessor`] or the metrics
//! registry, and let [`ApiError`] shape every failure. Accessor calls and
//! metric sampling run on Tokio's blocking pool: they may take locks owned
//! by the game world or read `/proc`, and a panic inside them must surface
//! as a 500 rather than take down a worker.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/health` | Liveness probe |
//! | `GET` | `/api/server` | Aggregate server metadata |
//! | `GET` | `/api/host` | Host CPU / memory / uptime with peaks |
//! | `GET` | `/api/players` | Online roster (`?equipment=true`) |
//! | `GET` | `/api/player/{name}` | Player profile (`?include=equipment`) |
//! | `GET` | `/api/player/{name}/stats` | Player statistics |
//! | `GET` | `/api/player/{name}/equipment` | Equipped items |
//! | `GET` | `/api/player/{name}/skills` | Brief skill list |
//! | `GET` | `/api/player/{name}/skills-full` | Full skill list |
//! | `GET` | `/api/player/{name}/quests` | Quest log |
//!
//! [`GameStateAccessor`]: crate::accessor::GameStateAccessor

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde_json::Value;
use tracing::debug;

use crate::accessor::{AccessError, GameStateAccessor, PlayerHandle};
use crate::error::ApiError;
use crate::extract::{PlayerName, QueryParams};
use crate::metrics::MetricsSnapshot;
use crate::state::AppState;

/// Error message for a missing or empty player name.
pub const PLAYER_NAME_REQUIRED: &str = "Player name is required";

/// Error message for an unknown or offline player.
pub const PLAYER_NOT_FOUND: &str = "Player not found or not online";

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// `GET /api/players?equipment=true`: only the exact value `true` counts.
fn roster_wants_equipment(params: &QueryParams) -> bool {
    params.first("equipment") == Some("true")
}

/// `GET /api/player/{name}?include=...`: any value mentioning `equipment`.
fn profile_wants_equipment(params: &QueryParams) -> bool {
    params
        .first("include")
        .is_some_and(|include| include.contains("equipment"))
}

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

/// Liveness probe. Always 200; touches nothing but the process uptime.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().timestamp(),
        "uptime_seconds": state.accessor.uptime_seconds(),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/server
// ---------------------------------------------------------------------------

/// Aggregate server metadata as shaped by the accessor.
pub async fn server_info(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let accessor = Arc::clone(&state.accessor);
    let body = run_blocking(move || Ok(accessor.server_info()?)).await?;
    Ok(Json(body))
}

// ---------------------------------------------------------------------------
// GET /api/host
// ---------------------------------------------------------------------------

/// Sample host metrics and fold them into the lifetime peaks.
pub async fn host_info(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MetricsSnapshot>, ApiError> {
    let metrics = Arc::clone(&state.metrics);
    let snapshot = run_blocking(move || Ok(metrics.sample()?)).await?;
    Ok(Json(snapshot))
}

// ---------------------------------------------------------------------------
// GET /api/players
// ---------------------------------------------------------------------------

/// List online players.
///
/// # Query Parameters
///
/// - `equipment`: `true` to include equipment per entry.
pub async fn online_players(
    State(state): State<Arc<AppState>>,
    params: QueryParams,
) -> Result<Json<Value>, ApiError> {
    let include_equipment = roster_wants_equipment(&params);
    let accessor = Arc::clone(&state.accessor);
    let players = run_blocking(move || Ok(accessor.online_players(include_equipment)?)).await?;

    Ok(Json(serde_json::json!({
        "count": players.len(),
        "players": players,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/player/{name}[/...]
// ---------------------------------------------------------------------------

/// `GET /api/player/` with nothing captured.
pub async fn player_name_missing() -> ApiError {
    ApiError::BadRequest(PLAYER_NAME_REQUIRED.to_owned())
}

/// Player profile.
///
/// # Query Parameters
///
/// - `include`: contains `equipment` to embed the equipment section.
pub async fn player_info(
    State(state): State<Arc<AppState>>,
    PlayerName(name): PlayerName,
    params: QueryParams,
) -> Result<Json<Value>, ApiError> {
    let include_equipment = profile_wants_equipment(&params);
    with_player(&state, name, move |accessor, player| {
        accessor.player_profile(player, include_equipment)
    })
    .await
}

/// Player statistics.
pub async fn player_stats(
    State(state): State<Arc<AppState>>,
    PlayerName(name): PlayerName,
) -> Result<Json<Value>, ApiError> {
    with_player(&state, name, |accessor, player| accessor.player_stats(player)).await
}

/// Equipped items.
pub async fn player_equipment(
    State(state): State<Arc<AppState>>,
    PlayerName(name): PlayerName,
) -> Result<Json<Value>, ApiError> {
    with_player(&state, name, |accessor, player| {
        accessor.player_equipment(player)
    })
    .await
}

/// Brief skill list.
pub async fn player_skills(
    State(state): State<Arc<AppState>>,
    PlayerName(name): PlayerName,
) -> Result<Json<Value>, ApiError> {
    with_player(&state, name, |accessor, player| accessor.player_skills(player)).await
}

/// Full skill list.
pub async fn player_skills_full(
    State(state): State<Arc<AppState>>,
    PlayerName(name): PlayerName,
) -> Result<Json<Value>, ApiError> {
    with_player(&state, name, |accessor, player| {
        accessor.player_skills_full(player)
    })
    .await
}

/// Quest log.
pub async fn player_quests(
    State(state): State<Arc<AppState>>,
    PlayerName(name): PlayerName,
) -> Result<Json<Value>, ApiError> {
    with_player(&state, name, |accessor, player| accessor.player_quests(player)).await
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// JSON 404 for unmatched paths.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Endpoint not found".to_owned())
}

/// JSON 405 for a known path with an unsupported method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve `name` to an in-world player and shape a payload for it.
async fn with_player<F>(state: &AppState, name: String, shape: F) -> Result<Json<Value>, ApiError>
where
    F: FnOnce(&dyn GameStateAccessor, PlayerHandle) -> Result<Value, AccessError> + Send + 'static,
{
    if name.is_empty() {
        return Err(ApiError::BadRequest(PLAYER_NAME_REQUIRED.to_owned()));
    }

    let accessor = Arc::clone(&state.accessor);
    let body = run_blocking(move || {
        let player = accessor
            .find_player(&name)
            .filter(|player| player.in_world)
            .ok_or_else(|| {
                debug!(player = %name, "player lookup missed");
                ApiError::NotFound(PLAYER_NOT_FOUND.to_owned())
            })?;
        Ok(shape(accessor.as_ref(), player)?)
    })
    .await?;

    Ok(Json(body))
}

/// Run a blocking closure on the blocking pool. A panic inside it becomes
/// [`ApiError::Internal`].
async fn run_blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ApiError::Internal(format!("handler task failed: {e}")))?
}
