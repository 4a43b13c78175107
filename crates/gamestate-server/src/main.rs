//! Standalone host for the game state API.
//!
//! Runs the API against the bundled in-memory [`World`], optionally
//! preloaded from a JSON roster. Realm servers embed
//! [`GameStateServer`] directly with their own accessor instead.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `gamestate-config.yaml` (or the path given
//!    as the first argument)
//! 3. Build the world, loading the roster if one is configured
//! 4. Build the host metrics registry
//! 5. Start the API listener
//! 6. Wait for Ctrl-C, then stop the listener

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use gamestate_api::{ApiConfig, GameStateServer, HostMetrics};
use gamestate_world::World;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::HostError;

/// Config file read when no path is given on the command line.
const DEFAULT_CONFIG_PATH: &str = "gamestate-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step fails or the listener
/// cannot be started.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("gamestate-server starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        allowed_origin = %config.server.allowed_origin,
        metrics_backend = ?config.metrics.backend,
        "Configuration loaded"
    );

    // 3. Build the world.
    let world = match &config.world.roster_path {
        Some(path) => World::from_roster_file(config.world.realm_name.clone(), path)
            .map_err(HostError::from)?,
        None => World::new(config.world.realm_name.clone()),
    };
    info!(
        realm = world.realm_name(),
        players = world.player_count(),
        "World initialized"
    );

    // 4. Host metrics registry.
    let metrics = Arc::new(HostMetrics::from_backend(
        config.metrics.backend,
        &config.metrics.procfs_root,
    ));
    info!(provider = metrics.provider_name(), "Host metrics initialized");

    // 5. Start the API.
    let server = GameStateServer::new(config.server.clone(), Arc::new(world), metrics)
        .map_err(HostError::from)?;
    let addr = server.start().map_err(HostError::from)?;
    info!(%addr, "Game state API ready");

    // 6. Wait for Ctrl-C.
    wait_for_ctrl_c()?;
    info!("Shutdown signal received");
    server.stop();

    info!("gamestate-server exited");
    Ok(())
}

/// Load configuration from the path given as the first argument, or from
/// `gamestate-config.yaml` if present. Falls back to defaults (plus
/// environment overrides) when no file exists.
fn load_config() -> Result<ApiConfig, HostError> {
    let explicit = std::env::args_os().nth(1).map(PathBuf::from);
    let path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    if explicit.is_some() || path.exists() {
        Ok(ApiConfig::from_file(&path)?)
    } else {
        info!("Config file not found, using defaults");
        Ok(ApiConfig::parse("")?)
    }
}

/// Block the main thread until Ctrl-C. The API listener has its own
/// runtime; this one only waits for the signal.
fn wait_for_ctrl_c() -> Result<(), HostError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| HostError::Signal {
            message: format!("failed to build signal runtime: {e}"),
        })?;
    runtime
        .block_on(tokio::signal::ctrl_c())
        .map_err(|e| HostError::Signal {
            message: format!("failed to listen for Ctrl-C: {e}"),
        })
}
