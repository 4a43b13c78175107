//! Error types for the standalone server binary.
//!
//! [`HostError`] is the top-level error type that wraps every failure mode
//! during startup and shutdown.

/// Top-level error for the server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: gamestate_api::ConfigError,
    },

    /// The roster could not be loaded.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: gamestate_world::WorldError,
    },

    /// The API server could not be created or started.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: gamestate_api::ServerError,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {message}")]
    Signal {
        /// Description of the failure.
        message: String,
    },
}
