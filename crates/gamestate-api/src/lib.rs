//! Read-only HTTP/JSON API over a running game server's state.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Player endpoints** (`/api/player/{name}` and its `stats`,
//!   `equipment`, `skills`, `skills-full` and `quests` sub-resources)
//! - **Roster and server endpoints** (`/api/players`, `/api/server`)
//! - **Host metrics** (`/api/host`): CPU, memory and uptime with lifetime
//!   peaks
//! - **Liveness** (`/api/health`)
//!
//! # Architecture
//!
//! The API never owns game state. Handlers read through a
//! [`GameStateAccessor`] supplied by the host process, which is
//! responsible for synchronizing access to its own world. The only
//! mutable state in this crate is the listener's running flag and the
//! [`HostMetrics`] registry (previous CPU counters and peaks).
//!
//! [`GameStateServer`] runs the listener on a dedicated thread with its
//! own Tokio runtime, so it can be started and stopped from synchronous
//! code. Every response, including errors and CORS preflights, carries the
//! configured CORS headers.
//!
//! [`GameStateAccessor`]: accessor::GameStateAccessor
//! [`HostMetrics`]: metrics::HostMetrics

pub mod accessor;
pub mod config;
pub mod cors;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use accessor::{AccessError, GameStateAccessor, PlayerHandle, PlayerId};
pub use config::{ApiConfig, ConfigError, ServerConfig};
pub use error::ApiError;
pub use metrics::{HostMetrics, MetricsBackend, MetricsSnapshot};
pub use router::build_router;
pub use server::{GameStateServer, ServerError};
pub use state::AppState;
