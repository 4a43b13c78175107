//! Collaborator interface to the live game world.
//!
//! The API never owns game state. Everything it serves comes through a
//! [`GameStateAccessor`], implemented by whatever subsystem owns the
//! players and sessions. Implementations must be safe to call from many
//! request-handling threads at once; handlers invoke them on Tokio's
//! blocking pool so a slow accessor only stalls the request being served.

use serde_json::Value;

/// Opaque, accessor-assigned identifier for a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct PlayerId(pub u64);

impl core::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of resolving a player name.
///
/// A handle is only meaningful to the accessor that produced it. A player
/// that is known but not currently in the simulated world (loading screen,
/// logging out) is reported with `in_world == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerHandle {
    /// Accessor-assigned identifier.
    pub id: PlayerId,
    /// Whether the player is currently present in the world.
    pub in_world: bool,
}

/// Failure reported by a [`GameStateAccessor`].
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// The handle no longer refers to a live player (logged out between
    /// lookup and shaping).
    #[error("player {0} is no longer available")]
    PlayerGone(PlayerId),

    /// The underlying game state could not be read.
    #[error("game state unavailable: {0}")]
    Unavailable(String),

    /// Shaping the payload into JSON failed.
    #[error("failed to shape payload: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Read access to live game-world state, shaped as JSON payloads.
pub trait GameStateAccessor: Send + Sync + 'static {
    /// Resolve a player name to a handle. `None` if no such player is
    /// online.
    fn find_player(&self, name: &str) -> Option<PlayerHandle>;

    /// Full player profile, optionally with an embedded equipment section.
    fn player_profile(
        &self,
        player: PlayerHandle,
        include_equipment: bool,
    ) -> Result<Value, AccessError>;

    /// Combat and attribute statistics.
    fn player_stats(&self, player: PlayerHandle) -> Result<Value, AccessError>;

    /// Equipped items by slot.
    fn player_equipment(&self, player: PlayerHandle) -> Result<Value, AccessError>;

    /// Brief skill list.
    fn player_skills(&self, player: PlayerHandle) -> Result<Value, AccessError>;

    /// Skill list with every tracked field.
    fn player_skills_full(&self, player: PlayerHandle) -> Result<Value, AccessError>;

    /// Quest log.
    fn player_quests(&self, player: PlayerHandle) -> Result<Value, AccessError>;

    /// One entry per online player.
    fn online_players(&self, include_equipment: bool) -> Result<Vec<Value>, AccessError>;

    /// Aggregate server metadata.
    fn server_info(&self) -> Result<Value, AccessError>;

    /// Seconds since the game server process started.
    fn uptime_seconds(&self) -> u64;
}
