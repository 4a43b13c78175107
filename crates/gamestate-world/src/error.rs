//! Error types for the `gamestate-world` crate.

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A character name was empty or contained invalid characters.
    #[error("invalid player name: {0:?}")]
    InvalidName(String),

    /// A character with the same (case-insensitive) name already exists.
    #[error("duplicate player name: {0}")]
    DuplicatePlayer(String),

    /// No character with this name is registered.
    #[error("player not found: {0}")]
    PlayerNotFound(String),

    /// A roster file could not be read.
    #[error("failed to read roster: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A roster document was not valid JSON.
    #[error("failed to parse roster: {source}")]
    Roster {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
