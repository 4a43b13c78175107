//! In-memory player registry for the game state API.
//!
//! This crate is the reference [`GameStateAccessor`] implementation: a
//! concurrently mutable roster of characters with their stats, equipment,
//! skills and quests, plus the JSON shaping the API serves. A realm server
//! would implement the accessor over its own object model instead; the
//! standalone binary and the tests use this one.
//!
//! # Modules
//!
//! - [`player`] -- Character model (stats, equipment, skills, quests).
//! - [`registry`] -- [`World`], the lock-guarded roster with name index.
//! - [`shape`] -- Per-endpoint JSON payloads.
//! - [`error`] -- Error types for registry operations.
//!
//! [`GameStateAccessor`]: gamestate_api::GameStateAccessor

mod accessor;
pub mod error;
pub mod player;
pub mod registry;
pub mod shape;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use player::{
    EquipmentSlot, EquippedItem, Gender, ItemQuality, Player, PlayerStats, Position,
    QuestEntry, QuestObjective, QuestStatus, Skill,
};
pub use registry::{World, normalize_name};
