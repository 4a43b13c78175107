//! In-memory player registry.
//!
//! [`World`] is the live, mutable roster the API reads from. The game side
//! mutates it (login, logout, stat changes) while request handlers read it
//! concurrently; one [`RwLock`] guards both the players and the name index
//! so a lookup and the following read see the same roster.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use gamestate_api::PlayerId;
use tracing::{debug, info};

use crate::error::WorldError;
use crate::player::Player;

#[derive(Debug, Default)]
pub(crate) struct Roster {
    pub(crate) players: BTreeMap<PlayerId, Player>,
    by_name: HashMap<String, PlayerId>,
}

impl Roster {
    pub(crate) fn find(&self, name: &str) -> Option<(PlayerId, &Player)> {
        let id = *self.by_name.get(&normalize_name(name)?)?;
        self.players.get(&id).map(|player| (id, player))
    }
}

/// The live player registry for one realm.
#[derive(Debug)]
pub struct World {
    realm_name: String,
    started_at: Instant,
    next_id: AtomicU64,
    roster: RwLock<Roster>,
}

impl World {
    /// Create an empty realm.
    pub fn new(realm_name: impl Into<String>) -> Self {
        Self {
            realm_name: realm_name.into(),
            started_at: Instant::now(),
            next_id: AtomicU64::new(1),
            roster: RwLock::new(Roster::default()),
        }
    }

    /// Create a realm preloaded from a JSON roster file (an array of
    /// players).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Io`] or [`WorldError::Roster`] if the file
    /// cannot be read or parsed, and any error from [`World::add_player`].
    pub fn from_roster_file(
        realm_name: impl Into<String>,
        path: &Path,
    ) -> Result<Self, WorldError> {
        let contents = std::fs::read_to_string(path)?;
        let world = Self::new(realm_name);
        let loaded = world.load_roster(&contents)?;
        info!(path = %path.display(), players = loaded, "roster loaded");
        Ok(world)
    }

    /// Add every player of a JSON roster. Returns how many were added.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Roster`] on malformed JSON and stops at the
    /// first player [`World::add_player`] rejects.
    pub fn load_roster(&self, json: &str) -> Result<usize, WorldError> {
        let players: Vec<Player> = serde_json::from_str(json)?;
        let count = players.len();
        for player in players {
            self.add_player(player)?;
        }
        Ok(count)
    }

    /// Realm name.
    pub fn realm_name(&self) -> &str {
        &self.realm_name
    }

    /// Seconds since the registry was created.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Register a character.
    ///
    /// # Errors
    ///
    /// - [`WorldError::InvalidName`] for an empty or non-alphabetic name.
    /// - [`WorldError::DuplicatePlayer`] if the name is taken.
    pub fn add_player(&self, mut player: Player) -> Result<PlayerId, WorldError> {
        let key = normalize_name(&player.name)
            .ok_or_else(|| WorldError::InvalidName(player.name.clone()))?;

        let mut roster = self.write();
        if roster.by_name.contains_key(&key) {
            return Err(WorldError::DuplicatePlayer(key));
        }

        let id = PlayerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        player.name.clone_from(&key);
        debug!(player = %key, %id, "player registered");
        roster.by_name.insert(key, id);
        roster.players.insert(id, player);
        Ok(id)
    }

    /// Remove a character. Returns it if it was registered.
    pub fn remove_player(&self, name: &str) -> Option<Player> {
        let key = normalize_name(name)?;
        let mut roster = self.write();
        let id = roster.by_name.remove(&key)?;
        roster.players.remove(&id)
    }

    /// Mark a character as entering or leaving the world.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PlayerNotFound`] if no such character exists.
    pub fn set_in_world(&self, name: &str, in_world: bool) -> Result<(), WorldError> {
        self.update_player(name, |player| player.in_world = in_world)
    }

    /// Apply `update` to a character under the write lock.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PlayerNotFound`] if no such character exists.
    pub fn update_player<F>(&self, name: &str, update: F) -> Result<(), WorldError>
    where
        F: FnOnce(&mut Player),
    {
        let mut roster = self.write();
        let id = normalize_name(name)
            .and_then(|key| roster.by_name.get(&key).copied())
            .ok_or_else(|| WorldError::PlayerNotFound(name.to_owned()))?;
        let player = roster
            .players
            .get_mut(&id)
            .ok_or_else(|| WorldError::PlayerNotFound(name.to_owned()))?;

        // The name is the index key; keep it stable.
        let name_before = player.name.clone();
        update(player);
        player.name = name_before;
        Ok(())
    }

    /// Clone of a character's current state.
    pub fn player(&self, name: &str) -> Option<Player> {
        self.read().find(name).map(|(_, player)| player.clone())
    }

    /// Number of registered characters.
    pub fn player_count(&self) -> usize {
        self.read().players.len()
    }

    /// Number of characters currently in the world.
    pub fn online_count(&self) -> usize {
        self.read().players.values().filter(|p| p.in_world).count()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Roster> {
        self.roster.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Roster> {
        self.roster.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Canonical form of a character name: first letter upper case, the rest
/// lower case. `None` for names that are empty or contain anything but
/// letters.
pub fn normalize_name(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() || !name.chars().all(char::is_alphabetic) {
        return None;
    }
    let mut chars = name.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn names_normalize_case_insensitively() {
        assert_eq!(normalize_name("tHRALL").as_deref(), Some("Thrall"));
        assert_eq!(normalize_name("  jaina ").as_deref(), Some("Jaina"));
        assert_eq!(normalize_name(""), None);
        assert_eq!(normalize_name("Bad/Name"), None);
        assert_eq!(normalize_name("x1"), None);
    }

    #[test]
    fn add_and_find_player() {
        let world = World::new("Test");
        let id = world.add_player(Player::new("thrall", "Orc", "Shaman")).unwrap();
        let roster = world.read();
        let (found, player) = roster.find("THRALL").unwrap();
        assert_eq!(found, id);
        assert_eq!(player.name, "Thrall");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let world = World::new("Test");
        world.add_player(Player::new("Thrall", "Orc", "Shaman")).unwrap();
        let err = world
            .add_player(Player::new("THRALL", "Orc", "Warrior"))
            .unwrap_err();
        assert!(matches!(err, WorldError::DuplicatePlayer(_)));
    }

    #[test]
    fn invalid_names_are_rejected() {
        let world = World::new("Test");
        let err = world.add_player(Player::new("", "Orc", "Shaman")).unwrap_err();
        assert!(matches!(err, WorldError::InvalidName(_)));
    }

    #[test]
    fn ids_are_unique() {
        let world = World::new("Test");
        let a = world.add_player(Player::new("Alpha", "Human", "Mage")).unwrap();
        let b = world.add_player(Player::new("Beta", "Human", "Mage")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn remove_player_frees_the_name() {
        let world = World::new("Test");
        world.add_player(Player::new("Jaina", "Human", "Mage")).unwrap();
        assert!(world.remove_player("jaina").is_some());
        assert_eq!(world.player_count(), 0);
        world.add_player(Player::new("Jaina", "Human", "Mage")).unwrap();
    }

    #[test]
    fn set_in_world_changes_online_count() {
        let world = World::new("Test");
        world.add_player(Player::new("Jaina", "Human", "Mage")).unwrap();
        world.add_player(Player::new("Thrall", "Orc", "Shaman")).unwrap();
        assert_eq!(world.online_count(), 2);
        world.set_in_world("thrall", false).unwrap();
        assert_eq!(world.online_count(), 1);
        assert!(world.set_in_world("nobody", false).is_err());
    }

    #[test]
    fn update_cannot_rename() {
        let world = World::new("Test");
        world.add_player(Player::new("Jaina", "Human", "Mage")).unwrap();
        world
            .update_player("Jaina", |p| {
                p.level = 80;
                p.name = String::from("Other");
            })
            .unwrap();
        let player = world.player("jaina").unwrap();
        assert_eq!(player.level, 80);
        assert_eq!(player.name, "Jaina");
    }

    #[test]
    fn roster_json_loads_with_defaults() {
        let world = World::new("Test");
        let json = r#"[
            {"name": "Thrall", "level": 80, "race": "Orc", "class": "Shaman"},
            {"name": "Jaina", "level": 80, "race": "Human", "class": "Mage", "in_world": false}
        ]"#;
        assert_eq!(world.load_roster(json).unwrap(), 2);
        assert_eq!(world.player_count(), 2);
        assert_eq!(world.online_count(), 1);
    }

    #[test]
    fn malformed_roster_is_an_error() {
        let world = World::new("Test");
        assert!(matches!(
            world.load_roster("{not json"),
            Err(WorldError::Roster { .. })
        ));
    }
}
