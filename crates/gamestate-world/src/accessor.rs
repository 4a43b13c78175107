//! [`GameStateAccessor`] implementation for [`World`].
//!
//! Every call takes the roster read lock once, so a payload is always
//! shaped from a single consistent view of the player.

use gamestate_api::{AccessError, GameStateAccessor, PlayerHandle};
use serde_json::{Value, json};

use crate::player::Player;
use crate::registry::World;
use crate::shape;

impl World {
    fn with_player<F>(&self, handle: PlayerHandle, build: F) -> Result<Value, AccessError>
    where
        F: FnOnce(&Player) -> Value,
    {
        let roster = self.read();
        roster
            .players
            .get(&handle.id)
            .map(build)
            .ok_or(AccessError::PlayerGone(handle.id))
    }
}

impl GameStateAccessor for World {
    fn find_player(&self, name: &str) -> Option<PlayerHandle> {
        self.read().find(name).map(|(id, player)| PlayerHandle {
            id,
            in_world: player.in_world,
        })
    }

    fn player_profile(
        &self,
        player: PlayerHandle,
        include_equipment: bool,
    ) -> Result<Value, AccessError> {
        self.with_player(player, |p| shape::profile(p, include_equipment))
    }

    fn player_stats(&self, player: PlayerHandle) -> Result<Value, AccessError> {
        self.with_player(player, shape::stats)
    }

    fn player_equipment(&self, player: PlayerHandle) -> Result<Value, AccessError> {
        self.with_player(player, shape::equipment)
    }

    fn player_skills(&self, player: PlayerHandle) -> Result<Value, AccessError> {
        self.with_player(player, shape::skills)
    }

    fn player_skills_full(&self, player: PlayerHandle) -> Result<Value, AccessError> {
        self.with_player(player, shape::skills_full)
    }

    fn player_quests(&self, player: PlayerHandle) -> Result<Value, AccessError> {
        self.with_player(player, shape::quests)
    }

    fn online_players(&self, include_equipment: bool) -> Result<Vec<Value>, AccessError> {
        let roster = self.read();
        let mut online: Vec<&Player> = roster.players.values().filter(|p| p.in_world).collect();
        online.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(online
            .into_iter()
            .map(|p| shape::roster_entry(p, include_equipment))
            .collect())
    }

    fn server_info(&self) -> Result<Value, AccessError> {
        let roster = self.read();
        let online = roster.players.values().filter(|p| p.in_world).count();
        let max_level = roster.players.values().map(|p| p.level).max().unwrap_or(0);
        Ok(json!({
            "realm": self.realm_name(),
            "version": env!("CARGO_PKG_VERSION"),
            "online_players": online,
            "known_players": roster.players.len(),
            "highest_level": max_level,
            "uptime_seconds": self.uptime_seconds(),
            "timestamp": chrono::Utc::now().timestamp(),
        }))
    }

    fn uptime_seconds(&self) -> u64 {
        Self::uptime_seconds(self)
    }
}
