//! Shared fixtures: a scripted accessor and a scripted metrics provider.

#![allow(dead_code, clippy::arithmetic_side_effects)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use axum::Router;
use gamestate_api::cors::CorsPolicy;
use gamestate_api::metrics::{
    CpuReading, CpuTimes, HostCounters, HostMetricsProvider, MetricsError,
};
use gamestate_api::{
    AccessError, AppState, GameStateAccessor, HostMetrics, PlayerHandle, PlayerId, build_router,
};
use serde_json::{Value, json};

pub const TEST_ORIGIN: &str = "https://dashboard.example";

/// In-memory accessor with a fixed roster.
///
/// `Alice` and `Carol` are in the world, `Bob` is on a loading screen.
pub struct StubAccessor {
    players: BTreeMap<String, (PlayerId, bool)>,
    pub fail_server_info: AtomicBool,
    pub panic_in_stats: AtomicBool,
}

impl StubAccessor {
    pub fn new() -> Self {
        let players = [("Alice", 1, true), ("Bob", 2, false), ("Carol", 3, true)]
            .into_iter()
            .map(|(name, id, in_world)| (name.to_owned(), (PlayerId(id), in_world)))
            .collect();
        Self {
            players,
            fail_server_info: AtomicBool::new(false),
            panic_in_stats: AtomicBool::new(false),
        }
    }

    fn name_of(&self, handle: PlayerHandle) -> Result<&str, AccessError> {
        self.players
            .iter()
            .find(|(_, (id, _))| *id == handle.id)
            .map(|(name, _)| name.as_str())
            .ok_or(AccessError::PlayerGone(handle.id))
    }

    fn equipment_for(name: &str) -> Value {
        json!([{ "slot": "head", "item_id": 100, "name": format!("{name}'s Helm") }])
    }
}

impl GameStateAccessor for StubAccessor {
    fn find_player(&self, name: &str) -> Option<PlayerHandle> {
        self.players
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, (id, in_world))| PlayerHandle {
                id: *id,
                in_world: *in_world,
            })
    }

    fn player_profile(
        &self,
        player: PlayerHandle,
        include_equipment: bool,
    ) -> Result<Value, AccessError> {
        let name = self.name_of(player)?;
        let mut body = json!({ "name": name, "level": 10 + player.id.0 });
        if include_equipment {
            body["equipment"] = Self::equipment_for(name);
        }
        Ok(body)
    }

    fn player_stats(&self, player: PlayerHandle) -> Result<Value, AccessError> {
        assert!(
            !self.panic_in_stats.load(Ordering::Relaxed),
            "stats lookup exploded"
        );
        let name = self.name_of(player)?;
        Ok(json!({ "name": name, "health": 100 * player.id.0 }))
    }

    fn player_equipment(&self, player: PlayerHandle) -> Result<Value, AccessError> {
        Ok(Self::equipment_for(self.name_of(player)?))
    }

    fn player_skills(&self, player: PlayerHandle) -> Result<Value, AccessError> {
        self.name_of(player)?;
        Ok(json!([{ "id": 1, "name": "Swords", "value": 5 }]))
    }

    fn player_skills_full(&self, player: PlayerHandle) -> Result<Value, AccessError> {
        self.name_of(player)?;
        Ok(json!([{ "id": 1, "name": "Swords", "value": 5, "max_value": 75 }]))
    }

    fn player_quests(&self, player: PlayerHandle) -> Result<Value, AccessError> {
        self.name_of(player)?;
        Ok(json!({ "count": 0, "quests": [] }))
    }

    fn online_players(&self, include_equipment: bool) -> Result<Vec<Value>, AccessError> {
        Ok(self
            .players
            .iter()
            .filter(|(_, (_, in_world))| *in_world)
            .map(|(name, _)| {
                let mut entry = json!({ "name": name });
                if include_equipment {
                    entry["equipment"] = Self::equipment_for(name);
                }
                entry
            })
            .collect())
    }

    fn server_info(&self) -> Result<Value, AccessError> {
        if self.fail_server_info.load(Ordering::Relaxed) {
            return Err(AccessError::Unavailable(String::from("world lock poisoned")));
        }
        Ok(json!({ "realm": "Stub Realm", "online_players": 2 }))
    }

    fn uptime_seconds(&self) -> u64 {
        42
    }
}

/// Provider whose counters advance on every sample: 25% busy per
/// interval, memory use alternating between 3 GiB and 1 GiB.
#[derive(Default)]
pub struct StubProvider {
    calls: AtomicU64,
}

impl HostMetricsProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn sample(&self) -> Result<HostCounters, MetricsError> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        let gib = 1024 * 1024 * 1024;
        let used = if n % 2 == 0 { 3 * gib } else { gib };
        Ok(HostCounters {
            uptime_seconds: 1000 + n,
            total_mem: 8 * gib,
            available_mem: 8 * gib - used,
            cpu: CpuReading::Times(CpuTimes {
                idle: 300 * n,
                total: 400 * n,
            }),
        })
    }
}

pub fn make_state() -> (Arc<StubAccessor>, Arc<AppState>) {
    let accessor = Arc::new(StubAccessor::new());
    let metrics = Arc::new(HostMetrics::new(Box::new(StubProvider::default())));
    let state = Arc::new(AppState::new(
        Arc::clone(&accessor) as Arc<dyn GameStateAccessor>,
        metrics,
    ));
    (accessor, state)
}

pub fn make_router(state: Arc<AppState>) -> Router {
    let cors = Arc::new(CorsPolicy::new(TEST_ORIGIN).unwrap());
    build_router(state, cors)
}
