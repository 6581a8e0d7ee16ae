//! Snapshot persistence: the mirroring adapter between the in-memory arena
//! and a local JSON file. Matching logic never touches this layer.

use crate::models::{Arena, Fight, FightResult, Player, PlayerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Persisted state shape, versioned by `saved_at`. The bracket is run live
/// and is not mirrored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub players: Vec<Player>,
    pub results: Vec<FightResult>,
    pub queue: Vec<PlayerId>,
    pub in_flight: Vec<Fight>,
    pub saved_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn from_arena(arena: &Arena) -> Self {
        Self {
            players: arena.players.clone(),
            results: arena.results.clone(),
            queue: arena.queue.clone(),
            in_flight: arena.in_flight.clone(),
            saved_at: Utc::now(),
        }
    }

    pub fn into_arena(self) -> Arena {
        Arena {
            players: self.players,
            results: self.results,
            queue: self.queue,
            in_flight: self.in_flight,
            bracket_round: 0,
            bracket_matches: Vec::new(),
        }
    }
}

/// Load the arena from a snapshot file. An absent, unreadable, or unparsable
/// file yields the empty initial state (logged, never an error).
pub fn load_snapshot(path: &Path) -> Arena {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("No snapshot at {}: {} (starting empty)", path.display(), e);
            return Arena::new();
        }
    };
    let mut value: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("Unparsable snapshot at {}: {} (starting empty)", path.display(), e);
            return Arena::new();
        }
    };
    upgrade_legacy_players(&mut value);
    match serde_json::from_value::<Snapshot>(value) {
        Ok(snapshot) => snapshot.into_arena(),
        Err(e) => {
            log::warn!("Invalid snapshot at {}: {} (starting empty)", path.display(), e);
            Arena::new()
        }
    }
}

/// Write the current state to the snapshot file.
pub fn save_snapshot(path: &Path, arena: &Arena) -> std::io::Result<()> {
    let snapshot = Snapshot::from_arena(arena);
    let json = serde_json::to_vec_pretty(&snapshot)?;
    std::fs::write(path, json)
}

/// One-time schema upgrade for old snapshots: player records that carry a
/// single string field `weapon` inside the loadout (instead of the `weapons`
/// list) get that weapon duplicated into both slots. Irreversible; performed
/// only here, on read.
fn upgrade_legacy_players(value: &mut serde_json::Value) {
    let Some(players) = value.get_mut("players").and_then(|p| p.as_array_mut()) else {
        return;
    };
    for player in players {
        let Some(loadout) = player.get_mut("loadout").and_then(|l| l.as_object_mut()) else {
            continue;
        };
        if loadout.contains_key("weapons") {
            continue;
        }
        let Some(weapon) = loadout.remove("weapon") else {
            continue;
        };
        if let Some(name) = weapon.as_str() {
            loadout.insert(
                "weapons".to_string(),
                serde_json::json!([name, name]),
            );
        }
    }
}
