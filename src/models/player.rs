//! Player data structures: role, DPS loadout, level, and the weapon catalogs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in fights and lookups).
pub type PlayerId = Uuid;

/// How many recent opponents a player remembers (most-recent-first).
pub const RECENT_OPPONENTS_CAP: usize = 10;

/// Combat role. Mutually exclusive, chosen at registration.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Tank,
    Healer,
    Dps,
}

/// Damage style for DPS players.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageStyle {
    Melee,
    Ranged,
}

/// Informational skill tier. Never consulted by the pairing algorithm.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    #[default]
    Medium,
    High,
}

/// Fixed melee weapon catalog. Disjoint from the ranged catalog.
pub const MELEE_WEAPONS: &[&str] = &["sword", "spear", "blade", "dual_blades", "gauntlets"];

/// Fixed ranged weapon catalog. Disjoint from the melee catalog.
pub const RANGED_WEAPONS: &[&str] = &["fan", "umbrella", "bow", "chakram", "zither"];

/// The catalog matching a damage style.
pub fn weapon_catalog(style: DamageStyle) -> &'static [&'static str] {
    match style {
        DamageStyle::Melee => MELEE_WEAPONS,
        DamageStyle::Ranged => RANGED_WEAPONS,
    }
}

/// DPS sub-attributes: damage style plus one or two weapons from that style's catalog.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    pub style: DamageStyle,
    /// One or two weapon names from the catalog matching `style`.
    pub weapons: Vec<String>,
}

/// A registered player.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Unique (case-insensitive, trimmed) among all players.
    pub nickname: String,
    pub role: Role,
    /// Present iff `role == Role::Dps`.
    pub loadout: Option<Loadout>,
    pub level: Level,
    /// Inactive players stay in the roster but are never paired.
    pub active: bool,
    pub wins: u32,
    pub losses: u32,
    /// Opponent ids, most-recent-first, capped at `RECENT_OPPONENTS_CAP`.
    pub recent_opponents: Vec<PlayerId>,
    pub last_played: Option<DateTime<Utc>>,
}

impl Player {
    /// Create a new active player with zeroed stats and empty history.
    pub fn new(
        nickname: impl Into<String>,
        role: Role,
        loadout: Option<Loadout>,
        level: Level,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            nickname: nickname.into(),
            role,
            loadout,
            level,
            active: true,
            wins: 0,
            losses: 0,
            recent_opponents: Vec::new(),
            last_played: None,
        }
    }

    /// Record a win for this player.
    pub fn add_win(&mut self) {
        self.wins += 1;
    }

    /// Record a loss for this player.
    pub fn add_loss(&mut self) {
        self.losses += 1;
    }

    /// Push an opponent to the front of the recent-opponent history, keeping the cap.
    pub fn remember_opponent(&mut self, opponent: PlayerId) {
        self.recent_opponents.insert(0, opponent);
        self.recent_opponents.truncate(RECENT_OPPONENTS_CAP);
    }

    /// The first `lookback` entries of the recent-opponent history.
    pub fn recent_window(&self, lookback: usize) -> &[PlayerId] {
        let n = lookback
            .min(RECENT_OPPONENTS_CAP)
            .min(self.recent_opponents.len());
        &self.recent_opponents[..n]
    }
}
