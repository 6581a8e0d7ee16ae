//! Arena: the single explicit state object (roster, queue, in-flight fights,
//! result history, current bracket) plus roster and rotation operations.

use crate::models::fight::{BracketMatch, Fight, FightId, FightResult};
use crate::models::player::{weapon_catalog, Level, Loadout, Player, PlayerId, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ArenaError {
    /// A player with this nickname already exists (unique, case-insensitive).
    DuplicateNickname,
    /// Nickname is empty after trimming.
    InvalidNickname,
    /// Role is DPS but no loadout was given.
    MissingLoadout,
    /// Role is not DPS but a loadout was given.
    UnexpectedLoadout,
    /// A DPS loadout must pick one or two weapons.
    WrongWeaponCount { selected: usize },
    /// Weapon is not in the catalog for the chosen damage style.
    UnknownWeapon(String),
    /// Player not found in the roster.
    PlayerNotFound(PlayerId),
    /// Bracket match not found in the current round.
    MatchNotFound(FightId),
    /// Not enough participants to start a bracket.
    NotEnoughParticipants { required: usize },
    /// The same player was listed more than once in a bracket selection.
    DuplicateParticipant(PlayerId),
    /// Odd participant count and byes are disabled.
    OddWithoutBye,
    /// The current bracket round still has undecided matches.
    RoundNotReady,
    /// No bracket round is currently running.
    NoActiveBracket,
    /// The bracket match already has a winner or was canceled.
    MatchAlreadyDecided,
    /// Byes have no winner to set or cancel.
    ByeMatch,
    /// Declared winner is not a participant of the fight.
    WinnerNotInFight,
}

impl std::fmt::Display for ArenaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArenaError::DuplicateNickname => write!(f, "A player with this nickname already exists"),
            ArenaError::InvalidNickname => write!(f, "Nickname must not be empty"),
            ArenaError::MissingLoadout => write!(f, "DPS players must pick a damage style and weapons"),
            ArenaError::UnexpectedLoadout => write!(f, "Only DPS players have a damage style and weapons"),
            ArenaError::WrongWeaponCount { selected } => {
                write!(f, "Pick one or two weapons (selected {})", selected)
            }
            ArenaError::UnknownWeapon(w) => write!(f, "Weapon '{}' is not in the catalog for this style", w),
            ArenaError::PlayerNotFound(_) => write!(f, "Player not found"),
            ArenaError::MatchNotFound(_) => write!(f, "Bracket match not found in the current round"),
            ArenaError::NotEnoughParticipants { required } => {
                write!(f, "Need at least {} participants", required)
            }
            ArenaError::DuplicateParticipant(_) => {
                write!(f, "A participant is listed more than once")
            }
            ArenaError::OddWithoutBye => write!(f, "Odd participant count and byes are disabled"),
            ArenaError::RoundNotReady => write!(f, "Not all matches in the round are decided"),
            ArenaError::NoActiveBracket => write!(f, "No bracket round is running"),
            ArenaError::MatchAlreadyDecided => write!(f, "Match already has a winner or was canceled"),
            ArenaError::ByeMatch => write!(f, "Byes advance automatically"),
            ArenaError::WinnerNotInFight => write!(f, "Declared winner is not in this fight"),
        }
    }
}

/// Full arena state: roster, rotation queue, in-flight fights, result history,
/// and the current bracket round (0 = no bracket running).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Arena {
    pub players: Vec<Player>,
    /// Matchmaking order: front = next side-A draw. Each id appears at most once.
    pub queue: Vec<PlayerId>,
    /// Proposed fights awaiting a result. No player appears in more than one.
    pub in_flight: Vec<Fight>,
    /// Resolved fights, most-recent-first.
    pub results: Vec<FightResult>,
    /// Current bracket round number; 0 when no bracket is running.
    pub bracket_round: u32,
    /// Matches of the current bracket round.
    pub bracket_matches: Vec<BracketMatch>,
}

impl Arena {
    /// Empty arena: no players, empty queue and history.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Register a new player and append them to the rotation queue.
    /// Nicknames are trimmed and must be unique case-insensitively; the
    /// loadout must match the role (present iff DPS, weapons from the
    /// catalog of the chosen style).
    pub fn register(
        &mut self,
        nickname: impl Into<String>,
        role: Role,
        loadout: Option<Loadout>,
        level: Level,
    ) -> Result<PlayerId, ArenaError> {
        let nickname = nickname.into();
        let trimmed = nickname.trim();
        if trimmed.is_empty() {
            return Err(ArenaError::InvalidNickname);
        }
        let is_duplicate = self
            .players
            .iter()
            .any(|p| p.nickname.eq_ignore_ascii_case(trimmed));
        if is_duplicate {
            return Err(ArenaError::DuplicateNickname);
        }
        match (role, &loadout) {
            (Role::Dps, None) => return Err(ArenaError::MissingLoadout),
            (Role::Dps, Some(l)) => validate_loadout(l)?,
            (_, Some(_)) => return Err(ArenaError::UnexpectedLoadout),
            (_, None) => {}
        }
        let player = Player::new(trimmed, role, loadout, level);
        let id = player.id;
        self.players.push(player);
        self.enqueue(id);
        Ok(id)
    }

    /// Flip a player's activity flag. Deactivated players stay in the roster
    /// and queue but are skipped by pairing; the caller must abandon any
    /// in-flight fight they are part of.
    pub fn set_active(&mut self, id: PlayerId, active: bool) -> Result<(), ArenaError> {
        let p = self.get_player_mut(id).ok_or(ArenaError::PlayerNotFound(id))?;
        p.active = active;
        Ok(())
    }

    /// Remove a player from the roster and the queue. The caller must abandon
    /// any in-flight fight they are part of.
    pub fn remove(&mut self, id: PlayerId) -> Result<(), ArenaError> {
        let idx = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or(ArenaError::PlayerNotFound(id))?;
        self.players.remove(idx);
        self.dequeue(id);
        Ok(())
    }

    /// Apply a decided fight to the roster: bump counters, cross-push the
    /// recent-opponent histories, stamp both last-played times.
    pub fn record_result(&mut self, winner_id: PlayerId, loser_id: PlayerId) -> Result<(), ArenaError> {
        let now = Utc::now();
        self.record_result_at(winner_id, loser_id, now)
    }

    /// `record_result` with an explicit timestamp (tests pin the clock).
    pub fn record_result_at(
        &mut self,
        winner_id: PlayerId,
        loser_id: PlayerId,
        now: DateTime<Utc>,
    ) -> Result<(), ArenaError> {
        // Check the loser exists before touching the winner (no partial updates).
        if self.get_player(loser_id).is_none() {
            return Err(ArenaError::PlayerNotFound(loser_id));
        }
        let w = self
            .get_player_mut(winner_id)
            .ok_or(ArenaError::PlayerNotFound(winner_id))?;
        w.add_win();
        w.remember_opponent(loser_id);
        w.last_played = Some(now);
        let l = self
            .get_player_mut(loser_id)
            .ok_or(ArenaError::PlayerNotFound(loser_id))?;
        l.add_loss();
        l.remember_opponent(winner_id);
        l.last_played = Some(now);
        Ok(())
    }

    /// Append to the queue if not already present.
    pub fn enqueue(&mut self, id: PlayerId) {
        if !self.queue.contains(&id) {
            self.queue.push(id);
        }
    }

    /// Remove from the queue wherever it is.
    pub fn dequeue(&mut self, id: PlayerId) {
        self.queue.retain(|&q| q != id);
    }

    /// Rotate a decided pair to the back: winner first, then loser. Everyone
    /// else keeps their relative order, so nobody plays twice while others
    /// are still waiting.
    pub fn requeue_after_result(&mut self, winner_id: PlayerId, loser_id: PlayerId) {
        self.dequeue(winner_id);
        self.dequeue(loser_id);
        self.queue.push(winner_id);
        self.queue.push(loser_id);
    }

    /// Replace the queue with all active ids (roster order) followed by all
    /// inactive ids. Explicit reset: prior rotation state is discarded.
    pub fn rebuild_queue_from_roster(&mut self) {
        let mut queue: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.active)
            .map(|p| p.id)
            .collect();
        queue.extend(self.players.iter().filter(|p| !p.active).map(|p| p.id));
        self.queue = queue;
    }

    /// Ids of players currently in an in-flight fight.
    pub fn busy_players(&self) -> Vec<PlayerId> {
        self.in_flight
            .iter()
            .flat_map(|f| [f.side_a, f.side_b])
            .collect()
    }
}

/// Weapon picks must number one or two and belong to the catalog of the style.
fn validate_loadout(loadout: &Loadout) -> Result<(), ArenaError> {
    let n = loadout.weapons.len();
    if n == 0 || n > 2 {
        return Err(ArenaError::WrongWeaponCount { selected: n });
    }
    let catalog = weapon_catalog(loadout.style);
    for w in &loadout.weapons {
        if !catalog.contains(&w.as_str()) {
            return Err(ArenaError::UnknownWeapon(w.clone()));
        }
    }
    Ok(())
}
