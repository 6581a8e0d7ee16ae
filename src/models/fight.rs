//! Fight (proposed 1v1 pairing), FightResult, and BracketMatch for tournament mode.

use crate::models::player::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a fight or bracket match.
pub type FightId = Uuid;

/// A proposed 1v1 pairing, in flight until resolved or abandoned.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Fight {
    pub id: FightId,
    pub side_a: PlayerId,
    pub side_b: PlayerId,
    /// Idempotence key for resolution: a fight's creation time yields at most one result.
    pub created_at: DateTime<Utc>,
}

impl Fight {
    pub fn new(side_a: PlayerId, side_b: PlayerId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            side_a,
            side_b,
            created_at,
        }
    }

    /// Whether the given player is one of the two sides.
    pub fn involves(&self, id: PlayerId) -> bool {
        self.side_a == id || self.side_b == id
    }
}

/// Immutable record of a resolved fight.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FightResult {
    pub fight: Fight,
    pub winner: PlayerId,
    pub loser: PlayerId,
    pub resolved_at: DateTime<Utc>,
}

/// Which side won a bracket match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSide {
    A,
    B,
}

/// A single-elimination bracket match. `side_b == None` denotes a bye
/// (side A advances automatically, no fight is recorded).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: FightId,
    pub round: u32,
    pub side_a: PlayerId,
    pub side_b: Option<PlayerId>,
    pub winner: Option<BracketSide>,
    pub canceled: bool,
}

impl BracketMatch {
    pub fn new(round: u32, side_a: PlayerId, side_b: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            side_a,
            side_b: Some(side_b),
            winner: None,
            canceled: false,
        }
    }

    /// A bye: side A has no opponent and is marked winner immediately.
    pub fn bye(round: u32, side_a: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            side_a,
            side_b: None,
            winner: Some(BracketSide::A),
            canceled: false,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.side_b.is_none()
    }

    /// Decided means a winner is set or the match was canceled.
    pub fn is_decided(&self) -> bool {
        self.canceled || self.winner.is_some()
    }

    /// The advancing player, if any (canceled matches advance nobody).
    pub fn winner_id(&self) -> Option<PlayerId> {
        if self.canceled {
            return None;
        }
        match self.winner? {
            BracketSide::A => Some(self.side_a),
            BracketSide::B => self.side_b,
        }
    }
}
