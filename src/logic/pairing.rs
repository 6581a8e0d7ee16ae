//! Pairing engine: opponent selection under the Random and Smart policies.
//!
//! Pure selection over the arena state; no mutation. The caller records the
//! returned fight as in-flight (see `logic::lifecycle`).

use crate::models::{Arena, DamageStyle, Fight, Player, PlayerId, Role, RECENT_OPPONENTS_CAP};
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Opponent selection policy.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Uniform pick from the candidate pool (anti-repeat sub-pool preferred).
    Random,
    /// Variety-maximizing heuristic score over all candidates.
    #[default]
    Smart,
}

/// Knobs for both policies.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingOptions {
    /// Draw side A uniformly from the first `top_n` eligible queue entries
    /// instead of always taking the front.
    pub randomize_side_a: bool,
    /// Pool size for the randomized side-A draw; clamped to [2, eligible].
    pub top_n: usize,
    /// Skip (Random) or penalize (Smart) opponents in A's recent window.
    pub avoid_recent_opponents: bool,
    /// How many recent opponents count as "recent"; at most the retention cap.
    pub recent_lookback: usize,
}

impl Default for PairingOptions {
    fn default() -> Self {
        Self {
            randomize_side_a: false,
            top_n: 3,
            avoid_recent_opponents: true,
            recent_lookback: 3,
        }
    }
}

/// Smart-score weights. The recent-opponent penalty is sized to dominate the
/// variety bonuses, making the lookback window a soft exclusion.
const ROLE_MIX_WEIGHT: f64 = 14.0;
const DPS_VARIETY_WEIGHT: f64 = 8.0;
const WEAPON_VARIETY_WEIGHT: f64 = 6.0;
const JITTER_MAX: f64 = 6.0;
const RECENT_OPPONENT_PENALTY: f64 = 35.0;
const RECENCY_PENALTY: f64 = 4.0;
const RECENCY_WINDOW_SECS: i64 = 60;

/// Select the next fight, or `None` when fewer than two eligible players are
/// queued (a routine outcome, not an error).
///
/// Eligible = queued, active, and not part of any in-flight fight. Side A is
/// the queue front, or a uniform draw from the first `top_n` eligible entries
/// when `randomize_side_a` is set. Side B follows the policy.
pub fn select_fight<R: Rng>(
    arena: &Arena,
    policy: Policy,
    options: &PairingOptions,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Option<Fight> {
    let busy: HashSet<PlayerId> = arena.busy_players().into_iter().collect();
    let eligible: Vec<&Player> = arena
        .queue
        .iter()
        .filter_map(|&id| arena.get_player(id))
        .filter(|p| p.active && !busy.contains(&p.id))
        .collect();
    if eligible.len() < 2 {
        return None;
    }

    let a_index = if options.randomize_side_a {
        let top_n = options.top_n.clamp(2, eligible.len());
        rng.gen_range(0..top_n)
    } else {
        0
    };
    let side_a = eligible[a_index];

    let candidates: Vec<&Player> = eligible
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != a_index)
        .map(|(_, p)| *p)
        .collect();

    let lookback = options.recent_lookback.min(RECENT_OPPONENTS_CAP);
    let recent: HashSet<PlayerId> = if options.avoid_recent_opponents {
        side_a.recent_window(lookback).iter().copied().collect()
    } else {
        HashSet::new()
    };

    let side_b = match policy {
        Policy::Random => pick_random(&candidates, &recent, rng)?,
        Policy::Smart => pick_smart(side_a, &candidates, &recent, now, rng)?,
    };

    Some(Fight::new(side_a.id, side_b, now))
}

/// Random policy: prefer the sub-pool outside A's recent window, falling back
/// to the full pool when every candidate is a recent opponent.
fn pick_random<R: Rng>(
    candidates: &[&Player],
    recent: &HashSet<PlayerId>,
    rng: &mut R,
) -> Option<PlayerId> {
    let fresh: Vec<&&Player> = candidates.iter().filter(|p| !recent.contains(&p.id)).collect();
    if fresh.is_empty() {
        candidates.choose(rng).map(|p| p.id)
    } else {
        fresh.choose(rng).map(|p| p.id)
    }
}

/// Smart policy: score every candidate against A; strictly highest score
/// wins, ties keep the first-seen candidate.
fn pick_smart<R: Rng>(
    side_a: &Player,
    candidates: &[&Player],
    recent: &HashSet<PlayerId>,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Option<PlayerId> {
    let mut best: Option<(PlayerId, f64)> = None;
    for c in candidates {
        let score = score_candidate(side_a, c, recent, now, rng);
        match best {
            Some((_, s)) if score <= s => {}
            _ => best = Some((c.id, score)),
        }
    }
    best.map(|(id, _)| id)
}

/// Heuristic variety score for pairing candidate `c` against `a`.
fn score_candidate<R: Rng>(
    a: &Player,
    c: &Player,
    recent: &HashSet<PlayerId>,
    now: DateTime<Utc>,
    rng: &mut R,
) -> f64 {
    let mut score = ROLE_MIX_WEIGHT * f64::from(role_mix(a, c))
        + DPS_VARIETY_WEIGHT * f64::from(dps_variety(a, c))
        + WEAPON_VARIETY_WEIGHT * f64::from(weapon_variety(a, c))
        + rng.gen_range(0.0..JITTER_MAX);
    if recent.contains(&c.id) {
        score -= RECENT_OPPONENT_PENALTY;
    }
    if played_recently(a, now) {
        score -= RECENCY_PENALTY;
    }
    if played_recently(c, now) {
        score -= RECENCY_PENALTY;
    }
    score
}

/// 6 when roles differ, 2 for a same-role mirror (discouraged, not forbidden).
fn role_mix(a: &Player, c: &Player) -> u8 {
    if a.role != c.role {
        6
    } else {
        2
    }
}

/// Only meaningful for two DPS players: 3 when damage styles differ, else 1.
fn dps_variety(a: &Player, c: &Player) -> u8 {
    match (dps_style(a), dps_style(c)) {
        (Some(sa), Some(sc)) if sa != sc => 3,
        (Some(_), Some(_)) => 1,
        _ => 0,
    }
}

/// Only meaningful for two DPS players: size of the symmetric difference of
/// their weapon sets, capped at 3.
fn weapon_variety(a: &Player, c: &Player) -> u8 {
    let (Some(wa), Some(wc)) = (weapon_set(a), weapon_set(c)) else {
        return 0;
    };
    let diff = wa.symmetric_difference(&wc).count();
    diff.min(3) as u8
}

fn dps_style(p: &Player) -> Option<DamageStyle> {
    if p.role != Role::Dps {
        return None;
    }
    p.loadout.as_ref().map(|l| l.style)
}

/// Weapon picks as a set: duplicated legacy picks collapse to one element.
fn weapon_set(p: &Player) -> Option<HashSet<&str>> {
    if p.role != Role::Dps {
        return None;
    }
    p.loadout
        .as_ref()
        .map(|l| l.weapons.iter().map(String::as_str).collect())
}

/// Whether the player fought within the last `RECENCY_WINDOW_SECS`.
fn played_recently(p: &Player, now: DateTime<Utc>) -> bool {
    match p.last_played {
        Some(t) => now.signed_duration_since(t) < Duration::seconds(RECENCY_WINDOW_SECS),
        None => false,
    }
}
