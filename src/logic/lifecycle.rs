//! Fight lifecycle: propose, resolve (exactly once), abandon.

use crate::logic::pairing::{select_fight, PairingOptions, Policy};
use crate::models::{Arena, ArenaError, Fight, FightId, FightResult, PlayerId};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Select the next fight and record it as in-flight. Returns `None` when no
/// pairing is possible (fewer than two eligible players).
pub fn propose_fight<R: Rng>(
    arena: &mut Arena,
    policy: Policy,
    options: &PairingOptions,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Option<Fight> {
    let fight = select_fight(arena, policy, options, now, rng)?;
    arena.in_flight.push(fight.clone());
    Some(fight)
}

/// Resolve a fight exactly once: bump roster stats, rotate both players to
/// the back of the queue (winner first), prepend the result to history, and
/// drop the fight from the in-flight set.
///
/// A result already recorded for this fight's creation time makes the call a
/// silent no-op — mirrored tabs are expected to race on resolution, so the
/// duplicate is dropped, not reported.
pub fn resolve_fight(arena: &mut Arena, fight: &Fight, winner_id: PlayerId) -> Result<(), ArenaError> {
    resolve_fight_at(arena, fight, winner_id, Utc::now())
}

/// `resolve_fight` with an explicit resolution time (tests pin the clock).
pub fn resolve_fight_at(
    arena: &mut Arena,
    fight: &Fight,
    winner_id: PlayerId,
    now: DateTime<Utc>,
) -> Result<(), ArenaError> {
    if arena
        .results
        .iter()
        .any(|r| r.fight.created_at == fight.created_at)
    {
        // Already applied by an earlier call (possibly from another tab).
        arena.in_flight.retain(|f| f.id != fight.id);
        return Ok(());
    }
    if !fight.involves(winner_id) {
        return Err(ArenaError::WinnerNotInFight);
    }
    let loser_id = if fight.side_a == winner_id {
        fight.side_b
    } else {
        fight.side_a
    };

    arena.record_result_at(winner_id, loser_id, now)?;
    arena.requeue_after_result(winner_id, loser_id);
    arena.results.insert(
        0,
        FightResult {
            fight: fight.clone(),
            winner: winner_id,
            loser: loser_id,
            resolved_at: now,
        },
    );
    arena.in_flight.retain(|f| f.id != fight.id);
    Ok(())
}

/// Discard an in-flight fight without resolving it. No other state changes.
pub fn abandon_fight(arena: &mut Arena, fight_id: FightId) {
    arena.in_flight.retain(|f| f.id != fight_id);
}

/// Abandon every in-flight fight involving the given player. Used when a
/// participant is removed or deactivated.
pub fn abandon_fights_involving(arena: &mut Arena, player_id: PlayerId) {
    arena.in_flight.retain(|f| !f.involves(player_id));
}
