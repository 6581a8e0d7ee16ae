//! Single-elimination bracket: round generation and advancement.

use crate::models::{Arena, ArenaError, BracketMatch, BracketSide, FightId, PlayerId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Outcome of advancing the bracket.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketProgress {
    /// A new round was generated.
    NextRound(Vec<BracketMatch>),
    /// Zero or one winners remained; the bracket is over. `Some` names the
    /// champion, `None` means every surviving match was canceled.
    Complete(Option<PlayerId>),
}

/// Start round 1 from an explicit participant selection: at least two
/// distinct, known players. Participants are shuffled and consumed in pairs;
/// an odd leftover gets a bye when `allow_bye`, otherwise the call fails and
/// nothing changes.
pub fn start_bracket<R: Rng>(
    arena: &mut Arena,
    participant_ids: &[PlayerId],
    allow_bye: bool,
    rng: &mut R,
) -> Result<(), ArenaError> {
    if participant_ids.len() < 2 {
        return Err(ArenaError::NotEnoughParticipants { required: 2 });
    }
    let mut seen = HashSet::new();
    for &id in participant_ids {
        if !seen.insert(id) {
            return Err(ArenaError::DuplicateParticipant(id));
        }
        if arena.get_player(id).is_none() {
            return Err(ArenaError::PlayerNotFound(id));
        }
    }
    if participant_ids.len() % 2 != 0 && !allow_bye {
        return Err(ArenaError::OddWithoutBye);
    }
    let matches = pair_round(participant_ids.to_vec(), 1, rng);
    arena.bracket_round = 1;
    arena.bracket_matches = matches;
    Ok(())
}

/// Set the winner of a current-round match and record the win/loss into the
/// roster. Byes cannot be decided (they already are), and a decided match
/// cannot be re-decided.
pub fn set_bracket_winner(
    arena: &mut Arena,
    match_id: FightId,
    side: BracketSide,
) -> Result<(), ArenaError> {
    if arena.bracket_round == 0 {
        return Err(ArenaError::NoActiveBracket);
    }
    let m = arena
        .bracket_matches
        .iter()
        .find(|m| m.id == match_id)
        .ok_or(ArenaError::MatchNotFound(match_id))?;
    if m.is_bye() {
        return Err(ArenaError::ByeMatch);
    }
    if m.is_decided() {
        return Err(ArenaError::MatchAlreadyDecided);
    }
    let side_a = m.side_a;
    let side_b = m.side_b.ok_or(ArenaError::ByeMatch)?;
    let (winner_id, loser_id) = match side {
        BracketSide::A => (side_a, side_b),
        BracketSide::B => (side_b, side_a),
    };
    arena.record_result(winner_id, loser_id)?;
    if let Some(m) = arena.bracket_matches.iter_mut().find(|m| m.id == match_id) {
        m.winner = Some(side);
    }
    Ok(())
}

/// Cancel an undecided current-round match. Canceled matches advance nobody.
pub fn cancel_bracket_match(arena: &mut Arena, match_id: FightId) -> Result<(), ArenaError> {
    if arena.bracket_round == 0 {
        return Err(ArenaError::NoActiveBracket);
    }
    let m = arena
        .bracket_matches
        .iter_mut()
        .find(|m| m.id == match_id)
        .ok_or(ArenaError::MatchNotFound(match_id))?;
    if m.is_bye() {
        return Err(ArenaError::ByeMatch);
    }
    if m.is_decided() {
        return Err(ArenaError::MatchAlreadyDecided);
    }
    m.canceled = true;
    Ok(())
}

/// Advance to the next round once every current match has a winner or is
/// canceled. Zero or one remaining winners end the bracket (reported as
/// `Complete`, not an error); otherwise the winners are shuffled and paired
/// for the next round, with an odd leftover getting a bye.
pub fn advance_bracket<R: Rng>(arena: &mut Arena, rng: &mut R) -> Result<BracketProgress, ArenaError> {
    if arena.bracket_round == 0 {
        return Err(ArenaError::NoActiveBracket);
    }
    if !arena.bracket_matches.iter().all(BracketMatch::is_decided) {
        return Err(ArenaError::RoundNotReady);
    }
    let winners: Vec<PlayerId> = arena
        .bracket_matches
        .iter()
        .filter_map(BracketMatch::winner_id)
        .collect();
    if winners.len() <= 1 {
        arena.bracket_round = 0;
        arena.bracket_matches.clear();
        return Ok(BracketProgress::Complete(winners.first().copied()));
    }
    let round = arena.bracket_round + 1;
    let matches = pair_round(winners, round, rng);
    arena.bracket_round = round;
    arena.bracket_matches = matches.clone();
    Ok(BracketProgress::NextRound(matches))
}

/// Shuffle and consume in pairs; an odd leftover becomes a bye with an
/// automatic winner. Byes are never recorded as fights.
fn pair_round<R: Rng>(mut participants: Vec<PlayerId>, round: u32, rng: &mut R) -> Vec<BracketMatch> {
    participants.shuffle(rng);
    let mut matches: Vec<BracketMatch> = participants
        .chunks_exact(2)
        .map(|pair| BracketMatch::new(round, pair[0], pair[1]))
        .collect();
    if let Some(&leftover) = participants.chunks_exact(2).remainder().first() {
        matches.push(BracketMatch::bye(round, leftover));
    }
    matches
}
