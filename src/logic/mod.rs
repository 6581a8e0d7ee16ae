//! Matchmaking business logic: pairing, fight lifecycle, brackets.

mod bracket;
mod lifecycle;
mod pairing;

pub use bracket::{
    advance_bracket, cancel_bracket_match, set_bracket_winner, start_bracket, BracketProgress,
};
pub use lifecycle::{
    abandon_fight, abandon_fights_involving, propose_fight, resolve_fight, resolve_fight_at,
};
pub use pairing::{select_fight, PairingOptions, Policy};
