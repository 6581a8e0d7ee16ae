//! PvP arena web app: library with models and matchmaking logic.

pub mod logic;
pub mod models;
pub mod storage;

pub use logic::{
    abandon_fight, abandon_fights_involving, advance_bracket, cancel_bracket_match, propose_fight,
    resolve_fight, resolve_fight_at, select_fight, set_bracket_winner, start_bracket,
    BracketProgress, PairingOptions, Policy,
};
pub use models::{
    Arena, ArenaError, BracketMatch, BracketSide, DamageStyle, Fight, FightId, FightResult, Level,
    Loadout, Player, PlayerId, Role, MELEE_WEAPONS, RANGED_WEAPONS, RECENT_OPPONENTS_CAP,
};
pub use storage::{load_snapshot, save_snapshot, Snapshot};
