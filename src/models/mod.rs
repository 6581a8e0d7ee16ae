//! Data structures for the arena: players, fights, brackets, and state.

mod arena;
mod fight;
mod player;

pub use arena::{Arena, ArenaError};
pub use fight::{BracketMatch, BracketSide, Fight, FightId, FightResult};
pub use player::{
    weapon_catalog, DamageStyle, Level, Loadout, Player, PlayerId, Role, MELEE_WEAPONS,
    RANGED_WEAPONS, RECENT_OPPONENTS_CAP,
};
