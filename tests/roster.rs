//! Integration tests for the roster store: registration validation,
//! activation, and removal.

use pvp_arena_web::{Arena, ArenaError, DamageStyle, Level, Loadout, Role};

fn loadout(style: DamageStyle, weapons: &[&str]) -> Option<Loadout> {
    Some(Loadout {
        style,
        weapons: weapons.iter().map(|w| w.to_string()).collect(),
    })
}

#[test]
fn nicknames_are_unique_case_insensitive_and_trimmed() {
    let mut arena = Arena::new();
    arena.register("Shadow", Role::Tank, None, Level::Low).unwrap();

    assert_eq!(
        arena.register("  shadow  ", Role::Healer, None, Level::High),
        Err(ArenaError::DuplicateNickname)
    );
    assert_eq!(
        arena.register("SHADOW", Role::Tank, None, Level::Low),
        Err(ArenaError::DuplicateNickname)
    );
    assert_eq!(
        arena.register("   ", Role::Tank, None, Level::Low),
        Err(ArenaError::InvalidNickname)
    );
    assert_eq!(arena.players.len(), 1);
}

#[test]
fn registration_stores_the_trimmed_nickname() {
    let mut arena = Arena::new();
    let id = arena.register("  Blade  ", Role::Tank, None, Level::Medium).unwrap();
    assert_eq!(arena.get_player(id).unwrap().nickname, "Blade");
}

#[test]
fn dps_requires_a_loadout_and_others_reject_one() {
    let mut arena = Arena::new();
    assert_eq!(
        arena.register("NoKit", Role::Dps, None, Level::Medium),
        Err(ArenaError::MissingLoadout)
    );
    assert_eq!(
        arena.register(
            "ArmedTank",
            Role::Tank,
            loadout(DamageStyle::Melee, &["sword"]),
            Level::Medium
        ),
        Err(ArenaError::UnexpectedLoadout)
    );
}

#[test]
fn weapons_must_come_from_the_catalog_of_the_chosen_style() {
    let mut arena = Arena::new();
    // "bow" is ranged; a melee loadout cannot pick it.
    assert_eq!(
        arena.register(
            "WrongStyle",
            Role::Dps,
            loadout(DamageStyle::Melee, &["bow"]),
            Level::Medium
        ),
        Err(ArenaError::UnknownWeapon("bow".to_string()))
    );
    assert_eq!(
        arena.register(
            "Unarmed",
            Role::Dps,
            loadout(DamageStyle::Ranged, &[]),
            Level::Medium
        ),
        Err(ArenaError::WrongWeaponCount { selected: 0 })
    );
    assert_eq!(
        arena.register(
            "Hoarder",
            Role::Dps,
            loadout(DamageStyle::Ranged, &["fan", "bow", "zither"]),
            Level::Medium
        ),
        Err(ArenaError::WrongWeaponCount { selected: 3 })
    );
    // One or two valid picks are fine.
    arena
        .register("One", Role::Dps, loadout(DamageStyle::Ranged, &["fan"]), Level::Medium)
        .unwrap();
    arena
        .register(
            "Two",
            Role::Dps,
            loadout(DamageStyle::Melee, &["sword", "spear"]),
            Level::Medium,
        )
        .unwrap();
}

#[test]
fn registration_appends_to_the_queue() {
    let mut arena = Arena::new();
    let a = arena.register("A", Role::Tank, None, Level::Medium).unwrap();
    let b = arena.register("B", Role::Healer, None, Level::Medium).unwrap();
    assert_eq!(arena.queue, vec![a, b]);
}

#[test]
fn removal_drops_the_player_from_roster_and_queue() {
    let mut arena = Arena::new();
    let a = arena.register("A", Role::Tank, None, Level::Medium).unwrap();
    let b = arena.register("B", Role::Healer, None, Level::Medium).unwrap();

    arena.remove(a).unwrap();
    assert!(arena.get_player(a).is_none());
    assert_eq!(arena.queue, vec![b]);
    assert_eq!(arena.remove(a), Err(ArenaError::PlayerNotFound(a)));
}

#[test]
fn deactivation_keeps_the_player_in_roster_and_queue() {
    let mut arena = Arena::new();
    let a = arena.register("A", Role::Tank, None, Level::Medium).unwrap();
    arena.set_active(a, false).unwrap();
    assert!(!arena.get_player(a).unwrap().active);
    assert!(arena.queue.contains(&a));
}
