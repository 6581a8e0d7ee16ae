//! Integration tests for the fight lifecycle: exactly-once resolution,
//! rotation fairness, history bookkeeping, and abandonment.

use chrono::Utc;
use pvp_arena_web::{
    abandon_fight, propose_fight, resolve_fight, resolve_fight_at, ArenaError, Fight, Level,
    PairingOptions, PlayerId, Policy, Role,
};
use pvp_arena_web::{Arena, RECENT_OPPONENTS_CAP};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn arena_with_tanks(n: usize) -> (Arena, Vec<PlayerId>) {
    let mut arena = Arena::new();
    let ids = (0..n)
        .map(|i| {
            arena
                .register(format!("P{i}"), Role::Tank, None, Level::Medium)
                .unwrap()
        })
        .collect();
    (arena, ids)
}

// Duplicate resolution (a re-click or a mirrored tab racing) must be a
// silent no-op: one result, one win, one loss.
#[test]
fn resolving_twice_applies_exactly_once() {
    let (mut arena, ids) = arena_with_tanks(2);
    let (a, b) = (ids[0], ids[1]);
    let fight = Fight::new(a, b, Utc::now());
    arena.in_flight.push(fight.clone());

    resolve_fight(&mut arena, &fight, a).unwrap();
    resolve_fight(&mut arena, &fight, a).unwrap();
    // Even a conflicting winner claim after the fact is dropped.
    resolve_fight(&mut arena, &fight, b).unwrap();

    assert_eq!(arena.results.len(), 1);
    assert_eq!(arena.results[0].winner, a);
    let pa = arena.get_player(a).unwrap();
    let pb = arena.get_player(b).unwrap();
    assert_eq!((pa.wins, pa.losses), (1, 0));
    assert_eq!((pb.wins, pb.losses), (0, 1));
    assert!(arena.in_flight.is_empty());
}

// Winner then loser rotate to the back; everyone else keeps relative order.
#[test]
fn resolution_requeues_winner_before_loser() {
    let (mut arena, ids) = arena_with_tanks(5);
    let (a, b) = (ids[0], ids[1]);
    let fight = Fight::new(a, b, Utc::now());
    arena.in_flight.push(fight.clone());

    resolve_fight(&mut arena, &fight, b).unwrap();

    assert_eq!(arena.queue, vec![ids[2], ids[3], ids[4], b, a]);
}

#[test]
fn resolution_updates_histories_most_recent_first() {
    let (mut arena, ids) = arena_with_tanks(3);
    let (a, b, c) = (ids[0], ids[1], ids[2]);

    // Distinct creation times: the idempotence guard keys on them.
    let base = Utc::now();
    let first = Fight::new(a, b, base);
    arena.in_flight.push(first.clone());
    resolve_fight(&mut arena, &first, a).unwrap();

    let second = Fight::new(a, c, base + chrono::Duration::seconds(1));
    arena.in_flight.push(second.clone());
    resolve_fight(&mut arena, &second, c).unwrap();

    let pa = arena.get_player(a).unwrap();
    assert_eq!(pa.recent_opponents, vec![c, b]);
    assert!(pa.last_played.is_some());
    assert_eq!(arena.results[0].fight.id, second.id);
    assert_eq!(arena.results[1].fight.id, first.id);
}

#[test]
fn recent_opponent_history_is_capped() {
    let (mut arena, ids) = arena_with_tanks(RECENT_OPPONENTS_CAP + 3);
    let a = ids[0];
    let base = Utc::now();
    for (i, &opponent) in ids[1..].iter().enumerate() {
        let fight = Fight::new(a, opponent, base + chrono::Duration::seconds(i as i64));
        arena.in_flight.push(fight.clone());
        resolve_fight(&mut arena, &fight, a).unwrap();
    }
    let pa = arena.get_player(a).unwrap();
    assert_eq!(pa.recent_opponents.len(), RECENT_OPPONENTS_CAP);
    assert_eq!(pa.recent_opponents[0], *ids.last().unwrap());
    assert_eq!(pa.wins, (RECENT_OPPONENTS_CAP + 2) as u32);
}

#[test]
fn declared_winner_must_be_a_participant() {
    let (mut arena, ids) = arena_with_tanks(3);
    let fight = Fight::new(ids[0], ids[1], Utc::now());
    arena.in_flight.push(fight.clone());

    let err = resolve_fight_at(&mut arena, &fight, ids[2], Utc::now());
    assert_eq!(err, Err(ArenaError::WinnerNotInFight));
    // Nothing changed.
    assert!(arena.results.is_empty());
    assert_eq!(arena.in_flight.len(), 1);
    assert_eq!(arena.get_player(ids[0]).unwrap().wins, 0);
}

#[test]
fn abandoned_fight_leaves_no_trace() {
    let (mut arena, ids) = arena_with_tanks(4);
    let queue_before = arena.queue.clone();
    let mut rng = StdRng::seed_from_u64(11);
    let fight = propose_fight(
        &mut arena,
        Policy::Smart,
        &PairingOptions::default(),
        Utc::now(),
        &mut rng,
    )
    .unwrap();
    assert_eq!(arena.in_flight.len(), 1);

    abandon_fight(&mut arena, fight.id);

    assert!(arena.in_flight.is_empty());
    assert!(arena.results.is_empty());
    assert_eq!(arena.queue, queue_before);
    for &id in &ids {
        let p = arena.get_player(id).unwrap();
        assert_eq!((p.wins, p.losses), (0, 0));
        assert!(p.last_played.is_none());
    }
}

// Players of a proposed fight are off-limits until it resolves or is dropped.
#[test]
fn proposed_fight_blocks_its_participants() {
    let (mut arena, _ids) = arena_with_tanks(4);
    let mut rng = StdRng::seed_from_u64(5);
    let opts = PairingOptions::default();

    let first = propose_fight(&mut arena, Policy::Smart, &opts, Utc::now(), &mut rng).unwrap();
    let second = propose_fight(&mut arena, Policy::Smart, &opts, Utc::now(), &mut rng).unwrap();

    for id in [second.side_a, second.side_b] {
        assert!(!first.involves(id));
    }
    // All four players are now busy; a third proposal finds nobody.
    assert!(propose_fight(&mut arena, Policy::Smart, &opts, Utc::now(), &mut rng).is_none());
}

#[test]
fn rebuild_queue_puts_active_before_inactive() {
    let (mut arena, ids) = arena_with_tanks(4);
    arena.set_active(ids[0], false).unwrap();
    arena.set_active(ids[2], false).unwrap();
    // Scramble the rotation first so the rebuild actually resets it.
    arena.requeue_after_result(ids[3], ids[1]);

    arena.rebuild_queue_from_roster();

    assert_eq!(arena.queue, vec![ids[1], ids[3], ids[0], ids[2]]);
}
