use candy_cascade_core::{CellCoord, Command, Event, SwapRejection};
use candy_cascade_grid::query;
use candy_cascade_system_matching::{find_matches, possible_swaps};
use candy_cascade_system_session::{apply, Session, SessionConfig};

fn session_with(move_limit: u32, seed: u64) -> Session {
    Session::new(SessionConfig {
        move_limit,
        seed,
        ..SessionConfig::default()
    })
    .expect("valid session")
}

fn swap(from: (i32, i32), to: (i32, i32)) -> Command {
    Command::RequestSwap {
        from: CellCoord::new(from.0, from.1),
        to: CellCoord::new(to.0, to.1),
    }
}

#[test]
fn new_session_deals_a_stable_full_grid() {
    let session = session_with(100, 3);

    assert!(session.grid().is_full());
    assert!(find_matches(query::grid_view(session.grid())).is_empty());
    assert_eq!(session.grid_info().cells().len(), 64);
    assert_eq!(session.grid_info().width(), 512.0);

    let state = session.current_state();
    assert_eq!(state.move_count, 0);
    assert_eq!(state.score, 0);
    assert!(!state.is_game_over);
    assert_eq!(state.moves_remaining(), 100);
}

#[test]
fn move_limit_ends_the_game() {
    let mut session = session_with(3, 11);
    let mut events = Vec::new();

    for _ in 0..3 {
        events.clear();
        apply(&mut session, swap((0, 0), (1, 0)), &mut events);
        assert!(matches!(events.first(), Some(Event::SwapAccepted { .. })));
    }

    let state = session.current_state();
    assert_eq!(state.move_count, 3);
    assert!(state.is_game_over);
    assert_eq!(
        events.last(),
        Some(&Event::GameOver {
            move_count: 3,
            score: state.score,
        })
    );

    events.clear();
    apply(&mut session, swap((0, 0), (1, 0)), &mut events);
    assert_eq!(
        events,
        vec![Event::SwapRejected {
            from: CellCoord::new(0, 0),
            to: CellCoord::new(1, 0),
            reason: SwapRejection::GameOver,
        }]
    );
    assert_eq!(session.current_state().move_count, 3);
}

#[test]
fn rejected_swaps_keep_counters_and_grid() {
    let mut session = session_with(10, 5);
    let before = session.grid().clone();
    let mut events = Vec::new();

    apply(&mut session, swap((0, 0), (-1, 0)), &mut events);
    apply(&mut session, swap((0, 0), (2, 0)), &mut events);

    assert_eq!(events.len(), 2);
    assert!(events
        .iter()
        .all(|event| matches!(event, Event::SwapRejected { .. })));
    assert_eq!(session.grid(), &before);
    assert_eq!(session.current_state().move_count, 0);
}

#[test]
fn productive_swap_emits_an_ordered_timeline() {
    let (mut session, from, to) = (0..64)
        .find_map(|seed| {
            let session = session_with(100, seed);
            let pair = possible_swaps(query::grid_view(session.grid()))
                .first()
                .copied();
            pair.map(|(from, to)| (session, from, to))
        })
        .expect("some seed deals a playable grid");
    let mut events = Vec::new();

    apply(&mut session, Command::RequestSwap { from, to }, &mut events);

    assert_eq!(
        events[0],
        Event::SwapAccepted {
            from,
            to,
            move_number: 1,
        }
    );
    assert!(matches!(events[1], Event::MatchesFound { round: 0, .. }));
    assert!(matches!(events[2], Event::CellsCleared { round: 0, .. }));

    let settled = events
        .iter()
        .position(|event| matches!(event, Event::ResolutionSettled { .. }))
        .expect("resolution settles");
    let Event::ResolutionSettled { rounds, removed } = &events[settled] else {
        unreachable!();
    };
    let spawned = events
        .iter()
        .filter(|event| matches!(event, Event::PieceSpawned { .. }))
        .count();
    assert!(*rounds >= 1);
    assert_eq!(*removed as usize, spawned);

    let state = session.current_state();
    assert_eq!(
        events[settled + 1],
        Event::ScoreChanged {
            delta: state.score,
            score: state.score,
        }
    );
    assert_eq!(state.score % 60, 0);
    assert!(state.score >= 60);
    assert!(find_matches(query::grid_view(session.grid())).is_empty());
}

#[test]
fn restart_deals_a_new_grid_and_resets_counters() {
    let mut session = session_with(2, 1);
    let mut events = Vec::new();
    apply(&mut session, swap((0, 0), (1, 0)), &mut events);
    apply(&mut session, swap((0, 0), (1, 0)), &mut events);
    assert!(session.current_state().is_game_over);

    events.clear();
    apply(&mut session, Command::Restart { seed: 99 }, &mut events);

    assert_eq!(
        events,
        vec![Event::SessionStarted {
            columns: 8,
            rows: 8,
            move_limit: 2,
        }]
    );
    let state = session.current_state();
    assert_eq!(state.move_count, 0);
    assert_eq!(state.score, 0);
    assert!(!state.is_game_over);
    assert_eq!(session.config().seed, 99);
    assert_eq!(session.grid(), session_with(2, 99).grid());
}
