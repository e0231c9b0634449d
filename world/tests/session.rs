use fog_forage_core::{
    Command, Direction, Event, GamePhase, GameState, Item, ItemId, Position, Terrain, WorldGrid,
};
use fog_forage_system_generation::GenerationConfig;
use fog_forage_system_visibility::update_visibility;
use fog_forage_world::{
    self as world, create_session,
    query::{self, CellVisibility, Outcome},
    Session, SessionConfig,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn seeded_config(seed: u64) -> SessionConfig {
    SessionConfig {
        seed: Some(seed),
        ..SessionConfig::default()
    }
}

fn corridor_state(energy: u32) -> GameState {
    let world = WorldGrid::from_obstacles(6, [Position::new(2, 1)]);
    let items = vec![
        Item::new(ItemId::new(0), Position::new(3, 2)),
        Item::new(ItemId::new(1), Position::new(5, 5)),
    ];
    update_visibility(&GameState::new(
        world,
        items,
        Position::new(2, 2),
        energy,
        100,
        3,
    ))
}

#[test]
fn new_session_is_prerevealed() {
    let session = Session::new(seeded_config(0xfeed)).expect("session");
    let state = query::state(&session);

    assert_eq!(state.energy, 50);
    assert_eq!(state.max_energy, 100);
    assert_eq!(state.score, 0);
    assert_eq!(state.move_counter, 1);
    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.world_size, 50);
    assert_eq!(state.visible_grid, 3);
    assert_eq!(state.items.len(), 250);
    assert!(state.visited.is_visible(state.player, 1));
}

#[test]
fn free_function_matches_session_construction() {
    let config = seeded_config(77);
    let mut rng = ChaCha8Rng::seed_from_u64(77);
    let state = create_session(&config, &mut rng).expect("state");
    let session = Session::new(config).expect("session");

    assert_eq!(&state, session.state());
}

#[test]
fn restart_resets_every_counter() {
    let mut session = Session::new(seeded_config(21)).expect("session");
    for direction in [Direction::North, Direction::East, Direction::South, Direction::West] {
        let (dx, dy) = direction.delta();
        let _ = session.move_player(dx, dy);
    }

    let state = session.restart().expect("restart");
    assert_eq!(state.energy, 50);
    assert_eq!(state.score, 0);
    assert_eq!(state.move_counter, 1);
    assert_eq!(state.phase, GamePhase::Playing);
    assert!(state.seen_items.iter().all(|position| state.item_at(*position).is_some()));
}

#[test]
fn restart_draws_a_new_world() {
    let mut session = Session::new(seeded_config(8)).expect("session");
    let before = session.state().clone();
    let after = session.restart().expect("restart").clone();
    assert_ne!(before.world, after.world);
}

#[test]
fn terminal_phase_holds_until_restart() {
    let config = seeded_config(2);
    let mut session = Session::from_state(config, corridor_state(1));

    let lost = session.move_player(0, 1).clone();
    assert_eq!(lost.phase, GamePhase::Lost);

    let mut events = Vec::new();
    for direction in Direction::ALL {
        world::apply(&mut session, Command::Move { direction }, &mut events).expect("move");
    }
    assert_eq!(session.state(), &lost, "terminal session accepted a move");
    assert_eq!(events.len(), 4);

    world::apply(&mut session, Command::Restart, &mut events).expect("restart");
    assert_eq!(query::phase(&session), GamePhase::Playing);
}

#[test]
fn rejected_move_keeps_the_exact_state() {
    let mut session = Session::from_state(seeded_config(4), corridor_state(20));
    let before = session.state().clone();

    let after = session.move_player(0, -1).clone();
    assert_eq!(after, before, "moving into rock must be a no-op");

    let diagonal = session.move_player(1, 1).clone();
    assert_eq!(diagonal, before, "diagonal input is not a move");
}

#[test]
fn fog_classification_tracks_the_window() {
    let mut session = Session::from_state(seeded_config(4), corridor_state(20));
    let _ = session.move_player(0, 1);
    let _ = session.move_player(0, 1);
    let state = query::state(&session);

    assert_eq!(
        query::cell_visibility(state, Position::new(2, 4)),
        CellVisibility::Visible
    );
    assert_eq!(
        query::cell_visibility(state, Position::new(2, 1)),
        CellVisibility::Remembered
    );
    assert_eq!(
        query::cell_visibility(state, Position::new(5, 0)),
        CellVisibility::Unexplored
    );
}

#[test]
fn disclosed_items_only_list_sighted_active_items() {
    let mut session = Session::from_state(seeded_config(4), corridor_state(20));
    assert_eq!(
        query::disclosed_items(query::state(&session)),
        vec![Position::new(3, 2)]
    );

    let mut events = Vec::new();
    world::apply(
        &mut session,
        Command::Move {
            direction: Direction::East,
        },
        &mut events,
    )
    .expect("move");
    assert!(query::disclosed_items(query::state(&session)).is_empty());
    assert!(events.iter().any(|event| matches!(
        event,
        Event::ItemCollected { item, .. } if *item == ItemId::new(0)
    )));
}

#[test]
fn local_view_reports_edges_and_contents() {
    let session = Session::from_state(seeded_config(4), corridor_state(20));
    let cells = query::visible_cells(query::state(&session));

    assert_eq!(cells.len(), 9);
    let centre = cells[4];
    assert!(centre.player);
    assert_eq!(centre.position, Some(Position::new(2, 2)));

    let rock = cells[1];
    assert_eq!(rock.position, Some(Position::new(2, 1)));
    assert_eq!(rock.terrain, Some(Terrain::Obstacle));

    let fruit = cells[5];
    assert!(fruit.item);
    assert_eq!(fruit.terrain, Some(Terrain::Empty));

    let corner = Session::from_state(
        seeded_config(4),
        update_visibility(&GameState::new(
            WorldGrid::empty(4),
            vec![Item::new(ItemId::new(0), Position::new(3, 3))],
            Position::new(0, 0),
            10,
            100,
            3,
        )),
    );
    let edge_cells = query::visible_cells(query::state(&corner));
    assert_eq!(edge_cells[0].position, None);
    assert_eq!(edge_cells[0].terrain, None);
    assert_eq!(edge_cells.iter().filter(|cell| cell.position.is_some()).count(), 4);
}

#[test]
fn outcome_is_reported_only_for_finished_sessions() {
    let mut session = Session::from_state(seeded_config(4), corridor_state(1));
    assert_eq!(query::outcome(query::state(&session)), None);

    let _ = session.move_player(0, 1);
    assert_eq!(
        query::outcome(query::state(&session)),
        Some(Outcome {
            phase: GamePhase::Lost,
            score: 0,
            remaining_items: 2,
        })
    );
}

#[test]
fn small_worlds_can_be_won_by_sweeping() {
    let config = SessionConfig {
        generation: GenerationConfig {
            world_size: 4,
            obstacle_density: 0.0,
            item_density: 0.25,
            ..GenerationConfig::default()
        },
        seed: Some(12),
        ..SessionConfig::default()
    };
    let mut session = Session::new(config).expect("session");

    // Walk to the top-left corner, then sweep row by row.
    for _ in 0..4 {
        let _ = session.move_player(-1, 0);
        let _ = session.move_player(0, -1);
    }
    'sweep: for row in 0..4 {
        let dx = if row % 2 == 0 { 1 } else { -1 };
        for _ in 0..3 {
            if session.state().phase.is_terminal() {
                break 'sweep;
            }
            let _ = session.move_player(dx, 0);
        }
        let _ = session.move_player(0, 1);
    }

    assert_eq!(query::phase(&session), GamePhase::Won);
    assert_eq!(query::score(&session), 40);
    assert_eq!(query::remaining_items(&session), 0);
}
