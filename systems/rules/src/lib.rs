#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement, resource, and win/lose rules for Fog Forage.
//!
//! A move request either produces a brand new [`GameState`] or is ignored.
//! Ignored requests are not failures: the caller keeps the state it already
//! holds, and the event path reports a [`MoveRejection`] explaining why.

use fog_forage_core::{
    Direction, Event, GamePhase, GameState, MoveRejection, Position, ITEM_ENERGY_BONUS,
    ITEM_SCORE, MOVE_ENERGY_COST,
};
use fog_forage_system_visibility::apply_pass;

/// Applies a move and returns the resulting state.
///
/// Rejected moves return a state equal to the input.
#[must_use]
pub fn move_player(state: &GameState, dx: i32, dy: i32) -> GameState {
    let mut discarded = Vec::new();
    try_move(state, dx, dy, &mut discarded).unwrap_or_else(|| state.clone())
}

/// Applies a move in the provided direction and returns the resulting state.
#[must_use]
pub fn step(state: &GameState, direction: Direction) -> GameState {
    let (dx, dy) = direction.delta();
    move_player(state, dx, dy)
}

/// Attempts a move, reporting what happened through `out_events`.
///
/// Returns `None` when the move is ignored; a single
/// [`Event::MoveRejected`] is emitted in that case. Accepted moves emit
/// [`Event::PlayerMoved`], then any [`Event::ItemSighted`], then
/// [`Event::ItemCollected`] and [`Event::PhaseChanged`] when they apply.
pub fn try_move(
    state: &GameState,
    dx: i32,
    dy: i32,
    out_events: &mut Vec<Event>,
) -> Option<GameState> {
    let destination = match check_move(state, dx, dy) {
        Ok(destination) => destination,
        Err(reason) => {
            out_events.push(Event::MoveRejected { dx, dy, reason });
            return None;
        }
    };

    let mut next = state.clone();
    next.player = destination;
    next.energy = next.energy.saturating_sub(MOVE_ENERGY_COST);
    out_events.push(Event::PlayerMoved {
        from: state.player,
        to: destination,
        energy: next.energy,
    });

    apply_pass(&mut next, out_events);
    collect_item(&mut next, destination, out_events);
    resolve_phase(&mut next, out_events);
    Some(next)
}

/// Validates a move without applying it, returning the destination cell.
pub fn check_move(state: &GameState, dx: i32, dy: i32) -> Result<Position, MoveRejection> {
    if !state.is_playing() {
        return Err(MoveRejection::GameOver);
    }
    if state.energy == 0 {
        return Err(MoveRejection::Exhausted);
    }

    let direction = Direction::from_delta(dx, dy).ok_or(MoveRejection::NotAxisAligned)?;
    let destination = state
        .player
        .step(direction)
        .filter(|cell| cell.within(state.world_size))
        .ok_or(MoveRejection::OutOfBounds)?;

    if !state.world.is_walkable(destination) {
        return Err(MoveRejection::Obstacle);
    }
    Ok(destination)
}

fn collect_item(state: &mut GameState, position: Position, out_events: &mut Vec<Event>) {
    let Some(index) = state.items.iter().position(|item| item.position == position) else {
        return;
    };

    let item = state.items.remove(index);
    let _ = state.seen_items.remove(&position);
    state.energy = state
        .energy
        .saturating_add(ITEM_ENERGY_BONUS)
        .min(state.max_energy);
    state.score = state.score.saturating_add(ITEM_SCORE);

    out_events.push(Event::ItemCollected {
        item: item.id,
        position,
        score: state.score,
        energy: state.energy,
    });
}

fn resolve_phase(state: &mut GameState, out_events: &mut Vec<Event>) {
    // Collecting the last item on the move that drains the final energy wins.
    let phase = if state.items.is_empty() {
        GamePhase::Won
    } else if state.energy == 0 {
        GamePhase::Lost
    } else {
        return;
    };

    state.phase = phase;
    out_events.push(Event::PhaseChanged { phase });
}
