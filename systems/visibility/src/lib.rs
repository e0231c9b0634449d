#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Visibility tracking for Fog Forage.
//!
//! Every pass stamps the cells inside the square window around the player with
//! the next move counter and records items that enter the window for the
//! first time. A cell is currently visible exactly when its stamp equals the
//! state's move counter.

use fog_forage_core::{Event, GameState, Position};

/// Square window of cells centred on a position.
///
/// The origin may lie outside the world; such slots simply map to no cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    origin_x: i64,
    origin_y: i64,
    side: u32,
}

impl Window {
    /// Creates a window of `side` cells centred on `center`.
    #[must_use]
    pub fn centered(center: Position, side: u32) -> Self {
        let half = i64::from(side / 2);
        Self {
            origin_x: i64::from(center.x()) - half,
            origin_y: i64::from(center.y()) - half,
            side,
        }
    }

    /// Window currently surrounding the player.
    #[must_use]
    pub fn around_player(state: &GameState) -> Self {
        Self::centered(state.player, state.visible_grid)
    }

    /// Side length of the window in cells.
    #[must_use]
    pub const fn side(&self) -> u32 {
        self.side
    }

    /// World position of the slot at `column`, `row` inside the window.
    ///
    /// Returns `None` for slots beyond the window or with negative world
    /// coordinates. The world's upper bound is not checked.
    #[must_use]
    pub fn slot(&self, column: u32, row: u32) -> Option<Position> {
        if column >= self.side || row >= self.side {
            return None;
        }
        let x = u32::try_from(self.origin_x + i64::from(column)).ok()?;
        let y = u32::try_from(self.origin_y + i64::from(row)).ok()?;
        Some(Position::new(x, y))
    }

    /// Reports whether the position falls inside the window.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        let x = i64::from(position.x()) - self.origin_x;
        let y = i64::from(position.y()) - self.origin_y;
        let side = i64::from(self.side);
        (0..side).contains(&x) && (0..side).contains(&y)
    }

    /// In-bounds cells of the window in row-major order.
    pub fn cells(self, world_size: u32) -> impl Iterator<Item = Position> {
        let side = self.side;
        (0..side)
            .flat_map(move |row| (0..side).map(move |column| (column, row)))
            .filter_map(move |(column, row)| self.slot(column, row))
            .filter(move |position| position.within(world_size))
    }
}

/// In-bounds cells currently inside the player's window.
pub fn visible_window(state: &GameState) -> impl Iterator<Item = Position> {
    Window::around_player(state).cells(state.world_size)
}

/// Applies one visibility pass and returns the updated state.
#[must_use]
pub fn update_visibility(state: &GameState) -> GameState {
    let mut discarded = Vec::new();
    reveal(state, &mut discarded)
}

/// Applies one visibility pass, reporting newly sighted items as events.
#[must_use]
pub fn reveal(state: &GameState, out_events: &mut Vec<Event>) -> GameState {
    let mut next = state.clone();
    apply_pass(&mut next, out_events);
    next
}

/// Applies one visibility pass in place to a successor state under construction.
pub fn apply_pass(state: &mut GameState, out_events: &mut Vec<Event>) {
    let move_counter = state.move_counter + 1;
    let window = Window::around_player(state);

    for cell in window.cells(state.world_size) {
        state.visited.mark(cell, move_counter);
        if state.item_at(cell).is_some() && state.seen_items.insert(cell) {
            out_events.push(Event::ItemSighted { position: cell });
        }
    }

    state.move_counter = move_counter;
}
