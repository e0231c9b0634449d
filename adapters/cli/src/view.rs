//! Plain-text presentation of the session.

use fog_forage_core::{Event, GamePhase, GameState, MoveRejection, Terrain};
use fog_forage_world::query::{self, Outcome, WindowCell};

const PLAYER_GLYPH: char = '@';
const ITEM_GLYPH: char = '*';
const OBSTACLE_GLYPH: char = '#';
const FLOOR_GLYPH: char = '.';
const VOID_GLYPH: char = ' ';

/// Heads-up line summarising the player's resources.
pub(crate) fn status_line(state: &GameState) -> String {
    format!(
        "energy {}/{}  score {}  items left {}  {}",
        state.energy,
        state.max_energy,
        state.score,
        state.remaining_items(),
        phase_label(state.phase),
    )
}

/// The player's local view, one text row per window row.
pub(crate) fn render_window(state: &GameState) -> String {
    let cells = query::visible_cells(state);
    let side = usize::try_from(state.visible_grid).unwrap_or(1).max(1);

    let mut rendered = String::with_capacity(cells.len() * 2 + side);
    for row in cells.chunks(side) {
        let line: Vec<String> = row.iter().map(|cell| glyph(cell).to_string()).collect();
        rendered.push_str(line.join(" ").trim_end());
        rendered.push('\n');
    }
    rendered
}

fn glyph(cell: &WindowCell) -> char {
    if cell.player {
        PLAYER_GLYPH
    } else if cell.item {
        ITEM_GLYPH
    } else {
        match cell.terrain {
            Some(Terrain::Obstacle) => OBSTACLE_GLYPH,
            Some(Terrain::Empty) => FLOOR_GLYPH,
            None => VOID_GLYPH,
        }
    }
}

/// Message announcing an event, or `None` for events the status line covers.
pub(crate) fn describe(event: &Event) -> Option<String> {
    let message = match event {
        Event::SessionStarted { player, items } => {
            format!("A new world with {items} items; you start at {player}.")
        }
        Event::PlayerMoved { .. } => return None,
        Event::MoveRejected { reason, .. } => rejection_message(*reason).to_owned(),
        Event::ItemSighted { position } => format!("You spot something at {position}."),
        Event::ItemCollected { item, energy, .. } => {
            format!("Collected {item}; energy is now {energy}.")
        }
        Event::PhaseChanged { phase } => match phase {
            GamePhase::Won => "Every item is collected. You win!".to_owned(),
            GamePhase::Lost => "You ran out of energy.".to_owned(),
            GamePhase::Playing => return None,
        },
    };
    Some(message)
}

fn rejection_message(reason: MoveRejection) -> &'static str {
    match reason {
        MoveRejection::Exhausted => "You are too tired to move.",
        MoveRejection::GameOver => "The game is over; press r to play again.",
        MoveRejection::NotAxisAligned => "You can only step one cell at a time.",
        MoveRejection::OutOfBounds => "The world ends here.",
        MoveRejection::Obstacle => "Something blocks the way.",
    }
}

/// Final summary of a finished session.
pub(crate) fn outcome_line(outcome: &Outcome) -> String {
    format!(
        "{}: final score {} with {} items left",
        phase_label(outcome.phase),
        outcome.score,
        outcome.remaining_items,
    )
}

fn phase_label(phase: GamePhase) -> &'static str {
    match phase {
        GamePhase::Playing => "playing",
        GamePhase::Won => "won",
        GamePhase::Lost => "lost",
    }
}
