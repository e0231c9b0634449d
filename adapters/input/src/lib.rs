#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Input decoding shared by Fog Forage adapters.
//!
//! Adapters capture raw key names and pointer positions from whatever
//! windowing or terminal layer they run on, then use this crate to turn them
//! into [`Command`] values. Drag and swipe gestures resolve to the dominant
//! axis once they travel far enough, so diagonal input never reaches the
//! session.

use fog_forage_core::{Command, Direction, GamePhase};
use glam::Vec2;

/// Minimum pointer travel, in screen units, for a drag to count as a move.
pub const DEFAULT_SWIPE_THRESHOLD: f32 = 35.0;

/// Player intent decoded from a single input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// Step one cell in the provided direction.
    Move(Direction),
    /// Start over with a new world.
    Restart,
}

impl InputAction {
    /// Converts the action into the command submitted to the session.
    #[must_use]
    pub const fn into_command(self) -> Command {
        match self {
            Self::Move(direction) => Command::Move { direction },
            Self::Restart => Command::Restart,
        }
    }
}

/// Direction bound to a key name, ignoring case.
///
/// Recognises `w`/`a`/`s`/`d` and the `ArrowUp`/`ArrowLeft`/`ArrowDown`/`ArrowRight`
/// names.
#[must_use]
pub fn direction_for_key(key: &str) -> Option<Direction> {
    match key.to_ascii_lowercase().as_str() {
        "w" | "arrowup" => Some(Direction::North),
        "s" | "arrowdown" => Some(Direction::South),
        "a" | "arrowleft" => Some(Direction::West),
        "d" | "arrowright" => Some(Direction::East),
        _ => None,
    }
}

/// Reports whether the key requests a restart.
#[must_use]
pub fn is_restart_key(key: &str) -> bool {
    key == " " || matches!(key.to_ascii_lowercase().as_str(), "r" | "space")
}

/// Decodes a key press for a session in the provided phase.
///
/// Once the session has ended only the restart keys produce an action.
#[must_use]
pub fn action_for_key(key: &str, phase: GamePhase) -> Option<InputAction> {
    if is_restart_key(key) {
        return Some(InputAction::Restart);
    }
    if phase.is_terminal() {
        return None;
    }
    direction_for_key(key).map(InputAction::Move)
}

/// Resolves a drag vector into a direction along its dominant axis.
///
/// Returns `None` until either axis reaches `threshold`. Ties favour the
/// vertical axis.
#[must_use]
pub fn swipe_direction(delta: Vec2, threshold: f32) -> Option<Direction> {
    let magnitude = delta.abs();
    if magnitude.x < threshold && magnitude.y < threshold {
        return None;
    }

    let direction = if magnitude.x > magnitude.y {
        if delta.x > 0.0 {
            Direction::East
        } else {
            Direction::West
        }
    } else if delta.y > 0.0 {
        Direction::South
    } else {
        Direction::North
    };
    Some(direction)
}

/// Tracks a touch or mouse drag from press to release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwipeTracker {
    threshold: f32,
    start: Option<Vec2>,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}

impl SwipeTracker {
    /// Creates a tracker that requires `threshold` units of travel.
    #[must_use]
    pub const fn new(threshold: f32) -> Self {
        Self {
            threshold,
            start: None,
        }
    }

    /// Minimum travel required for a gesture to count.
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Reports whether a press is awaiting its release.
    #[must_use]
    pub const fn is_tracking(&self) -> bool {
        self.start.is_some()
    }

    /// Records where the pointer went down, replacing any unfinished gesture.
    pub fn begin(&mut self, point: Vec2) {
        self.start = Some(point);
    }

    /// Completes the gesture at the release point.
    ///
    /// The tracker resets whether or not the gesture produced a direction.
    pub fn end(&mut self, point: Vec2) -> Option<Direction> {
        let start = self.start.take()?;
        swipe_direction(point - start, self.threshold)
    }

    /// Abandons the current gesture.
    pub fn cancel(&mut self) {
        self.start = None;
    }
}
