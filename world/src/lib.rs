#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Fog Forage.
//!
//! A [`Session`] owns the one current [`GameState`] together with the seeded
//! random source used to generate worlds. Adapters submit [`Command`] values
//! through [`apply`] and read everything else through the [`query`] module.

use fog_forage_core::{
    Command, Event, GameState, DEFAULT_MAX_ENERGY, DEFAULT_STARTING_ENERGY, DEFAULT_VISIBLE_GRID,
};
use fog_forage_system_generation::{generate, GenerationConfig, GenerationError};
use fog_forage_system_rules::try_move;
use fog_forage_system_visibility::reveal;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Settings applied whenever a session generates a new world.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// World generation knobs.
    pub generation: GenerationConfig,
    /// Energy granted at the start of every session.
    pub starting_energy: u32,
    /// Energy ceiling.
    pub max_energy: u32,
    /// Side length of the visibility window; must be odd.
    pub visible_grid: u32,
    /// Seed for the world generator; drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            starting_energy: DEFAULT_STARTING_ENERGY,
            max_energy: DEFAULT_MAX_ENERGY,
            visible_grid: DEFAULT_VISIBLE_GRID,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Checks that a session can be built from the configuration.
    pub fn validate(&self) -> Result<(), SessionError> {
        self.generation.validate()?;
        let max = self.max_visible_grid();
        if self.visible_grid == 0 || self.visible_grid % 2 == 0 || self.visible_grid > max {
            return Err(SessionError::InvalidVisibleGrid {
                side: self.visible_grid,
                max,
            });
        }
        if self.starting_energy == 0 || self.starting_energy > self.max_energy {
            return Err(SessionError::InvalidEnergy {
                starting: self.starting_energy,
                max: self.max_energy,
            });
        }
        Ok(())
    }

    /// Widest window allowed; centred on any cell it already spans the world.
    #[must_use]
    pub fn max_visible_grid(&self) -> u32 {
        self.generation
            .world_size
            .saturating_mul(2)
            .saturating_add(1)
    }
}

/// Configuration mistakes detected while building a session.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SessionError {
    /// The visibility window cannot be centred on the player.
    #[error("visible grid side {side} must be odd and lie in 1..={max}")]
    InvalidVisibleGrid {
        /// Rejected side length.
        side: u32,
        /// Widest window allowed for the configured world.
        max: u32,
    },
    /// Starting energy is zero or above the ceiling.
    #[error("starting energy {starting} must lie in 1..={max}")]
    InvalidEnergy {
        /// Requested starting energy.
        starting: u32,
        /// Configured ceiling.
        max: u32,
    },
    /// The world could not be generated.
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Builds a fresh, already revealed state for a new session.
///
/// The player starts with `starting_energy`, zero score, and the visibility
/// window around the start cell revealed, so the move counter is one.
pub fn create_session<R>(config: &SessionConfig, rng: &mut R) -> Result<GameState, SessionError>
where
    R: Rng + ?Sized,
{
    let mut discarded = Vec::new();
    fresh_state(config, rng, &mut discarded)
}

fn fresh_state<R>(
    config: &SessionConfig,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) -> Result<GameState, SessionError>
where
    R: Rng + ?Sized,
{
    config.validate()?;
    let generated = generate(&config.generation, rng)?;
    let unrevealed = GameState::new(
        generated.world,
        generated.items,
        generated.player,
        config.starting_energy,
        config.max_energy,
        config.visible_grid,
    );

    out_events.push(Event::SessionStarted {
        player: unrevealed.player,
        items: unrevealed.remaining_items(),
    });
    Ok(reveal(&unrevealed, out_events))
}

/// Owner of the current game state.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    seed: u64,
    rng: ChaCha8Rng,
    state: GameState,
}

impl Session {
    /// Creates a session with a freshly generated world.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let state = create_session(&config, &mut rng)?;
        info!(
            seed,
            player = %state.player,
            items = state.remaining_items(),
            "session created"
        );
        Ok(Self {
            config,
            seed,
            rng,
            state,
        })
    }

    /// Resumes a session from a previously captured state.
    ///
    /// Restarts draw from the configured seed, or from entropy when none is set.
    #[must_use]
    pub fn from_state(config: SessionConfig, state: GameState) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self {
            config,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            state,
        }
    }

    /// Current state of the session.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Configuration used for restarts.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Seed the session's generator was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Attempts a move and returns the state that results from it.
    pub fn move_player(&mut self, dx: i32, dy: i32) -> &GameState {
        let mut events = Vec::new();
        self.advance(dx, dy, &mut events);
        &self.state
    }

    /// Replaces the session with a brand new world.
    pub fn restart(&mut self) -> Result<&GameState, SessionError> {
        let mut events = Vec::new();
        self.regenerate(&mut events)?;
        Ok(&self.state)
    }

    fn advance(&mut self, dx: i32, dy: i32, out_events: &mut Vec<Event>) {
        let first_new = out_events.len();
        if let Some(next) = try_move(&self.state, dx, dy, out_events) {
            self.state = next;
        }
        for event in &out_events[first_new..] {
            trace_event(event);
        }
    }

    fn regenerate(&mut self, out_events: &mut Vec<Event>) -> Result<(), SessionError> {
        self.state = fresh_state(&self.config, &mut self.rng, out_events)?;
        info!(
            seed = self.seed,
            player = %self.state.player,
            items = self.state.remaining_items(),
            "session restarted"
        );
        Ok(())
    }
}

/// Applies the provided command to the session.
///
/// Moves never fail; ignored moves are reported as [`Event::MoveRejected`].
/// A restart fails only when the configuration cannot produce a world, in
/// which case the previous state is kept.
pub fn apply(
    session: &mut Session,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), SessionError> {
    match command {
        Command::Move { direction } => {
            let (dx, dy) = direction.delta();
            session.advance(dx, dy, out_events);
            Ok(())
        }
        Command::Restart => session.regenerate(out_events),
    }
}

fn trace_event(event: &Event) {
    match event {
        Event::MoveRejected { dx, dy, reason } => {
            debug!(dx, dy, ?reason, "move rejected");
        }
        Event::ItemCollected {
            item,
            score,
            energy,
            ..
        } => {
            debug!(item = %item, score, energy, "item collected");
        }
        Event::PhaseChanged { phase } => {
            info!(?phase, "phase changed");
        }
        _ => {}
    }
}

/// Query functions that provide read-only access to session state.
pub mod query {
    use fog_forage_core::{GamePhase, GameState, Position, Terrain};
    use fog_forage_system_visibility::Window;

    use super::Session;

    /// Provides read-only access to the session's current state.
    #[must_use]
    pub fn state(session: &Session) -> &GameState {
        session.state()
    }

    /// Cell currently occupied by the player.
    #[must_use]
    pub fn player(session: &Session) -> Position {
        session.state.player
    }

    /// Remaining energy.
    #[must_use]
    pub fn energy(session: &Session) -> u32 {
        session.state.energy
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(session: &Session) -> u32 {
        session.state.score
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(session: &Session) -> GamePhase {
        session.state.phase
    }

    /// Number of items still waiting to be collected.
    #[must_use]
    pub fn remaining_items(session: &Session) -> usize {
        session.state.remaining_items()
    }

    /// Fog-of-war classification of a single cell.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub enum CellVisibility {
        /// Never inside the visibility window.
        Unexplored,
        /// Seen earlier but outside the current window; drawn dimmed.
        Remembered,
        /// Inside the current window.
        Visible,
    }

    /// Classifies a cell for the overview map.
    #[must_use]
    pub fn cell_visibility(state: &GameState, position: Position) -> CellVisibility {
        if state.visited.is_visible(position, state.move_counter) {
            CellVisibility::Visible
        } else if state.visited.is_explored(position) {
            CellVisibility::Remembered
        } else {
            CellVisibility::Unexplored
        }
    }

    /// Sighted items that are still waiting to be collected.
    #[must_use]
    pub fn disclosed_items(state: &GameState) -> Vec<Position> {
        state
            .seen_items
            .iter()
            .copied()
            .filter(|position| state.item_at(*position).is_some())
            .collect()
    }

    /// Single slot of the player's local view.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct WindowCell {
        /// Column of the slot inside the window.
        pub column: u32,
        /// Row of the slot inside the window.
        pub row: u32,
        /// World cell behind the slot, or `None` beyond the world edge.
        pub position: Option<Position>,
        /// Terrain of the world cell, if any.
        pub terrain: Option<Terrain>,
        /// Whether an active item lies on the cell.
        pub item: bool,
        /// Whether the player stands on the cell.
        pub player: bool,
    }

    /// Every slot of the player's local view in row-major order.
    #[must_use]
    pub fn visible_cells(state: &GameState) -> Vec<WindowCell> {
        let window = Window::around_player(state);
        let side = window.side();
        let slots = usize::try_from(side).unwrap_or(0);
        let mut cells = Vec::with_capacity(slots.saturating_mul(slots));
        for row in 0..side {
            for column in 0..side {
                let position = window
                    .slot(column, row)
                    .filter(|position| position.within(state.world_size));
                cells.push(WindowCell {
                    column,
                    row,
                    position,
                    terrain: position.and_then(|position| state.world.terrain(position)),
                    item: position.map_or(false, |position| state.item_at(position).is_some()),
                    player: position == Some(state.player),
                });
            }
        }
        cells
    }

    /// Summary shown once a session has ended.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Outcome {
        /// Terminal phase that was reached.
        pub phase: GamePhase,
        /// Final score.
        pub score: u32,
        /// Items left uncollected.
        pub remaining_items: usize,
    }

    /// Terminal summary, or `None` while the session is still running.
    #[must_use]
    pub fn outcome(state: &GameState) -> Option<Outcome> {
        state.phase.is_terminal().then(|| Outcome {
            phase: state.phase,
            score: state.score,
            remaining_items: state.remaining_items(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fog_forage_core::{Direction, GamePhase, Item, ItemId, Position, WorldGrid};
    use fog_forage_system_visibility::update_visibility;

    fn small_config(seed: u64) -> SessionConfig {
        SessionConfig {
            generation: GenerationConfig {
                world_size: 12,
                ..GenerationConfig::default()
            },
            seed: Some(seed),
            ..SessionConfig::default()
        }
    }

    #[test]
    fn even_visible_grid_is_rejected() {
        let config = SessionConfig {
            visible_grid: 4,
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SessionError::InvalidVisibleGrid { side: 4, max: 101 })
        );
    }

    #[test]
    fn window_wider_than_the_world_is_rejected() {
        let oversized = SessionConfig {
            visible_grid: 3_000_000_001,
            ..SessionConfig::default()
        };
        assert_eq!(
            oversized.validate(),
            Err(SessionError::InvalidVisibleGrid {
                side: 3_000_000_001,
                max: 101,
            })
        );

        let widest = SessionConfig {
            generation: GenerationConfig {
                world_size: 12,
                ..GenerationConfig::default()
            },
            visible_grid: 25,
            ..SessionConfig::default()
        };
        assert_eq!(widest.validate(), Ok(()));
        assert!(matches!(
            SessionConfig {
                visible_grid: 27,
                ..widest
            }
            .validate(),
            Err(SessionError::InvalidVisibleGrid { side: 27, max: 25 })
        ));
    }

    #[test]
    fn starting_energy_above_ceiling_is_rejected() {
        let config = SessionConfig {
            starting_energy: 150,
            ..SessionConfig::default()
        };
        assert!(matches!(
            Session::new(config),
            Err(SessionError::InvalidEnergy {
                starting: 150,
                max: 100
            })
        ));
    }

    #[test]
    fn generation_errors_surface_through_the_session() {
        let config = SessionConfig {
            generation: GenerationConfig {
                world_size: 4,
                obstacle_density: 0.9,
                item_density: 0.5,
                ..GenerationConfig::default()
            },
            ..SessionConfig::default()
        };
        assert!(matches!(
            Session::new(config),
            Err(SessionError::Generation(GenerationError::Overcrowded { .. }))
        ));
    }

    #[test]
    fn seeded_sessions_generate_identical_worlds() {
        let first = Session::new(small_config(11)).expect("session");
        let second = Session::new(small_config(11)).expect("session");
        assert_eq!(first.state(), second.state());
        assert_eq!(first.seed(), 11);
    }

    #[test]
    fn restart_keeps_the_session_seed() {
        let mut session = Session::new(small_config(31)).expect("session");
        let _ = session.restart().expect("restart");
        assert_eq!(session.seed(), 31);
    }

    #[test]
    fn restart_event_stream_starts_with_session_started() {
        let mut session = Session::new(small_config(3)).expect("session");
        let mut events = Vec::new();
        apply(&mut session, Command::Restart, &mut events).expect("restart");

        assert!(matches!(
            events.first(),
            Some(Event::SessionStarted { player, .. }) if *player == session.state().player
        ));
        assert!(events[1..]
            .iter()
            .all(|event| matches!(event, Event::ItemSighted { .. })));
    }

    #[test]
    fn moves_through_apply_replace_the_state() {
        let world = WorldGrid::empty(8);
        let items = vec![
            Item::new(ItemId::new(0), Position::new(4, 3)),
            Item::new(ItemId::new(1), Position::new(7, 7)),
        ];
        let state = update_visibility(&GameState::new(
            world,
            items,
            Position::new(3, 3),
            50,
            100,
            3,
        ));
        let mut session = Session::from_state(small_config(5), state);

        let mut events = Vec::new();
        apply(
            &mut session,
            Command::Move {
                direction: Direction::East,
            },
            &mut events,
        )
        .expect("moves never fail");

        assert_eq!(query::player(&session), Position::new(4, 3));
        assert_eq!(query::score(&session), 10);
        assert_eq!(query::energy(&session), 52);
        assert_eq!(query::remaining_items(&session), 1);
        assert_eq!(query::phase(&session), GamePhase::Playing);
    }
}
