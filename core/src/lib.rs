#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Fog Forage engine.
//!
//! This crate defines the data model and the message surface that connects
//! adapters, the authoritative session, and the pure systems. Adapters submit
//! [`Command`] values describing what the player asked for, the session
//! resolves them through the rules and visibility systems, and then broadcasts
//! [`Event`] values describing what actually happened. Every transition
//! produces a fresh [`GameState`]; existing states are never edited in place.

use std::{collections::BTreeSet, fmt};

use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Fog Forage.";

/// Side length of the square world, measured in cells.
pub const DEFAULT_WORLD_SIZE: u32 = 50;

/// Side length of the square visibility window centred on the player.
pub const DEFAULT_VISIBLE_GRID: u32 = 3;

/// Upper bound for the player's energy.
pub const DEFAULT_MAX_ENERGY: u32 = 100;

/// Energy granted at the start of every session.
pub const DEFAULT_STARTING_ENERGY: u32 = 50;

/// Energy consumed by every accepted step.
pub const MOVE_ENERGY_COST: u32 = 1;

/// Energy restored when an item is collected.
pub const ITEM_ENERGY_BONUS: u32 = 3;

/// Score awarded when an item is collected.
pub const ITEM_SCORE: u32 = 10;

/// Commands that express every request an adapter may submit to a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Requests that the player advance a single cell in the provided direction.
    Move {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Discards the current session and generates a brand new world.
    Restart,
}

/// Events broadcast after a command has been resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a freshly generated world is ready to play.
    SessionStarted {
        /// Cell the player starts on.
        player: Position,
        /// Number of collectible items placed in the world.
        items: usize,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: Position,
        /// Cell the player occupies after the move.
        to: Position,
        /// Energy remaining once the step cost was paid.
        energy: u32,
    },
    /// Reports that a move request was ignored.
    MoveRejected {
        /// Requested horizontal delta.
        dx: i32,
        /// Requested vertical delta.
        dy: i32,
        /// Specific reason the move was not applied.
        reason: MoveRejection,
    },
    /// Reports that an item entered the visible window for the first time.
    ItemSighted {
        /// Cell holding the sighted item.
        position: Position,
    },
    /// Confirms that the player picked up an item.
    ItemCollected {
        /// Identifier of the collected item.
        item: ItemId,
        /// Cell the item occupied.
        position: Position,
        /// Score after the pickup was credited.
        score: u32,
        /// Energy after the pickup bonus was applied.
        energy: u32,
    },
    /// Announces that the session entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: GamePhase,
    },
}

/// Reasons a move request may be ignored by the rules engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// The player has no energy left.
    Exhausted,
    /// The session already reached a terminal phase.
    GameOver,
    /// The delta was not a single axis-aligned step.
    NotAxisAligned,
    /// The destination lies outside the world.
    OutOfBounds,
    /// The destination cell is an obstacle.
    Obstacle,
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit delta `(dx, dy)` travelled by a step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Resolves an axis-aligned unit delta into a direction.
    ///
    /// Diagonal, zero, and multi-cell deltas have no direction.
    #[must_use]
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Self::North),
            (1, 0) => Some(Self::East),
            (0, 1) => Some(Self::South),
            (-1, 0) => Some(Self::West),
            _ => None,
        }
    }
}

/// Location of a single world cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: u32,
    y: u32,
}

impl Position {
    /// Creates a new position from a column and a row.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Offsets the position by a signed delta.
    ///
    /// Returns `None` when either coordinate would become negative or
    /// overflow. World bounds are not checked here.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Self { x, y })
    }

    /// Neighbouring position one step away in the provided direction.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    /// Reports whether the position lies inside a square world of `size` cells.
    #[must_use]
    pub const fn within(&self, size: u32) -> bool {
        self.x < size && self.y < size
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Terrain occupying a single world cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Walkable ground.
    #[default]
    Empty,
    /// Impassable rock.
    Obstacle,
}

/// Unique identifier assigned to a collectible item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(u32);

impl ItemId {
    /// Creates a new item identifier with the provided sequence number.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// Collectible fruit lying somewhere in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Identifier allocated during generation.
    pub id: ItemId,
    /// Cell the item occupies.
    pub position: Position,
}

impl Item {
    /// Creates an item located at the provided cell.
    #[must_use]
    pub const fn new(id: ItemId, position: Position) -> Self {
        Self { id, position }
    }
}

/// Grid snapshot whose cell count disagrees with its side length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("grid of side {size} needs {expected} cells but holds {actual}")]
pub struct GridShapeError {
    /// Declared side length.
    pub size: u32,
    /// Cells a grid of that side must hold.
    pub expected: usize,
    /// Cells actually present.
    pub actual: usize,
}

#[derive(Deserialize)]
struct GridParts<T> {
    size: u32,
    cells: Vec<T>,
}

impl<T> GridParts<T> {
    fn into_checked(self) -> Result<(u32, Vec<T>), GridShapeError> {
        let expected = cell_count(self.size);
        if self.cells.len() != expected {
            return Err(GridShapeError {
                size: self.size,
                expected,
                actual: self.cells.len(),
            });
        }
        Ok((self.size, self.cells))
    }
}

/// Dense square terrain grid stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WorldGrid {
    size: u32,
    cells: Vec<Terrain>,
}

impl WorldGrid {
    /// Creates a world of the provided size with every cell empty.
    #[must_use]
    pub fn empty(size: u32) -> Self {
        Self {
            size,
            cells: vec![Terrain::Empty; cell_count(size)],
        }
    }

    /// Creates a world with obstacles at the provided positions.
    ///
    /// Positions outside the world are ignored.
    #[must_use]
    pub fn from_obstacles(size: u32, obstacles: impl IntoIterator<Item = Position>) -> Self {
        let mut grid = Self::empty(size);
        for position in obstacles {
            let slot = grid.index(position).and_then(|index| grid.cells.get_mut(index));
            if let Some(cell) = slot {
                *cell = Terrain::Obstacle;
            }
        }
        grid
    }

    /// Side length of the world in cells.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Terrain at the provided cell, or `None` outside the world.
    #[must_use]
    pub fn terrain(&self, position: Position) -> Option<Terrain> {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the player may stand on the provided cell.
    #[must_use]
    pub fn is_walkable(&self, position: Position) -> bool {
        self.terrain(position) == Some(Terrain::Empty)
    }

    /// Number of obstacle cells in the world.
    #[must_use]
    pub fn obstacle_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|terrain| **terrain == Terrain::Obstacle)
            .count()
    }

    fn index(&self, position: Position) -> Option<usize> {
        grid_index(self.size, position)
    }
}

impl<'de> Deserialize<'de> for WorldGrid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (size, cells) = GridParts::deserialize(deserializer)?
            .into_checked()
            .map_err(de::Error::custom)?;
        Ok(Self { size, cells })
    }
}

/// Fog-of-war memory recording the move at which each cell was last visible.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VisitedGrid {
    size: u32,
    cells: Vec<u64>,
}

impl VisitedGrid {
    /// Creates a grid where no cell has ever been visible.
    #[must_use]
    pub fn new(size: u32) -> Self {
        Self {
            size,
            cells: vec![0; cell_count(size)],
        }
    }

    /// Side length of the grid in cells.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Move counter at which the cell was last visible, or zero if never.
    #[must_use]
    pub fn last_seen(&self, position: Position) -> u64 {
        grid_index(self.size, position)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(0)
    }

    /// Reports whether the cell is inside the window for the provided move.
    #[must_use]
    pub fn is_visible(&self, position: Position, move_counter: u64) -> bool {
        move_counter != 0 && self.last_seen(position) == move_counter
    }

    /// Reports whether the cell has ever been visible.
    #[must_use]
    pub fn is_explored(&self, position: Position) -> bool {
        self.last_seen(position) != 0
    }

    /// Records that the cell was visible at the provided move.
    ///
    /// Stored values never decrease. Positions outside the grid are ignored.
    pub fn mark(&mut self, position: Position, move_counter: u64) {
        let slot = grid_index(self.size, position).and_then(|index| self.cells.get_mut(index));
        if let Some(cell) = slot {
            *cell = (*cell).max(move_counter);
        }
    }
}

impl<'de> Deserialize<'de> for VisitedGrid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (size, cells) = GridParts::deserialize(deserializer)?
            .into_checked()
            .map_err(de::Error::custom)?;
        Ok(Self { size, cells })
    }
}

/// Lifecycle phase of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Moves are accepted.
    Playing,
    /// Every item was collected.
    Won,
    /// Energy ran out with items remaining.
    Lost,
}

impl GamePhase {
    /// Reports whether the phase ends the session until a restart.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Complete, immutable snapshot of a session.
///
/// Systems never edit a state they were handed; they clone it and return the
/// updated copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Cell currently occupied by the player.
    pub player: Position,
    /// Remaining energy, never above `max_energy`.
    pub energy: u32,
    /// Energy ceiling.
    pub max_energy: u32,
    /// Accumulated score.
    pub score: u32,
    /// Items that have not been collected, ordered by identifier.
    pub items: Vec<Item>,
    /// Terrain of the world.
    pub world: WorldGrid,
    /// Fog-of-war memory.
    pub visited: VisitedGrid,
    /// Positions of active items that have entered the visible window.
    pub seen_items: BTreeSet<Position>,
    /// Number of visibility passes applied since the session started.
    pub move_counter: u64,
    /// Current lifecycle phase.
    pub phase: GamePhase,
    /// Side length of the world in cells.
    pub world_size: u32,
    /// Side length of the visibility window; always odd.
    pub visible_grid: u32,
}

impl GameState {
    /// Assembles a fresh, not yet revealed state around a generated world.
    #[must_use]
    pub fn new(
        world: WorldGrid,
        items: Vec<Item>,
        player: Position,
        energy: u32,
        max_energy: u32,
        visible_grid: u32,
    ) -> Self {
        let world_size = world.size();
        Self {
            player,
            energy: energy.min(max_energy),
            max_energy,
            score: 0,
            items,
            visited: VisitedGrid::new(world_size),
            world,
            seen_items: BTreeSet::new(),
            move_counter: 0,
            phase: GamePhase::Playing,
            world_size,
            visible_grid,
        }
    }

    /// Active item occupying the provided cell, if any.
    #[must_use]
    pub fn item_at(&self, position: Position) -> Option<&Item> {
        self.items.iter().find(|item| item.position == position)
    }

    /// Reports whether moves are currently accepted.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Number of items still waiting to be collected.
    #[must_use]
    pub fn remaining_items(&self) -> usize {
        self.items.len()
    }
}

fn cell_count(size: u32) -> usize {
    let side = usize::try_from(size).unwrap_or(0);
    side.saturating_mul(side)
}

fn grid_index(size: u32, position: Position) -> Option<usize> {
    if !position.within(size) {
        return None;
    }
    let row = usize::try_from(position.y()).ok()?;
    let column = usize::try_from(position.x()).ok()?;
    let width = usize::try_from(size).ok()?;
    Some(row * width + column)
}
