#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural world generation for Fog Forage.
//!
//! The generator scatters obstacles, picks a start cell for the player, and
//! then places collectible items, all through bounded rejection sampling. The
//! caller supplies the random source so that seeded generators reproduce the
//! exact same world.

use std::fmt;

use fog_forage_core::{Item, ItemId, Position, WorldGrid, DEFAULT_WORLD_SIZE};
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Largest world side length accepted by the generator.
pub const MAX_WORLD_SIZE: u32 = 4_096;

/// Fraction of cells turned into obstacles by default.
pub const DEFAULT_OBSTACLE_DENSITY: f64 = 0.08;

/// Fraction of cells holding an item by default.
pub const DEFAULT_ITEM_DENSITY: f64 = 0.10;

/// Samples a single placement may draw before generation gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;

/// Tuning knobs controlling world generation.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Side length of the square world in cells.
    pub world_size: u32,
    /// Fraction of all cells that become obstacles, in `[0, 1)`.
    pub obstacle_density: f64,
    /// Fraction of all cells that receive an item, in `[0, 1)`.
    pub item_density: f64,
    /// Upper bound on samples drawn for any single placement.
    pub max_attempts: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            world_size: DEFAULT_WORLD_SIZE,
            obstacle_density: DEFAULT_OBSTACLE_DENSITY,
            item_density: DEFAULT_ITEM_DENSITY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl GenerationConfig {
    /// Total number of cells in the configured world.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let side = usize::try_from(self.world_size).unwrap_or(usize::MAX);
        side.saturating_mul(side)
    }

    /// Number of obstacles the generator will place.
    #[must_use]
    pub fn obstacle_count(&self) -> usize {
        scaled_count(self.cell_count(), self.obstacle_density)
    }

    /// Number of items the generator will place.
    #[must_use]
    pub fn item_count(&self) -> usize {
        scaled_count(self.cell_count(), self.item_density)
    }

    /// Checks that the configuration can be satisfied.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.world_size == 0 || self.world_size > MAX_WORLD_SIZE {
            return Err(GenerationError::InvalidWorldSize {
                size: self.world_size,
            });
        }
        check_density("obstacle", self.obstacle_density)?;
        check_density("item", self.item_density)?;
        if self.max_attempts == 0 {
            return Err(GenerationError::ZeroAttempts);
        }

        let required = self.obstacle_count() + self.item_count() + 1;
        let capacity = self.cell_count();
        if required > capacity {
            return Err(GenerationError::Overcrowded { required, capacity });
        }
        Ok(())
    }
}

/// Artifacts produced by a successful generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedWorld {
    /// Terrain of the new world.
    pub world: WorldGrid,
    /// Items ordered by identifier.
    pub items: Vec<Item>,
    /// Empty cell the player starts on.
    pub player: Position,
}

/// Kind of entity being placed when sampling runs out of attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    /// An obstacle cell.
    Obstacle,
    /// The player's starting cell.
    PlayerStart,
    /// A collectible item.
    Item,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Obstacle => "obstacle",
            Self::PlayerStart => "player start",
            Self::Item => "item",
        };
        f.write_str(label)
    }
}

/// Configuration mistakes that make a world impossible to generate.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GenerationError {
    /// The world side length is zero or unreasonably large.
    #[error("world size {size} must lie in 1..={MAX_WORLD_SIZE}")]
    InvalidWorldSize {
        /// Rejected side length.
        size: u32,
    },
    /// A density is negative, not finite, or would fill the whole world.
    #[error("{kind} density {value} must lie in [0, 1)")]
    InvalidDensity {
        /// Which density was rejected.
        kind: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// The attempt budget leaves no room to sample anything.
    #[error("placement attempt budget must be non-zero")]
    ZeroAttempts,
    /// Obstacles, items, and the player do not fit into the world.
    #[error("{required} cells are required but the world only has {capacity}")]
    Overcrowded {
        /// Cells needed for every placement.
        required: usize,
        /// Cells available in the world.
        capacity: usize,
    },
    /// Rejection sampling hit its retry cap.
    #[error("no free cell found for {placement} after {attempts} attempts")]
    PlacementExhausted {
        /// Entity that could not be placed.
        placement: Placement,
        /// Samples drawn before giving up.
        attempts: u32,
    },
}

/// Generates a new world using the provided random source.
pub fn generate<R>(
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<GeneratedWorld, GenerationError>
where
    R: Rng + ?Sized,
{
    config.validate()?;

    let size = config.world_size;
    let sampler = CellSampler::new(size, config.max_attempts);
    let mut claimed = ClaimMap::new(size);

    let obstacle_count = config.obstacle_count();
    let mut obstacles = Vec::with_capacity(obstacle_count);
    for _ in 0..obstacle_count {
        let cell = sampler.sample(rng, Placement::Obstacle, |cell| claimed.is_free(cell))?;
        claimed.claim(cell);
        obstacles.push(cell);
    }

    let player = sampler.sample(rng, Placement::PlayerStart, |cell| claimed.is_free(cell))?;
    claimed.claim(player);

    let item_count = config.item_count();
    let mut items = Vec::with_capacity(item_count);
    for index in 0..item_count {
        let cell = sampler.sample(rng, Placement::Item, |cell| claimed.is_free(cell))?;
        claimed.claim(cell);
        let id = ItemId::new(u32::try_from(index).unwrap_or(u32::MAX));
        items.push(Item::new(id, cell));
    }

    debug!(
        world_size = size,
        obstacles = obstacle_count,
        items = item_count,
        player = %player,
        "generated world"
    );

    Ok(GeneratedWorld {
        world: WorldGrid::from_obstacles(size, obstacles),
        items,
        player,
    })
}

/// Bounded rejection sampler over the cells of a square world.
#[derive(Clone, Copy, Debug)]
struct CellSampler {
    size: u32,
    max_attempts: u32,
}

impl CellSampler {
    fn new(size: u32, max_attempts: u32) -> Self {
        Self { size, max_attempts }
    }

    fn sample<R, F>(
        &self,
        rng: &mut R,
        placement: Placement,
        mut accept: F,
    ) -> Result<Position, GenerationError>
    where
        R: Rng + ?Sized,
        F: FnMut(Position) -> bool,
    {
        for _ in 0..self.max_attempts {
            let x = rng.gen_range(0..self.size);
            let y = rng.gen_range(0..self.size);
            let cell = Position::new(x, y);
            if accept(cell) {
                return Ok(cell);
            }
        }
        Err(GenerationError::PlacementExhausted {
            placement,
            attempts: self.max_attempts,
        })
    }
}

/// Tracks which cells already hold an obstacle, the player, or an item.
#[derive(Debug)]
struct ClaimMap {
    size: u32,
    cells: Vec<bool>,
}

impl ClaimMap {
    fn new(size: u32) -> Self {
        let side = usize::try_from(size).unwrap_or(0);
        Self {
            size,
            cells: vec![false; side * side],
        }
    }

    fn is_free(&self, cell: Position) -> bool {
        self.index(cell).map_or(false, |index| !self.cells[index])
    }

    fn claim(&mut self, cell: Position) {
        if let Some(index) = self.index(cell) {
            self.cells[index] = true;
        }
    }

    fn index(&self, cell: Position) -> Option<usize> {
        if !cell.within(self.size) {
            return None;
        }
        let width = usize::try_from(self.size).ok()?;
        let row = usize::try_from(cell.y()).ok()?;
        let column = usize::try_from(cell.x()).ok()?;
        Some(row * width + column)
    }
}

fn scaled_count(cells: usize, density: f64) -> usize {
    if !density.is_finite() || density <= 0.0 {
        return 0;
    }
    (cells as f64 * density).floor() as usize
}

fn check_density(kind: &'static str, value: f64) -> Result<(), GenerationError> {
    if value.is_finite() && (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(GenerationError::InvalidDensity { kind, value })
    }
}
