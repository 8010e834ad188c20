use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use crate::{Coord, Coord2, Difficulty, GameError, Result, Tile, TileWeights, ToNdIndex};

/// Grid side length; the lake is always square.
pub const GRID_SIZE: Coord = 10;
/// Corner the token starts each round on.
pub const START: Coord2 = (0, 0);
/// Corner that completes the round on entry.
pub const END: Coord2 = (GRID_SIZE - 1, GRID_SIZE - 1);

/// The tile matrix the token walks across.
///
/// Both corner cells always hold [`Tile::Marker`]; regeneration never
/// touches them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LakeGrid {
    tiles: Array2<Tile>,
}

impl LakeGrid {
    /// Fresh grid for a new round: corners pinned, every other cell drawn
    /// from the difficulty weights.
    pub fn generate(difficulty: Difficulty, rng: &mut impl Rng) -> Self {
        let mut grid = Self {
            tiles: Array2::default([GRID_SIZE as usize, GRID_SIZE as usize]),
        };
        grid.tiles[START.to_nd_index()] = Tile::Marker;
        grid.tiles[END.to_nd_index()] = Tile::Marker;
        grid.regenerate(difficulty, rng);
        grid
    }

    /// Re-draws every non-corner cell independently.
    ///
    /// Called after every surviving step: the whole board reshuffles each
    /// move. That is a gameplay rule, not a missed optimization.
    pub fn regenerate(&mut self, difficulty: Difficulty, rng: &mut impl Rng) {
        let weights = difficulty.weights();
        for x in 0..GRID_SIZE {
            for y in 0..GRID_SIZE {
                let coords = (x, y);
                if coords == START || coords == END {
                    continue;
                }
                self.tiles[coords.to_nd_index()] = draw_tile(weights, rng);
            }
        }
        log::trace!("regenerated grid for {:?}", difficulty);
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.tiles.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    /// Tile stored at `coords`, or `OutOfBounds` outside the grid.
    pub fn tile_at(&self, coords: Coord2) -> Result<Tile> {
        let coords = self.validate_coords(coords)?;
        Ok(self.tiles[coords.to_nd_index()])
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    /// Marks the token's cell for rendering. Hazard resolution happens
    /// before marking, so this never changes an outcome.
    pub fn mark_current(&mut self, coords: Coord2) {
        self.tiles[coords.to_nd_index()] = Tile::Marker;
    }
}

impl Index<Coord2> for LakeGrid {
    type Output = Tile;

    fn index(&self, (x, y): Coord2) -> &Self::Output {
        &self.tiles[(x as usize, y as usize)]
    }
}

impl IndexMut<Coord2> for LakeGrid {
    fn index_mut(&mut self, (x, y): Coord2) -> &mut Self::Output {
        &mut self.tiles[(x as usize, y as usize)]
    }
}

fn draw_tile(weights: TileWeights, rng: &mut impl Rng) -> Tile {
    let roll: u8 = rng.random_range(0..100);
    if roll < weights.safe {
        Tile::Safe
    } else if roll < weights.safe + weights.unstable {
        Tile::Unstable
    } else {
        Tile::HighlyUnstable
    }
}
