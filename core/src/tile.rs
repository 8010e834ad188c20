use serde::{Deserialize, Serialize};

/// Hazard classification of a single grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    /// Start/end corner and the token's current cell.
    Marker,
    /// Solid ground, never fails.
    Safe,
    /// Always fails on entry.
    Unstable,
    /// Fails on entry half the time.
    HighlyUnstable,
}

impl Tile {
    /// Whether entering this tile can end the round.
    pub const fn is_hazard(self) -> bool {
        matches!(self, Self::Unstable | Self::HighlyUnstable)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::Safe
    }
}
