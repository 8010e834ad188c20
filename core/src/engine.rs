use rand::Rng;
use std::time::Duration;
use web_time::Instant;

use crate::types::offset;
use crate::{
    Coord2, Difficulty, Direction, GameError, HighScoreTable, LakeGrid, MoveOutcome, Result, Tile,
    END, START,
};

/// One playthrough attempt, from menu confirm to drowning or completion.
#[derive(Clone, Debug)]
pub struct Round {
    grid: LakeGrid,
    token: Coord2,
    difficulty: Difficulty,
    started_at: Instant,
    ended_at: Option<Instant>,
}

impl Round {
    /// Fresh round: regenerated grid, token on the start corner, running
    /// clock.
    pub fn start(difficulty: Difficulty, rng: &mut impl Rng, now: Instant) -> Self {
        let grid = LakeGrid::generate(difficulty, rng);
        log::debug!("round started on {:?}", difficulty);
        Self {
            grid,
            token: START,
            difficulty,
            started_at: now,
            ended_at: None,
        }
    }

    pub fn grid(&self) -> &LakeGrid {
        &self.grid
    }

    pub fn token(&self) -> Coord2 {
        self.token
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Whether a terminal move already resolved this round.
    pub fn is_over(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Time since the round started, frozen at the terminal move.
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.ended_at.unwrap_or(now).duration_since(self.started_at)
    }

    /// Resolves one step in `dir`.
    ///
    /// Resolution order: bounds, end corner, hazard class. The end-corner
    /// check runs before any tile lookup, so reaching the end always
    /// completes. On `Continued` the token moves, the board regenerates,
    /// and the new cell is marked. On a terminal outcome the token stays
    /// where it was and the clock freezes.
    pub fn attempt_move(
        &mut self,
        dir: Direction,
        scores: &mut HighScoreTable,
        rng: &mut impl Rng,
        now: Instant,
    ) -> Result<MoveOutcome> {
        self.check_running()?;

        let Some(dest) = offset(self.token, dir.delta(), self.grid.size()) else {
            log::trace!("move {:?} from {:?} blocked at the shore", dir, self.token);
            return Ok(MoveOutcome::Blocked);
        };

        if dest == END {
            self.ended_at = Some(now);
            let elapsed = self.elapsed(now);
            log::debug!("crossed the lake in {:.2}s", elapsed.as_secs_f32());
            scores.record(self.difficulty, elapsed);
            return Ok(MoveOutcome::Completed);
        }

        let drowned = match self.grid[dest] {
            Tile::Unstable => true,
            Tile::HighlyUnstable => rng.random_range(0..2) == 0,
            Tile::Safe | Tile::Marker => false,
        };

        if drowned {
            self.ended_at = Some(now);
            log::debug!("drowned stepping onto {:?}", dest);
            return Ok(MoveOutcome::Drowned);
        }

        self.token = dest;
        self.grid.regenerate(self.difficulty, rng);
        self.grid.mark_current(dest);
        Ok(MoveOutcome::Continued)
    }

    fn check_running(&self) -> Result<()> {
        if self.ended_at.is_some() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }

    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut LakeGrid {
        &mut self.grid
    }
}
