use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Difficulty;

/// Best completion time per difficulty, kept for the process lifetime.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreTable {
    best: [Option<Duration>; 3],
}

impl HighScoreTable {
    pub fn best(&self, difficulty: Difficulty) -> Option<Duration> {
        self.best[difficulty.index()]
    }

    /// Stores `elapsed` when it beats the recorded best (or none exists
    /// yet). Returns whether the table changed.
    pub fn record(&mut self, difficulty: Difficulty, elapsed: Duration) -> bool {
        let slot = &mut self.best[difficulty.index()];
        match slot {
            Some(best) if *best <= elapsed => false,
            _ => {
                log::debug!("new {} best: {:.2}s", difficulty, elapsed.as_secs_f32());
                *slot = Some(elapsed);
                true
            }
        }
    }
}
