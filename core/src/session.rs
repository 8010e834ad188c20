use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use web_time::{Instant, SystemTime};

use crate::{Difficulty, HighScoreTable, Input, MoveOutcome, Round};

/// How long a terminal message stays on screen before the session falls
/// back to the menu.
pub const MESSAGE_DURATION: Duration = Duration::from_secs(2);

/// Message shown after a terminal move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundMessage {
    Drowned,
    Completed,
}

impl RoundMessage {
    pub const fn text(self) -> &'static str {
        match self {
            Self::Drowned => "You Drowned",
            Self::Completed => "Challenge Completed!",
        }
    }

    /// Hosts render completion green and drowning red.
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Which screen the session is on, as exposed to the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Menu,
    Playing,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct PendingMessage {
    message: RoundMessage,
    shown_at: Instant,
}

#[derive(Clone, Debug)]
enum Stage {
    Menu,
    Playing {
        round: Round,
        message: Option<PendingMessage>,
    },
}

/// Owns the whole game state between process start and exit: the
/// menu/playing state machine, the selected difficulty, the high-score
/// table, and the random source every draw flows through.
///
/// The host calls [`handle_input`](Self::handle_input) for each debounced
/// logical input and [`tick`](Self::tick) once per frame, then renders
/// from the read-only accessors.
#[derive(Debug)]
pub struct GameSession<R = SmallRng> {
    stage: Stage,
    difficulty: Difficulty,
    scores: HighScoreTable,
    rng: R,
}

impl GameSession {
    /// Session with the random source seeded from wall-clock time.
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|since_epoch| since_epoch.as_nanos() as u64)
            .unwrap_or_default();
        Self::from_seed(seed)
    }

    /// Reproducible session for a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> GameSession<R> {
    /// Session over a caller-supplied random source.
    pub fn with_rng(rng: R) -> Self {
        Self {
            stage: Stage::Menu,
            difficulty: Difficulty::default(),
            scores: HighScoreTable::default(),
            rng,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.stage {
            Stage::Menu => SessionState::Menu,
            Stage::Playing { .. } => SessionState::Playing,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn scores(&self) -> &HighScoreTable {
        &self.scores
    }

    /// Current round, when one is being played.
    pub fn round(&self) -> Option<&Round> {
        match &self.stage {
            Stage::Menu => None,
            Stage::Playing { round, .. } => Some(round),
        }
    }

    /// Pending terminal message, when one is on screen.
    pub fn message(&self) -> Option<RoundMessage> {
        match &self.stage {
            Stage::Playing {
                message: Some(pending),
                ..
            } => Some(pending.message),
            _ => None,
        }
    }

    /// Feeds one debounced logical input. Returns whether visible state
    /// changed.
    ///
    /// Movement is suppressed while a terminal message is on screen;
    /// `ReturnToMenu` is not, and abandons the message timer.
    pub fn handle_input(&mut self, input: Input, now: Instant) -> bool {
        match (&mut self.stage, input) {
            (Stage::Menu, Input::CycleUp) => {
                self.difficulty = self.difficulty.cycle_up();
                log::debug!("selected {}", self.difficulty);
                true
            }
            (Stage::Menu, Input::CycleDown) => {
                self.difficulty = self.difficulty.cycle_down();
                log::debug!("selected {}", self.difficulty);
                true
            }
            (Stage::Menu, Input::Confirm) => {
                self.stage = Stage::Playing {
                    round: Round::start(self.difficulty, &mut self.rng, now),
                    message: None,
                };
                true
            }
            (Stage::Playing { .. }, Input::ReturnToMenu) => {
                log::debug!("returning to menu");
                self.stage = Stage::Menu;
                true
            }
            (Stage::Playing { round, message }, Input::Direction(dir)) if message.is_none() => {
                match round.attempt_move(dir, &mut self.scores, &mut self.rng, now) {
                    Ok(MoveOutcome::Blocked) => false,
                    Ok(MoveOutcome::Continued) => true,
                    Ok(MoveOutcome::Drowned) => {
                        *message = Some(PendingMessage {
                            message: RoundMessage::Drowned,
                            shown_at: now,
                        });
                        true
                    }
                    Ok(MoveOutcome::Completed) => {
                        *message = Some(PendingMessage {
                            message: RoundMessage::Completed,
                            shown_at: now,
                        });
                        true
                    }
                    Err(err) => {
                        log::warn!("rejected move: {}", err);
                        false
                    }
                }
            }
            _ => false,
        }
    }

    /// Advances the message timer. Call once per frame; returns whether
    /// visible state changed.
    ///
    /// Once a terminal message has been on screen for
    /// [`MESSAGE_DURATION`], the round is dropped and the session falls
    /// back to the menu; the next round starts from the start corner.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Stage::Playing {
            message: Some(pending),
            ..
        } = &self.stage
        {
            if now.duration_since(pending.shown_at) >= MESSAGE_DURATION {
                log::debug!("message expired, back to menu");
                self.stage = Stage::Menu;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coord2, Direction, Tile, END, GRID_SIZE, START};

    fn session() -> GameSession {
        GameSession::from_seed(1234)
    }

    fn rig_tile(session: &mut GameSession, coords: Coord2, tile: Tile) {
        match &mut session.stage {
            Stage::Playing { round, .. } => round.grid_mut()[coords] = tile,
            Stage::Menu => panic!("no round to rig"),
        }
    }

    #[test]
    fn difficulty_cycling_wraps_among_the_three_modes() {
        let mut session = session();
        let now = Instant::now();
        assert_eq!(session.difficulty(), Difficulty::Easy);

        assert!(session.handle_input(Input::CycleUp, now));
        assert_eq!(session.difficulty(), Difficulty::Hard);

        assert!(session.handle_input(Input::CycleDown, now));
        assert_eq!(session.difficulty(), Difficulty::Easy);

        assert!(session.handle_input(Input::CycleDown, now));
        assert_eq!(session.difficulty(), Difficulty::Medium);
    }

    #[test]
    fn confirm_starts_a_round_at_the_start_corner() {
        let mut session = session();
        let now = Instant::now();

        assert!(session.handle_input(Input::Confirm, now));

        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.message(), None);
        let round = session.round().unwrap();
        assert_eq!(round.token(), START);
        assert_eq!(round.elapsed(now), Duration::ZERO);
    }

    #[test]
    fn menu_ignores_movement_input() {
        let mut session = session();
        let now = Instant::now();

        assert!(!session.handle_input(Input::Direction(Direction::East), now));
        assert_eq!(session.state(), SessionState::Menu);
    }

    #[test]
    fn playing_ignores_difficulty_cycling() {
        let mut session = session();
        let now = Instant::now();
        session.handle_input(Input::Confirm, now);

        assert!(!session.handle_input(Input::CycleUp, now));
        assert_eq!(session.difficulty(), Difficulty::Easy);
    }

    #[test]
    fn drowning_shows_the_message_and_falls_back_to_menu_after_two_seconds() {
        let mut session = session();
        let t0 = Instant::now();
        session.handle_input(Input::Confirm, t0);
        rig_tile(&mut session, (1, 0), Tile::Unstable);

        let hit = t0 + Duration::from_millis(900);
        assert!(session.handle_input(Input::Direction(Direction::East), hit));
        assert_eq!(session.message(), Some(RoundMessage::Drowned));
        assert_eq!(session.round().unwrap().token(), START);

        // further movement is suppressed while the message is up
        assert!(!session.handle_input(
            Input::Direction(Direction::South),
            hit + Duration::from_millis(100)
        ));

        // not yet
        assert!(!session.tick(hit + Duration::from_millis(1_999)));
        assert_eq!(session.state(), SessionState::Playing);

        // two seconds on screen
        assert!(session.tick(hit + MESSAGE_DURATION));
        assert_eq!(session.state(), SessionState::Menu);
        assert_eq!(session.message(), None);
        assert!(session.round().is_none());
    }

    #[test]
    fn return_to_menu_abandons_a_pending_message() {
        let mut session = session();
        let t0 = Instant::now();
        session.handle_input(Input::Confirm, t0);
        rig_tile(&mut session, (1, 0), Tile::Unstable);
        session.handle_input(Input::Direction(Direction::East), t0);
        assert_eq!(session.message(), Some(RoundMessage::Drowned));

        assert!(session.handle_input(Input::ReturnToMenu, t0));

        assert_eq!(session.state(), SessionState::Menu);
        assert_eq!(session.message(), None);
        assert!(!session.tick(t0 + MESSAGE_DURATION));
    }

    #[test]
    fn walking_the_diagonal_completes_and_records_the_score() {
        let mut session = session();
        let t0 = Instant::now();
        session.handle_input(Input::Confirm, t0);

        // pave each destination before stepping; the end corner needs no
        // paving, entry completes regardless of what is stored there
        let mut now = t0;
        for step in 1..GRID_SIZE {
            let dest = (step, step);
            now += Duration::from_millis(500);
            if dest != END {
                rig_tile(&mut session, dest, Tile::Safe);
            }
            assert!(session.handle_input(Input::Direction(Direction::SouthEast), now));
        }

        assert_eq!(session.message(), Some(RoundMessage::Completed));
        let round = session.round().unwrap();
        assert_eq!(round.token(), (GRID_SIZE - 2, GRID_SIZE - 2));
        assert_eq!(
            session.scores().best(Difficulty::Easy),
            Some(now.duration_since(t0))
        );

        assert!(session.tick(now + MESSAGE_DURATION));
        assert_eq!(session.state(), SessionState::Menu);
        // the table outlives the round
        assert_eq!(
            session.scores().best(Difficulty::Easy),
            Some(Duration::from_millis(4_500))
        );
    }

    #[test]
    fn selected_difficulty_persists_across_rounds() {
        let mut session = session();
        let now = Instant::now();

        session.handle_input(Input::CycleDown, now);
        assert_eq!(session.difficulty(), Difficulty::Medium);

        session.handle_input(Input::Confirm, now);
        session.handle_input(Input::ReturnToMenu, now);

        assert_eq!(session.difficulty(), Difficulty::Medium);
        session.handle_input(Input::Confirm, now);
        assert_eq!(session.round().unwrap().difficulty(), Difficulty::Medium);
    }
}
