use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

use crate::Direction;

/// Debounced logical inputs the host feeds the session, one per key press.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Input {
    Direction(Direction),
    CycleUp,
    CycleDown,
    Confirm,
    ReturnToMenu,
}

/// Turns raw held-state polling into once-per-press edges.
///
/// Hosts that poll continuous key state call [`update`](Self::update) every
/// frame for every key they care about; a key registers only on the
/// transition from released to held, never while it stays held.
#[derive(Clone, Debug)]
pub struct EdgeDetector<K> {
    held: HashSet<K>,
}

impl<K: Copy + Eq + Hash> EdgeDetector<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports the current raw state of `key`; returns whether this call
    /// is a rising edge.
    pub fn update(&mut self, key: K, held: bool) -> bool {
        if held {
            self.held.insert(key)
        } else {
            self.held.remove(&key);
            false
        }
    }
}

impl<K> Default for EdgeDetector<K> {
    fn default() -> Self {
        Self {
            held: HashSet::new(),
        }
    }
}
