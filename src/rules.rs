//! Birth/survival rule sets.

use core::fmt;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Birth and survival neighbour counts for a Life-like automaton.
///
/// Both sets are plain non-negative integers. Counts above 8 are accepted but
/// can never fire, since a Moore neighbourhood has at most 8 live cells.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct RuleSet {
    pub birth: BTreeSet<u32>,
    pub survival: BTreeSet<u32>,
}

impl RuleSet {
    pub fn new<B, S>(birth: B, survival: S) -> Self
    where
        B: IntoIterator<Item = u32>,
        S: IntoIterator<Item = u32>,
    {
        Self {
            birth: birth.into_iter().collect(),
            survival: survival.into_iter().collect(),
        }
    }

    /// Conway's Game of Life, B3/S23
    pub fn conway() -> Self {
        Self::new(vec![3], vec![2, 3])
    }

    /// HighLife, B36/S23
    pub fn high_life() -> Self {
        Self::new(vec![3, 6], vec![2, 3])
    }

    /// Seeds, B2/S - nothing survives
    pub fn seeds() -> Self {
        Self::new(vec![2], vec![])
    }

    /// Day & Night, B3678/S34678
    pub fn day_and_night() -> Self {
        Self::new(vec![3, 6, 7, 8], vec![3, 4, 6, 7, 8])
    }

    /// Replicator, B1357/S1357
    pub fn replicator() -> Self {
        Self::new(vec![1, 3, 5, 7], vec![1, 3, 5, 7])
    }

    #[inline]
    pub fn is_birth(&self, neighbors: u32) -> bool {
        self.birth.contains(&neighbors)
    }

    #[inline]
    pub fn is_survival(&self, neighbors: u32) -> bool {
        self.survival.contains(&neighbors)
    }

    /// Next state of a cell given its current state and live neighbour count.
    #[inline]
    pub fn next_state(&self, alive: bool, neighbors: u32) -> bool {
        if alive {
            self.is_survival(neighbors)
        } else {
            self.is_birth(neighbors)
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::conway()
    }
}

/// `B3/S23` notation. Multi-digit counts are comma separated so the output
/// stays unambiguous, e.g. `B3,12/S2`.
impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn counts(set: &BTreeSet<u32>) -> String {
            let sep = if set.iter().any(|&n| n > 9) { "," } else { "" };
            itertools::join(set.iter(), sep)
        }

        write!(f, "B{}/S{}", counts(&self.birth), counts(&self.survival))
    }
}
