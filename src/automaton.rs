//! Automaton engine - owns the grid and rule set, steps generations.
//!
//! The engine knows nothing about sound. Callers read the grid through
//! [`AutomatonEngine::grid`] (or the return value of [`AutomatonEngine::step`])
//! and hand snapshots to the [`VoiceManager`](crate::VoiceManager).

use tracing::{debug, info};

use crate::grid::Grid;
use crate::rules::RuleSet;

/// A 2-D Life-like cellular automaton with clamped (non-wrapping) edges.
///
/// # Example
///
/// ```
/// use lifetone::{AutomatonEngine, RuleSet};
///
/// let mut engine = AutomatonEngine::new(5, 5).with_rules(RuleSet::conway());
///
/// // Horizontal blinker
/// engine.toggle_cell(2, 1);
/// engine.toggle_cell(2, 2);
/// engine.toggle_cell(2, 3);
///
/// let next = engine.step();
/// assert!(next.is_alive(1, 2) && next.is_alive(2, 2) && next.is_alive(3, 2));
/// assert_eq!(next.population(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct AutomatonEngine {
    grid: Grid,
    rules: RuleSet,
    generation: u64,
}

impl AutomatonEngine {
    /// Create an engine with an all-dead grid and Conway's rules.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            grid: Grid::new(rows, cols),
            rules: RuleSet::default(),
            generation: 0,
        }
    }

    /// Set the rule set (builder pattern).
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Current grid snapshot.
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// `(rows, cols)`
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        self.grid.dimensions()
    }

    /// Generations stepped since construction, the last clear, or the last resize.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Flip one cell.
    ///
    /// Out-of-bounds coordinates are ignored; callers are expected to
    /// validate against [`dimensions`](Self::dimensions). Returns whether a
    /// cell was flipped.
    pub fn toggle_cell(&mut self, row: usize, col: usize) -> bool {
        self.grid.toggle(row, col)
    }

    /// Set one cell. Out-of-bounds coordinates are ignored.
    pub fn set_cell(&mut self, row: usize, col: usize, alive: bool) -> bool {
        self.grid.set(row, col, alive)
    }

    /// Replace both rule sets at once.
    pub fn set_rules<B, S>(&mut self, birth: B, survival: S)
    where
        B: IntoIterator<Item = u32>,
        S: IntoIterator<Item = u32>,
    {
        self.rules = RuleSet::new(birth, survival);
        debug!(rules = %self.rules, "rules replaced");
    }

    /// Replace the rule set with an existing one.
    pub fn set_rule_set(&mut self, rules: RuleSet) {
        self.rules = rules;
        debug!(rules = %self.rules, "rules replaced");
    }

    /// Resize the grid, keeping the overlapping top-left rectangle.
    ///
    /// Any voices keyed by the old coordinates are stale after this call; the
    /// driver must [`shutdown`](crate::VoiceManager::shutdown) its voice
    /// manager before or immediately after resizing, and the next
    /// [`reconcile`](crate::VoiceManager::reconcile) must diff against an
    /// all-dead grid of the new size so the surviving cells are sounded.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        let (old_rows, old_cols) = self.grid.dimensions();
        self.grid = self.grid.resized(rows, cols);
        self.generation = 0;
        info!(old_rows, old_cols, rows, cols, "grid resized");
    }

    /// Compute the next generation and make it the current grid.
    ///
    /// Every neighbour count is taken from the grid as it was before the
    /// step; the new states are written to a separate buffer.
    pub fn step(&mut self) -> &Grid {
        let (rows, cols) = self.grid.dimensions();
        let mut next = Grid::new(rows, cols);

        for cell in self.grid.coords() {
            let alive = self.grid.is_alive(cell.row, cell.col);
            let neighbors = self.grid.live_neighbors(cell.row, cell.col);
            if self.rules.next_state(alive, neighbors) {
                next.set(cell.row, cell.col, true);
            }
        }

        self.grid = next;
        self.generation += 1;
        &self.grid
    }

    /// Kill every cell.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.generation = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellId;

    fn live(engine: &AutomatonEngine) -> Vec<CellId> {
        engine.grid().live_cells().collect()
    }

    fn engine_with(rows: usize, cols: usize, cells: &[(usize, usize)]) -> AutomatonEngine {
        let mut engine = AutomatonEngine::new(rows, cols);
        for &(r, c) in cells {
            engine.set_cell(r, c, true);
        }
        engine
    }

    #[test]
    fn empty_grid_stays_empty_under_every_preset() {
        let presets = vec![
            RuleSet::conway(),
            RuleSet::high_life(),
            RuleSet::seeds(),
            RuleSet::day_and_night(),
            RuleSet::replicator(),
        ];

        for rules in presets {
            let mut engine = AutomatonEngine::new(8, 8).with_rules(rules.clone());
            for _ in 0..4 {
                assert_eq!(engine.step().population(), 0, "{}", rules);
            }
        }
    }

    #[test]
    fn blinker_has_period_two() {
        let mut engine = engine_with(5, 5, &[(2, 1), (2, 2), (2, 3)]);
        let start = engine.grid().clone();

        let first = engine.step().clone();
        assert_ne!(first, start);
        assert_eq!(
            first.live_cells().collect::<Vec<_>>(),
            vec![CellId::new(1, 2), CellId::new(2, 2), CellId::new(3, 2)]
        );

        assert_eq!(engine.step(), &start);
        assert_eq!(engine.generation(), 2);
    }

    #[test]
    fn step_is_deterministic() {
        let cells = [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2), (5, 5), (5, 6)];
        let mut a = engine_with(8, 8, &cells).with_rules(RuleSet::high_life());
        let mut b = engine_with(8, 8, &cells).with_rules(RuleSet::high_life());

        for _ in 0..10 {
            assert_eq!(a.step(), b.step());
        }
    }

    #[test]
    fn step_reads_only_the_previous_generation() {
        // Under Seeds a lone pair births the four cells touching both. An
        // in-place update would count (0, 1) when visiting (0, 2).
        let mut engine = engine_with(4, 4, &[(1, 1), (1, 2)]).with_rules(RuleSet::seeds());
        engine.step();
        assert_eq!(
            live(&engine),
            vec![
                CellId::new(0, 1),
                CellId::new(0, 2),
                CellId::new(2, 1),
                CellId::new(2, 2)
            ]
        );
    }

    #[test]
    fn corners_do_not_wrap() {
        // On a torus these three corners would birth the fourth.
        let mut engine = engine_with(4, 4, &[(0, 0), (0, 3), (3, 0)]);
        engine.step();
        assert!(live(&engine).is_empty());
    }

    #[test]
    fn block_is_still_life() {
        let mut engine = engine_with(4, 4, &[(1, 1), (1, 2), (2, 1), (2, 2)]);
        let start = engine.grid().clone();
        assert_eq!(engine.step(), &start);
    }

    #[test]
    fn toggle_out_of_bounds_is_noop() {
        let mut engine = AutomatonEngine::new(3, 3);
        assert!(!engine.toggle_cell(3, 3));
        assert!(!engine.toggle_cell(0, 10));
        assert_eq!(engine.grid().population(), 0);
        assert!(engine.toggle_cell(2, 2));
        assert_eq!(live(&engine), vec![CellId::new(2, 2)]);
    }

    #[test]
    fn set_rules_replaces_both_sets() {
        let mut engine = AutomatonEngine::new(3, 3);
        engine.set_rules(vec![3, 6], vec![2, 3]);
        assert_eq!(engine.rules(), &RuleSet::high_life());

        engine.set_rules(vec![2], vec![]);
        assert_eq!(engine.rules(), &RuleSet::seeds());
    }

    #[test]
    fn rules_above_eight_never_fire() {
        let mut engine = engine_with(3, 3, &[(1, 1)]);
        engine.set_rules(vec![9, 10], vec![9]);
        assert_eq!(engine.step().population(), 0);
    }

    #[test]
    fn resize_preserves_overlap() {
        let cells: Vec<(usize, usize)> = (0..10).map(|i| (i, 9 - i)).collect();
        let mut engine = engine_with(10, 10, &cells);
        let before = engine.grid().clone();

        engine.resize(20, 5);
        assert_eq!(engine.dimensions(), (20, 5));
        for cell in engine.grid().coords() {
            let expected = cell.row < 10 && before.is_alive(cell.row, cell.col);
            assert_eq!(engine.grid().is_alive(cell.row, cell.col), expected);
        }

        engine.resize(3, 3);
        assert_eq!(engine.dimensions(), (3, 3));
        assert_eq!(engine.grid().population(), 0);
    }

    #[test]
    fn clear_kills_everything_in_place() {
        let mut engine = engine_with(5, 5, &[(0, 0), (4, 4), (2, 3)]);
        engine.step();
        engine.clear();
        assert_eq!(engine.grid().population(), 0);
        assert_eq!(engine.dimensions(), (5, 5));
        assert_eq!(engine.generation(), 0);
    }
}
