use serde::{Deserialize, Serialize};

use crate::core::MAX_PIECE_EXTENT;

/// Most lines a single turn can clear: every row and column a piece spans.
pub const MAX_LINES_PER_TURN: usize = 2 * MAX_PIECE_EXTENT;

/// Point values of a turn.
///
/// A turn that places `cells` cells and clears `lines` lines while the combo
/// streak is `streak` is worth
///
/// ```text
/// cells × cell_points + line_bonus × lines × lines × (1 + streak)
/// ```
///
/// plus `all_clear_bonus` when clearing leaves the board empty. `streak` is
/// the value before the turn, so the first clearing turn of a streak is not
/// multiplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringRules {
    pub cell_points: u32,
    pub line_bonus: u32,
    pub all_clear_bonus: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            cell_points: 1,
            line_bonus: 10,
            all_clear_bonus: 300,
        }
    }
}

impl ScoringRules {
    /// Points awarded for one turn, saturating at `u64::MAX`.
    #[must_use]
    pub fn turn_points(&self, cells: usize, lines: usize, streak: u32, all_clear: bool) -> u64 {
        let cells = cells as u64;
        let lines = lines as u64;
        let mut points = cells.saturating_mul(u64::from(self.cell_points));
        if lines > 0 {
            let bonus = u64::from(self.line_bonus)
                .saturating_mul(lines * lines)
                .saturating_mul(1 + u64::from(streak));
            points = points.saturating_add(bonus);
            if all_clear {
                points = points.saturating_add(u64::from(self.all_clear_bonus));
            }
        }
        points
    }
}

/// Game statistics tracking score, combo streak and line clears.
///
/// - **Score**: Sum of all turn points
/// - **Moves**: Number of accepted placements
/// - **Combo streak**: Consecutive clearing turns, reset by a non-clearing turn
/// - **Line clear distribution**: How many turns cleared 0, 1, 2, ... lines
///
/// # Example
///
/// ```
/// use gridblast_engine::{GameStats, ScoringRules};
///
/// let rules = ScoringRules::default();
/// let mut stats = GameStats::new();
/// stats.complete_turn(&rules, 4, 1, false); // 4 + 10
/// stats.complete_turn(&rules, 2, 2, false); // 2 + 10 × 2 × 2 × 2
///
/// assert_eq!(stats.score(), 14 + 82);
/// assert_eq!(stats.combo_streak(), 2);
/// assert_eq!(stats.line_cleared_counter()[2], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameStats {
    score: u64,
    moves: usize,
    total_cleared_lines: usize,
    combo_streak: u32,
    max_combo_streak: u32,
    all_clears: usize,
    line_cleared_counter: [usize; MAX_LINES_PER_TURN + 1],
}

impl GameStats {
    /// Creates a new game statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            moves: 0,
            total_cleared_lines: 0,
            combo_streak: 0,
            max_combo_streak: 0,
            all_clears: 0,
            line_cleared_counter: [0; MAX_LINES_PER_TURN + 1],
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Returns the number of accepted placements.
    #[must_use]
    pub const fn moves(&self) -> usize {
        self.moves
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns the number of consecutive clearing turns up to now.
    #[must_use]
    pub const fn combo_streak(&self) -> u32 {
        self.combo_streak
    }

    #[must_use]
    pub const fn max_combo_streak(&self) -> u32 {
        self.max_combo_streak
    }

    /// Returns how many turns left the board completely empty.
    #[must_use]
    pub const fn all_clears(&self) -> usize {
        self.all_clears
    }

    /// Returns a histogram of turns by number of lines cleared.
    ///
    /// Index `n` counts the turns that cleared exactly `n` lines.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; MAX_LINES_PER_TURN + 1] {
        &self.line_cleared_counter
    }

    /// Updates statistics after a placement and returns the points it earned.
    ///
    /// # Arguments
    ///
    /// * `cells` - Number of cells the placed piece covered
    /// * `cleared_lines` - Rows plus columns cleared by the placement
    /// * `all_clear` - Whether the board is empty after clearing
    pub fn complete_turn(
        &mut self,
        rules: &ScoringRules,
        cells: usize,
        cleared_lines: usize,
        all_clear: bool,
    ) -> u64 {
        let points = rules.turn_points(cells, cleared_lines, self.combo_streak, all_clear);
        self.score = self.score.saturating_add(points);
        self.moves += 1;
        self.total_cleared_lines += cleared_lines;
        self.line_cleared_counter[cleared_lines.min(MAX_LINES_PER_TURN)] += 1;
        if cleared_lines > 0 {
            self.combo_streak += 1;
            self.max_combo_streak = self.max_combo_streak.max(self.combo_streak);
            if all_clear {
                self.all_clears += 1;
            }
        } else {
            self.combo_streak = 0;
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extreme_bonus_saturates() {
        let rules = ScoringRules {
            cell_points: u32::MAX,
            line_bonus: u32::MAX,
            all_clear_bonus: u32::MAX,
        };
        assert_eq!(rules.turn_points(25, 16, u32::MAX, true), u64::MAX);
        assert_eq!(rules.turn_points(1, 0, u32::MAX, false), u64::from(u32::MAX));
    }

    #[test]
    fn test_placement_only_awards_cell_points() {
        let rules = ScoringRules::default();
        let mut stats = GameStats::new();
        assert_eq!(stats.complete_turn(&rules, 1, 0, false), 1);
        assert_eq!(stats.score(), 1);
        assert_eq!(stats.combo_streak(), 0);
        assert_eq!(stats.line_cleared_counter()[0], 1);
    }

    #[test]
    fn test_simultaneous_lines_multiply_bonus() {
        let rules = ScoringRules::default();
        assert_eq!(rules.turn_points(0, 1, 0, false), 10);
        assert_eq!(rules.turn_points(0, 2, 0, false), 40);
        assert_eq!(rules.turn_points(0, 3, 0, false), 90);
    }

    #[test]
    fn test_streak_multiplies_line_bonus() {
        let rules = ScoringRules::default();
        let mut stats = GameStats::new();
        assert_eq!(stats.complete_turn(&rules, 1, 1, false), 11);
        assert_eq!(stats.complete_turn(&rules, 1, 1, false), 21);
        assert_eq!(stats.complete_turn(&rules, 1, 1, false), 31);
        assert_eq!(stats.combo_streak(), 3);
        assert_eq!(stats.max_combo_streak(), 3);
    }

    #[test]
    fn test_non_clearing_turn_resets_streak() {
        let rules = ScoringRules::default();
        let mut stats = GameStats::new();
        stats.complete_turn(&rules, 1, 1, false);
        stats.complete_turn(&rules, 1, 1, false);
        stats.complete_turn(&rules, 3, 0, false);
        assert_eq!(stats.combo_streak(), 0);
        assert_eq!(stats.max_combo_streak(), 2);
        assert_eq!(stats.complete_turn(&rules, 1, 1, false), 11);
    }

    #[test]
    fn test_all_clear_bonus() {
        let rules = ScoringRules::default();
        let mut stats = GameStats::new();
        assert_eq!(stats.complete_turn(&rules, 1, 1, true), 1 + 10 + 300);
        assert_eq!(stats.all_clears(), 1);
        // An empty board without clearing is not an all-clear.
        assert_eq!(rules.turn_points(0, 0, 0, true), 0);
    }

    #[test]
    fn test_custom_rules() {
        let rules = ScoringRules {
            cell_points: 2,
            line_bonus: 5,
            all_clear_bonus: 0,
        };
        assert_eq!(rules.turn_points(3, 2, 1, true), 6 + 5 * 4 * 2);
    }

    #[test]
    fn test_score_is_monotonic() {
        let rules = ScoringRules::default();
        let mut stats = GameStats::new();
        let mut last = stats.score();
        for (cells, lines) in [(1, 0), (4, 1), (9, 2), (2, 0), (3, 1)] {
            stats.complete_turn(&rules, cells, lines, false);
            assert!(stats.score() >= last);
            last = stats.score();
        }
        assert_eq!(stats.moves(), 5);
        assert_eq!(stats.total_cleared_lines(), 4);
    }

    #[test]
    fn test_scoring_rules_deserialize_with_defaults() {
        let rules: ScoringRules = serde_json::from_str(r#"{"line_bonus": 20}"#).unwrap();
        assert_eq!(
            rules,
            ScoringRules {
                cell_points: 1,
                line_bonus: 20,
                all_clear_bonus: 300,
            }
        );
        assert!(serde_json::from_str::<ScoringRules>(r#"{"bonus": 1}"#).is_err());
    }
}
