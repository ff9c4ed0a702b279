//! Stint boundary detection
//!
//! A stint ends at the first event of the game, at every period change,
//! and whenever a substitution leaves a lineup different from the one the
//! current stint opened with. Faulted substitutions never split a stint.

use super::types::PlayerId;

/// Remembers the lineups in effect for the open stint and decides whether
/// the current on-court state constitutes a boundary.
pub struct BoundaryDetector {
    home: Vec<PlayerId>,
    away: Vec<PlayerId>,
}

impl BoundaryDetector {
    pub fn new() -> Self {
        Self {
            home: Vec::new(),
            away: Vec::new(),
        }
    }

    /// Record the lineups the stint just opened with (sorted vectors).
    pub fn stint_opened(&mut self, home: Vec<PlayerId>, away: Vec<PlayerId>) {
        self.home = home;
        self.away = away;
    }

    /// Two states are the same lineup iff both teams' 5-player sets are
    /// pairwise identical; anything else is a boundary.
    pub fn lineup_changed(&self, home: &[PlayerId], away: &[PlayerId]) -> bool {
        self.home != home || self.away != away
    }

    /// Lineups the open stint started with.
    pub fn open_lineups(&self) -> (&[PlayerId], &[PlayerId]) {
        (&self.home, &self.away)
    }
}

impl Default for BoundaryDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_lineups_do_not_split() {
        let mut detector = BoundaryDetector::new();
        detector.stint_opened(vec![1, 2, 3, 4, 5], vec![6, 7, 8, 9, 10]);

        assert!(!detector.lineup_changed(&[1, 2, 3, 4, 5], &[6, 7, 8, 9, 10]));
    }

    #[test]
    fn test_either_side_changing_splits() {
        let mut detector = BoundaryDetector::new();
        detector.stint_opened(vec![1, 2, 3, 4, 5], vec![6, 7, 8, 9, 10]);

        assert!(detector.lineup_changed(&[1, 2, 3, 4, 12], &[6, 7, 8, 9, 10]));
        assert!(detector.lineup_changed(&[1, 2, 3, 4, 5], &[6, 7, 8, 9, 12]));
    }

    #[test]
    fn test_net_unchanged_after_swap_back() {
        let mut detector = BoundaryDetector::new();
        detector.stint_opened(vec![1, 2, 3, 4, 5], vec![6, 7, 8, 9, 10]);

        // A player leaving and returning within the same dead ball leaves
        // the effective lineup intact.
        assert!(!detector.lineup_changed(&[1, 2, 3, 4, 5], &[6, 7, 8, 9, 10]));
    }
}
