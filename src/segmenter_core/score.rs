//! Running score and margin aggregation
//!
//! Cumulative home/away scores span the whole game; per-stint points are
//! the deltas between stint open and close. Margin is always home minus
//! away.

use super::types::Side;

pub struct ScoreBoard {
    home: u32,
    away: u32,
    stint_home_open: u32,
    stint_away_open: u32,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self {
            home: 0,
            away: 0,
            stint_home_open: 0,
            stint_away_open: 0,
        }
    }

    pub fn add_points(&mut self, side: Side, points: u8) {
        match side {
            Side::Home => self.home += points as u32,
            Side::Away => self.away += points as u32,
        }
    }

    /// Home minus away, cumulative.
    pub fn margin(&self) -> i32 {
        self.home as i32 - self.away as i32
    }

    /// Snapshot the cumulative scores as the open point of a new stint.
    pub fn open_stint(&mut self) {
        self.stint_home_open = self.home;
        self.stint_away_open = self.away;
    }

    /// Points scored by each side since the stint opened.
    pub fn stint_points(&self) -> (u32, u32) {
        (
            self.home - self.stint_home_open,
            self.away - self.stint_away_open,
        )
    }

    pub fn totals(&self) -> (u32, u32) {
        (self.home, self.away)
    }
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new()
    }
}
