//! Shared types for the segmentation engine: game metadata and output records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type TeamId = u64;
pub type PlayerId = u64;

/// Which bench a team belongs to within one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// Game header handed over by the external fetch layer.
///
/// Team ids are required to attribute points and possessions to a side;
/// the engine never resolves them itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMeta {
    pub game_id: u64,
    pub game_date: NaiveDate,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
}

impl GameMeta {
    /// Map a raw team id onto home/away, or `None` for an id that belongs
    /// to neither team (bad data; callers record a fault).
    pub fn side_of(&self, team: TeamId) -> Option<Side> {
        if team == self.home_team_id {
            Some(Side::Home)
        } else if team == self.away_team_id {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn team_of(&self, side: Side) -> TeamId {
        match side {
            Side::Home => self.home_team_id,
            Side::Away => self.away_team_id,
        }
    }
}

/// One closed stint: a maximal interval during which both teams kept the
/// same five players on court.
///
/// Stints for a game are contiguous: `end_clock`/`period` of stint `n`
/// equals `start_clock`/`period` of stint `n + 1`, except across a period
/// boundary, and `end_margin` of `n` equals `start_margin` of `n + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stint {
    pub game_id: u64,
    /// 1-based, monotonically increasing within the game
    pub stint_num: u32,
    pub period: u32,
    /// "MM:SS" remaining in the period when the stint opened
    pub start_clock: String,
    /// "MM:SS" remaining in the period when the stint closed
    pub end_clock: String,
    /// Sorted player ids on court for the home team
    pub home_lineup: Vec<PlayerId>,
    /// Sorted player ids on court for the away team
    pub away_lineup: Vec<PlayerId>,
    /// Possession-ending events observed within this stint
    pub possessions: u32,
    pub home_points: u32,
    pub away_points: u32,
    /// Home minus away score when the stint opened
    pub start_margin: i32,
    /// Home minus away score when the stint closed
    pub end_margin: i32,
}

/// Why a possession ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PossessionEnd {
    #[serde(rename = "made_shot")]
    MadeShot,
    #[serde(rename = "defensive_rebound")]
    DefensiveRebound,
    #[serde(rename = "turnover")]
    Turnover,
    #[serde(rename = "made_ft")]
    MadeFreeThrow,
    #[serde(rename = "period_end")]
    PeriodEnd,
}

impl PossessionEnd {
    pub fn as_str(&self) -> &'static str {
        match self {
            PossessionEnd::MadeShot => "made_shot",
            PossessionEnd::DefensiveRebound => "defensive_rebound",
            PossessionEnd::Turnover => "turnover",
            PossessionEnd::MadeFreeThrow => "made_ft",
            PossessionEnd::PeriodEnd => "period_end",
        }
    }
}

/// One possession: a spell of ball control by one team, with a typed end
/// reason. Second output mode alongside stints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PossessionRecord {
    pub game_id: u64,
    /// 1-based, monotonically increasing within the game
    pub possession_num: u32,
    pub period: u32,
    pub offense_team_id: TeamId,
    pub defense_team_id: TeamId,
    pub start_clock: String,
    pub end_clock: String,
    pub end_type: PossessionEnd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_of_maps_both_teams() {
        let meta = GameMeta {
            game_id: 1,
            game_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            home_team_id: 10,
            away_team_id: 20,
        };

        assert_eq!(meta.side_of(10), Some(Side::Home));
        assert_eq!(meta.side_of(20), Some(Side::Away));
        assert_eq!(meta.side_of(99), None);
        assert_eq!(meta.team_of(Side::Away), 20);
    }

    #[test]
    fn test_possession_end_serde_names() {
        let json = serde_json::to_string(&PossessionEnd::DefensiveRebound).unwrap();
        assert_eq!(json, r#""defensive_rebound""#);
        assert_eq!(PossessionEnd::MadeFreeThrow.as_str(), "made_ft");
    }
}
