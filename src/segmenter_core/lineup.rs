//! On-court lineup tracking
//!
//! Maintains the five-player roster per team. Lineup identity (both teams'
//! 5-player sets pairwise identical) is what defines a stint, so this state
//! is the boundary detector's only input besides period changes. Faulted
//! operations leave the last known-good state untouched.

use std::collections::BTreeSet;

use super::fault::{Fault, FaultKind};
use super::types::{GameMeta, PlayerId, Side, TeamId};

pub struct LineupTracker {
    home_team_id: TeamId,
    away_team_id: TeamId,
    home: BTreeSet<PlayerId>,
    away: BTreeSet<PlayerId>,
}

impl LineupTracker {
    pub fn new(meta: &GameMeta) -> Self {
        Self {
            home_team_id: meta.home_team_id,
            away_team_id: meta.away_team_id,
            home: BTreeSet::new(),
            away: BTreeSet::new(),
        }
    }

    /// Set both lineups to the period's starters.
    ///
    /// A side that does not supply exactly five distinct players keeps the
    /// previous period's closing lineup as a best-effort substitute, and
    /// the call reports an `IncompleteLineup` fault.
    pub fn apply_period_start(
        &mut self,
        seq: usize,
        period: u32,
        clock_seconds: u32,
        home_starters: &[PlayerId],
        away_starters: &[PlayerId],
    ) -> Result<(), Fault> {
        let home: BTreeSet<PlayerId> = home_starters.iter().copied().collect();
        let away: BTreeSet<PlayerId> = away_starters.iter().copied().collect();

        let home_ok = home.len() == 5;
        let away_ok = away.len() == 5;

        if home_ok {
            self.home = home;
        }
        if away_ok {
            self.away = away;
        }

        if home_ok && away_ok {
            Ok(())
        } else {
            Err(Fault::at_event(
                seq,
                period,
                clock_seconds,
                FaultKind::IncompleteLineup { period },
            ))
        }
    }

    /// Replace one on-court player. Fails (state unchanged) if the outgoing
    /// player is not on court or the result is not five distinct players.
    pub fn apply_substitution(
        &mut self,
        seq: usize,
        period: u32,
        clock_seconds: u32,
        team: TeamId,
        player_in: PlayerId,
        player_out: PlayerId,
    ) -> Result<(), Fault> {
        let invalid = || {
            Fault::at_event(
                seq,
                period,
                clock_seconds,
                FaultKind::InvalidSubstitution {
                    team,
                    player_in,
                    player_out,
                },
            )
        };

        let lineup = if team == self.home_team_id {
            &mut self.home
        } else if team == self.away_team_id {
            &mut self.away
        } else {
            return Err(invalid());
        };

        if !lineup.contains(&player_out) {
            return Err(invalid());
        }
        // Incoming player already on court would collapse the set to four.
        if lineup.contains(&player_in) {
            return Err(invalid());
        }

        lineup.remove(&player_out);
        lineup.insert(player_in);

        debug_assert_eq!(lineup.len(), 5);
        Ok(())
    }

    pub fn lineup(&self, side: Side) -> &BTreeSet<PlayerId> {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// Both lineups as sorted vectors, for stint emission and boundary
    /// comparison.
    pub fn snapshot(&self) -> (Vec<PlayerId>, Vec<PlayerId>) {
        (
            self.home.iter().copied().collect(),
            self.away.iter().copied().collect(),
        )
    }

    /// Both teams have exactly five players on court.
    pub fn is_complete(&self) -> bool {
        self.home.len() == 5 && self.away.len() == 5
    }
}
