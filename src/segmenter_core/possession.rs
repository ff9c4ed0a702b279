//! Possession-ending heuristic
//!
//! `PossessionCounter` classifies each event as opening and/or closing a
//! possession and keeps a running tally scoped to the open stint.
//! `PossessionLog` mirrors the same deltas into full possession records,
//! the second output mode of the engine.
//!
//! # Heuristic
//! - A made field goal ends the scoring team's possession.
//! - A defensive rebound of a live missed shot ends the shooting team's
//!   possession and opens one for the rebounder; an offensive rebound
//!   continues the possession.
//! - A turnover ends the team's possession.
//! - The final made free throw of a sequence ends the possession;
//!   intermediate attempts do not. A missed final free throw leaves a live
//!   ball awaiting the rebound.
//! - Period end closes a live possession exactly once; a possession
//!   already closed by one of the above is not double-counted.
//!
//! Fouls never open or close a possession: a defensive foul carries the
//! defender's team id, so inferring ball control from it would flip the
//! offense. A rebound with no live missed shot (team rebound, or one
//! logged after a made basket) opens control for the rebounder but ends
//! nothing.

use log::debug;

use super::normalizer::{Event, EventKind};
use super::types::{GameMeta, PossessionEnd, PossessionRecord, TeamId};

/// What one event did to possession state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PossessionDelta {
    /// A possession opened at this event, with this offense
    pub opened: Option<TeamId>,
    /// This team's possession ended at this event
    pub closed: Option<(TeamId, PossessionEnd)>,
}

impl PossessionDelta {
    const NONE: PossessionDelta = PossessionDelta {
        opened: None,
        closed: None,
    };
}

pub struct PossessionCounter {
    stint_count: u32,
    /// Offense of the live possession, if one is in progress
    offense: Option<TeamId>,
    /// Team of the last live missed shot, awaiting a rebound
    pending_shot: Option<TeamId>,
}

impl PossessionCounter {
    pub fn new() -> Self {
        Self {
            stint_count: 0,
            offense: None,
            pending_shot: None,
        }
    }

    /// Reset the per-stint tally. Live possession state carries across the
    /// boundary: a possession is attributed to the stint in which it ends.
    pub fn open_stint(&mut self) {
        self.stint_count = 0;
    }

    /// Possession-ending events observed since the stint opened.
    pub fn stint_possessions(&self) -> u32 {
        self.stint_count
    }

    /// Classify one event. Substitutions and period starts must not be fed
    /// here; the assembler routes them separately.
    pub fn observe(&mut self, event: &Event) -> PossessionDelta {
        match &event.kind {
            EventKind::Score {
                points,
                made,
                free_throw,
            } => {
                let Some(team) = event.team else {
                    return PossessionDelta::NONE;
                };
                let opened = self.ensure_open(team);

                if *points >= 2 {
                    if *made {
                        let delta = PossessionDelta {
                            opened,
                            closed: Some(self.close(team, PossessionEnd::MadeShot)),
                        };
                        debug!("possession closed: made shot by {}", team);
                        delta
                    } else {
                        self.pending_shot = Some(team);
                        PossessionDelta {
                            opened,
                            closed: None,
                        }
                    }
                } else {
                    // Free throw. Only the final attempt of its sequence can
                    // end the possession; a missed final attempt leaves a
                    // live ball.
                    let is_final = free_throw.map(|ft| ft.is_final()).unwrap_or(true);
                    if *made && is_final {
                        PossessionDelta {
                            opened,
                            closed: Some(self.close(team, PossessionEnd::MadeFreeThrow)),
                        }
                    } else {
                        if !*made && is_final {
                            self.pending_shot = Some(team);
                        }
                        PossessionDelta {
                            opened,
                            closed: None,
                        }
                    }
                }
            }
            EventKind::Rebound => {
                let Some(team) = event.team else {
                    return PossessionDelta::NONE;
                };
                match self.pending_shot {
                    Some(shooter) if team != shooter => {
                        // Defensive rebound: the shooter's possession ends,
                        // the rebounder's begins at the same event.
                        let closed = self.close(shooter, PossessionEnd::DefensiveRebound);
                        let opened = self.ensure_open(team);
                        debug!("possession closed: defensive rebound by {}", team);
                        PossessionDelta {
                            opened,
                            closed: Some(closed),
                        }
                    }
                    Some(_) => {
                        // Offensive rebound: same possession continues.
                        self.pending_shot = None;
                        PossessionDelta::NONE
                    }
                    None => {
                        // No live missed shot: nothing to end, but the
                        // rebounder controls the ball now.
                        PossessionDelta {
                            opened: self.ensure_open(team),
                            closed: None,
                        }
                    }
                }
            }
            EventKind::Turnover => {
                let Some(team) = event.team else {
                    return PossessionDelta::NONE;
                };
                let opened = self.ensure_open(team);
                PossessionDelta {
                    opened,
                    closed: Some(self.close(team, PossessionEnd::Turnover)),
                }
            }
            EventKind::PeriodEnd => self.period_break(),
            EventKind::Foul | EventKind::Other => PossessionDelta::NONE,
            EventKind::Substitution { .. } | EventKind::PeriodStart { .. } => {
                PossessionDelta::NONE
            }
        }
    }

    /// Close a live possession at a period boundary. Also used by the
    /// assembler when a PERIOD_END record is missing from the stream.
    pub fn period_break(&mut self) -> PossessionDelta {
        match self.offense {
            Some(team) => PossessionDelta {
                opened: None,
                closed: Some(self.close(team, PossessionEnd::PeriodEnd)),
            },
            None => {
                self.pending_shot = None;
                PossessionDelta::NONE
            }
        }
    }

    fn ensure_open(&mut self, team: TeamId) -> Option<TeamId> {
        if self.offense.is_none() {
            self.offense = Some(team);
            Some(team)
        } else {
            None
        }
    }

    fn close(&mut self, team: TeamId, end: PossessionEnd) -> (TeamId, PossessionEnd) {
        self.stint_count += 1;
        self.offense = None;
        self.pending_shot = None;
        (team, end)
    }
}

impl Default for PossessionCounter {
    fn default() -> Self {
        Self::new()
    }
}

struct OpenPossession {
    period: u32,
    start_clock: u32,
    offense: TeamId,
}

/// Builds the ordered possession-record output from counter deltas.
pub struct PossessionLog {
    game_id: u64,
    home_team_id: TeamId,
    away_team_id: TeamId,
    records: Vec<PossessionRecord>,
    open: Option<OpenPossession>,
}

impl PossessionLog {
    pub fn new(meta: &GameMeta) -> Self {
        Self {
            game_id: meta.game_id,
            home_team_id: meta.home_team_id,
            away_team_id: meta.away_team_id,
            records: Vec::new(),
            open: None,
        }
    }

    /// Mirror one event's possession delta into the log.
    pub fn apply(&mut self, period: u32, clock_seconds: u32, delta: &PossessionDelta) {
        // A single event can both open and close. When the same team is on
        // both sides (a make that cold-opens) the open comes first; when
        // they differ (a defensive rebound) the close of the old possession
        // comes first.
        let open_first = match (delta.opened, delta.closed) {
            (Some(opened), Some((closed, _))) => opened == closed,
            _ => true,
        };

        if open_first {
            if let Some(offense) = delta.opened {
                self.open_possession(period, clock_seconds, offense);
            }
            if let Some((offense, end)) = delta.closed {
                self.close_possession(period, clock_seconds, offense, end);
            }
        } else {
            if let Some((offense, end)) = delta.closed {
                self.close_possession(period, clock_seconds, offense, end);
            }
            if let Some(offense) = delta.opened {
                self.open_possession(period, clock_seconds, offense);
            }
        }
    }

    pub fn into_records(self) -> Vec<PossessionRecord> {
        self.records
    }

    fn open_possession(&mut self, period: u32, clock_seconds: u32, offense: TeamId) {
        self.open = Some(OpenPossession {
            period,
            start_clock: clock_seconds,
            offense,
        });
    }

    fn close_possession(
        &mut self,
        period: u32,
        clock_seconds: u32,
        offense: TeamId,
        end: PossessionEnd,
    ) {
        use super::normalizer::format_clock;

        let open = self.open.take().unwrap_or(OpenPossession {
            period,
            start_clock: clock_seconds,
            offense,
        });

        let defense = if offense == self.home_team_id {
            self.away_team_id
        } else {
            self.home_team_id
        };

        self.records.push(PossessionRecord {
            game_id: self.game_id,
            possession_num: self.records.len() as u32 + 1,
            period: open.period,
            offense_team_id: offense,
            defense_team_id: defense,
            start_clock: format_clock(open.start_clock),
            end_clock: format_clock(clock_seconds),
            end_type: end,
        });
    }
}
