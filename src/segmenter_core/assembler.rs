//! Stint assembly: the per-game segmentation fold
//!
//! `segment_game` drives the normalizer, lineup tracker, boundary
//! detector, possession counter, and scoreboard over one game's ordered
//! plays and emits numbered stints plus the possession log. Processing is
//! a pure, synchronous fold: same input, byte-identical output.

use log::{info, warn};

use super::boundary::BoundaryDetector;
use super::fault::{Fault, FaultKind};
use super::lineup::LineupTracker;
use super::normalizer::{format_clock, Event, EventKind, EventNormalizer, RawPlay};
use super::possession::{PossessionCounter, PossessionLog};
use super::score::ScoreBoard;
use super::types::{GameMeta, PossessionRecord, Stint};

/// Everything the engine produces for one game. Faults accompany partial
/// output; fatal faults zero the outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    pub stints: Vec<Stint>,
    pub possessions: Vec<PossessionRecord>,
    pub faults: Vec<Fault>,
}

impl Segmentation {
    /// A fatal fault was recorded and the game produced no output.
    pub fn is_fatal(&self) -> bool {
        self.faults.iter().any(|f| f.is_fatal())
    }
}

struct OpenStint {
    period: u32,
    start_clock: u32,
    start_margin: i32,
}

struct Assembler<'a> {
    meta: &'a GameMeta,
    tracker: LineupTracker,
    boundary: BoundaryDetector,
    scoreboard: ScoreBoard,
    counter: PossessionCounter,
    log: PossessionLog,
    stints: Vec<Stint>,
    faults: Vec<Fault>,
    open: Option<OpenStint>,
    // (period, clock) of the last accepted event, for closing a stint when
    // a PERIOD_END record is missing from the stream
    last_clock: Option<(u32, u32)>,
    ended_with_period_end: bool,
}

impl<'a> Assembler<'a> {
    fn new(meta: &'a GameMeta) -> Self {
        Self {
            meta,
            tracker: LineupTracker::new(meta),
            boundary: BoundaryDetector::new(),
            scoreboard: ScoreBoard::new(),
            counter: PossessionCounter::new(),
            log: PossessionLog::new(meta),
            stints: Vec::new(),
            faults: Vec::new(),
            open: None,
            last_clock: None,
            ended_with_period_end: false,
        }
    }

    fn record_fault(&mut self, fault: Fault) {
        warn!("⚠️  game {}: {}", self.meta.game_id, fault);
        self.faults.push(fault);
    }

    fn open_stint(&mut self, period: u32, clock_seconds: u32) {
        let (home, away) = self.tracker.snapshot();
        self.boundary.stint_opened(home, away);
        self.scoreboard.open_stint();
        self.counter.open_stint();
        self.open = Some(OpenStint {
            period,
            start_clock: clock_seconds,
            start_margin: self.scoreboard.margin(),
        });
    }

    fn close_stint(&mut self, end_clock: u32) {
        let Some(open) = self.open.take() else {
            return;
        };
        let (home_lineup, away_lineup) = self.boundary.open_lineups();
        let (home_points, away_points) = self.scoreboard.stint_points();

        self.stints.push(Stint {
            game_id: self.meta.game_id,
            stint_num: self.stints.len() as u32 + 1,
            period: open.period,
            start_clock: format_clock(open.start_clock),
            end_clock: format_clock(end_clock),
            home_lineup: home_lineup.to_vec(),
            away_lineup: away_lineup.to_vec(),
            possessions: self.counter.stint_possessions(),
            home_points,
            away_points,
            start_margin: open.start_margin,
            end_margin: self.scoreboard.margin(),
        });
    }

    /// Boundary rule (a): action with no stint open starts one at that
    /// event, with the tracker's last known-good lineups.
    fn ensure_stint_open(&mut self, event: &Event) {
        if self.open.is_some() {
            return;
        }
        if !self.tracker.is_complete() {
            self.record_fault(Fault::at_event(
                event.seq,
                event.period,
                event.clock_seconds,
                FaultKind::IncompleteLineup {
                    period: event.period,
                },
            ));
        }
        self.open_stint(event.period, event.clock_seconds);
    }

    fn apply(&mut self, event: &Event) {
        match &event.kind {
            EventKind::PeriodStart {
                home_starters,
                away_starters,
            } => {
                // A missing PERIOD_END leaves the previous stint open;
                // close it at the last clock seen in its period.
                if let Some(stale_period) = self.open.as_ref().map(|open| open.period) {
                    let end_clock = match self.last_clock {
                        Some((p, clock)) if p == stale_period => clock,
                        _ => 0,
                    };
                    let delta = self.counter.period_break();
                    self.log.apply(stale_period, end_clock, &delta);
                    self.close_stint(end_clock);
                }

                if let Err(fault) = self.tracker.apply_period_start(
                    event.seq,
                    event.period,
                    event.clock_seconds,
                    home_starters,
                    away_starters,
                ) {
                    self.record_fault(fault);
                }
                self.open_stint(event.period, event.clock_seconds);
            }
            EventKind::PeriodEnd => {
                let delta = self.counter.observe(event);
                self.log.apply(event.period, event.clock_seconds, &delta);
                self.close_stint(event.clock_seconds);
            }
            EventKind::Substitution {
                player_in,
                player_out,
            } => {
                // Normalizer guarantees a team on substitutions.
                let Some(team) = event.team else { return };
                match self.tracker.apply_substitution(
                    event.seq,
                    event.period,
                    event.clock_seconds,
                    team,
                    *player_in,
                    *player_out,
                ) {
                    Err(fault) => self.record_fault(fault),
                    Ok(()) => {
                        let (home, away) = self.tracker.snapshot();
                        if self.open.is_some() && self.boundary.lineup_changed(&home, &away) {
                            self.close_stint(event.clock_seconds);
                            self.open_stint(event.period, event.clock_seconds);
                        }
                    }
                }
            }
            EventKind::Score { points, made, .. } => {
                self.ensure_stint_open(event);
                if *made {
                    // Normalizer guarantees a team on scores.
                    if let Some(team) = event.team {
                        match self.meta.side_of(team) {
                            Some(side) => self.scoreboard.add_points(side, *points),
                            None => self.record_fault(Fault::at_event(
                                event.seq,
                                event.period,
                                event.clock_seconds,
                                FaultKind::MalformedPlay {
                                    reason: format!("scoring team {} is in neither lineup", team),
                                },
                            )),
                        }
                    }
                }
                let delta = self.counter.observe(event);
                self.log.apply(event.period, event.clock_seconds, &delta);
            }
            EventKind::Rebound | EventKind::Turnover | EventKind::Foul | EventKind::Other => {
                self.ensure_stint_open(event);
                let delta = self.counter.observe(event);
                self.log.apply(event.period, event.clock_seconds, &delta);
            }
        }

        self.last_clock = Some((event.period, event.clock_seconds));
        self.ended_with_period_end = matches!(event.kind, EventKind::PeriodEnd);
    }
}

/// Segment one game's ordered play-by-play into stints and possessions.
///
/// The single entry point of the engine. Deterministic and side-effect
/// free: re-running on the same input yields identical records, so callers
/// may skip or force reprocessing freely.
pub fn segment_game(meta: &GameMeta, plays: &[RawPlay]) -> Segmentation {
    let mut assembler = Assembler::new(meta);
    let mut normalizer = EventNormalizer::new();
    let mut accepted = 0usize;

    for (seq, raw) in plays.iter().enumerate() {
        match normalizer.normalize(seq, raw) {
            Ok(event) => {
                accepted += 1;
                assembler.apply(&event);
            }
            Err(fault) => assembler.record_fault(fault),
        }
    }

    let Assembler {
        stints,
        mut faults,
        last_clock,
        ended_with_period_end,
        log,
        ..
    } = assembler;

    if accepted == 0 {
        let fault = Fault::for_game(FaultKind::EmptyGame);
        warn!("❌ game {}: {}", meta.game_id, fault);
        faults.push(fault);
        return Segmentation {
            stints: Vec::new(),
            possessions: Vec::new(),
            faults,
        };
    }

    if !ended_with_period_end {
        let last_period = last_clock.map(|(p, _)| p).unwrap_or(0);
        let fault = Fault::for_game(FaultKind::UnclosedGame { last_period });
        warn!("❌ game {}: {}", meta.game_id, fault);
        faults.push(fault);
        // Partial stint rows would violate the partition invariant
        // downstream, so a structurally incomplete game yields nothing.
        return Segmentation {
            stints: Vec::new(),
            possessions: Vec::new(),
            faults,
        };
    }

    let possessions = log.into_records();
    info!(
        "✅ game {}: {} stints, {} possessions, {} faults",
        meta.game_id,
        stints.len(),
        possessions.len(),
        faults.len()
    );

    Segmentation {
        stints,
        possessions,
        faults,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HOME: u64 = 10;
    const AWAY: u64 = 20;

    fn meta() -> GameMeta {
        GameMeta {
            game_id: 42,
            game_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            home_team_id: HOME,
            away_team_id: AWAY,
        }
    }

    fn play(period: u32, clock: &str, event_type: &str) -> RawPlay {
        RawPlay {
            period,
            clock: clock.to_string(),
            event_type: event_type.to_string(),
            team_id: None,
            points: None,
            made: None,
            ft_number: None,
            ft_total: None,
            player_in: None,
            player_out: None,
            home_starters: None,
            away_starters: None,
        }
    }

    fn period_start(period: u32) -> RawPlay {
        let mut p = play(period, "12:00", "PERIOD_START");
        p.home_starters = Some(vec![1, 2, 3, 4, 5]);
        p.away_starters = Some(vec![6, 7, 8, 9, 10]);
        p
    }

    fn score(period: u32, clock: &str, team: u64, points: u8, made: bool) -> RawPlay {
        let mut p = play(period, clock, "SCORE");
        p.team_id = Some(team);
        p.points = Some(points);
        p.made = Some(made);
        p
    }

    fn substitution(period: u32, clock: &str, team: u64, pin: u64, pout: u64) -> RawPlay {
        let mut p = play(period, clock, "SUBSTITUTION");
        p.team_id = Some(team);
        p.player_in = Some(pin);
        p.player_out = Some(pout);
        p
    }

    fn rebound(period: u32, clock: &str, team: u64) -> RawPlay {
        let mut p = play(period, clock, "REBOUND");
        p.team_id = Some(team);
        p
    }

    #[test]
    fn test_single_period_two_stints() {
        let plays = vec![
            period_start(1),
            score(1, "10:00", HOME, 2, true),
            rebound(1, "9:40", AWAY),
            substitution(1, "8:00", HOME, 12, 1),
            score(1, "6:00", AWAY, 3, true),
            play(1, "0:00", "PERIOD_END"),
        ];

        let result = segment_game(&meta(), &plays);
        assert!(result.faults.is_empty());
        assert_eq!(result.stints.len(), 2);

        let first = &result.stints[0];
        assert_eq!(first.stint_num, 1);
        assert_eq!(first.start_clock, "12:00");
        assert_eq!(first.end_clock, "08:00");
        assert_eq!(first.home_points, 2);
        assert_eq!(first.away_points, 0);
        assert_eq!(first.possessions, 1);
        assert_eq!(first.start_margin, 0);
        assert_eq!(first.end_margin, 2);
        assert_eq!(first.home_lineup, vec![1, 2, 3, 4, 5]);

        let second = &result.stints[1];
        assert_eq!(second.stint_num, 2);
        assert_eq!(second.start_clock, "08:00");
        assert_eq!(second.end_clock, "00:00");
        assert_eq!(second.home_points, 0);
        assert_eq!(second.away_points, 3);
        assert_eq!(second.possessions, 1);
        assert_eq!(second.start_margin, 2);
        assert_eq!(second.end_margin, -1);
        assert_eq!(second.home_lineup, vec![2, 3, 4, 5, 12]);
    }

    #[test]
    fn test_period_boundary_always_splits() {
        let plays = vec![
            period_start(1),
            score(1, "5:00", HOME, 2, true),
            play(1, "0:00", "PERIOD_END"),
            period_start(2),
            score(2, "5:00", AWAY, 2, true),
            play(2, "0:00", "PERIOD_END"),
        ];

        let result = segment_game(&meta(), &plays);
        assert_eq!(result.stints.len(), 2);
        assert_eq!(result.stints[0].period, 1);
        assert_eq!(result.stints[1].period, 2);
        // Same lineups both periods; the period change alone split them.
        assert_eq!(result.stints[0].home_lineup, result.stints[1].home_lineup);
        assert_eq!(result.stints[0].end_margin, result.stints[1].start_margin);
    }

    #[test]
    fn test_faulted_substitution_does_not_split() {
        let plays = vec![
            period_start(1),
            score(1, "10:00", HOME, 2, true),
            // Player 99 was never on court.
            substitution(1, "8:00", HOME, 12, 99),
            score(1, "6:00", AWAY, 2, true),
            play(1, "0:00", "PERIOD_END"),
        ];

        let result = segment_game(&meta(), &plays);
        assert_eq!(result.stints.len(), 1);
        assert_eq!(result.faults.len(), 1);
        assert!(matches!(
            result.faults[0].kind,
            FaultKind::InvalidSubstitution { .. }
        ));
        assert_eq!(result.stints[0].home_lineup, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_back_to_back_substitutions_allow_zero_duration_stint() {
        let plays = vec![
            period_start(1),
            score(1, "10:00", HOME, 2, true),
            substitution(1, "8:00", HOME, 12, 1),
            substitution(1, "8:00", HOME, 13, 2),
            score(1, "6:00", AWAY, 2, true),
            play(1, "0:00", "PERIOD_END"),
        ];

        let result = segment_game(&meta(), &plays);
        assert_eq!(result.stints.len(), 3);

        let zero = &result.stints[1];
        assert_eq!(zero.start_clock, zero.end_clock);
        assert_eq!(zero.possessions, 0);
        assert_eq!(zero.home_points, 0);
        assert_eq!(zero.away_points, 0);
        assert_eq!(zero.start_margin, zero.end_margin);
    }

    #[test]
    fn test_unclosed_game_is_fatal() {
        let plays = vec![
            period_start(1),
            score(1, "10:00", HOME, 2, true),
            score(1, "6:00", AWAY, 2, true),
        ];

        let result = segment_game(&meta(), &plays);
        assert!(result.is_fatal());
        assert!(result.stints.is_empty());
        assert!(result.possessions.is_empty());
        assert_eq!(
            result.faults.last().unwrap().kind,
            FaultKind::UnclosedGame { last_period: 1 }
        );
    }

    #[test]
    fn test_empty_game_is_fatal() {
        let result = segment_game(&meta(), &[]);
        assert!(result.is_fatal());
        assert!(result.stints.is_empty());
        assert_eq!(result.faults[0].kind, FaultKind::EmptyGame);
    }

    #[test]
    fn test_missing_period_end_closes_stint_at_last_clock() {
        let plays = vec![
            period_start(1),
            score(1, "5:00", HOME, 2, true),
            // PERIOD_END for period 1 was dropped from the feed.
            period_start(2),
            score(2, "5:00", AWAY, 2, true),
            play(2, "0:00", "PERIOD_END"),
        ];

        let result = segment_game(&meta(), &plays);
        assert_eq!(result.stints.len(), 2);
        assert_eq!(result.stints[0].end_clock, "05:00");
        assert_eq!(result.stints[1].period, 2);
    }

    #[test]
    fn test_stream_without_period_start_opens_lazily() {
        let plays = vec![
            score(1, "10:00", HOME, 2, true),
            score(1, "6:00", AWAY, 2, true),
            play(1, "0:00", "PERIOD_END"),
        ];

        let result = segment_game(&meta(), &plays);
        assert_eq!(result.stints.len(), 1);
        assert_eq!(result.stints[0].start_clock, "10:00");
        // No lineups were ever supplied.
        assert!(result
            .faults
            .iter()
            .any(|f| matches!(f.kind, FaultKind::IncompleteLineup { .. })));
    }

    #[test]
    fn test_idempotent_reprocessing() {
        let plays = vec![
            period_start(1),
            score(1, "10:00", HOME, 2, true),
            substitution(1, "8:00", HOME, 12, 1),
            score(1, "6:00", AWAY, 3, true),
            play(1, "0:00", "PERIOD_END"),
        ];

        let first = segment_game(&meta(), &plays);
        let second = segment_game(&meta(), &plays);
        assert_eq!(first, second);
    }
}
