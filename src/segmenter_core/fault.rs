//! Fault taxonomy for segmentation
//!
//! Recoverable faults identify a single bad event (or period) and never
//! abort a game; fatal faults mean the stream is structurally incomplete
//! and the game yields zero stints. All faults are returned to the caller
//! alongside whatever partial output exists.

use super::types::{PlayerId, TeamId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultKind {
    /// Clock text did not parse as "MM:SS"
    ClockParse { text: String },
    /// Event ordering key (period, -clock, seq) did not advance
    OutOfOrder,
    /// A required payload field was missing or out of range
    MalformedPlay { reason: String },
    /// Substitution referenced a player not on court, or would not leave
    /// exactly five distinct players
    InvalidSubstitution {
        team: TeamId,
        player_in: PlayerId,
        player_out: PlayerId,
    },
    /// PERIOD_START did not supply exactly five distinct starters per team
    IncompleteLineup { period: u32 },
    /// The stream contained no events at all (fatal)
    EmptyGame,
    /// The stream did not end with a terminal PERIOD_END (fatal)
    UnclosedGame { last_period: u32 },
}

impl FaultKind {
    /// Fatal faults abort segmentation for the whole game.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FaultKind::EmptyGame | FaultKind::UnclosedGame { .. })
    }
}

/// A recorded data-quality fault, tagged with the offending event's
/// position in the stream where one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Original stream index of the offending event, if event-scoped
    pub seq: Option<usize>,
    pub period: Option<u32>,
    pub clock_seconds: Option<u32>,
    pub kind: FaultKind,
}

impl Fault {
    /// Fault scoped to a single event.
    pub fn at_event(seq: usize, period: u32, clock_seconds: u32, kind: FaultKind) -> Self {
        Self {
            seq: Some(seq),
            period: Some(period),
            clock_seconds: Some(clock_seconds),
            kind,
        }
    }

    /// Fault scoped to the whole game (fatal conditions).
    pub fn for_game(kind: FaultKind) -> Self {
        Self {
            seq: None,
            period: None,
            clock_seconds: None,
            kind,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaultKind::ClockParse { text } => write!(f, "unparseable clock text {:?}", text),
            FaultKind::OutOfOrder => write!(f, "event out of order"),
            FaultKind::MalformedPlay { reason } => write!(f, "malformed play: {}", reason),
            FaultKind::InvalidSubstitution {
                team,
                player_in,
                player_out,
            } => write!(
                f,
                "invalid substitution for team {}: {} in for {}",
                team, player_in, player_out
            ),
            FaultKind::IncompleteLineup { period } => {
                write!(f, "period {} start without 5 distinct starters per team", period)
            }
            FaultKind::EmptyGame => write!(f, "event stream is empty"),
            FaultKind::UnclosedGame { last_period } => write!(
                f,
                "stream ended without a terminal PERIOD_END (last period {})",
                last_period
            ),
        }
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.seq {
            Some(seq) => write!(f, "event #{}: {}", seq, self.kind),
            None => write!(f, "game: {}", self.kind),
        }
    }
}

impl std::error::Error for Fault {}
