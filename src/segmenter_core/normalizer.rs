//! Play normalization from raw fetch-layer records to canonical events
//!
//! The fetch layer hands over one `RawPlay` per line of play-by-play,
//! already scoped to a single game. Normalization converts clock text to
//! integer seconds, maps the loose event-type string onto a closed
//! `EventKind` sum type, and validates that the ordering key
//! `(period, -clock, seq)` strictly advances. Each rejected play becomes a
//! recoverable fault; normalization never mutates shared state.

use serde::{Deserialize, Serialize};

use super::fault::{Fault, FaultKind};
use super::types::{PlayerId, TeamId};

/// Seconds in a regulation period
pub const REGULATION_SECS: u32 = 720;
/// Seconds in an overtime period
pub const OVERTIME_SECS: u32 = 300;

/// Length of a period in seconds (periods 5+ are overtime).
pub fn period_length_secs(period: u32) -> u32 {
    if period >= 5 {
        OVERTIME_SECS
    } else {
        REGULATION_SECS
    }
}

/// Parse "MM:SS" clock text into seconds remaining in the period.
///
/// A fractional seconds part ("0:24.7") is truncated; anything else is
/// rejected.
pub fn parse_clock(text: &str) -> Option<u32> {
    let (minutes, seconds) = text.trim().split_once(':')?;
    let minutes: u32 = minutes.parse().ok()?;
    // Seconds may carry a fraction in some feeds; truncate it.
    let seconds: f64 = seconds.parse().ok()?;
    if !(0.0..60.0).contains(&seconds) {
        return None;
    }
    Some(minutes * 60 + seconds as u32)
}

/// Format seconds remaining as "MM:SS".
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Wire shape of one play, as produced by the external fetch layer.
///
/// Optional fields are populated per event type; the normalizer validates
/// presence. Parseable from a JSONL line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPlay {
    pub period: u32,
    pub clock: String,
    pub event_type: String,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    /// Shot value (1, 2, 3) for SCORE events
    #[serde(default)]
    pub points: Option<u8>,
    #[serde(default)]
    pub made: Option<bool>,
    /// Free-throw position within its sequence ("2 of 2" => number=2, total=2)
    #[serde(default)]
    pub ft_number: Option<u8>,
    #[serde(default)]
    pub ft_total: Option<u8>,
    #[serde(default)]
    pub player_in: Option<PlayerId>,
    #[serde(default)]
    pub player_out: Option<PlayerId>,
    /// Starters for PERIOD_START events
    #[serde(default)]
    pub home_starters: Option<Vec<PlayerId>>,
    #[serde(default)]
    pub away_starters: Option<Vec<PlayerId>>,
}

impl RawPlay {
    /// Parse a RawPlay from a JSONL line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Free-throw position within a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeThrow {
    pub number: u8,
    pub total: u8,
}

impl FreeThrow {
    /// The final attempt of its sequence (the one that can end a possession).
    pub fn is_final(&self) -> bool {
        self.number == self.total
    }
}

/// Canonical event type with payloads specific to each case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Score {
        /// Shot value: 1 (free throw), 2, or 3
        points: u8,
        made: bool,
        free_throw: Option<FreeThrow>,
    },
    Substitution {
        player_in: PlayerId,
        player_out: PlayerId,
    },
    Rebound,
    Turnover,
    Foul,
    PeriodStart {
        home_starters: Vec<PlayerId>,
        away_starters: Vec<PlayerId>,
    },
    PeriodEnd,
    Other,
}

/// Canonical, validated event. Read-only input to the fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub period: u32,
    /// Seconds remaining in the period
    pub clock_seconds: u32,
    /// Original stream position, tiebreaker for same-clock events
    pub seq: usize,
    pub team: Option<TeamId>,
    pub kind: EventKind,
}

/// Converts raw plays to canonical events, enforcing the ordering contract
/// against the previously accepted event.
pub struct EventNormalizer {
    // (period, clock_seconds) of the last accepted event
    last_key: Option<(u32, u32)>,
}

impl EventNormalizer {
    pub fn new() -> Self {
        Self { last_key: None }
    }

    /// Normalize one raw play. On failure the play is dropped and the
    /// ordering state is left untouched.
    pub fn normalize(&mut self, seq: usize, raw: &RawPlay) -> Result<Event, Fault> {
        if raw.period < 1 {
            return Err(Fault {
                seq: Some(seq),
                period: Some(raw.period),
                clock_seconds: None,
                kind: FaultKind::MalformedPlay {
                    reason: format!("period {} out of range", raw.period),
                },
            });
        }

        let clock_seconds = parse_clock(&raw.clock).ok_or_else(|| Fault {
            seq: Some(seq),
            period: Some(raw.period),
            clock_seconds: None,
            kind: FaultKind::ClockParse {
                text: raw.clock.clone(),
            },
        })?;

        if clock_seconds > period_length_secs(raw.period) {
            return Err(Fault::at_event(
                seq,
                raw.period,
                clock_seconds,
                FaultKind::MalformedPlay {
                    reason: format!(
                        "clock {} exceeds period length {}",
                        clock_seconds,
                        period_length_secs(raw.period)
                    ),
                },
            ));
        }

        // Ordering: period never decreases, clock never increases within a
        // period. seq itself is strictly increasing by construction.
        if let Some((last_period, last_clock)) = self.last_key {
            let out_of_order = raw.period < last_period
                || (raw.period == last_period && clock_seconds > last_clock);
            if out_of_order {
                return Err(Fault::at_event(
                    seq,
                    raw.period,
                    clock_seconds,
                    FaultKind::OutOfOrder,
                ));
            }
        }

        let kind = self.map_kind(seq, raw, clock_seconds)?;

        self.last_key = Some((raw.period, clock_seconds));

        Ok(Event {
            period: raw.period,
            clock_seconds,
            seq,
            team: raw.team_id,
            kind,
        })
    }

    fn map_kind(&self, seq: usize, raw: &RawPlay, clock_seconds: u32) -> Result<EventKind, Fault> {
        let malformed = |reason: String| {
            Fault::at_event(
                seq,
                raw.period,
                clock_seconds,
                FaultKind::MalformedPlay { reason },
            )
        };

        let kind = match raw.event_type.to_ascii_uppercase().as_str() {
            "SCORE" => {
                let points = raw
                    .points
                    .ok_or_else(|| malformed("SCORE without shot value".to_string()))?;
                if !(1..=3).contains(&points) {
                    return Err(malformed(format!("shot value {} out of range", points)));
                }
                let made = raw
                    .made
                    .ok_or_else(|| malformed("SCORE without made flag".to_string()))?;
                if raw.team_id.is_none() {
                    return Err(malformed("SCORE without team".to_string()));
                }
                let free_throw = match (points, raw.ft_number, raw.ft_total) {
                    (1, Some(number), Some(total)) if number >= 1 && number <= total => {
                        Some(FreeThrow { number, total })
                    }
                    (1, _, _) => {
                        // Lone free throw with no sequence info: treat as a
                        // one-attempt sequence.
                        Some(FreeThrow {
                            number: 1,
                            total: 1,
                        })
                    }
                    _ => None,
                };
                EventKind::Score {
                    points,
                    made,
                    free_throw,
                }
            }
            "SUBSTITUTION" => {
                let player_in = raw
                    .player_in
                    .ok_or_else(|| malformed("SUBSTITUTION without incoming player".to_string()))?;
                let player_out = raw
                    .player_out
                    .ok_or_else(|| malformed("SUBSTITUTION without outgoing player".to_string()))?;
                if raw.team_id.is_none() {
                    return Err(malformed("SUBSTITUTION without team".to_string()));
                }
                EventKind::Substitution {
                    player_in,
                    player_out,
                }
            }
            "REBOUND" => EventKind::Rebound,
            "TURNOVER" => EventKind::Turnover,
            "FOUL" => EventKind::Foul,
            "PERIOD_START" => EventKind::PeriodStart {
                home_starters: raw.home_starters.clone().unwrap_or_default(),
                away_starters: raw.away_starters.clone().unwrap_or_default(),
            },
            "PERIOD_END" => EventKind::PeriodEnd,
            _ => EventKind::Other,
        };

        Ok(kind)
    }
}

impl Default for EventNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
