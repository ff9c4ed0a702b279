//! Segmenter Core - Lineup Stint & Possession Engine
//!
//! Turns one game's ordered play-by-play stream into contiguous lineup
//! stints and possession records, deterministically.
//!
//! # Architecture
//!
//! ```text
//! RawPlay stream → EventNormalizer (clock text, ordering, typed events)
//!     ↓
//! LineupTracker + BoundaryDetector (lineup changes and period breaks
//!     decide where stints split)
//!     ↓
//! PossessionCounter + ScoreBoard (per-stint possession tally, points,
//!     margins; PossessionLog mirrors the full possession records)
//!     ↓
//! segment_game → numbered Stint records + faults
//! ```
//!
//! Processing is a pure fold over the event sequence: no I/O, no shared
//! state, byte-identical output on reruns. Faults never abort a game
//! unless the stream is structurally incomplete (empty, or no terminal
//! PERIOD_END).

pub mod assembler;
pub mod boundary;
pub mod fault;
pub mod lineup;
pub mod normalizer;
pub mod possession;
pub mod score;
pub mod types;

pub use assembler::{segment_game, Segmentation};
pub use boundary::BoundaryDetector;
pub use fault::{Fault, FaultKind};
pub use lineup::LineupTracker;
pub use normalizer::{
    format_clock, parse_clock, period_length_secs, Event, EventKind, EventNormalizer, FreeThrow,
    RawPlay, OVERTIME_SECS, REGULATION_SECS,
};
pub use possession::{PossessionCounter, PossessionDelta, PossessionLog};
pub use score::ScoreBoard;
pub use types::{GameMeta, PlayerId, PossessionEnd, PossessionRecord, Side, Stint, TeamId};
