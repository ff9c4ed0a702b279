//! hoopflow - deterministic stint & possession segmentation for basketball
//! play-by-play
//!
//! The engine consumes an already-fetched, time-ordered event stream for a
//! single game and partitions it into lineup stints (intervals during
//! which the same ten players are on court), each annotated with points
//! per side and an estimated possession count. Fetching, serialization,
//! and loading live outside this crate.
//!
//! Entry points:
//! - [`segmenter_core::segment_game`] — the per-game fold
//! - [`runner::run_games`] — parallel per-game processing into a
//!   serialized sink

pub mod runner;
pub mod segmenter_core;

pub use segmenter_core::{segment_game, GameMeta, RawPlay, Segmentation, Stint};
