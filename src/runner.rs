//! Parallel per-game segmentation into a serialized output sink
//!
//! Games share no mutable state, so each one runs the sequential fold on
//! its own task; results funnel through an mpsc channel into a single
//! `StintSink`, which therefore needs no cross-game coordination. Per-game
//! output is deterministic; only the order games reach the sink varies.

use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use tokio::sync::{mpsc, Semaphore};

use crate::segmenter_core::{
    segment_game, GameMeta, PossessionRecord, RawPlay, Segmentation, Stint,
};

/// One game's input: header plus ordered plays, as handed over by the
/// external fetch layer.
#[derive(Debug, Clone)]
pub struct GameInput {
    pub meta: GameMeta,
    pub plays: Vec<RawPlay>,
}

#[derive(Debug)]
pub enum SinkError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Backend(String),
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Io(err)
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::Serialization(err)
    }
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Io(e) => write!(f, "IO error: {}", e),
            SinkError::Serialization(e) => write!(f, "Serialization error: {}", e),
            SinkError::Backend(e) => write!(f, "Backend error: {}", e),
        }
    }
}

impl std::error::Error for SinkError {}

/// Output backend for segmented games. One call per game; the runner
/// serializes calls, so implementations need no locking.
#[async_trait]
pub trait StintSink: Send {
    /// Write one game's stints and possessions.
    async fn write_game(
        &mut self,
        meta: &GameMeta,
        stints: &[Stint],
        possessions: &[PossessionRecord],
    ) -> Result<(), SinkError>;

    /// Flush pending writes to storage.
    async fn flush(&mut self) -> Result<(), SinkError>;

    /// Get backend type for logging.
    fn backend_type(&self) -> &'static str;
}

/// In-memory sink, for tests and embedding callers that post-process
/// records themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub games: Vec<(GameMeta, Vec<Stint>, Vec<PossessionRecord>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stints_for(&self, game_id: u64) -> Option<&[Stint]> {
        self.games
            .iter()
            .find(|(meta, _, _)| meta.game_id == game_id)
            .map(|(_, stints, _)| stints.as_slice())
    }
}

#[async_trait]
impl StintSink for MemorySink {
    async fn write_game(
        &mut self,
        meta: &GameMeta,
        stints: &[Stint],
        possessions: &[PossessionRecord],
    ) -> Result<(), SinkError> {
        self.games
            .push((meta.clone(), stints.to_vec(), possessions.to_vec()));
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "Memory"
    }
}

/// Runner configuration, loaded from environment variables with sensible
/// defaults.
///
/// Environment variables:
/// - `HOOPFLOW_CHANNEL_BUFFER` (default: 256)
/// - `HOOPFLOW_MAX_CONCURRENCY` (default: 8)
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Channel buffer between game workers and the sink loop
    pub channel_buffer: usize,
    /// Games processed concurrently
    pub max_concurrency: usize,
}

impl RunnerConfig {
    pub fn from_env() -> Self {
        Self {
            channel_buffer: env::var("HOOPFLOW_CHANNEL_BUFFER")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(256),

            max_concurrency: env::var("HOOPFLOW_MAX_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8),
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 256,
            max_concurrency: 8,
        }
    }
}

/// Outcome tallies across one runner invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunnerStats {
    pub games_ok: usize,
    pub games_fatal: usize,
    pub stints_written: usize,
    pub faults: usize,
}

/// Segment every game on its own task and write results through the sink.
///
/// Fatal games (empty or unclosed streams) are counted but written
/// nowhere; their faults are still tallied.
pub async fn run_games(
    games: Vec<GameInput>,
    sink: &mut dyn StintSink,
    config: &RunnerConfig,
) -> Result<RunnerStats, SinkError> {
    let game_count = games.len();
    let (tx, mut rx) = mpsc::channel::<(GameMeta, Segmentation)>(config.channel_buffer.max(1));
    let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));

    for game in games {
        let tx = tx.clone();
        let semaphore = semaphore.clone();
        tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };
            let result = segment_game(&game.meta, &game.plays);
            // Receiver dropping means the runner is shutting down.
            let _ = tx.send((game.meta, result)).await;
        });
    }
    drop(tx);

    let mut stats = RunnerStats::default();
    while let Some((meta, segmentation)) = rx.recv().await {
        stats.faults += segmentation.faults.len();
        if segmentation.is_fatal() {
            stats.games_fatal += 1;
            continue;
        }
        sink.write_game(&meta, &segmentation.stints, &segmentation.possessions)
            .await?;
        stats.games_ok += 1;
        stats.stints_written += segmentation.stints.len();
    }
    sink.flush().await?;

    info!(
        "✅ runner finished: {}/{} games ok ({} fatal), {} stints → {}",
        stats.games_ok,
        game_count,
        stats.games_fatal,
        stats.stints_written,
        sink.backend_type()
    );

    Ok(stats)
}
