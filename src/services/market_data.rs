//! Candle sources feeding the signal pipeline.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use tracing::debug;

use crate::types::RawCandle;

/// Provider of time-ordered raw candles.
pub trait CandleSource {
    /// Fetch candles for `symbol`, oldest first.
    ///
    /// With a `limit`, only the most recent `limit` candles are returned.
    fn fetch(&self, symbol: &str, limit: Option<usize>) -> anyhow::Result<Vec<RawCandle>>;
}

/// Keep candles for `symbol` (or with no symbol), tag them, and apply `limit`.
fn select(candles: Vec<RawCandle>, symbol: &str, limit: Option<usize>) -> Vec<RawCandle> {
    let mut selected: Vec<RawCandle> = candles
        .into_iter()
        .filter(|c| c.symbol.as_deref().map_or(true, |s| s.eq_ignore_ascii_case(symbol)))
        .map(|mut c| {
            c.symbol.get_or_insert_with(|| symbol.to_string());
            c
        })
        .collect();

    if let Some(limit) = limit {
        let skip = selected.len().saturating_sub(limit);
        selected.drain(..skip);
    }
    selected
}

/// Reads a JSON array of candles from disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl CandleSource for JsonFileSource {
    fn fetch(&self, symbol: &str, limit: Option<usize>) -> anyhow::Result<Vec<RawCandle>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read candles from {}", self.path.display()))?;
        let candles: Vec<RawCandle> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse candles in {}", self.path.display()))?;

        debug!(path = %self.path.display(), count = candles.len(), "Loaded candle file");
        Ok(select(candles, symbol, limit))
    }
}

/// In-memory candles, for tests and replay.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    candles: Vec<RawCandle>,
}

impl MemorySource {
    pub fn new(candles: Vec<RawCandle>) -> Self {
        Self { candles }
    }
}

impl CandleSource for MemorySource {
    fn fetch(&self, symbol: &str, limit: Option<usize>) -> anyhow::Result<Vec<RawCandle>> {
        Ok(select(self.candles.clone(), symbol, limit))
    }
}
