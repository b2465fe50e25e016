//! Signal engines service module.
//!
//! Provides the indicator engines and the aggregator that merges their
//! per-bar output onto the candle series.

pub mod aggregator;
pub mod indicators;

pub use aggregator::{EnrichedSeries, SignalAggregator};

use crate::types::CandleSeries;

/// Trait for implementing signal engines.
///
/// Engines are pure functions of the whole series: every output is
/// index-aligned with the input and never reads another engine's output.
pub trait Engine: Send + Sync {
    /// Per-bar output, index-aligned with the input series.
    type Output;

    /// Unique identifier for this engine.
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Number of bars before the engine's output is fully warmed up.
    fn min_periods(&self) -> usize;

    /// Compute the engine over the full series.
    /// Bars inside the warm-up come back undefined rather than as an error.
    fn compute(&self, series: &CandleSeries) -> Self::Output;
}
