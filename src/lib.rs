//! Signal Engine - ADX, Laguerre PPO and z-score band signals over OHLCV candles

pub mod config;
pub mod error;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use services::{EnrichedSeries, SignalAggregator};
pub use types::*;
