//! Technical indicator implementations.

pub mod adx;
pub mod ema;
pub mod laguerre;
pub mod percentile;
pub mod ppo;
pub mod reversal;
pub mod ribbon;
pub mod rolling;
pub mod trend_gate;
pub mod wilder;
pub mod zscore;

pub use adx::{DmiAdx, DmiAdxOutput};
pub use ema::{Ema, EmaSeed};
pub use laguerre::LaguerreFilter;
pub use percentile::PercentileRank;
pub use ppo::{LaguerrePpo, PpoOutput, ZoneTracker};
pub use reversal::{Pivot, ReversalLevelHistory};
pub use ribbon::{EmaRibbon, RibbonOutput};
pub use trend_gate::{TrendGate, TrendState};
pub use wilder::WilderSmoother;
pub use zscore::{ZScoreBands, ZScoreOutput};
