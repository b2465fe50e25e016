//! EMA trend gate.

use super::ema::{Ema, EmaSeed};

/// Trend state for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrendState {
    pub ema_fast: f64,
    pub ema_slow: f64,
    /// `|fast - slow| / slow * 100`, 0 when the slow EMA is 0.
    pub gap_pct: f64,
    pub up: bool,
    pub down: bool,
}

/// Opens the up side when the fast EMA leads the slow one by at least
/// `min_gap_pct` percent, the down side when it trails by as much.
#[derive(Debug, Clone, Copy)]
pub struct TrendGate {
    fast: Ema,
    slow: Ema,
    min_gap_pct: f64,
}

impl TrendGate {
    pub fn new(fast_len: usize, slow_len: usize, min_gap_pct: f64) -> Self {
        Self {
            fast: Ema::new(fast_len, EmaSeed::FirstValue),
            slow: Ema::new(slow_len, EmaSeed::FirstValue),
            min_gap_pct,
        }
    }

    /// Classify one bar from its two EMA values.
    pub fn classify(&self, ema_fast: f64, ema_slow: f64) -> TrendState {
        if ema_slow == 0.0 {
            return TrendState {
                ema_fast,
                ema_slow,
                ..TrendState::default()
            };
        }
        let gap_pct = (ema_fast - ema_slow).abs() / ema_slow * 100.0;
        let wide = gap_pct >= self.min_gap_pct;
        TrendState {
            ema_fast,
            ema_slow,
            gap_pct,
            up: ema_fast > ema_slow && wide,
            down: ema_fast < ema_slow && wide,
        }
    }

    /// Trend state for every bar of a close series.
    pub fn evaluate(&self, closes: &[f64]) -> Vec<TrendState> {
        let fast = self.fast.series(closes);
        let slow = self.slow.series(closes);

        fast.into_iter()
            .zip(slow)
            .map(|pair| match pair {
                (Some(f), Some(s)) => self.classify(f, s),
                _ => TrendState::default(),
            })
            .collect()
    }
}
