//! Rolling percentile rank.

use crate::types::RankWindow;

/// Percentage of a trailing window's values below the current value, in `[0, 100]`.
#[derive(Debug, Clone, Copy)]
pub struct PercentileRank {
    lookback: usize,
    window: RankWindow,
}

impl PercentileRank {
    pub fn new(lookback: usize, window: RankWindow) -> Self {
        Self {
            lookback: lookback.max(1),
            window,
        }
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Bars before the first defined rank.
    pub fn warmup(&self) -> usize {
        match self.window {
            RankWindow::Inclusive => 0,
            RankWindow::Exclusive => self.lookback,
        }
    }

    /// Rank of a single bar.
    pub fn rank_at(&self, values: &[f64], i: usize) -> Option<f64> {
        let current = *values.get(i)?;
        match self.window {
            RankWindow::Inclusive => {
                let start = (i + 1).saturating_sub(self.lookback);
                let window = &values[start..=i];
                let below = window.iter().filter(|&&v| v < current).count();
                Some(below as f64 / window.len() as f64 * 100.0)
            }
            RankWindow::Exclusive => {
                if i < self.lookback {
                    return None;
                }
                let window = &values[i - self.lookback..i];
                let at_or_below = window.iter().filter(|&&v| v <= current).count();
                Some(at_or_below as f64 / self.lookback as f64 * 100.0)
            }
        }
    }

    /// Ranks for every bar.
    pub fn apply(&self, values: &[f64]) -> Vec<Option<f64>> {
        (0..values.len()).map(|i| self.rank_at(values, i)).collect()
    }
}
