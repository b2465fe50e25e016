//! Laguerre PPO with percentile-rank zones and a trend gate.
//!
//! Pipeline per bar:
//! 1. Fast and slow Laguerre filters over the midpoint price.
//! 2. `ppoT = (fast - slow) / slow * 100`, `ppoB = -ppoT` (0 when slow is 0).
//! 3. Percentile rank of each side (bottom rank negated for display).
//! 4. EMA trend gate picks the visible side; the other side is `hidden`.
//! 5. Zone colour per side and the composite `ppo_pro_signal`.

use tracing::debug;

use super::laguerre::LaguerreFilter;
use super::percentile::PercentileRank;
use super::trend_gate::{TrendGate, TrendState};
use crate::config::PpoConfig;
use crate::error::Result;
use crate::services::signals::Engine;
use crate::types::{CandleSeries, PpoFields, PpoSignal, PpoSignalMode, RankWindow, ZoneColor};

/// Laguerre PPO percentile-rank engine.
#[derive(Debug, Clone, Default)]
pub struct LaguerrePpo {
    config: PpoConfig,
}

/// Full engine output, index-aligned with the candle series.
#[derive(Debug, Clone, PartialEq)]
pub struct PpoOutput {
    pub lmas: Vec<f64>,
    pub lmal: Vec<f64>,
    pub ppo_top: Vec<f64>,
    pub ppo_bottom: Vec<f64>,
    pub pct_rank_t: Vec<Option<f64>>,
    /// Negated bottom rank, in `[-100, 0]`.
    pub pct_rank_b: Vec<Option<f64>>,
    pub col_t: Vec<ZoneColor>,
    pub col_b: Vec<ZoneColor>,
    pub up_trend: Vec<bool>,
    pub down_trend: Vec<bool>,
    pub ppo_pro_signal: Vec<Option<PpoSignal>>,
}

impl PpoOutput {
    pub fn len(&self) -> usize {
        self.lmas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lmas.is_empty()
    }

    pub fn fields_at(&self, i: usize) -> PpoFields {
        PpoFields {
            lmas: self.lmas[i],
            lmal: self.lmal[i],
            ppo_top: self.ppo_top[i],
            ppo_bottom: self.ppo_bottom[i],
            pct_rank_t: self.pct_rank_t[i],
            pct_rank_b: self.pct_rank_b[i],
            col_t: self.col_t[i],
            col_b: self.col_b[i],
            up_trend: self.up_trend[i],
            down_trend: self.down_trend[i],
            ppo_pro_signal: self.ppo_pro_signal[i],
        }
    }
}

/// Last visible zone colour per side, carried bar to bar.
///
/// Hidden bars leave the previous colour untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ZoneTracker {
    prev_top: Option<ZoneColor>,
    prev_bottom: Option<ZoneColor>,
}

impl ZoneTracker {
    /// Feed one bar's colours and return the transition signal, if any.
    pub fn step(&mut self, col_t: ZoneColor, col_b: ZoneColor) -> Option<PpoSignal> {
        use ZoneColor::{Gray, Green, Orange};

        let signal = match (self.prev_top, col_t, self.prev_bottom, col_b) {
            (Some(Gray), Orange, _, _) => Some(PpoSignal::Buy),
            (Some(Orange), Gray, _, _) => Some(PpoSignal::StopBuy),
            (_, _, Some(Gray), Green) => Some(PpoSignal::Sell),
            (_, _, Some(Green), Gray) => Some(PpoSignal::StopSell),
            _ => None,
        };

        if col_t != ZoneColor::Hidden {
            self.prev_top = Some(col_t);
        }
        if col_b != ZoneColor::Hidden {
            self.prev_bottom = Some(col_b);
        }
        signal
    }
}

/// Relative difference of the fast and slow lines in percent; 0 when slow is 0.
pub fn ppo(fast: f64, slow: f64) -> f64 {
    if slow == 0.0 {
        0.0
    } else {
        (fast - slow) / slow * 100.0
    }
}

impl LaguerrePpo {
    pub fn new(config: PpoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PpoConfig {
        &self.config
    }

    /// Top-side colour for a rank.
    pub fn top_zone(&self, rank: Option<f64>, visible: bool) -> ZoneColor {
        let Some(rank) = rank.filter(|_| visible) else {
            return ZoneColor::Hidden;
        };
        let c = &self.config;
        if rank < c.show_threshold_top {
            ZoneColor::Gray
        } else if rank >= c.pctile {
            ZoneColor::Red
        } else if rank >= c.wrn_pctile {
            ZoneColor::Orange
        } else {
            ZoneColor::Gray
        }
    }

    /// Bottom-side colour for a negated rank.
    pub fn bottom_zone(&self, rank: Option<f64>, visible: bool) -> ZoneColor {
        let Some(rank) = rank.filter(|_| visible) else {
            return ZoneColor::Hidden;
        };
        let c = &self.config;
        if rank > c.show_threshold_bot {
            ZoneColor::Gray
        } else if rank <= -c.pctile {
            ZoneColor::Lime
        } else if rank <= -c.wrn_pctile {
            ZoneColor::Green
        } else {
            ZoneColor::Gray
        }
    }

    fn signal(
        &self,
        trend: &TrendState,
        tracker: &mut ZoneTracker,
        col_t: ZoneColor,
        col_b: ZoneColor,
    ) -> Option<PpoSignal> {
        match self.config.signal_mode {
            PpoSignalMode::Trend => {
                if trend.up {
                    Some(PpoSignal::Buy)
                } else if trend.down {
                    Some(PpoSignal::Sell)
                } else {
                    None
                }
            }
            PpoSignalMode::ZoneTransition => tracker.step(col_t, col_b),
        }
    }

    /// Run the pipeline over raw price arrays.
    pub fn compute_from(&self, high: &[f64], low: &[f64], close: &[f64]) -> PpoOutput {
        let c = &self.config;
        let n = close.len();
        let hl2: Vec<f64> = high.iter().zip(low).map(|(h, l)| (h + l) / 2.0).collect();

        let lmas = LaguerreFilter::new(c.short_g).apply(&hl2);
        let lmal = LaguerreFilter::new(c.long_g).apply(&hl2);

        let ppo_top: Vec<f64> = lmas.iter().zip(&lmal).map(|(&f, &s)| ppo(f, s)).collect();
        let ppo_bottom: Vec<f64> = ppo_top.iter().map(|v| -v).collect();

        let pct_rank_t = PercentileRank::new(c.lkb_t, c.rank_window).apply(&ppo_top);
        let pct_rank_b: Vec<Option<f64>> = PercentileRank::new(c.lkb_b, c.rank_window)
            .apply(&ppo_bottom)
            .into_iter()
            .map(|r| r.map(|v| -v))
            .collect();

        let trends = TrendGate::new(c.ema_fast_len, c.ema_slow_len, c.min_gap_pct).evaluate(close);

        let mut col_t = Vec::with_capacity(n);
        let mut col_b = Vec::with_capacity(n);
        let mut ppo_pro_signal = Vec::with_capacity(n);
        let mut tracker = ZoneTracker::default();

        for (i, trend) in trends.iter().enumerate() {
            let top = self.top_zone(pct_rank_t[i], trend.up);
            let bottom = self.bottom_zone(pct_rank_b[i], trend.down);
            ppo_pro_signal.push(self.signal(trend, &mut tracker, top, bottom));
            col_t.push(top);
            col_b.push(bottom);
        }

        PpoOutput {
            lmas,
            lmal,
            ppo_top,
            ppo_bottom,
            pct_rank_t,
            pct_rank_b,
            col_t,
            col_b,
            up_trend: trends.iter().map(|t| t.up).collect(),
            down_trend: trends.iter().map(|t| t.down).collect(),
            ppo_pro_signal,
        }
    }
}

impl Engine for LaguerrePpo {
    type Output = PpoOutput;

    fn id(&self) -> &str {
        "ppo"
    }

    fn name(&self) -> &str {
        "Laguerre PPO Percentile Rank"
    }

    fn min_periods(&self) -> usize {
        let lookback = self.config.lkb_t.max(self.config.lkb_b);
        match self.config.rank_window {
            RankWindow::Inclusive => lookback,
            RankWindow::Exclusive => lookback + 1,
        }
    }

    fn compute(&self, series: &CandleSeries) -> PpoOutput {
        let output = self.compute_from(&series.highs(), &series.lows(), &series.closes());
        debug!(
            bars = series.len(),
            mode = ?self.config.signal_mode,
            signals = output.ppo_pro_signal.iter().flatten().count(),
            "PPO engine computed"
        );
        output
    }
}
