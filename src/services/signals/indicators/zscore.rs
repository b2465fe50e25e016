//! Z-score mean-reversion bands.
//!
//! 1. Rolling mean and population std of close over `length`.
//! 2. Raw z-score, smoothed with a VWMA over `smooth`.
//! 3. Pivots of the smoothed z-score feed bounded top/bottom reversal
//!    histories. A pivot at bar `i` is confirmed when bar `i + 1` closes.
//! 4. Bands are projected from the average reversal levels.
//! 5. Long/short fire when price enters the support/resistance band.
//!
//! A series shorter than `length + smooth` yields an all-undefined output.

use tracing::debug;

use super::reversal::{pivot_at, Pivot, ReversalLevelHistory};
use super::rolling::{rolling_mean_std, vwma};
use crate::config::ZScoreConfig;
use crate::error::Result;
use crate::services::signals::Engine;
use crate::types::{CandleSeries, ZScoreFields, ZScoreSignal};

/// Width of each projected band in standard deviations.
const BAND_WIDTH: f64 = 0.5;

/// Z-score band engine.
#[derive(Debug, Clone, Default)]
pub struct ZScoreBands {
    config: ZScoreConfig,
}

/// Full engine output, index-aligned with the candle series.
#[derive(Debug, Clone, PartialEq)]
pub struct ZScoreOutput {
    pub mean: Vec<Option<f64>>,
    pub std: Vec<Option<f64>>,
    pub z_score: Vec<Option<f64>>,
    pub avg_top_level: Vec<Option<f64>>,
    pub avg_bot_level: Vec<Option<f64>>,
    pub res_band_low: Vec<Option<f64>>,
    pub res_band_high: Vec<Option<f64>>,
    pub sup_band_low: Vec<Option<f64>>,
    pub sup_band_high: Vec<Option<f64>>,
    pub long_signal: Vec<bool>,
    pub short_signal: Vec<bool>,
    pub signal_zscore: Vec<Option<ZScoreSignal>>,
    /// Top history length after processing each bar.
    pub top_history_len: Vec<usize>,
    /// Bottom history length after processing each bar.
    pub bottom_history_len: Vec<usize>,
}

impl ZScoreOutput {
    fn empty(n: usize) -> Self {
        Self {
            mean: vec![None; n],
            std: vec![None; n],
            z_score: vec![None; n],
            avg_top_level: vec![None; n],
            avg_bot_level: vec![None; n],
            res_band_low: vec![None; n],
            res_band_high: vec![None; n],
            sup_band_low: vec![None; n],
            sup_band_high: vec![None; n],
            long_signal: vec![false; n],
            short_signal: vec![false; n],
            signal_zscore: vec![None; n],
            top_history_len: vec![0; n],
            bottom_history_len: vec![0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.z_score.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z_score.is_empty()
    }

    pub fn fields_at(&self, i: usize) -> ZScoreFields {
        ZScoreFields {
            z_score: self.z_score[i],
            avg_top_level: self.avg_top_level[i],
            avg_bot_level: self.avg_bot_level[i],
            res_band_low: self.res_band_low[i],
            res_band_high: self.res_band_high[i],
            sup_band_low: self.sup_band_low[i],
            sup_band_high: self.sup_band_high[i],
            signal_zscore: self.signal_zscore[i],
        }
    }
}

/// `current` true and `previous` not, with undefined comparisons counting as false.
fn entered(current: Option<bool>, previous: Option<bool>) -> bool {
    current.unwrap_or(false) && !previous.unwrap_or(false)
}

impl ZScoreBands {
    pub fn new(config: ZScoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ZScoreConfig {
        &self.config
    }

    /// Raw z-score `(close - mean) / std`, undefined where std is 0.
    pub fn raw_z(close: &[f64], mean: &[Option<f64>], std: &[Option<f64>]) -> Vec<Option<f64>> {
        close
            .iter()
            .zip(mean.iter().zip(std))
            .map(|(&c, pair)| match pair {
                (Some(m), Some(s)) if *s > 0.0 => Some((c - m) / s),
                _ => None,
            })
            .collect()
    }

    pub fn compute_from(&self, high: &[f64], low: &[f64], close: &[f64], volume: &[f64]) -> ZScoreOutput {
        let n = close.len();
        let mut out = ZScoreOutput::empty(n);
        // too short for a smoothed z-score: every field stays undefined
        if n < self.min_periods() {
            return out;
        }

        let (mean, std) = rolling_mean_std(close, self.config.length);
        let raw = Self::raw_z(close, &mean, &std);
        let z = vwma(&raw, volume, self.config.smooth);

        let mut top = ReversalLevelHistory::top(self.config.history_depth);
        let mut bottom = ReversalLevelHistory::bottom(self.config.history_depth);

        for i in 0..n {
            if i >= 1 {
                match pivot_at(&z[..=i], i - 1) {
                    Some(Pivot::High(level)) if level > self.config.z_thresh => top.push(level),
                    Some(Pivot::Low(level)) if level < -self.config.z_thresh => bottom.push(level),
                    _ => {}
                }
            }
            out.top_history_len[i] = top.len();
            out.bottom_history_len[i] = bottom.len();

            let avg_top = top.average();
            let avg_bot = bottom.average();
            out.avg_top_level[i] = Some(avg_top);
            out.avg_bot_level[i] = Some(avg_bot);

            let (Some(m), Some(s)) = (mean[i], std[i]) else {
                continue;
            };
            let res_low = m + avg_top * s;
            let sup_high = m + avg_bot * s;

            out.res_band_low[i] = Some(res_low);
            out.res_band_high[i] = Some(res_low + BAND_WIDTH * s);
            out.sup_band_high[i] = Some(sup_high);
            out.sup_band_low[i] = Some(sup_high - BAND_WIDTH * s);
        }
        out.mean = mean;
        out.std = std;
        out.z_score = z;

        for i in 1..n {
            let in_support = |j: usize| out.sup_band_high[j].map(|band| low[j] < band);
            let in_resistance = |j: usize| out.res_band_low[j].map(|band| high[j] > band);

            let long = entered(in_support(i), in_support(i - 1));
            let short = entered(in_resistance(i), in_resistance(i - 1));

            out.long_signal[i] = long;
            out.short_signal[i] = short && !long;
            out.signal_zscore[i] = if long {
                Some(ZScoreSignal::Long)
            } else if short {
                Some(ZScoreSignal::Short)
            } else {
                None
            };
        }

        out
    }
}

impl Engine for ZScoreBands {
    type Output = ZScoreOutput;

    fn id(&self) -> &str {
        "zscore"
    }

    fn name(&self) -> &str {
        "Z-Score Reversal Bands"
    }

    fn min_periods(&self) -> usize {
        self.config.length + self.config.smooth
    }

    fn compute(&self, series: &CandleSeries) -> ZScoreOutput {
        let output = self.compute_from(
            &series.highs(),
            &series.lows(),
            &series.closes(),
            &series.volumes(),
        );
        debug!(
            bars = series.len(),
            top_levels = output.top_history_len.last().copied().unwrap_or(0),
            bottom_levels = output.bottom_history_len.last().copied().unwrap_or(0),
            signals = output.signal_zscore.iter().flatten().count(),
            "Z-score engine computed"
        );
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ZScoreConfig {
        ZScoreConfig {
            length: 5,
            smooth: 2,
            history_depth: 3,
            z_thresh: 0.5,
        }
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + 10.0 * (i as f64 * 0.4).sin()).collect()
    }

    #[test]
    fn test_min_periods() {
        let engine = ZScoreBands::new(ZScoreConfig::default()).unwrap();
        assert_eq!(engine.min_periods(), 164);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ZScoreConfig {
            history_depth: 0,
            ..ZScoreConfig::default()
        };
        assert!(ZScoreBands::new(config).is_err());
    }

    #[test]
    fn test_warmup_alignment() {
        let close = wave(40);
        let volume = vec![1.0; 40];
        let out = ZScoreBands::new(small_config())
            .unwrap()
            .compute_from(&close, &close, &close, &volume);

        assert_eq!(out.len(), 40);
        assert!(out.res_band_low[..4].iter().all(Option::is_none));
        assert!(out.res_band_low[4..].iter().all(Option::is_some));
        // VWMA needs two defined raw values
        assert!(out.z_score[..5].iter().all(Option::is_none));
        assert!(out.z_score[5].is_some());
    }

    #[test]
    fn test_band_geometry() {
        let close = wave(60);
        let volume = vec![1.0; 60];
        let out = ZScoreBands::new(small_config())
            .unwrap()
            .compute_from(&close, &close, &close, &volume);

        for i in 4..60 {
            let s = out.std[i].unwrap();
            let res_low = out.res_band_low[i].unwrap();
            let sup_high = out.sup_band_high[i].unwrap();
            assert!((out.res_band_high[i].unwrap() - res_low - 0.5 * s).abs() < 1e-9);
            assert!((sup_high - out.sup_band_low[i].unwrap() - 0.5 * s).abs() < 1e-9);
        }
    }

    #[test]
    fn test_history_bounded_and_levels_beyond_threshold() {
        let close = wave(200);
        let volume = vec![1.0; 200];
        let config = small_config();
        let out = ZScoreBands::new(config.clone())
            .unwrap()
            .compute_from(&close, &close, &close, &volume);

        assert!(out.top_history_len.iter().all(|&len| len <= config.history_depth));
        assert!(out.bottom_history_len.iter().all(|&len| len <= config.history_depth));
        assert!(out.top_history_len[199] > 0);
        for i in 4..200 {
            if out.top_history_len[i] > 0 {
                assert!(out.avg_top_level[i].unwrap() > config.z_thresh);
            }
            if out.bottom_history_len[i] > 0 {
                assert!(out.avg_bot_level[i].unwrap() < -config.z_thresh);
            }
        }
    }

    #[test]
    fn test_zero_std_falls_back_to_mean() {
        let close = vec![50.0; 30];
        let volume = vec![10.0; 30];
        let out = ZScoreBands::new(small_config())
            .unwrap()
            .compute_from(&close, &close, &close, &volume);

        assert!(out.z_score.iter().all(Option::is_none));
        assert_eq!(out.avg_top_level[29], Some(2.0));
        assert_eq!(out.avg_bot_level[29], Some(-2.0));
        assert_eq!(out.res_band_low[29], Some(50.0));
        assert_eq!(out.sup_band_low[29], Some(50.0));
        assert!(out.signal_zscore.iter().all(Option::is_none));
    }

    #[test]
    fn test_long_fires_on_entry_only() {
        // flat history then two bars dipping through the support band
        let mut close = vec![100.0, 101.0, 99.0, 100.0, 101.0, 99.0, 100.0, 101.0];
        let mut low = close.clone();
        close.extend([100.0, 100.0, 100.0]);
        low.extend([90.0, 90.0, 100.0]);
        let high = close.clone();
        let volume = vec![1.0; close.len()];

        let out = ZScoreBands::new(small_config())
            .unwrap()
            .compute_from(&high, &low, &close, &volume);

        assert!(out.long_signal[8]);
        assert_eq!(out.signal_zscore[8], Some(ZScoreSignal::Long));
        // already inside the band
        assert!(!out.long_signal[9]);
        assert!(out.long_signal.iter().zip(&out.short_signal).all(|(l, s)| !(*l && *s)));
    }

    #[test]
    fn test_series_below_min_periods_is_undefined() {
        let close = wave(150);
        let volume = vec![1.0; 150];
        let out = ZScoreBands::default().compute_from(&close, &close, &close, &volume);

        assert_eq!(out, ZScoreOutput::empty(150));
        for i in 0..150 {
            let fields = out.fields_at(i);
            assert_eq!(fields.res_band_low, None);
            assert_eq!(fields.avg_top_level, None);
            assert_eq!(fields.z_score, None);
            assert_eq!(fields.signal_zscore, None);
        }
    }

    #[test]
    fn test_min_periods_boundary() {
        let config = small_config();
        let engine = ZScoreBands::new(config.clone()).unwrap();
        let close = wave(7);
        let volume = vec![1.0; 7];

        let short = engine.compute_from(&close[..6], &close[..6], &close[..6], &volume[..6]);
        assert!(short.res_band_low.iter().all(Option::is_none));

        let full = engine.compute_from(&close, &close, &close, &volume);
        assert!(full.res_band_low[config.length - 1].is_some());
        assert!(full.z_score[6].is_some());
    }

    #[test]
    fn test_average_levels_defined_from_first_bar() {
        let close = wave(300);
        let volume = vec![1.0; 300];
        let out = ZScoreBands::default().compute_from(&close, &close, &close, &volume);

        assert_eq!(out.avg_top_level[0], Some(2.0));
        assert_eq!(out.avg_bot_level[0], Some(-2.0));
        assert!(out.avg_top_level.iter().all(Option::is_some));
        // bands still wait for the rolling window
        assert_eq!(out.res_band_low[142], None);
        assert!(out.res_band_low[143].is_some());
    }
}
