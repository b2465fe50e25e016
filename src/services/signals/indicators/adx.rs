//! Average Directional Index (ADX) with Directional Movement (DMI) signals.

use tracing::debug;

use super::wilder::WilderSmoother;
use crate::config::AdxConfig;
use crate::error::Result;
use crate::services::signals::Engine;
use crate::types::{AdxFields, CandleSeries};

/// DI must exceed this level for entries and `warn_down`.
const DI_ENTRY_LEVEL: f64 = 30.0;
/// ADX must exceed this level for entries.
const ADX_FLOOR: f64 = 15.0;

/// ADX/DMI engine.
///
/// - `buy`: ADX inside (15, threshold), DI+ leads and exceeds 30 with enough
///   separation, bullish candle.
/// - `sell`: mirror on DI-, confirmed by two consecutive bearish candles.
/// - `warn_weak`: ADX crosses down through the threshold.
/// - `warn_down`: DI- above 30 for three bars in a strong trend, throttled by
///   a cooldown.
#[derive(Debug, Clone, Default)]
pub struct DmiAdx {
    config: AdxConfig,
}

/// Raw per-bar true range and directional movement. Index 0 is undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalMovement {
    pub true_range: Vec<Option<f64>>,
    pub plus_dm: Vec<Option<f64>>,
    pub minus_dm: Vec<Option<f64>>,
}

/// DI+/DI-/ADX lines.
#[derive(Debug, Clone, PartialEq)]
pub struct DmiLines {
    pub di_plus: Vec<Option<f64>>,
    pub di_minus: Vec<Option<f64>>,
    pub adx: Vec<Option<f64>>,
}

/// Full engine output, index-aligned with the candle series.
#[derive(Debug, Clone, PartialEq)]
pub struct DmiAdxOutput {
    pub di_plus: Vec<Option<f64>>,
    pub di_minus: Vec<Option<f64>>,
    pub adx: Vec<Option<f64>>,
    pub buy_signal: Vec<bool>,
    pub sell_signal: Vec<bool>,
    pub warn_weak: Vec<bool>,
    pub warn_down: Vec<bool>,
}

impl DmiAdxOutput {
    pub fn len(&self) -> usize {
        self.adx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adx.is_empty()
    }

    pub fn fields_at(&self, i: usize) -> AdxFields {
        AdxFields {
            di_plus: self.di_plus[i],
            di_minus: self.di_minus[i],
            adx: self.adx[i],
            buy_signal: self.buy_signal[i],
            sell_signal: self.sell_signal[i],
            warn_weak: self.warn_weak[i],
            warn_down: self.warn_down[i],
        }
    }
}

/// Cooldown anchor for de-duplicating raw triggers.
#[derive(Debug, Clone, Copy)]
pub struct Cooldown {
    bars: usize,
    last_accepted: Option<usize>,
}

impl Cooldown {
    pub fn new(bars: usize) -> Self {
        Self {
            bars,
            last_accepted: None,
        }
    }

    /// Accept a raw trigger at bar `i` if the cooldown has elapsed.
    pub fn accept(&mut self, i: usize) -> bool {
        let ready = self.last_accepted.map_or(true, |last| i - last >= self.bars);
        if ready {
            self.last_accepted = Some(i);
        }
        ready
    }
}

impl DmiAdx {
    pub fn new(config: AdxConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AdxConfig {
        &self.config
    }

    /// True range and +DM/-DM for every bar after the first.
    pub fn directional_movement(high: &[f64], low: &[f64], close: &[f64]) -> DirectionalMovement {
        let n = close.len();
        let mut true_range = vec![None; n];
        let mut plus_dm = vec![None; n];
        let mut minus_dm = vec![None; n];

        for i in 1..n {
            let prev_close = close[i - 1];
            let tr = (high[i] - low[i])
                .max((high[i] - prev_close).abs())
                .max((low[i] - prev_close).abs());
            true_range[i] = Some(tr);

            let up = high[i] - high[i - 1];
            let down = low[i - 1] - low[i];
            plus_dm[i] = Some(if up > down && up > 0.0 { up } else { 0.0 });
            minus_dm[i] = Some(if down > up && down > 0.0 { down } else { 0.0 });
        }

        DirectionalMovement {
            true_range,
            plus_dm,
            minus_dm,
        }
    }

    /// DI+/DI-/ADX lines.
    pub fn lines(&self, high: &[f64], low: &[f64], close: &[f64]) -> DmiLines {
        let n = close.len();
        let dm = Self::directional_movement(high, low, close);

        let di = WilderSmoother::new(self.config.di_len);
        let atr = di.smooth(&dm.true_range);
        let plus = di.smooth(&dm.plus_dm);
        let minus = di.smooth(&dm.minus_dm);

        let mut di_plus = vec![None; n];
        let mut di_minus = vec![None; n];
        let mut dx = vec![None; n];

        for i in 0..n {
            let (Some(a), Some(p), Some(m)) = (atr[i], plus[i], minus[i]) else {
                continue;
            };
            if a == 0.0 {
                continue;
            }
            let dip = p / a * 100.0;
            let dim = m / a * 100.0;
            di_plus[i] = Some(dip);
            di_minus[i] = Some(dim);

            let denom = dip + dim;
            dx[i] = Some(if denom != 0.0 {
                (dip - dim).abs() / denom * 100.0
            } else {
                0.0
            });
        }

        let adx = WilderSmoother::new(self.config.adx_smooth).smooth(&dx);

        DmiLines {
            di_plus,
            di_minus,
            adx,
        }
    }

    /// Evaluate buy/sell/warn flags over computed lines.
    pub fn signals(&self, open: &[f64], close: &[f64], lines: DmiLines) -> DmiAdxOutput {
        let n = close.len();
        let threshold = self.config.threshold;
        let mut buy_signal = vec![false; n];
        let mut sell_signal = vec![false; n];
        let mut warn_weak = vec![false; n];
        let mut warn_down_raw = vec![false; n];

        let DmiLines {
            di_plus,
            di_minus,
            adx,
        } = lines;

        for i in 2..n {
            let (Some(dip), Some(dim), Some(adx_now)) = (di_plus[i], di_minus[i], adx[i]) else {
                continue;
            };

            let separated = (dip - dim).abs() >= self.config.min_sep;
            let in_band = ADX_FLOOR < adx_now && adx_now < threshold;
            let bullish = close[i] > open[i];
            let bearish = close[i] < open[i] && close[i - 1] < open[i - 1];

            buy_signal[i] = in_band && dip > dim && dip > DI_ENTRY_LEVEL && separated && bullish;
            sell_signal[i] = in_band && dim > dip && dim > DI_ENTRY_LEVEL && separated && bearish;

            if let Some(adx_prev) = adx[i - 1] {
                warn_weak[i] = adx_prev >= threshold && threshold > adx_now;
            }

            let above = |v: Option<f64>| v.is_some_and(|v| v > DI_ENTRY_LEVEL);
            let sustained = dim > DI_ENTRY_LEVEL && above(di_minus[i - 1]) && above(di_minus[i - 2]);
            warn_down_raw[i] = sustained && adx_now > threshold && dim > dip && !sell_signal[i];
        }

        let mut cooldown = Cooldown::new(self.config.warn_cooldown);
        let warn_down = warn_down_raw
            .iter()
            .enumerate()
            .map(|(i, &raw)| raw && cooldown.accept(i))
            .collect();

        DmiAdxOutput {
            di_plus,
            di_minus,
            adx,
            buy_signal,
            sell_signal,
            warn_weak,
            warn_down,
        }
    }
}

impl Engine for DmiAdx {
    type Output = DmiAdxOutput;

    fn id(&self) -> &str {
        "adx"
    }

    fn name(&self) -> &str {
        "ADX / DMI"
    }

    fn min_periods(&self) -> usize {
        self.config.di_len + self.config.adx_smooth
    }

    fn compute(&self, series: &CandleSeries) -> DmiAdxOutput {
        let (open, high, low, close) = (
            series.opens(),
            series.highs(),
            series.lows(),
            series.closes(),
        );
        let lines = self.lines(&high, &low, &close);
        let output = self.signals(&open, &close, lines);

        debug!(
            bars = series.len(),
            buys = output.buy_signal.iter().filter(|&&b| b).count(),
            sells = output.sell_signal.iter().filter(|&&s| s).count(),
            "ADX engine computed"
        );
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directional_movement_rules() {
        let high = [10.0, 12.0, 11.0, 11.5];
        let low = [8.0, 9.0, 7.0, 7.0];
        let close = [9.0, 11.0, 8.0, 10.0];
        let dm = DmiAdx::directional_movement(&high, &low, &close);

        assert_eq!(dm.true_range[0], None);
        assert_eq!(dm.true_range[1], Some(3.0));
        assert_eq!(dm.true_range[2], Some(4.0));
        assert_eq!(dm.true_range[3], Some(4.5));

        // up 2 vs down -1
        assert_eq!(dm.plus_dm[1], Some(2.0));
        assert_eq!(dm.minus_dm[1], Some(0.0));
        // up -1 vs down 2
        assert_eq!(dm.plus_dm[2], Some(0.0));
        assert_eq!(dm.minus_dm[2], Some(2.0));
        // up 0.5 vs down 0
        assert_eq!(dm.plus_dm[3], Some(0.5));
        assert_eq!(dm.minus_dm[3], Some(0.0));
    }

    #[test]
    fn test_equal_moves_cancel() {
        let high = [10.0, 11.0];
        let low = [8.0, 7.0];
        let close = [9.0, 9.0];
        let dm = DmiAdx::directional_movement(&high, &low, &close);
        assert_eq!(dm.plus_dm[1], Some(0.0));
        assert_eq!(dm.minus_dm[1], Some(0.0));
    }

    #[test]
    fn test_cooldown_spacing() {
        let mut cooldown = Cooldown::new(5);
        let accepted: Vec<usize> = (0..20).filter(|&i| cooldown.accept(i)).collect();
        assert_eq!(accepted, vec![0, 5, 10, 15]);
    }

    #[test]
    fn test_min_periods() {
        assert_eq!(DmiAdx::default().min_periods(), 28);
    }

    #[test]
    fn test_first_adx_index() {
        let n = 40;
        let high: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * 1.5 + 2.0).collect();
        let low: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * 1.5 - 1.0).collect();
        let close: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * 1.5 + 1.0).collect();
        let lines = DmiAdx::default().lines(&high, &low, &close);

        assert!(lines.di_plus[13].is_none());
        assert!(lines.di_plus[14].is_some());
        assert!(lines.adx[26].is_none());
        assert!(lines.adx[27].is_some());
    }

    #[test]
    fn test_uptrend_di_plus_dominates() {
        let n = 60;
        let high: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * 1.5 + 2.0).collect();
        let low: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * 1.5 - 1.0).collect();
        let close: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * 1.5 + 1.0).collect();
        let lines = DmiAdx::default().lines(&high, &low, &close);

        let last = n - 1;
        assert!(lines.di_plus[last].unwrap() > lines.di_minus[last].unwrap());
        assert_eq!(lines.di_minus[last], Some(0.0));
        // pure up-moves drive DX to 100
        assert!((lines.adx[last].unwrap() - 100.0).abs() < 1e-9);
    }
}
