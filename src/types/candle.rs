use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// OHLCV candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub symbol: String,
}

impl Candle {
    /// Create a candle, validating prices and volume.
    ///
    /// `index` is only used to label the error.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        index: usize,
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        symbol: impl Into<String>,
    ) -> Result<Self> {
        for (field, value) in [
            ("open", open),
            ("high", high),
            ("low", low),
            ("close", close),
            ("volume", volume),
        ] {
            if !value.is_finite() {
                return Err(PipelineError::InvalidValue { index, field, value });
            }
        }
        if volume < 0.0 {
            return Err(PipelineError::InvalidValue {
                index,
                field: "volume",
                value: volume,
            });
        }
        if high < low {
            return Err(PipelineError::InvalidCandle {
                index,
                reason: format!("high {} is below low {}", high, low),
            });
        }

        Ok(Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            symbol: symbol.into(),
        })
    }

    /// Midpoint price `(high + low) / 2`.
    pub fn mid_price(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Candle as delivered by a market-data collaborator, before validation.
///
/// Every field is optional so a missing value is reported with its index
/// instead of failing the whole document parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCandle {
    /// Unix timestamp in seconds.
    pub timestamp: Option<i64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    /// Filled in by the source when absent.
    pub symbol: Option<String>,
}

impl RawCandle {
    /// Validate into a [`Candle`].
    pub fn into_candle(self, index: usize) -> Result<Candle> {
        let secs = self.timestamp.ok_or(PipelineError::MissingField {
            index,
            field: "timestamp",
        })?;
        let timestamp = Utc.timestamp_opt(secs, 0).single().ok_or_else(|| {
            PipelineError::InvalidCandle {
                index,
                reason: format!("timestamp {} is out of range", secs),
            }
        })?;
        let require = |value: Option<f64>, field: &'static str| {
            value.ok_or(PipelineError::MissingField { index, field })
        };

        Candle::new(
            index,
            timestamp,
            require(self.open, "open")?,
            require(self.high, "high")?,
            require(self.low, "low")?,
            require(self.close, "close")?,
            require(self.volume, "volume")?,
            self.symbol.unwrap_or_default(),
        )
    }
}

/// Time-ordered candle sequence. Every indicator array is index-aligned with it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Build a series, rejecting non-increasing timestamps.
    pub fn new(candles: Vec<Candle>) -> Result<Self> {
        for (index, pair) in candles.windows(2).enumerate() {
            Self::check_order(index + 1, &pair[0], &pair[1])?;
        }
        Ok(Self { candles })
    }

    /// Validate raw collaborator candles and build a series.
    pub fn from_raw(raw: Vec<RawCandle>) -> Result<Self> {
        let candles = raw
            .into_iter()
            .enumerate()
            .map(|(index, candle)| candle.into_candle(index))
            .collect::<Result<Vec<_>>>()?;
        Self::new(candles)
    }

    /// Append one candle after the current last bar.
    pub fn push(&mut self, candle: Candle) -> Result<()> {
        if let Some(last) = self.candles.last() {
            Self::check_order(self.candles.len(), last, &candle)?;
        }
        self.candles.push(candle);
        Ok(())
    }

    fn check_order(index: usize, previous: &Candle, current: &Candle) -> Result<()> {
        if current.timestamp <= previous.timestamp {
            return Err(PipelineError::NonMonotonicTimestamp {
                index,
                previous: previous.timestamp,
                current: current.timestamp,
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.candles.iter()
    }

    /// Series truncated to the first `len` candles.
    pub fn truncated(&self, len: usize) -> Self {
        Self {
            candles: self.candles[..len.min(self.candles.len())].to_vec(),
        }
    }

    pub fn opens(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    pub fn mid_prices(&self) -> Vec<f64> {
        self.candles.iter().map(Candle::mid_price).collect()
    }
}

impl<'a> IntoIterator for &'a CandleSeries {
    type Item = &'a Candle;
    type IntoIter = std::slice::Iter<'a, Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.candles.iter()
    }
}
