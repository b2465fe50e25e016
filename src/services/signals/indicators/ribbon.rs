//! EMA ribbon trend.

use std::collections::BTreeMap;

use tracing::debug;

use super::ema::{Ema, EmaSeed};
use crate::config::RibbonConfig;
use crate::error::Result;
use crate::services::signals::Engine;
use crate::types::{CandleSeries, RibbonFields, RibbonTrend};

/// A set of SMA-seeded EMAs of close.
///
/// Trend is `up` when shorter EMAs sit strictly above longer ones and close is
/// above the shortest, `down` in mirror.
#[derive(Debug, Clone)]
pub struct EmaRibbon {
    emas: Vec<Ema>,
}

/// EMA lines ordered by ascending period, plus the per-bar trend.
#[derive(Debug, Clone, PartialEq)]
pub struct RibbonOutput {
    pub periods: Vec<usize>,
    pub lines: Vec<Vec<Option<f64>>>,
    pub trend: Vec<Option<RibbonTrend>>,
}

impl RibbonOutput {
    pub fn len(&self) -> usize {
        self.trend.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trend.is_empty()
    }

    pub fn fields_at(&self, i: usize) -> RibbonFields {
        let emas = self
            .periods
            .iter()
            .zip(&self.lines)
            .map(|(period, line)| (format!("ema_{period}"), line[i]))
            .collect::<BTreeMap<_, _>>();
        RibbonFields {
            emas,
            trend: self.trend[i],
        }
    }
}

impl EmaRibbon {
    pub fn new(config: RibbonConfig) -> Result<Self> {
        config.validate()?;
        let mut periods = config.periods;
        periods.sort_unstable();
        periods.dedup();
        Ok(Self {
            emas: periods.into_iter().map(|p| Ema::new(p, EmaSeed::Sma)).collect(),
        })
    }

    pub fn periods(&self) -> Vec<usize> {
        self.emas.iter().map(Ema::period).collect()
    }

    /// Trend for one bar given EMA values ordered by ascending period.
    pub fn classify(close: f64, values: &[f64]) -> Option<RibbonTrend> {
        let shortest = *values.first()?;
        let descending = values.windows(2).all(|w| w[0] > w[1]);
        let ascending = values.windows(2).all(|w| w[0] < w[1]);

        if descending && close > shortest {
            Some(RibbonTrend::Up)
        } else if ascending && close < shortest {
            Some(RibbonTrend::Down)
        } else {
            None
        }
    }

    pub fn compute_from(&self, close: &[f64]) -> RibbonOutput {
        let lines: Vec<Vec<Option<f64>>> = self.emas.iter().map(|ema| ema.series(close)).collect();

        let trend = (0..close.len())
            .map(|i| {
                let values: Option<Vec<f64>> = lines.iter().map(|line| line[i]).collect();
                values.and_then(|values| Self::classify(close[i], &values))
            })
            .collect();

        RibbonOutput {
            periods: self.periods(),
            lines,
            trend,
        }
    }
}

impl Engine for EmaRibbon {
    type Output = RibbonOutput;

    fn id(&self) -> &str {
        "ribbon"
    }

    fn name(&self) -> &str {
        "EMA Ribbon"
    }

    fn min_periods(&self) -> usize {
        self.emas.iter().map(Ema::period).max().unwrap_or(1)
    }

    fn compute(&self, series: &CandleSeries) -> RibbonOutput {
        let output = self.compute_from(&series.closes());
        debug!(
            bars = series.len(),
            lines = output.lines.len(),
            latest = ?output.trend.last().copied().flatten(),
            "EMA ribbon computed"
        );
        output
    }
}
