//! Exponential Moving Average (EMA).

/// How the first EMA value is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmaSeed {
    /// `ema[0] = values[0]`; defined from the first bar.
    FirstValue,
    /// `ema[period-1] = SMA(period)`; undefined before that.
    Sma,
}

/// EMA with multiplier `2 / (period + 1)`.
#[derive(Debug, Clone, Copy)]
pub struct Ema {
    period: usize,
    seed: EmaSeed,
}

impl Ema {
    pub fn new(period: usize, seed: EmaSeed) -> Self {
        Self {
            period: period.max(1),
            seed,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    fn multiplier(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }

    /// EMA series, index-aligned with `values`.
    pub fn series(&self, values: &[f64]) -> Vec<Option<f64>> {
        let n = values.len();
        let mut out = vec![None; n];

        let (start, seed) = match self.seed {
            EmaSeed::FirstValue => match values.first() {
                Some(&first) => (0, first),
                None => return out,
            },
            EmaSeed::Sma => {
                if n < self.period {
                    return out;
                }
                let sma = values[..self.period].iter().sum::<f64>() / self.period as f64;
                (self.period - 1, sma)
            }
        };

        let k = self.multiplier();
        let mut ema = seed;
        out[start] = Some(ema);
        for i in start + 1..n {
            ema = values[i] * k + ema * (1.0 - k);
            out[i] = Some(ema);
        }

        out
    }
}
