//! Wilder's smoothing (RMA).

/// Wilder moving average with smoothing factor `1 / period`.
///
/// Seeds with the arithmetic mean of the first full window of defined values,
/// then applies `out[i] = out[i-1] * (1 - 1/period) + v[i] / period`. An
/// undefined input after the seed holds the previous output.
#[derive(Debug, Clone, Copy)]
pub struct WilderSmoother {
    period: usize,
}

impl WilderSmoother {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Smooth a sequence, keeping it index-aligned with the input.
    pub fn smooth(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let n = values.len();
        let mut out = vec![None; n];

        let Some(seed_at) = self.seed_index(values) else {
            return out;
        };

        let window = &values[seed_at + 1 - self.period..=seed_at];
        let seed = window.iter().flatten().sum::<f64>() / self.period as f64;
        out[seed_at] = Some(seed);

        let alpha = 1.0 / self.period as f64;
        let mut prev = seed;
        for i in seed_at + 1..n {
            if let Some(v) = values[i] {
                prev = prev * (1.0 - alpha) + v * alpha;
            }
            out[i] = Some(prev);
        }

        out
    }

    /// First index at or after `period - 1` that closes a window of
    /// `period` consecutive defined values.
    fn seed_index(&self, values: &[Option<f64>]) -> Option<usize> {
        let mut run = 0;
        for (i, value) in values.iter().enumerate() {
            if value.is_some() {
                run += 1;
                if run >= self.period {
                    return Some(i);
                }
            } else {
                run = 0;
            }
        }
        None
    }
}
