//! Four-stage Laguerre filter.

/// Laguerre low-pass filter with damping factor `gamma`.
///
/// All four stages start at the first price, so the output is defined from
/// the first bar.
#[derive(Debug, Clone, Copy)]
pub struct LaguerreFilter {
    gamma: f64,
}

/// Filter state after one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Stages {
    l0: f64,
    l1: f64,
    l2: f64,
    l3: f64,
}

impl Stages {
    fn seeded(price: f64) -> Self {
        Self {
            l0: price,
            l1: price,
            l2: price,
            l3: price,
        }
    }

    fn next(&self, g: f64, price: f64) -> Self {
        let l0 = (1.0 - g) * price + g * self.l0;
        let l1 = -g * l0 + self.l0 + g * self.l1;
        let l2 = -g * l1 + self.l1 + g * self.l2;
        let l3 = -g * l2 + self.l2 + g * self.l3;
        Self { l0, l1, l2, l3 }
    }

    fn output(&self) -> f64 {
        (self.l0 + 2.0 * self.l1 + 2.0 * self.l2 + self.l3) / 6.0
    }
}

impl LaguerreFilter {
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Filter a price sequence.
    pub fn apply(&self, prices: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(prices.len());
        let mut state: Option<Stages> = None;

        for &price in prices {
            let next = match state {
                None => Stages::seeded(price),
                Some(prev) => prev.next(self.gamma, price),
            };
            out.push(next.output());
            state = Some(next);
        }

        out
    }
}
