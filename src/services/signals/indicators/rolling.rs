//! Rolling window statistics.
//!
//! Both reductions slide a running accumulator one bar at a time and rebuild
//! it from the raw window every `period` bars. The rebuild points depend only
//! on the bar index, so appending bars never changes earlier outputs.

/// Standard deviations at or below `|mean| * RELATIVE_NOISE` are summation
/// noise and snap to zero.
const RELATIVE_NOISE: f64 = 1e-12;

/// Whether the window ending at bar `i` is rebuilt from scratch.
fn is_anchor(i: usize, period: usize) -> bool {
    (i + 1 - period) % period == 0
}

/// Rolling mean and population standard deviation over `period` bars.
///
/// Both are undefined until the window fills. Between anchors the mean and
/// the sum of squared deviations are updated as one value leaves and one
/// enters the window.
pub fn rolling_mean_std(values: &[f64], period: usize) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let n = values.len();
    let mut mean = vec![None; n];
    let mut std = vec![None; n];
    if period == 0 || n < period {
        return (mean, std);
    }

    let p = period as f64;
    let mut m = 0.0;
    let mut m2 = 0.0;
    for i in period - 1..n {
        let start = i + 1 - period;
        if is_anchor(i, period) {
            let window = &values[start..=i];
            m = window.iter().sum::<f64>() / p;
            m2 = window.iter().map(|v| (v - m).powi(2)).sum::<f64>();
        } else {
            let incoming = values[i];
            let outgoing = values[start - 1];
            let previous = m;
            m += (incoming - outgoing) / p;
            m2 += (incoming - outgoing) * (incoming - m + outgoing - previous);
            m2 = m2.max(0.0);
        }

        let sd = (m2 / p).sqrt();
        mean[i] = Some(m);
        std[i] = Some(if sd <= m.abs() * RELATIVE_NOISE { 0.0 } else { sd });
    }

    (mean, std)
}

/// Running sums over the VWMA window.
#[derive(Debug, Default)]
struct WeightedWindow {
    weighted: f64,
    total: f64,
    undefined: usize,
    nonzero: usize,
}

impl WeightedWindow {
    fn add(&mut self, value: Option<f64>, weight: f64) {
        match value {
            Some(v) => self.weighted += v * weight,
            None => self.undefined += 1,
        }
        self.total += weight;
        if weight != 0.0 {
            self.nonzero += 1;
        }
    }

    fn remove(&mut self, value: Option<f64>, weight: f64) {
        match value {
            Some(v) => self.weighted -= v * weight,
            None => self.undefined -= 1,
        }
        self.total -= weight;
        if weight != 0.0 {
            self.nonzero -= 1;
        }
    }

    fn average(&self) -> Option<f64> {
        (self.undefined == 0 && self.nonzero > 0).then(|| self.weighted / self.total)
    }
}

/// Volume-weighted moving average `Σ(v·w) / Σ(w)` over the trailing window.
///
/// Undefined when the window is not full, contains an undefined value, or
/// carries zero total volume.
pub fn vwma(values: &[Option<f64>], weights: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut out = vec![None; n];
    if period == 0 || n < period {
        return out;
    }

    let mut window = WeightedWindow::default();
    for i in period - 1..n {
        let start = i + 1 - period;
        if is_anchor(i, period) {
            window = WeightedWindow::default();
            for (value, &weight) in values[start..=i].iter().zip(&weights[start..=i]) {
                window.add(*value, weight);
            }
        } else {
            window.remove(values[start - 1], weights[start - 1]);
            window.add(values[i], weights[i]);
        }
        out[i] = window.average();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Direct per-window reduction to compare the sliding results against.
    fn window_mean_std(window: &[f64]) -> (f64, f64) {
        let p = window.len() as f64;
        let m = window.iter().sum::<f64>() / p;
        let var = window.iter().map(|v| (v - m).powi(2)).sum::<f64>() / p;
        (m, var.sqrt())
    }

    #[test]
    fn test_rolling_mean_std() {
        let (mean, std) = rolling_mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        assert!(mean[..7].iter().all(Option::is_none));
        assert_eq!(mean[7], Some(5.0));
        assert_eq!(std[7], Some(2.0));
    }

    #[test]
    fn test_constant_window_has_zero_std() {
        let (mean, std) = rolling_mean_std(&[27345.67; 200], 144);
        assert!(std[143..].iter().all(|s| *s == Some(0.0)));
        assert!((mean[199].unwrap() - 27345.67).abs() < 1e-6);
    }

    #[test]
    fn test_vwma_weights_by_volume() {
        let values = vec![Some(1.0), Some(2.0), Some(4.0)];
        let out = vwma(&values, &[1.0, 1.0, 2.0], 2);
        assert_eq!(out[0], None);
        assert_eq!(out[1], Some(1.5));
        // (2*1 + 4*2) / 3
        assert!((out[2].unwrap() - 10.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_vwma_undefined_inputs() {
        let values = vec![None, Some(2.0), Some(3.0), Some(5.0)];
        let out = vwma(&values, &[1.0, 1.0, 0.0, 0.0], 2);
        assert_eq!(out[1], None);
        assert_eq!(out[2], Some(2.0));
        // zero volume window
        assert_eq!(out[3], None);
    }

    #[test]
    fn test_sliding_matches_direct_windows() {
        let values: Vec<f64> = (0..1_000)
            .map(|i| 60_000.0 + 900.0 * (i as f64 * 0.07).sin() + (i % 13) as f64 * 17.5)
            .collect();
        let (mean, std) = rolling_mean_std(&values, 20);

        for i in 19..values.len() {
            let (m, s) = window_mean_std(&values[i - 19..=i]);
            assert!((mean[i].unwrap() - m).abs() < 1e-7, "bar {}", i);
            assert!((std[i].unwrap() - s).abs() < 1e-6, "bar {}", i);
        }
    }

    #[test]
    fn test_vwma_recovers_after_undefined_value() {
        let mut values: Vec<Option<f64>> = (0..12).map(|i| Some(i as f64)).collect();
        values[4] = None;
        let weights = vec![2.0; 12];
        let out = vwma(&values, &weights, 3);

        assert_eq!(out[3], Some(2.0));
        assert!(out[4..7].iter().all(Option::is_none));
        assert!((out[7].unwrap() - 6.0).abs() < 1e-12);
        assert!((out[11].unwrap() - 10.0).abs() < 1e-12);
    }
}
