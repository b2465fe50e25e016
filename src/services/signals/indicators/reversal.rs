//! Pivot detection and bounded reversal-level history.

use std::collections::VecDeque;

/// Default projected level for an empty top history.
pub const DEFAULT_TOP_LEVEL: f64 = 2.0;
/// Default projected level for an empty bottom history.
pub const DEFAULT_BOTTOM_LEVEL: f64 = -2.0;

/// Local extremum relative to the two neighbouring bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pivot {
    High(f64),
    Low(f64),
}

/// Width-1 pivot at bar `i`: strictly above (or below) both neighbours.
///
/// Needs bar `i + 1`, so a pivot at `i` is only known once bar `i + 1` closes.
pub fn pivot_at(values: &[Option<f64>], i: usize) -> Option<Pivot> {
    if i == 0 || i + 1 >= values.len() {
        return None;
    }
    let (prev, mid, next) = (values[i - 1]?, values[i]?, values[i + 1]?);
    if mid > prev && mid > next {
        Some(Pivot::High(mid))
    } else if mid < prev && mid < next {
        Some(Pivot::Low(mid))
    } else {
        None
    }
}

/// Most recent reversal levels, newest first, capped at `depth`.
#[derive(Debug, Clone)]
pub struct ReversalLevelHistory {
    levels: VecDeque<f64>,
    depth: usize,
    default_level: f64,
}

impl ReversalLevelHistory {
    pub fn new(depth: usize, default_level: f64) -> Self {
        let depth = depth.max(1);
        Self {
            levels: VecDeque::with_capacity(depth + 1),
            depth,
            default_level,
        }
    }

    /// History for resistance (top) reversals.
    pub fn top(depth: usize) -> Self {
        Self::new(depth, DEFAULT_TOP_LEVEL)
    }

    /// History for support (bottom) reversals.
    pub fn bottom(depth: usize) -> Self {
        Self::new(depth, DEFAULT_BOTTOM_LEVEL)
    }

    /// Insert a level at the front, evicting the oldest past `depth`.
    pub fn push(&mut self, level: f64) {
        self.levels.push_front(level);
        if self.levels.len() > self.depth {
            self.levels.pop_back();
        }
    }

    /// Mean of the stored levels, or the default when empty.
    pub fn average(&self) -> f64 {
        if self.levels.is_empty() {
            return self.default_level;
        }
        self.levels.iter().sum::<f64>() / self.levels.len() as f64
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Levels, newest first.
    pub fn levels(&self) -> impl Iterator<Item = f64> + '_ {
        self.levels.iter().copied()
    }
}
