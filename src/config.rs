use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{PipelineError, Result};
use crate::types::{PpoSignalMode, RankWindow};

/// DMI/ADX engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AdxConfig {
    /// Wilder period for TR and directional movement.
    pub di_len: usize,
    /// Wilder period for DX -> ADX.
    pub adx_smooth: usize,
    /// Upper ADX bound for entries and the `warn_weak` cross level.
    pub threshold: f64,
    /// Minimum |DI+ - DI-| for an entry.
    pub min_sep: f64,
    /// Minimum bars between two accepted `warn_down` triggers.
    pub warn_cooldown: usize,
}

impl Default for AdxConfig {
    fn default() -> Self {
        Self {
            di_len: 14,
            adx_smooth: 14,
            threshold: 35.0,
            min_sep: 5.0,
            warn_cooldown: 5,
        }
    }
}

impl AdxConfig {
    pub fn validate(&self) -> Result<()> {
        if self.di_len == 0 || self.adx_smooth == 0 {
            return Err(invalid("adx periods must be at least 1"));
        }
        if !self.threshold.is_finite() {
            return Err(invalid("adx threshold must be finite"));
        }
        if !self.min_sep.is_finite() || self.min_sep < 0.0 {
            return Err(invalid("di_min_sep must be a non-negative number"));
        }
        Ok(())
    }
}

/// Laguerre PPO percentile-rank configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PpoConfig {
    /// Fast Laguerre gamma.
    pub short_g: f64,
    /// Slow Laguerre gamma.
    pub long_g: f64,
    /// Percentile-rank lookback for the top PPO.
    pub lkb_t: usize,
    /// Percentile-rank lookback for the bottom PPO.
    pub lkb_b: usize,
    /// Extreme percentile (red / lime).
    pub pctile: f64,
    /// Warning percentile (orange / green).
    pub wrn_pctile: f64,
    pub show_threshold_top: f64,
    pub show_threshold_bot: f64,
    /// Trend gate fast EMA length.
    pub ema_fast_len: usize,
    /// Trend gate slow EMA length.
    pub ema_slow_len: usize,
    /// Minimum EMA gap in percent for the gate to open.
    pub min_gap_pct: f64,
    pub rank_window: RankWindow,
    pub signal_mode: PpoSignalMode,
}

impl Default for PpoConfig {
    fn default() -> Self {
        Self {
            short_g: 0.4,
            long_g: 0.8,
            lkb_t: 200,
            lkb_b: 200,
            pctile: 90.0,
            wrn_pctile: 70.0,
            show_threshold_top: 60.0,
            show_threshold_bot: -60.0,
            ema_fast_len: 20,
            ema_slow_len: 55,
            min_gap_pct: 0.3,
            rank_window: RankWindow::Inclusive,
            signal_mode: PpoSignalMode::Trend,
        }
    }
}

impl PpoConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, gamma) in [("short_g", self.short_g), ("long_g", self.long_g)] {
            if !(0.0..1.0).contains(&gamma) {
                return Err(invalid(&format!("{} must be in [0, 1), got {}", name, gamma)));
            }
        }
        if self.lkb_t == 0 || self.lkb_b == 0 {
            return Err(invalid("percentile-rank lookbacks must be at least 1"));
        }
        if !(0.0..=100.0).contains(&self.wrn_pctile)
            || !(0.0..=100.0).contains(&self.pctile)
            || self.wrn_pctile > self.pctile
        {
            return Err(invalid("expected 0 <= wrn_pctile <= pctile <= 100"));
        }
        if !self.show_threshold_top.is_finite() || !self.show_threshold_bot.is_finite() {
            return Err(invalid("show thresholds must be finite"));
        }
        if self.ema_fast_len == 0 || self.ema_slow_len == 0 {
            return Err(invalid("trend gate EMA lengths must be at least 1"));
        }
        if !self.min_gap_pct.is_finite() || self.min_gap_pct < 0.0 {
            return Err(invalid("min_gap_pct must be a non-negative number"));
        }
        Ok(())
    }
}

/// Z-score band configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ZScoreConfig {
    /// Rolling mean/std window.
    pub length: usize,
    /// VWMA window over the raw z-score.
    pub smooth: usize,
    /// Reversal levels kept per side.
    pub history_depth: usize,
    /// Pivot magnitude required to record a reversal.
    pub z_thresh: f64,
}

impl Default for ZScoreConfig {
    fn default() -> Self {
        Self {
            length: 144,
            smooth: 20,
            history_depth: 25,
            z_thresh: 1.5,
        }
    }
}

impl ZScoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.length == 0 || self.smooth == 0 {
            return Err(invalid("z-score windows must be at least 1"));
        }
        if self.history_depth == 0 {
            return Err(invalid("history_depth must be at least 1"));
        }
        if !self.z_thresh.is_finite() || self.z_thresh < 0.0 {
            return Err(invalid("z_thresh must be a non-negative number"));
        }
        Ok(())
    }
}

/// EMA ribbon configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RibbonConfig {
    pub enabled: bool,
    pub periods: Vec<usize>,
}

impl Default for RibbonConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            periods: vec![20, 25, 30, 35, 40, 45, 50, 55],
        }
    }
}

impl RibbonConfig {
    pub fn validate(&self) -> Result<()> {
        if self.periods.is_empty() || self.periods.contains(&0) {
            return Err(invalid("ribbon periods must be non-empty and at least 1"));
        }
        Ok(())
    }
}

/// Notification message configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NotifyConfig {
    /// Title shown at the top of every message.
    pub label: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            label: "BTC H4".to_string(),
        }
    }
}

/// Where the CLI reads candles from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    /// JSON candle file; the first CLI argument takes precedence.
    pub path: Option<PathBuf>,
    pub symbol: String,
    /// Keep only the most recent candles.
    pub limit: Option<usize>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: None,
            symbol: "BTCUSDT".to_string(),
            limit: None,
        }
    }
}

/// Full pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineConfig {
    pub adx: AdxConfig,
    pub ppo: PpoConfig,
    pub zscore: ZScoreConfig,
    pub ribbon: RibbonConfig,
    pub notify: NotifyConfig,
    pub source: SourceConfig,
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through a variable lookup.
    ///
    /// Absent or unparsable values fall back to the defaults.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        Self {
            adx: AdxConfig {
                di_len: parse_or(&get, "ADX_DI_LEN", d.adx.di_len),
                adx_smooth: parse_or(&get, "ADX_SMOOTH", d.adx.adx_smooth),
                threshold: parse_or(&get, "ADX_THRESHOLD", d.adx.threshold),
                min_sep: parse_or(&get, "ADX_DI_MIN_SEP", d.adx.min_sep),
                warn_cooldown: parse_or(&get, "ADX_WARN_COOLDOWN", d.adx.warn_cooldown),
            },
            ppo: PpoConfig {
                short_g: parse_or(&get, "PPO_SHORT_G", d.ppo.short_g),
                long_g: parse_or(&get, "PPO_LONG_G", d.ppo.long_g),
                lkb_t: parse_or(&get, "PPO_LKB_T", d.ppo.lkb_t),
                lkb_b: parse_or(&get, "PPO_LKB_B", d.ppo.lkb_b),
                pctile: parse_or(&get, "PPO_PCTILE", d.ppo.pctile),
                wrn_pctile: parse_or(&get, "PPO_WRN_PCTILE", d.ppo.wrn_pctile),
                show_threshold_top: parse_or(&get, "PPO_SHOW_TOP", d.ppo.show_threshold_top),
                show_threshold_bot: parse_or(&get, "PPO_SHOW_BOT", d.ppo.show_threshold_bot),
                ema_fast_len: parse_or(&get, "PPO_EMA_FAST", d.ppo.ema_fast_len),
                ema_slow_len: parse_or(&get, "PPO_EMA_SLOW", d.ppo.ema_slow_len),
                min_gap_pct: parse_or(&get, "PPO_MIN_GAP_PCT", d.ppo.min_gap_pct),
                rank_window: get("PPO_RANK_WINDOW")
                    .and_then(|v| RankWindow::from_str(&v))
                    .unwrap_or(d.ppo.rank_window),
                signal_mode: get("PPO_SIGNAL_MODE")
                    .and_then(|v| PpoSignalMode::from_str(&v))
                    .unwrap_or(d.ppo.signal_mode),
            },
            zscore: ZScoreConfig {
                length: parse_or(&get, "ZSCORE_LENGTH", d.zscore.length),
                smooth: parse_or(&get, "ZSCORE_SMOOTH", d.zscore.smooth),
                history_depth: parse_or(&get, "ZSCORE_HISTORY_DEPTH", d.zscore.history_depth),
                z_thresh: parse_or(&get, "ZSCORE_THRESHOLD", d.zscore.z_thresh),
            },
            ribbon: RibbonConfig {
                enabled: get("RIBBON_ENABLED")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(d.ribbon.enabled),
                // Format: "20,25,30"
                periods: get("RIBBON_PERIODS")
                    .and_then(|s| {
                        s.split(',')
                            .map(|p| p.trim().parse().ok())
                            .collect::<Option<Vec<usize>>>()
                    })
                    .unwrap_or(d.ribbon.periods),
            },
            notify: NotifyConfig {
                label: get("SIGNAL_LABEL").unwrap_or(d.notify.label),
            },
            source: SourceConfig {
                path: get("CANDLES_PATH").filter(|p| !p.is_empty()).map(PathBuf::from),
                symbol: get("CANDLES_SYMBOL").unwrap_or(d.source.symbol),
                limit: get("CANDLES_LIMIT").and_then(|v| v.parse().ok()),
            },
        }
    }

    /// Validate every engine group.
    pub fn validate(&self) -> Result<()> {
        self.adx.validate()?;
        self.ppo.validate()?;
        self.zscore.validate()?;
        if self.ribbon.enabled {
            self.ribbon.validate()?;
        }
        Ok(())
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> T
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn invalid(msg: &str) -> PipelineError {
    PipelineError::InvalidConfig(msg.to_string())
}
