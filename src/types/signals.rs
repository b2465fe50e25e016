use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Candle;

/// Histogram colour of a PPO percentile-rank zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneColor {
    /// Side not visible because the trend gate is closed.
    Hidden,
    Gray,
    /// Top warning zone.
    Orange,
    /// Top extreme zone.
    Red,
    /// Bottom warning zone.
    Green,
    /// Bottom extreme zone.
    Lime,
}

impl ZoneColor {
    pub fn label(&self) -> &'static str {
        match self {
            ZoneColor::Hidden => "hidden",
            ZoneColor::Gray => "gray",
            ZoneColor::Orange => "orange",
            ZoneColor::Red => "red",
            ZoneColor::Green => "green",
            ZoneColor::Lime => "lime",
        }
    }
}

/// Composite PPO signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PpoSignal {
    Buy,
    Sell,
    /// Top zone fell back from orange to gray.
    StopBuy,
    /// Bottom zone fell back from green to gray.
    StopSell,
}

impl PpoSignal {
    pub fn label(&self) -> &'static str {
        match self {
            PpoSignal::Buy => "buy",
            PpoSignal::Sell => "sell",
            PpoSignal::StopBuy => "stop_buy",
            PpoSignal::StopSell => "stop_sell",
        }
    }
}

/// How `ppo_pro_signal` is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PpoSignalMode {
    /// `buy` while the trend gate is up, `sell` while it is down.
    #[default]
    Trend,
    /// Edge-triggered on zone colour transitions.
    ZoneTransition,
}

impl PpoSignalMode {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trend" => Some(Self::Trend),
            "zone_transition" | "zone" | "transition" => Some(Self::ZoneTransition),
            _ => None,
        }
    }
}

/// Window boundary used by the percentile rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankWindow {
    /// Last `L` values ending at the current bar (fewer near the start);
    /// counts values strictly below the current one.
    #[default]
    Inclusive,
    /// The `L` values before the current bar; counts values less than or
    /// equal to the current one. Undefined until `L` prior values exist.
    Exclusive,
}

impl RankWindow {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "inclusive" => Some(Self::Inclusive),
            "exclusive" => Some(Self::Exclusive),
            _ => None,
        }
    }
}

/// Z-score band crossing signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZScoreSignal {
    #[serde(rename = "long signal")]
    Long,
    #[serde(rename = "short signal")]
    Short,
}

impl ZScoreSignal {
    pub fn label(&self) -> &'static str {
        match self {
            ZScoreSignal::Long => "long signal",
            ZScoreSignal::Short => "short signal",
        }
    }
}

/// EMA ribbon alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RibbonTrend {
    Up,
    Down,
}

/// ADX/DMI fields for one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdxFields {
    pub di_plus: Option<f64>,
    pub di_minus: Option<f64>,
    pub adx: Option<f64>,
    pub buy_signal: bool,
    pub sell_signal: bool,
    pub warn_weak: bool,
    pub warn_down: bool,
}

/// Laguerre PPO fields for one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpoFields {
    pub lmas: f64,
    pub lmal: f64,
    #[serde(rename = "ppoT")]
    pub ppo_top: f64,
    #[serde(rename = "ppoB")]
    pub ppo_bottom: f64,
    pub pct_rank_t: Option<f64>,
    pub pct_rank_b: Option<f64>,
    pub col_t: ZoneColor,
    pub col_b: ZoneColor,
    pub up_trend: bool,
    pub down_trend: bool,
    pub ppo_pro_signal: Option<PpoSignal>,
}

/// Z-score band fields for one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreFields {
    pub z_score: Option<f64>,
    pub avg_top_level: Option<f64>,
    pub avg_bot_level: Option<f64>,
    pub res_band_low: Option<f64>,
    pub res_band_high: Option<f64>,
    pub sup_band_low: Option<f64>,
    pub sup_band_high: Option<f64>,
    pub signal_zscore: Option<ZScoreSignal>,
}

/// EMA ribbon fields for one bar, keyed `ema_<period>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RibbonFields {
    #[serde(flatten)]
    pub emas: BTreeMap<String, Option<f64>>,
    pub trend: Option<RibbonTrend>,
}

/// A candle plus every field group attached by the engines.
///
/// A group is `None` when its engine was skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub candle: Candle,
    #[serde(flatten)]
    pub adx: Option<AdxFields>,
    #[serde(flatten)]
    pub ppo: Option<PpoFields>,
    #[serde(flatten)]
    pub zscore: Option<ZScoreFields>,
    #[serde(flatten)]
    pub ribbon: Option<RibbonFields>,
}

impl EnrichedRecord {
    pub fn new(candle: Candle) -> Self {
        Self {
            candle,
            adx: None,
            ppo: None,
            zscore: None,
            ribbon: None,
        }
    }

    pub fn ppo_pro_signal(&self) -> Option<PpoSignal> {
        self.ppo.as_ref().and_then(|p| p.ppo_pro_signal)
    }

    pub fn signal_zscore(&self) -> Option<ZScoreSignal> {
        self.zscore.as_ref().and_then(|z| z.signal_zscore)
    }

    /// True when any engine flagged something on this bar.
    pub fn has_signal(&self) -> bool {
        let adx = self.adx.as_ref().is_some_and(|a| {
            a.buy_signal || a.sell_signal || a.warn_weak || a.warn_down
        });
        adx || self.ppo_pro_signal().is_some() || self.signal_zscore().is_some()
    }
}
