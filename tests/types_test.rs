//! Unit tests for types module

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use signal_engine::types::*;

fn create_candle() -> Candle {
    let ts = Utc.with_ymd_and_hms(2024, 1, 2, 4, 0, 0).unwrap();
    Candle::new(0, ts, 100.0, 110.0, 95.0, 105.0, 12.5, "BTCUSDT").unwrap()
}

fn to_value(record: &EnrichedRecord) -> Value {
    serde_json::to_value(record).unwrap()
}

#[test]
fn test_zone_color_serialization() {
    assert_eq!(serde_json::to_string(&ZoneColor::Orange).unwrap(), "\"orange\"");
    assert_eq!(serde_json::to_string(&ZoneColor::Lime).unwrap(), "\"lime\"");
    let parsed: ZoneColor = serde_json::from_str("\"gray\"").unwrap();
    assert_eq!(parsed, ZoneColor::Gray);
}

#[test]
fn test_signal_labels_match_wire_names() {
    for signal in [PpoSignal::Buy, PpoSignal::Sell, PpoSignal::StopBuy, PpoSignal::StopSell] {
        let json = serde_json::to_string(&signal).unwrap();
        assert_eq!(json, format!("\"{}\"", signal.label()));
    }
    assert_eq!(serde_json::to_string(&ZScoreSignal::Long).unwrap(), "\"long signal\"");
    assert_eq!(serde_json::to_string(&ZScoreSignal::Short).unwrap(), "\"short signal\"");
}

#[test]
fn test_mode_parsing() {
    assert_eq!(PpoSignalMode::from_str("TREND"), Some(PpoSignalMode::Trend));
    assert_eq!(PpoSignalMode::from_str("zone_transition"), Some(PpoSignalMode::ZoneTransition));
    assert_eq!(PpoSignalMode::from_str("other"), None);
    assert_eq!(RankWindow::from_str("Exclusive"), Some(RankWindow::Exclusive));
    assert_eq!(RankWindow::default(), RankWindow::Inclusive);
}

#[test]
fn test_candle_helpers() {
    let candle = create_candle();
    assert_eq!(candle.mid_price(), 102.5);
    assert!(candle.is_bullish());
    assert!(!candle.is_bearish());
}

#[test]
fn test_candle_rejects_inverted_range() {
    let ts = Utc.with_ymd_and_hms(2024, 1, 2, 4, 0, 0).unwrap();
    let err = Candle::new(3, ts, 1.0, 0.5, 1.0, 1.0, 1.0, "BTCUSDT").unwrap_err();
    assert!(err.is_data_error());
    assert!(err.to_string().starts_with("Candle 3"));
}

#[test]
fn test_bare_record_is_flat_candle() {
    let value = to_value(&EnrichedRecord::new(create_candle()));
    assert_eq!(value["timestamp"], json!("2024-01-02T04:00:00Z"));
    assert_eq!(value["close"], json!(105.0));
    assert_eq!(value["symbol"], json!("BTCUSDT"));
    assert!(value.get("adx").is_none());
    assert!(value.get("ppoT").is_none());
}

#[test]
fn test_enriched_record_field_names() {
    let mut record = EnrichedRecord::new(create_candle());
    record.adx = Some(AdxFields {
        di_plus: Some(31.0),
        di_minus: None,
        adx: Some(22.0),
        buy_signal: true,
        sell_signal: false,
        warn_weak: false,
        warn_down: false,
    });
    record.ppo = Some(PpoFields {
        lmas: 101.0,
        lmal: 100.0,
        ppo_top: 1.0,
        ppo_bottom: -1.0,
        pct_rank_t: Some(92.5),
        pct_rank_b: None,
        col_t: ZoneColor::Red,
        col_b: ZoneColor::Hidden,
        up_trend: true,
        down_trend: false,
        ppo_pro_signal: Some(PpoSignal::Buy),
    });
    record.zscore = Some(ZScoreFields {
        z_score: None,
        avg_top_level: Some(2.0),
        avg_bot_level: Some(-2.0),
        res_band_low: Some(120.0),
        res_band_high: Some(125.0),
        sup_band_low: Some(80.0),
        sup_band_high: Some(85.0),
        signal_zscore: Some(ZScoreSignal::Long),
    });

    let value = to_value(&record);
    assert_eq!(value["di_plus"], json!(31.0));
    assert_eq!(value["di_minus"], Value::Null);
    assert_eq!(value["buy_signal"], json!(true));
    assert_eq!(value["ppoT"], json!(1.0));
    assert_eq!(value["ppoB"], json!(-1.0));
    assert_eq!(value["pct_rank_b"], Value::Null);
    assert_eq!(value["col_t"], json!("red"));
    assert_eq!(value["col_b"], json!("hidden"));
    assert_eq!(value["ppo_pro_signal"], json!("buy"));
    assert_eq!(value["z_score"], Value::Null);
    assert_eq!(value["signal_zscore"], json!("long signal"));
    assert!(value.get("ppo_top").is_none());
    assert!(record.has_signal());
}

#[test]
fn test_ribbon_fields_flatten() {
    let mut emas = std::collections::BTreeMap::new();
    emas.insert("ema_20".to_string(), Some(101.0));
    emas.insert("ema_55".to_string(), None);

    let mut record = EnrichedRecord::new(create_candle());
    record.ribbon = Some(RibbonFields {
        emas,
        trend: Some(RibbonTrend::Up),
    });

    let value = to_value(&record);
    assert_eq!(value["ema_20"], json!(101.0));
    assert_eq!(value["ema_55"], Value::Null);
    assert_eq!(value["trend"], json!("up"));
    assert!(!record.has_signal());
}

#[test]
fn test_raw_candle_accepts_missing_fields() {
    let raw: RawCandle = serde_json::from_str(r#"{"timestamp": 1700000000, "close": 1.5}"#).unwrap();
    assert_eq!(raw.close, Some(1.5));
    assert_eq!(raw.open, None);
    assert!(raw.into_candle(4).is_err());
}
