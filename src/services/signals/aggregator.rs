//! Merges every engine's per-bar output onto the candle series.

use tracing::{debug, info, warn};

use super::indicators::{DmiAdx, EmaRibbon, LaguerrePpo, ZScoreBands};
use super::Engine;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::types::{CandleSeries, EnrichedRecord};

/// The enriched series plus the engines that were skipped.
#[derive(Debug)]
pub struct EnrichedSeries {
    pub records: Vec<EnrichedRecord>,
    /// Engine id and the configuration error that disabled it.
    pub skipped: Vec<(String, PipelineError)>,
}

impl EnrichedSeries {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest(&self) -> Option<&EnrichedRecord> {
        self.records.last()
    }

    pub fn is_skipped(&self, engine_id: &str) -> bool {
        self.skipped.iter().any(|(id, _)| id == engine_id)
    }
}

/// Runs the ADX, PPO and z-score engines (plus the ribbon when enabled)
/// independently over the same series.
#[derive(Debug, Clone, Default)]
pub struct SignalAggregator {
    config: PipelineConfig,
}

impl SignalAggregator {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Compute every engine and attach its fields to each record.
    pub fn run(&self, series: &CandleSeries) -> EnrichedSeries {
        let mut records: Vec<EnrichedRecord> =
            series.iter().cloned().map(EnrichedRecord::new).collect();
        let mut skipped = Vec::new();

        if let Some(out) = compute("adx", DmiAdx::new(self.config.adx.clone()), series, &mut skipped) {
            for (i, record) in records.iter_mut().enumerate() {
                record.adx = Some(out.fields_at(i));
            }
        }

        if let Some(out) = compute("ppo", LaguerrePpo::new(self.config.ppo.clone()), series, &mut skipped) {
            for (i, record) in records.iter_mut().enumerate() {
                record.ppo = Some(out.fields_at(i));
            }
        }

        if let Some(out) = compute(
            "zscore",
            ZScoreBands::new(self.config.zscore.clone()),
            series,
            &mut skipped,
        ) {
            for (i, record) in records.iter_mut().enumerate() {
                record.zscore = Some(out.fields_at(i));
            }
        }

        if self.config.ribbon.enabled {
            if let Some(out) = compute(
                "ribbon",
                EmaRibbon::new(self.config.ribbon.clone()),
                series,
                &mut skipped,
            ) {
                for (i, record) in records.iter_mut().enumerate() {
                    record.ribbon = Some(out.fields_at(i));
                }
            }
        }

        let enriched = EnrichedSeries { records, skipped };
        if let Some(latest) = enriched.latest() {
            info!(
                bars = enriched.len(),
                skipped = enriched.skipped.len(),
                ppo_signal = ?latest.ppo_pro_signal(),
                zscore_signal = ?latest.signal_zscore(),
                "Signal pipeline complete"
            );
        }
        enriched
    }
}

/// Build-and-run one engine, recording a skip when its configuration is invalid.
fn compute<E: Engine>(
    id: &str,
    engine: Result<E>,
    series: &CandleSeries,
    skipped: &mut Vec<(String, PipelineError)>,
) -> Option<E::Output> {
    let engine = match engine {
        Ok(engine) => engine,
        Err(e) => {
            warn!(engine = id, error = %e, "Skipping engine with invalid configuration");
            skipped.push((id.to_string(), e));
            return None;
        }
    };

    if series.len() < engine.min_periods() {
        warn!(
            engine = engine.id(),
            bars = series.len(),
            min_periods = engine.min_periods(),
            "Series shorter than engine warm-up, output will be undefined"
        );
    }
    debug!(engine = engine.id(), name = engine.name(), "Running engine");
    Some(engine.compute(series))
}
