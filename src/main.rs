use anyhow::Context;
use signal_engine::config::PipelineConfig;
use signal_engine::services::{
    format_signal_message, CandleSource, JsonFileSource, LogNotifier, Notifier, SignalAggregator,
};
use signal_engine::types::CandleSeries;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing on stderr; stdout carries the JSON output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signal_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = PipelineConfig::from_env();
    if let Err(e) = config.validate() {
        warn!("Configuration has invalid groups, affected engines will be skipped: {}", e);
    }

    let path = std::env::args()
        .nth(1)
        .map(Into::into)
        .or_else(|| config.source.path.clone())
        .context("No candle file given (pass a path or set CANDLES_PATH)")?;

    let source = JsonFileSource::new(path);
    let raw = source.fetch(&config.source.symbol, config.source.limit)?;
    let series = CandleSeries::from_raw(raw).context("Invalid candle data")?;
    info!(
        "Loaded {} candles for {} from {}",
        series.len(),
        config.source.symbol,
        source.path().display()
    );

    let enriched = SignalAggregator::new(config.clone()).run(&series);
    for (engine, error) in &enriched.skipped {
        warn!("Engine {} skipped: {}", engine, error);
    }

    println!("{}", serde_json::to_string_pretty(&enriched.records)?);

    if let Some(message) = enriched
        .latest()
        .and_then(|latest| format_signal_message(latest, &config.notify.label))
    {
        LogNotifier.notify(&message)?;
    } else {
        info!("No signal on the latest bar");
    }

    Ok(())
}
