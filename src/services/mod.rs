pub mod market_data;
pub mod notify;
pub mod signals;

pub use market_data::{CandleSource, JsonFileSource, MemorySource};
pub use notify::{format_signal_message, LogNotifier, Notifier};
pub use signals::{EnrichedSeries, Engine, SignalAggregator};
