//! Signal notification formatting and delivery.

use tracing::info;

use crate::types::EnrichedRecord;

/// Timestamp layout used in messages.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Delivers a formatted message somewhere (chat bot, log, ...).
pub trait Notifier {
    fn notify(&self, message: &str) -> anyhow::Result<()>;
}

/// HTML message for one bar, or `None` when it carries neither a PPO nor a
/// z-score signal.
pub fn format_signal_message(record: &EnrichedRecord, label: &str) -> Option<String> {
    let ppo = record.ppo_pro_signal();
    let zscore = record.signal_zscore();
    if ppo.is_none() && zscore.is_none() {
        return None;
    }

    let mut message = format!(
        "🕯 <b>{} </b>\n🕐 Time: <code>{}</code>\n",
        label,
        record.candle.timestamp.format(TIME_FORMAT)
    );
    if let Some(signal) = ppo {
        message.push_str(&format!("📈 PPO Signal: <b>{}</b>\n", signal.label()));
    }
    if let Some(signal) = zscore {
        message.push_str(&format!("📊 Signal ZScore: <b>{}</b>", signal.label()));
    }
    Some(message)
}

/// Writes messages to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) -> anyhow::Result<()> {
        info!(message, "Signal notification");
        Ok(())
    }
}
