use chrono::{DateTime, Utc};
use thiserror::Error;

/// Pipeline error types.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Candle {index}: missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("Candle {index}: field `{field}` has invalid value {value}")]
    InvalidValue {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("Candle {index}: {reason}")]
    InvalidCandle { index: usize, reason: String },

    #[error("Candle {index}: timestamp {current} is not after previous timestamp {previous}")]
    NonMonotonicTimestamp {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl PipelineError {
    /// True for errors caused by malformed candle input.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            PipelineError::MissingField { .. }
                | PipelineError::InvalidValue { .. }
                | PipelineError::InvalidCandle { .. }
                | PipelineError::NonMonotonicTimestamp { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
