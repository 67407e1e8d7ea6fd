//! Error types for cooc_counter
//!
//! Every fallible operation in the crate returns [`CoocError`]. The only
//! per-operation signal that is expected during normal counting is
//! [`CoocError::Full`], which the window counter tallies instead of
//! propagating.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CoocError>;

#[derive(Error, Debug)]
pub enum CoocError {
    /// A table was requested with zero slots
    #[error("Invalid capacity: a table needs at least one slot")]
    InvalidCapacity,

    /// No room left for a new distinct (target, context) key
    #[error("Table is full: all {capacity} slots hold distinct keys")]
    Full { capacity: usize },

    /// Increments must be positive and finite so weights only grow
    #[error("Invalid amount {amount}: increments must be positive and finite")]
    InvalidAmount { amount: f64 },

    /// Document lengths do not describe the flattened token sequence
    #[error("Malformed corpus: {message}")]
    MalformedCorpus { message: String },

    /// Target filter range with lower bound above upper bound
    #[error("Invalid target range: lower {lower} is greater than upper {upper}")]
    InvalidRange { lower: usize, upper: usize },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("Npy error: {0}")]
    Npy(#[from] ndarray_npy::WriteNpyError),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl CoocError {
    pub fn malformed_corpus(message: impl Into<String>) -> Self {
        Self::MalformedCorpus {
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Check if this error is the recoverable "table is full" signal
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full { .. })
    }
}
