//! Error types for the liftlab_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for liftlab_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected calculation input (non-positive weight, RPE out of range, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stored result is missing data its progression scheme depends on
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// Custom set list that cannot be expanded into dense slots
    #[error("Set topology error: {0}")]
    SetTopology(String),

    /// Program definition error
    #[error("Program error: {0}")]
    Program(String),

    /// State management error
    #[error("State error: {0}")]
    State(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for errors caused by stored history rather than configuration
    pub fn is_data_integrity(&self) -> bool {
        matches!(self, Error::DataIntegrity(_))
    }
}
