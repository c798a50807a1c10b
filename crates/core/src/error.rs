//! Error types for the hashtag-pulse system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the hashtag-pulse system.
///
/// An empty dataset is deliberately not represented here: it is a valid
/// terminal state that every stage handles by producing empty output.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single raw record could not be decoded or normalized.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Data error (invalid or inconsistent data between stages).
    #[error("Data error: {0}")]
    Data(String),

    /// Too little textual or numeric variance to fit a feature model.
    #[error("Degenerate feature input: {0}")]
    DegenerateFeatureInput(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Plot rendering error.
    #[error("Plot error: {0}")]
    Plot(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parse error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a malformed record error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedRecord(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create a degenerate feature input error.
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Error::DegenerateFeatureInput(msg.into())
    }

    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Error::Database(msg.into())
    }

    /// Create a plot error.
    pub fn plot(msg: impl Into<String>) -> Self {
        Error::Plot(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::malformed("missing id");
        assert_eq!(err.to_string(), "Malformed record: missing id");
    }
}
