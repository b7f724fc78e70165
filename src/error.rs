use std::path::PathBuf;

/// Errors raised by table loading, the statistics functions and the record store.
#[derive(Debug, thiserror::Error)]
pub enum InflammationError {
    #[error("inflammation values should not be negative")]
    InvalidValue,

    #[error("invalid table shape: {0}")]
    InvalidShape(String),

    #[error("invalid table type: {0}")]
    InvalidType(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record data: {0}")]
    Format(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("no day follows day {0}")]
    DayOverflow(u32),

    #[error("{rows} data rows cannot be matched with {names} names")]
    LengthMismatch { rows: usize, names: usize },
}

impl InflammationError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InflammationError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for InflammationError {
    fn from(err: serde_json::Error) -> Self {
        InflammationError::Format(err.to_string())
    }
}

impl From<toml::de::Error> for InflammationError {
    fn from(err: toml::de::Error) -> Self {
        InflammationError::Config(err.to_string())
    }
}

pub type Result<T, E = InflammationError> = std::result::Result<T, E>;
