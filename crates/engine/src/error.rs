use thiserror::Error;

/// Result type for engine construction.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised while building an [`crate::Engine`].
///
/// Only construction can fail. Every per-item operation is total and reports quality
/// problems as data (gate decisions, relevance verdicts, fallback text).
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration values are inconsistent or out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A keyword table could not be compiled into a matcher
    #[error("Invalid pattern in {table}: {source}")]
    Pattern {
        table: String,
        #[source]
        source: regex::Error,
    },

    /// Failed to read a configuration file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse a TOML configuration
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Failed to render a configuration as TOML
    #[error("Config render error: {0}")]
    ConfigRender(#[from] toml::ser::Error),
}

impl EngineError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a pattern error for the named table
    pub fn pattern(table: impl Into<String>, source: regex::Error) -> Self {
        Self::Pattern {
            table: table.into(),
            source,
        }
    }
}
