//! Error types for bundled plugins

use thiserror::Error;

/// Errors raised while constructing plugins and backends.
#[derive(Error, Debug)]
pub enum PluginError {
    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A configured URL is malformed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Translation data is not a map of strings and nested maps
    #[error("Invalid translation data: {0}")]
    Data(#[from] serde_json::Error),
}

/// Result type for plugin construction
pub type PluginResult<T> = Result<T, PluginError>;
