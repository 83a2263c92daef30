//! Error types for translation engine operations

use thiserror::Error;

/// Errors that can occur while configuring the engine or managing plugins.
///
/// Lookups never produce these: a miss always resolves through the
/// fallback chain instead.
#[derive(Error, Debug)]
pub enum I18nError {
    /// A key could not be parsed by the path key parser
    #[error("Invalid translation key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// A plugin with the same name is already registered
    #[error("Plugin '{0}' is already registered")]
    PluginAlreadyRegistered(String),

    /// A plugin declared a dependency that is not registered
    #[error("Plugin '{plugin}' depends on '{dependency}' which is not registered")]
    MissingDependency { plugin: String, dependency: String },

    /// A plugin cannot be removed while another one depends on it
    #[error("Cannot unregister plugin '{plugin}' because '{dependent}' depends on it")]
    PluginInUse { plugin: String, dependent: String },

    /// A plugin's `init` hook failed
    #[error("Failed to initialize plugin '{plugin}': {source}")]
    PluginInit {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    /// The engine settings were rejected
    #[error("Invalid configuration: {0}")]
    Config(#[from] bakery_common::BakeryError),
}

/// Result type for engine operations
pub type I18nResult<T> = Result<T, I18nError>;
