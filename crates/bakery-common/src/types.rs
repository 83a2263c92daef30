//! Common type definitions shared by every bakery crate.

use serde_json::{Map, Value};

/// A locale identifier such as `"en"` or `"en-US"`.
///
/// Locales are opaque to the engine; only the plural and formatting
/// strategies look inside them.
pub type Locale = String;

/// A named bucket of translation keys, usually one per logical file.
pub type Namespace = String;

/// A dot-delimited key identifying a value within a namespace.
pub type Key = String;

/// Variable bag used for interpolation and plugin context data.
pub type Vars = Map<String, Value>;

/// Common result type for the shared crates.
pub type Result<T> = std::result::Result<T, BakeryError>;

/// Workspace-wide error type.
#[derive(thiserror::Error, Debug)]
pub enum BakeryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Build a [`Vars`] bag from `key => value` pairs.
///
/// Values go through [`serde_json::Value::from`], so strings, numbers,
/// booleans and nested `Value`s are all accepted.
///
/// ```
/// use bakery_common::vars;
///
/// let vars = vars! { "name" => "Alice", "count" => 3 };
/// assert_eq!(vars["name"], "Alice");
/// assert_eq!(vars["count"], 3);
/// ```
#[macro_export]
macro_rules! vars {
    () => {
        $crate::Vars::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut vars = $crate::Vars::new();
        $(
            vars.insert(::std::string::ToString::to_string(&$key), $crate::utils::to_value($value));
        )+
        vars
    }};
}
