//! Runtime key parsing
//!
//! Splits the keys passed to `t()` into a namespace and a key. This parser
//! never fails: translation lookups run on render paths, so malformed input
//! degrades to the default namespace instead of raising an error.
//!
//! The file-oriented rules used by build tooling live in
//! [`crate::path_key`]; the two rule sets are deliberately independent.

use serde::{Deserialize, Serialize};

/// Namespace and key produced by [`RuntimeKeyParser::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyParts {
    /// Namespace the key belongs to (`home`, `home/hero`, ...).
    pub namespace: String,
    /// Key within the namespace; may still contain dots for nested lookup.
    pub key: String,
}

/// Collapses repeated `:` and `.` separators and trims separators and
/// whitespace from both ends.
///
/// The result is stable under repeated application:
///
/// ```
/// use bakery_core::key::normalize;
///
/// assert_eq!(normalize(" ::home::.hero..title. "), "home:.hero.title");
/// assert_eq!(normalize(&normalize("..a::b..")), normalize("..a::b.."));
/// ```
pub fn normalize(key: &str) -> String {
    let mut collapsed = String::with_capacity(key.len());
    let mut previous: Option<char> = None;
    for c in key.chars() {
        if (c == ':' || c == '.') && previous == Some(c) {
            continue;
        }
        collapsed.push(c);
        previous = Some(c);
    }

    collapsed
        .trim_matches(|c: char| c == ':' || c == '.' || c.is_whitespace())
        .to_string()
}

/// Parser for the keys handed to the translation service.
#[derive(Debug, Clone, Default)]
pub struct RuntimeKeyParser {
    default_namespace: Option<String>,
}

impl RuntimeKeyParser {
    /// Creates a parser with an optional default namespace.
    pub fn new(default_namespace: Option<String>) -> Self {
        Self { default_namespace }
    }

    /// The configured default namespace, if any.
    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// See [`normalize`].
    pub fn normalize(&self, key: &str) -> String {
        normalize(key)
    }

    /// Splits `key` into namespace and key.
    ///
    /// * With a colon, the split happens at the last colon and any earlier
    ///   colons become `/` (`home:hero:title` → `home/hero`, `title`).
    /// * Otherwise, at the first dot (`home.hero.title` → `home`,
    ///   `hero.title`).
    /// * Otherwise the namespace is the default namespace, or the current
    ///   locale when none is configured.
    pub fn parse(&self, key: &str, current_locale: &str) -> KeyParts {
        let normalized = normalize(key);

        if let Some((namespace, rest)) = normalized.rsplit_once(':') {
            return KeyParts {
                namespace: namespace.replace(':', "/"),
                key: rest.to_string(),
            };
        }

        if let Some((namespace, rest)) = normalized.split_once('.') {
            return KeyParts {
                namespace: namespace.to_string(),
                key: rest.to_string(),
            };
        }

        KeyParts {
            namespace: self
                .default_namespace
                .clone()
                .unwrap_or_else(|| current_locale.to_string()),
            key: normalized,
        }
    }
}
