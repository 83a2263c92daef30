//! Settings schema definitions using serde.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Engine settings recognized by the translation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nSettings {
    /// Locale used for lookups until `set_locale` changes it.
    ///
    /// Validation requires a BCP-47 language identifier here and in
    /// `fallback_locale`. At runtime locales are opaque store keys:
    /// `set_locale` takes any string, and one without CLDR rules
    /// pluralizes like `en`.
    pub locale: String,
    /// Secondary locale consulted when a key is absent in the current one.
    pub fallback_locale: Option<String>,
    /// Namespace for keys that carry neither a colon nor a dot.
    pub default_namespace: Option<String>,
    /// Whether missing keys are handed to the configured saver.
    pub save_missing: bool,
    /// Raises the engine's trigger messages to `debug` level.
    pub debug: bool,
    /// Pluralization settings.
    pub pluralization: PluralizationSettings,
    /// Message template syntax.
    pub message_format: MessageFormat,
    /// Whether substituted variable values are HTML-escaped.
    pub escape_html: bool,
}

/// Pluralization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluralizationSettings {
    /// Strategy used to pick plural keys.
    pub strategy: PluralizationStrategy,
    /// Suffix appended to plural keys by the suffix strategy.
    pub plural_suffix: String,
}

/// Plural key strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluralizationStrategy {
    /// `key`, `key_plural`, `key_<count>`.
    Suffix,
    /// `key_one`, `key_other`, `key_few`, ...
    Cldr,
}

/// Message template syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageFormat {
    /// `{{variable}}` interpolation.
    Mustache,
    /// ICU subset: plural, select, selectordinal and `{variable}`.
    Icu,
}

impl FromStr for PluralizationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "suffix" => Ok(Self::Suffix),
            "cldr" => Ok(Self::Cldr),
            other => Err(format!("unknown pluralization strategy '{other}'")),
        }
    }
}

impl FromStr for MessageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mustache" => Ok(Self::Mustache),
            "icu" => Ok(Self::Icu),
            other => Err(format!("unknown message format '{other}'")),
        }
    }
}

impl fmt::Display for PluralizationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suffix => write!(f, "suffix"),
            Self::Cldr => write!(f, "cldr"),
        }
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mustache => write!(f, "mustache"),
            Self::Icu => write!(f, "icu"),
        }
    }
}

impl I18nSettings {
    /// Settings for `locale` with every other field at its default.
    pub fn for_locale(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            ..Self::default()
        }
    }

    /// Sets the fallback locale.
    #[must_use]
    pub fn with_fallback_locale(mut self, locale: impl Into<String>) -> Self {
        self.fallback_locale = Some(locale.into());
        self
    }

    /// Sets the default namespace.
    #[must_use]
    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = Some(namespace.into());
        self
    }

    /// Enables or disables missing-key saving.
    #[must_use]
    pub const fn with_save_missing(mut self, save_missing: bool) -> Self {
        self.save_missing = save_missing;
        self
    }

    /// Selects the pluralization strategy.
    #[must_use]
    pub const fn with_pluralization(mut self, strategy: PluralizationStrategy) -> Self {
        self.pluralization.strategy = strategy;
        self
    }

    /// Selects the message format.
    #[must_use]
    pub const fn with_message_format(mut self, format: MessageFormat) -> Self {
        self.message_format = format;
        self
    }

    /// Turns HTML escaping of substituted values on or off.
    #[must_use]
    pub const fn with_escape_html(mut self, escape: bool) -> Self {
        self.escape_html = escape;
        self
    }
}
