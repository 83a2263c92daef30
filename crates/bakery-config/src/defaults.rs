//! Default values for every settings section.

use crate::schema::{I18nSettings, MessageFormat, PluralizationSettings, PluralizationStrategy};

/// Suffix appended to plural keys by the suffix strategy.
pub const DEFAULT_PLURAL_SUFFIX: &str = "_plural";

impl Default for I18nSettings {
    fn default() -> Self {
        Self {
            // Required: left empty so validation reports a missing locale.
            locale: String::new(),
            fallback_locale: None,
            default_namespace: None,
            save_missing: false,
            debug: false,
            pluralization: PluralizationSettings::default(),
            message_format: MessageFormat::default(),
            escape_html: true,
        }
    }
}

impl Default for PluralizationSettings {
    fn default() -> Self {
        Self {
            strategy: PluralizationStrategy::default(),
            plural_suffix: DEFAULT_PLURAL_SUFFIX.to_string(),
        }
    }
}

impl Default for PluralizationStrategy {
    fn default() -> Self {
        Self::Suffix
    }
}

impl Default for MessageFormat {
    fn default() -> Self {
        Self::Mustache
    }
}
