//! Runtime validation of engine settings.

use crate::schema::I18nSettings;
use bakery_common::{BakeryError, Result};
use unic_langid::LanguageIdentifier;

/// Settings validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a settings value.
    ///
    /// # Errors
    ///
    /// Returns [`BakeryError::Config`] describing the first invalid field.
    pub fn validate(settings: &I18nSettings) -> Result<()> {
        if settings.locale.trim().is_empty() {
            return Err(BakeryError::Config("locale is required".to_string()));
        }
        Self::validate_locale("locale", &settings.locale)?;

        if let Some(fallback) = &settings.fallback_locale {
            Self::validate_locale("fallback_locale", fallback)?;
        }

        if let Some(namespace) = &settings.default_namespace {
            if namespace.trim().is_empty() {
                return Err(BakeryError::Config(
                    "default_namespace cannot be empty".to_string(),
                ));
            }
            if namespace.contains([':', '.']) {
                return Err(BakeryError::Config(format!(
                    "default_namespace '{namespace}' cannot contain ':' or '.'"
                )));
            }
        }

        if settings.pluralization.plural_suffix.is_empty() {
            return Err(BakeryError::Config(
                "pluralization.plural_suffix cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_locale(field: &str, locale: &str) -> Result<()> {
        locale
            .parse::<LanguageIdentifier>()
            .map(|_| ())
            .map_err(|e| BakeryError::Config(format!("{field} '{locale}' is not a valid locale: {e}")))
    }
}

impl I18nSettings {
    /// Validates these settings.
    ///
    /// # Errors
    ///
    /// See [`ConfigValidator::validate`].
    pub fn validate(&self) -> Result<()> {
        ConfigValidator::validate(self)
    }
}
