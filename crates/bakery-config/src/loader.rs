//! Settings loading from TOML, YAML or JSON files.

use crate::schema::I18nSettings;
use bakery_common::{BakeryError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// On-disk settings format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    /// `.toml`
    Toml,
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl SettingsFormat {
    /// Detects the format from a path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`BakeryError::Config`] for unknown or missing extensions.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("toml") => Ok(Self::Toml),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(BakeryError::Config(format!(
                "unsupported settings file extension: {}",
                path.display()
            ))),
        }
    }
}

/// Settings loader.
pub struct SettingsLoader {
    path: PathBuf,
}

impl SettingsLoader {
    /// Creates a new settings loader for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads, overrides from the process environment, and validates.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, parsed, or validated.
    pub async fn load(&self) -> Result<I18nSettings> {
        let format = SettingsFormat::from_path(&self.path)?;
        debug!("Loading settings file: {:?}", self.path);

        let content = tokio::fs::read_to_string(&self.path).await?;
        let mut settings = Self::parse_str(&content, format)?;
        Self::apply_env_overrides(&mut settings);
        settings.validate()?;

        info!(
            "Loaded settings from {:?} (locale: {})",
            self.path, settings.locale
        );
        Ok(settings)
    }

    /// Parses settings from a string in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`BakeryError::Serialization`] on malformed input.
    pub fn parse_str(content: &str, format: SettingsFormat) -> Result<I18nSettings> {
        match format {
            SettingsFormat::Toml => {
                toml::from_str(content).map_err(|e| BakeryError::Serialization(e.to_string()))
            }
            SettingsFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| BakeryError::Serialization(e.to_string()))
            }
            SettingsFormat::Json => {
                serde_json::from_str(content).map_err(|e| BakeryError::Serialization(e.to_string()))
            }
        }
    }

    /// Applies `BAKERY_*` environment variables on top of `settings`.
    pub fn apply_env_overrides(settings: &mut I18nSettings) {
        Self::apply_overrides_from(settings, |name| std::env::var(name).ok());
    }

    /// Applies overrides read through `lookup` (an environment stand-in).
    pub fn apply_overrides_from<F>(settings: &mut I18nSettings, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(locale) = lookup("BAKERY_LOCALE") {
            settings.locale = locale;
        }
        if let Some(fallback) = lookup("BAKERY_FALLBACK_LOCALE") {
            settings.fallback_locale = Some(fallback).filter(|f| !f.is_empty());
        }
        if let Some(namespace) = lookup("BAKERY_DEFAULT_NAMESPACE") {
            settings.default_namespace = Some(namespace).filter(|n| !n.is_empty());
        }
        if let Some(flag) = lookup("BAKERY_SAVE_MISSING") {
            match flag.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => settings.save_missing = true,
                "0" | "false" | "no" | "off" => settings.save_missing = false,
                other => warn!("Ignoring BAKERY_SAVE_MISSING={other}: not a boolean"),
            }
        }
        if let Some(format) = lookup("BAKERY_MESSAGE_FORMAT") {
            match format.parse() {
                Ok(format) => settings.message_format = format,
                Err(e) => warn!("Ignoring BAKERY_MESSAGE_FORMAT: {e}"),
            }
        }
        if let Some(strategy) = lookup("BAKERY_PLURALIZATION") {
            match strategy.parse() {
                Ok(strategy) => settings.pluralization.strategy = strategy,
                Err(e) => warn!("Ignoring BAKERY_PLURALIZATION: {e}"),
            }
        }
    }
}
