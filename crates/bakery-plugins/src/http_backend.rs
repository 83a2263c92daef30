//! HTTP translation backend
//!
//! Fetches namespaces as JSON documents. URLs come from a `load_path`
//! pattern (`/locales/{{lng}}/{{ns}}.json`) or, when a manifest is
//! configured, from its `"locale/namespace"` entries so hashed bundle names
//! resolve without the caller knowing them.

use crate::error::PluginResult;
use async_trait::async_trait;
use bakery_common::Vars;
use bakery_core::{Loader, Plugin, PluginConfig, PluginKind, PluginMetadata, TranslationMap};
use reqwest::Client;
use std::{collections::HashMap, time::Duration};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Placeholder replaced with the locale in `load_path`.
pub const LOCALE_PLACEHOLDER: &str = "{{lng}}";
/// Placeholder replaced with the namespace in `load_path`.
pub const NAMESPACE_PLACEHOLDER: &str = "{{ns}}";

/// Configuration for [`HttpBackend`]
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Path pattern, e.g. `/locales/{{lng}}/{{ns}}.json`
    pub load_path: String,
    /// Base for relative paths. Without it paths must be absolute URLs.
    pub base_url: Option<Url>,
    /// Location of the manifest mapping `locale/namespace` to a path
    pub manifest_path: Option<String>,
    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            load_path: "/locales/{{lng}}/{{ns}}.json".to_string(),
            base_url: None,
            manifest_path: None,
            timeout_secs: 10,
        }
    }
}

impl HttpBackendConfig {
    /// Create a configuration for the given path pattern
    pub fn new(load_path: impl Into<String>) -> Self {
        Self {
            load_path: load_path.into(),
            ..Default::default()
        }
    }

    /// Resolve relative paths against `base_url`
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Consult a manifest before falling back to `load_path`
    #[must_use]
    pub fn with_manifest(mut self, manifest_path: impl Into<String>) -> Self {
        self.manifest_path = Some(manifest_path.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Backend plugin and [`Loader`] that fetches namespaces over HTTP.
#[derive(Debug)]
pub struct HttpBackend {
    metadata: PluginMetadata,
    client: Client,
    config: HttpBackendConfig,
    manifest: OnceCell<HashMap<String, String>>,
}

impl HttpBackend {
    /// Create a backend with its own connection pool
    pub fn new(config: HttpBackendConfig) -> PluginResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            metadata: PluginMetadata::new("http-backend", "1.0.0", PluginKind::Backend)
                .with_description("Loads translation namespaces over HTTP"),
            client,
            config,
            manifest: OnceCell::new(),
        })
    }

    /// The active configuration
    pub const fn config(&self) -> &HttpBackendConfig {
        &self.config
    }

    /// Fetches the manifest once. Failures leave an empty manifest, so
    /// every namespace falls back to `load_path`.
    pub async fn load_manifest(&self) -> &HashMap<String, String> {
        self.manifest
            .get_or_init(|| async {
                let Some(path) = self.config.manifest_path.as_deref() else {
                    return HashMap::new();
                };
                match self.fetch_manifest(path).await {
                    Ok(manifest) => {
                        info!(path, entries = manifest.len(), "Loaded translation manifest");
                        manifest
                    }
                    Err(e) => {
                        warn!(path, error = %e, "Failed to load translation manifest");
                        HashMap::new()
                    }
                }
            })
            .await
    }

    async fn fetch_manifest(&self, path: &str) -> PluginResult<HashMap<String, String>> {
        let url = self.resolve_url(path)?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    /// `load_path` with the placeholders filled in
    pub fn load_path_for(&self, locale: &str, namespace: &str) -> String {
        self.config
            .load_path
            .replace(LOCALE_PLACEHOLDER, locale)
            .replace(NAMESPACE_PLACEHOLDER, namespace)
    }

    /// Path for a namespace, preferring the manifest entry when present
    pub async fn path_for(&self, locale: &str, namespace: &str) -> String {
        let manifest = self.load_manifest().await;
        manifest
            .get(&format!("{locale}/{namespace}"))
            .cloned()
            .unwrap_or_else(|| self.load_path_for(locale, namespace))
    }

    fn resolve_url(&self, path: &str) -> PluginResult<Url> {
        match &self.config.base_url {
            Some(base) => Ok(base.join(path)?),
            None => Ok(Url::parse(path)?),
        }
    }
}

impl Plugin for HttpBackend {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn default_config(&self) -> PluginConfig {
        let mut options = Vars::new();
        options.insert("loadPath".into(), self.config.load_path.clone().into());
        if let Some(manifest) = &self.config.manifest_path {
            options.insert("manifestPath".into(), manifest.clone().into());
        }
        PluginConfig::with_options(options)
    }
}

#[async_trait]
impl Loader for HttpBackend {
    #[instrument(skip(self))]
    async fn load(&self, locale: &str, namespace: &str) -> anyhow::Result<Option<TranslationMap>> {
        let path = self.path_for(locale, namespace).await;
        let url = match self.resolve_url(&path) {
            Ok(url) => url,
            Err(e) => {
                warn!(path = %path, error = %e, "Invalid translation URL");
                return Ok(None);
            }
        };

        debug!("Fetching translations from: {}", url);
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(url = %url, error = %e, "Network error loading translations");
                return Ok(None);
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Failed to load translations");
            return Ok(None);
        }

        match response.json::<TranslationMap>().await {
            Ok(map) => Ok(Some(map)),
            Err(e) => {
                error!(url = %url, error = %e, "Invalid translation document");
                Ok(None)
            }
        }
    }
}
