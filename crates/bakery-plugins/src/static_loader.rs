//! Loader serving namespaces bundled with the application.

use async_trait::async_trait;
use bakery_core::{Loader, TranslationMap};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::trace;

/// In-memory `(locale, namespace)` table answering [`Loader::load`].
///
/// ```
/// use bakery_plugins::StaticLoader;
/// use serde_json::json;
///
/// let loader = StaticLoader::new()
///     .with_json("en", "common", json!({ "hello": "Hello" }))
///     .unwrap();
/// assert!(loader.contains("en", "common"));
/// ```
#[derive(Debug, Default)]
pub struct StaticLoader {
    namespaces: RwLock<HashMap<(String, String), TranslationMap>>,
}

impl StaticLoader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a namespace, builder style
    #[must_use]
    pub fn with_namespace(
        self,
        locale: impl Into<String>,
        namespace: impl Into<String>,
        map: TranslationMap,
    ) -> Self {
        self.insert(locale, namespace, map);
        self
    }

    /// Adds a namespace from a JSON document
    pub fn with_json(
        self,
        locale: impl Into<String>,
        namespace: impl Into<String>,
        document: serde_json::Value,
    ) -> serde_json::Result<Self> {
        let map = bakery_core::store::from_json(document)?;
        Ok(self.with_namespace(locale, namespace, map))
    }

    /// Adds or replaces a namespace
    pub fn insert(&self, locale: impl Into<String>, namespace: impl Into<String>, map: TranslationMap) {
        self.namespaces
            .write()
            .insert((locale.into(), namespace.into()), map);
    }

    /// Whether the pair is served
    pub fn contains(&self, locale: &str, namespace: &str) -> bool {
        self.namespaces
            .read()
            .contains_key(&(locale.to_string(), namespace.to_string()))
    }
}

#[async_trait]
impl Loader for StaticLoader {
    async fn load(&self, locale: &str, namespace: &str) -> anyhow::Result<Option<TranslationMap>> {
        let map = self
            .namespaces
            .read()
            .get(&(locale.to_string(), namespace.to_string()))
            .cloned();
        if map.is_none() {
            trace!(locale, namespace, "No bundled namespace");
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_serves_known_pairs_only() {
        let loader = StaticLoader::new()
            .with_json("en", "shop", json!({ "cart": { "title": "Cart" } }))
            .unwrap();

        let map = loader.load("en", "shop").await.unwrap().unwrap();
        assert!(map.contains_key("cart"));
        assert!(loader.load("de", "shop").await.unwrap().is_none());
        assert!(loader.load("en", "home").await.unwrap().is_none());
    }

    #[test]
    fn test_invalid_document() {
        assert!(StaticLoader::new().with_json("en", "x", json!(["list"])).is_err());
    }
}
