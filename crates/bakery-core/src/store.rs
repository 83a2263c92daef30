//! In-memory translation storage
//!
//! Translations are kept as `locale → namespace → map`, where maps nest
//! arbitrarily and every leaf is a string.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A translation entry: a string leaf or a nested map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslationValue {
    /// Leaf template.
    Text(String),
    /// Nested group of entries.
    Nested(TranslationMap),
}

/// Key → value mapping for one namespace.
pub type TranslationMap = BTreeMap<String, TranslationValue>;

/// Namespace → map for one locale.
pub type NamespaceMap = BTreeMap<String, TranslationMap>;

impl TranslationValue {
    /// The leaf text, if this is a leaf.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Nested(_) => None,
        }
    }
}

impl From<&str> for TranslationValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for TranslationValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<TranslationMap> for TranslationValue {
    fn from(map: TranslationMap) -> Self {
        Self::Nested(map)
    }
}

/// Builds a [`TranslationMap`] from JSON, rejecting non-string leaves.
///
/// # Errors
///
/// Fails when `value` is not an object of strings and objects.
pub fn from_json(value: serde_json::Value) -> serde_json::Result<TranslationMap> {
    serde_json::from_value(value)
}

/// Storage port used by the translation service.
pub trait Store: Send + Sync {
    /// Looks up `key`, trying a direct match before walking dotted segments.
    fn get(&self, locale: &str, namespace: &str, key: &str) -> Option<&str>;

    /// Stores a single leaf under `key` (stored flat, not split on dots).
    fn set(&mut self, locale: &str, namespace: &str, key: &str, value: String);

    /// Replaces a whole namespace.
    fn set_namespace(&mut self, locale: &str, namespace: &str, translations: TranslationMap);

    /// Whether [`Store::get`] would find a value.
    fn has(&self, locale: &str, namespace: &str, key: &str) -> bool {
        self.get(locale, namespace, key).is_some()
    }

    /// Every namespace stored for `locale`.
    fn get_all(&self, locale: &str) -> Option<&NamespaceMap>;
}

/// [`Store`] backed by nested maps.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    data: HashMap<String, NamespaceMap>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Locales with at least one namespace.
    pub fn locales(&self) -> Vec<&str> {
        self.data.keys().map(String::as_str).collect()
    }

    fn namespace_mut(&mut self, locale: &str, namespace: &str) -> &mut TranslationMap {
        self.data
            .entry(locale.to_string())
            .or_default()
            .entry(namespace.to_string())
            .or_default()
    }
}

impl Store for MemoryStore {
    fn get(&self, locale: &str, namespace: &str, key: &str) -> Option<&str> {
        let map = self.data.get(locale)?.get(namespace)?;

        if let Some(text) = map.get(key).and_then(TranslationValue::as_text) {
            return Some(text);
        }

        if !key.contains('.') {
            return None;
        }

        let mut segments = key.split('.');
        let mut current = map.get(segments.next()?)?;
        for segment in segments {
            match current {
                TranslationValue::Nested(inner) => current = inner.get(segment)?,
                TranslationValue::Text(_) => return None,
            }
        }
        current.as_text()
    }

    fn set(&mut self, locale: &str, namespace: &str, key: &str, value: String) {
        self.namespace_mut(locale, namespace)
            .insert(key.to_string(), TranslationValue::Text(value));
    }

    fn set_namespace(&mut self, locale: &str, namespace: &str, translations: TranslationMap) {
        self.data
            .entry(locale.to_string())
            .or_default()
            .insert(namespace.to_string(), translations);
    }

    fn get_all(&self, locale: &str) -> Option<&NamespaceMap> {
        self.data.get(locale)
    }
}
