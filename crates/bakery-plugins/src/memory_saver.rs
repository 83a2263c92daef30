//! In-memory outbox for missing keys.

use async_trait::async_trait;
use bakery_core::Saver;
use parking_lot::Mutex;
use serde::Serialize;

/// One missing key reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingEntry {
    /// Locale active when the key was missed
    pub locale: String,
    /// Namespace of the key
    pub namespace: String,
    /// Key within the namespace
    pub key: String,
    /// Placeholder text recorded for the key
    pub value: String,
}

/// Collects saved keys in arrival order until a host drains them.
#[derive(Debug, Default)]
pub struct MemorySaver {
    entries: Mutex<Vec<MissingEntry>>,
}

impl MemorySaver {
    /// Create an empty saver
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the collected entries
    pub fn entries(&self) -> Vec<MissingEntry> {
        self.entries.lock().clone()
    }

    /// Takes every collected entry, leaving the saver empty
    pub fn drain(&self) -> Vec<MissingEntry> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Number of collected entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been collected
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl Saver for MemorySaver {
    async fn save(&self, locale: &str, namespace: &str, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.lock().push(MissingEntry {
            locale: locale.to_string(),
            namespace: namespace.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }
}
