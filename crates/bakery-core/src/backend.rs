//! Loader and saver ports
//!
//! The engine calls these from background tasks spawned by `t()` on a
//! miss. Implementations own their retry and timeout policy; the engine
//! only deduplicates concurrent calls.

use crate::store::TranslationMap;
use async_trait::async_trait;

/// Fetches a namespace on demand.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Loads `namespace` for `locale`.
    ///
    /// `Ok(None)` means "not available now": the namespace stays unloaded
    /// and a later miss retries. Errors are logged and treated the same way.
    async fn load(&self, locale: &str, namespace: &str) -> anyhow::Result<Option<TranslationMap>>;
}

/// Persists missing keys for later translation.
#[async_trait]
pub trait Saver: Send + Sync {
    /// Saves `value` as the placeholder for `key`. Errors are logged and not
    /// retried.
    async fn save(&self, locale: &str, namespace: &str, key: &str, value: &str) -> anyhow::Result<()>;
}
