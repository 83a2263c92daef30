//! Saver that reports missing keys through the log.

use async_trait::async_trait;
use bakery_core::Saver;
use tracing::info;

/// Logs every missing key at `info` under the `bakery::missing` target.
///
/// Handy during development: run with `RUST_LOG=bakery::missing=info` to
/// collect the keys a screen is missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSaver;

impl LogSaver {
    /// Create a new log saver
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Saver for LogSaver {
    async fn save(&self, locale: &str, namespace: &str, key: &str, value: &str) -> anyhow::Result<()> {
        info!(
            target: "bakery::missing",
            locale,
            namespace,
            key,
            value,
            "Missing translation"
        );
        Ok(())
    }
}
