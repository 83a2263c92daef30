//! Test utilities and shared test helpers for the bakery workspace.
//!
//! This module provides common testing utilities, fixtures, and helper
//! functions that can be used across all crates in the workspace for unit and
//! integration testing.

use std::sync::Once;

#[cfg(feature = "tracing-subscriber")]
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
#[cfg(feature = "tracing-subscriber")]
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// No-op version when tracing-subscriber is not available
#[cfg(not(feature = "tracing-subscriber"))]
pub fn init_test_logging() {
    INIT.call_once(|| {});
}

/// Create a tokio runtime for tests that drive async code from a
/// synchronous test body.
#[cfg(feature = "tokio")]
pub fn create_test_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().expect("Failed to create test runtime")
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Settings fixtures in every supported file format.
pub mod settings_fixtures {
    /// Minimal settings as TOML.
    pub fn minimal_settings_toml() -> &'static str {
        r#"
locale = "en"
"#
    }

    /// Full settings as TOML.
    pub fn full_settings_toml() -> &'static str {
        r#"
locale = "en-US"
fallback_locale = "es"
default_namespace = "common"
save_missing = true
debug = true
message_format = "icu"
escape_html = false

[pluralization]
strategy = "cldr"
plural_suffix = "_many"
"#
    }

    /// Full settings as YAML.
    pub fn full_settings_yaml() -> &'static str {
        concat!(
            "locale: \"en-US\"\n",
            "fallback_locale: \"es\"\n",
            "default_namespace: \"common\"\n",
            "save_missing: true\n",
            "message_format: \"icu\"\n",
            "pluralization:\n",
            "  strategy: \"cldr\"\n",
        )
    }

    /// Full settings as JSON.
    pub fn full_settings_json() -> &'static str {
        r#"{
  "locale": "en-US",
  "fallback_locale": "es",
  "save_missing": true,
  "message_format": "mustache",
  "pluralization": { "strategy": "suffix", "plural_suffix": "_plural" }
}"#
    }
}

/// Translation data fixtures.
pub mod translation_fixtures {
    use serde_json::{json, Value};

    /// A nested namespace as it would arrive from a loader.
    pub fn nested_namespace() -> Value {
        json!({
            "title": "Home Page",
            "hero": {
                "title": "Welcome",
                "cta": { "label": "Get started" }
            },
            "apple": "apple",
            "apple_plural": "apples",
            "apple_0": "no apples"
        })
    }

    /// A namespace using CLDR category suffixes.
    pub fn cldr_namespace() -> Value {
        json!({
            "item_zero": "no items",
            "item_one": "{{count}} item",
            "item_two": "two items",
            "item_few": "{{count}} items (few)",
            "item_many": "{{count}} items (many)",
            "item_other": "{{count}} items"
        })
    }
}
