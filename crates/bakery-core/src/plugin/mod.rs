//! Plugin system
//!
//! Plugins observe and reshape translation calls through hooks:
//!
//! * `before_translate` may return a [`ContextPatch`] that is merged into
//!   the live [`PluginContext`] (key, namespace, vars, ...)
//! * `after_translate` may replace the rendered result
//! * `on_missing`, `on_load` and `on_locale_change` are notifications
//!
//! Every hook returns `anyhow::Result`. Errors and panics are logged with
//! the plugin name and never reach the caller of `t()`.

mod manager;

pub use manager::PluginManager;

use crate::store::TranslationMap;
use bakery_common::Vars;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a plugin is for. Used for grouping only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    /// Number, date or currency formatting.
    Formatter,
    /// Translation loading or saving.
    Backend,
    /// Locale detection.
    Detector,
    /// Result post-processing.
    Processor,
    /// General pipeline middleware.
    Middleware,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Formatter => "formatter",
            Self::Backend => "backend",
            Self::Detector => "detector",
            Self::Processor => "processor",
            Self::Middleware => "middleware",
        };
        f.write_str(name)
    }
}

/// Identity and dependency information of a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Unique name.
    pub name: String,
    /// Plugin version.
    pub version: String,
    /// Plugin kind.
    pub kind: PluginKind,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Plugins that must be registered first.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl PluginMetadata {
    /// Metadata with no description, author or dependencies.
    pub fn new(name: impl Into<String>, version: impl Into<String>, kind: PluginKind) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            kind,
            description: None,
            author: None,
            dependencies: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Adds a dependency.
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }
}

/// Per-registration plugin configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Disabled plugins stay registered but receive no hooks.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Options handed to [`Plugin::init`].
    #[serde(default)]
    pub options: Vars,
}

fn enabled_by_default() -> bool {
    true
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            options: Vars::new(),
        }
    }
}

impl PluginConfig {
    /// An enabled config carrying `options`.
    pub fn with_options(options: Vars) -> Self {
        Self {
            enabled: true,
            options,
        }
    }

    /// A disabled config.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// State of one translation call as seen by plugins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginContext {
    /// Active locale.
    pub locale: String,
    /// Parsed namespace.
    pub namespace: Option<String>,
    /// Parsed key, without namespace.
    pub key: Option<String>,
    /// Interpolation variables.
    pub vars: Option<Vars>,
    /// Rendered result (after-translate and missing hooks).
    pub result: Option<String>,
    /// Scratch space plugins use to pass data between hooks.
    pub data: Vars,
}

impl PluginContext {
    /// A context for `locale` with nothing else set.
    pub fn for_locale(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            ..Self::default()
        }
    }

    /// Merges a patch. Fields present in the patch replace whole fields.
    pub fn apply(&mut self, patch: ContextPatch) {
        let ContextPatch {
            locale,
            namespace,
            key,
            vars,
            result,
            data,
        } = patch;
        if let Some(locale) = locale {
            self.locale = locale;
        }
        if let Some(namespace) = namespace {
            self.namespace = Some(namespace);
        }
        if let Some(key) = key {
            self.key = Some(key);
        }
        if let Some(vars) = vars {
            self.vars = Some(vars);
        }
        if let Some(result) = result {
            self.result = Some(result);
        }
        if let Some(data) = data {
            self.data = data;
        }
    }
}

/// Partial context returned from `before_translate`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextPatch {
    /// Replacement locale.
    pub locale: Option<String>,
    /// Replacement namespace.
    pub namespace: Option<String>,
    /// Replacement key.
    pub key: Option<String>,
    /// Replacement variables.
    pub vars: Option<Vars>,
    /// Replacement result.
    pub result: Option<String>,
    /// Replacement scratch data.
    pub data: Option<Vars>,
}

impl ContextPatch {
    /// Sets the key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the variables.
    pub fn vars(mut self, vars: Vars) -> Self {
        self.vars = Some(vars);
        self
    }

    /// Sets the scratch data.
    pub fn data(mut self, data: Vars) -> Self {
        self.data = Some(data);
        self
    }
}

/// A hook invocation.
#[derive(Debug, Clone, Copy)]
pub enum Hook<'a> {
    /// Before lookup; patches are merged into the context.
    BeforeTranslate,
    /// After rendering; may replace `context.result`.
    AfterTranslate,
    /// A lookup missed in every locale.
    Missing,
    /// A namespace finished loading.
    Load {
        /// Loaded locale.
        locale: &'a str,
        /// Loaded namespace.
        namespace: &'a str,
        /// Loaded entries.
        data: &'a TranslationMap,
    },
    /// The active locale changed.
    LocaleChange {
        /// Previous locale.
        old: &'a str,
        /// New locale.
        new: &'a str,
    },
}

impl Hook<'_> {
    /// Hook name used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BeforeTranslate => "before_translate",
            Self::AfterTranslate => "after_translate",
            Self::Missing => "on_missing",
            Self::Load { .. } => "on_load",
            Self::LocaleChange { .. } => "on_locale_change",
        }
    }
}

/// An engine extension.
///
/// Every hook has a no-op default, so plugins implement only what they use.
/// Hooks run synchronously inside `t()`; plugins needing mutable state keep
/// it behind a lock.
pub trait Plugin: Send + Sync {
    /// Name, version, kind and dependencies.
    fn metadata(&self) -> &PluginMetadata;

    /// Configuration used when none is given at registration.
    fn default_config(&self) -> PluginConfig {
        PluginConfig::default()
    }

    /// Called once at registration with the configured options.
    fn init(&self, _options: &Vars) -> anyhow::Result<()> {
        Ok(())
    }

    /// May return a patch merged into the context before lookup.
    fn before_translate(&self, _context: &PluginContext) -> anyhow::Result<Option<ContextPatch>> {
        Ok(None)
    }

    /// May return a replacement for the rendered result.
    fn after_translate(&self, _context: &PluginContext) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    /// A key was not found in any locale.
    fn on_missing(&self, _context: &PluginContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// A namespace was loaded in the background.
    fn on_load(&self, _locale: &str, _namespace: &str, _data: &TranslationMap) -> anyhow::Result<()> {
        Ok(())
    }

    /// The active locale changed.
    fn on_locale_change(&self, _old: &str, _new: &str) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called when the plugin is unregistered.
    fn destroy(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
